pub mod app;
pub mod core;
pub mod hosting;
pub mod report;
pub mod scanner;
