//! Application module

pub mod cli;
pub mod scan;
pub mod startup;
