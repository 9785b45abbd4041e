//! Scanner Integration Test Modules

pub mod fleet;
pub mod report;
