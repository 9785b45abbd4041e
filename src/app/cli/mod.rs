//! CLI module containing argument parsing, configuration file handling and
//! resolution of the final scan settings

pub mod api;
pub mod args;
pub mod config;
pub mod error;
pub mod settings;
pub mod validation;
