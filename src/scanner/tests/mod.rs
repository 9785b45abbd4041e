//! Test modules for the scanner system
//!
//! Project-level and fleet-level scans against the in-memory hosting backend.

pub mod helpers;
pub mod project;
