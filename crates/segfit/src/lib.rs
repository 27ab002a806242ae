//! Application logic for the segfit command-line driver.

pub mod app;
pub mod config;
pub mod errors;
pub mod report;
