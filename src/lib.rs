//! # dircat - Directory Concatenation
//!
//! Reads every entry of a directory in name order and streams the contents
//! into a single output file, printing a progress line per file.
//!
//! One enumerator thread feeds a single-slot queue; the copier drains it on
//! the caller's thread and stops at the first error.

// Module declarations
pub mod config;
pub mod scanner;
pub mod executor;
pub mod profile;
pub mod ui;
pub mod commands;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use types::{DircatError, FileRef};
pub use executor::CopyStats;
pub use config::Config;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
