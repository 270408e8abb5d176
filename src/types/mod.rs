//! Core type definitions for dircat

mod error;
mod file_ref;

pub use error::DircatError;
pub use file_ref::FileRef;
