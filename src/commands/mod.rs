//! Top-level commands

pub mod concat;
