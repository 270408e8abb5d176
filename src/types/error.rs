//! Error types for dircat

use std::path::PathBuf;
use thiserror::Error;

/// Error types for dircat operations
#[derive(Debug, Error)]
pub enum DircatError {
    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// The source directory could not be listed
    #[error("read directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The output file could not be created
    #[error("create {path}: {source}")]
    OutputCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An input file could not be opened
    #[error("open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading an input file or writing to the output failed mid-copy
    #[error("copy {path}: {source}")]
    Copy {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The output could not be flushed after the copy loop
    #[error("flush {path}: {source}")]
    OutputFlush {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Profiling setup or report write failed
    #[error("Profiling error: {0}")]
    Profile(String),
}

impl DircatError {
    /// Errors raised before the copy loop starts (listing, output, config)
    pub fn is_setup_error(&self) -> bool {
        matches!(
            self,
            DircatError::DirectoryRead { .. }
                | DircatError::OutputCreate { .. }
                | DircatError::Config(_)
        )
    }

    /// Errors raised by the copy loop for a specific input file
    pub fn is_copy_error(&self) -> bool {
        matches!(self, DircatError::Open { .. } | DircatError::Copy { .. })
    }

    /// Path of the file this error refers to, if any
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            DircatError::DirectoryRead { path, .. }
            | DircatError::OutputCreate { path, .. }
            | DircatError::Open { path, .. }
            | DircatError::Copy { path, .. }
            | DircatError::OutputFlush { path, .. } => Some(path),
            DircatError::Config(_) | DircatError::Profile(_) => None,
        }
    }

    /// Process exit status for a run that ended with this error
    pub fn exit_code(&self) -> u8 {
        1
    }
}
