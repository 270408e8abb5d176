//! FileRef - A not-yet-opened input file

use std::ffi::OsString;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Identifies one input file by its path (directory joined with entry name).
///
/// A `FileRef` is created from a directory entry, travels through the queue
/// by value and is consumed by the copier, which opens it exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRef {
    path: PathBuf,
    name: OsString,
}

impl FileRef {
    /// Create a reference to `name` inside `dir`
    pub fn new(dir: &Path, name: impl Into<OsString>) -> Self {
        let name = name.into();
        Self {
            path: dir.join(&name),
            name,
        }
    }

    /// Full path of the file (directory joined with entry name)
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bare directory entry name
    pub fn name(&self) -> &std::ffi::OsStr {
        &self.name
    }

    /// Open the file for reading
    pub fn open(&self) -> std::io::Result<File> {
        File::open(&self.path)
    }
}
