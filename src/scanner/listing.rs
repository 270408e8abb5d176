//! Flat directory listing
//!
//! The listing is read in full before the pipeline starts, so a failure here
//! is fatal and never reaches the enumerator.

use crate::config::Config;
use crate::types::{DircatError, FileRef};
use std::io;
use std::path::Path;

/// List the entries of `root_path`, sorted by file name.
///
/// Only direct children are returned (no recursion). Hidden files and
/// subdirectories are listed like any other entry; `config.exclude_patterns`
/// drops entries whose name matches one of the globs.
///
/// # Errors
/// * `DircatError::DirectoryRead` if the directory is missing, is not a
///   directory, or an entry cannot be read
/// * `DircatError::Config` for an invalid exclude pattern
pub fn list_directory(root_path: &Path, config: &Config) -> Result<Vec<FileRef>, DircatError> {
    let metadata = std::fs::metadata(root_path).map_err(|source| DircatError::DirectoryRead {
        path: root_path.to_path_buf(),
        source,
    })?;
    if !metadata.is_dir() {
        return Err(DircatError::DirectoryRead {
            path: root_path.to_path_buf(),
            source: io::Error::other("not a directory"),
        });
    }

    let mut override_builder = ignore::overrides::OverrideBuilder::new(root_path);
    for pattern in &config.exclude_patterns {
        // The ignore crate's OverrideBuilder uses ! for exclusion
        let exclude_pattern = format!("!{}", pattern);
        override_builder.add(&exclude_pattern).map_err(|e| {
            DircatError::Config(format!("Invalid exclude pattern '{}': {}", pattern, e))
        })?;
    }
    let overrides = override_builder
        .build()
        .map_err(|e| DircatError::Config(format!("Failed to build exclude overrides: {}", e)))?;

    let walker = ignore::WalkBuilder::new(root_path)
        .standard_filters(false)
        .max_depth(Some(1))
        .sort_by_file_name(|a, b| a.cmp(b))
        .overrides(overrides)
        .build();

    let mut entries = Vec::new();
    for result in walker {
        let entry = result.map_err(|e| {
            let message = e.to_string();
            DircatError::DirectoryRead {
                path: root_path.to_path_buf(),
                source: e.into_io_error().unwrap_or_else(|| io::Error::other(message)),
            }
        })?;

        // Depth 0 is the root itself
        if entry.depth() == 0 {
            continue;
        }

        entries.push(FileRef::new(root_path, entry.file_name().to_os_string()));
    }

    tracing::debug!(
        directory = %root_path.display(),
        entries = entries.len(),
        "listed directory"
    );

    Ok(entries)
}
