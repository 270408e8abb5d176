//! Copier: the consumer side of the pipeline

use super::{emit_event, CopyStats, EventCallback, PipelineEvent};
use crate::types::{DircatError, FileRef};
use std::io::{ErrorKind, Read, Write};
use tokio::sync::mpsc;

/// Stream one file into `sink`
///
/// The file is read in `buffer`-sized chunks, so memory use does not grow
/// with file size. The input handle is closed when this function returns,
/// on success and on every error path.
///
/// # Arguments
/// * `file_ref` - File to open and copy
/// * `sink` - Output stream; receives the file's bytes appended
/// * `buffer` - Scratch buffer, reused across files
///
/// # Returns
/// * `Ok(u64)` - Number of bytes copied
/// * `Err(DircatError::Open)` - The file could not be opened
/// * `Err(DircatError::Copy)` - Reading the file or writing the sink failed
///
/// # Example
/// ```no_run
/// use dircat::executor::copy_file_into;
/// use dircat::types::FileRef;
/// use std::path::Path;
///
/// let mut out = Vec::new();
/// let mut buffer = vec![0u8; 128 * 1024];
/// let bytes = copy_file_into(&FileRef::new(Path::new("testdata"), "a.txt"), &mut out, &mut buffer)?;
/// # Ok::<(), dircat::types::DircatError>(())
/// ```
pub fn copy_file_into<W: Write + ?Sized>(
    file_ref: &FileRef,
    sink: &mut W,
    buffer: &mut [u8],
) -> Result<u64, DircatError> {
    let mut file = file_ref.open().map_err(|source| DircatError::Open {
        path: file_ref.path().to_path_buf(),
        source,
    })?;

    let copy_error = |source: std::io::Error| DircatError::Copy {
        path: file_ref.path().to_path_buf(),
        source,
    };

    let mut total_bytes = 0u64;
    loop {
        let bytes_read = match file.read(buffer) {
            Ok(0) => break, // EOF
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(copy_error(e)),
        };

        sink.write_all(&buffer[..bytes_read]).map_err(copy_error)?;
        total_bytes += bytes_read as u64;
    }

    Ok(total_bytes)
}

/// Drain the queue, copying each file into `sink` in arrival order
///
/// Stops at the first open or copy error and returns it; nothing already
/// written is rolled back. A `Copied` event with a 1-based index follows
/// each fully copied file, and a `Failed` event precedes the returned error.
///
/// Must be called from a plain thread, not from inside an async runtime.
pub fn copy_all<W: Write + ?Sized>(
    mut queue: mpsc::Receiver<FileRef>,
    sink: &mut W,
    buffer_size: usize,
    on_event: Option<&EventCallback<'_>>,
) -> Result<CopyStats, DircatError> {
    let mut buffer = vec![0u8; buffer_size.max(1)];
    let mut stats = CopyStats::default();

    while let Some(file_ref) = queue.blocking_recv() {
        let bytes = match copy_file_into(&file_ref, sink, &mut buffer) {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::debug!(
                    path = %file_ref.path().display(),
                    copied = stats.files_copied,
                    "copy loop aborted"
                );
                emit_event(
                    on_event,
                    PipelineEvent::Failed {
                        index: stats.files_copied + 1,
                        path: file_ref.path(),
                        error: &err,
                    },
                );
                return Err(err);
            }
        };

        stats.files_copied += 1;
        stats.bytes_copied += bytes;

        emit_event(
            on_event,
            PipelineEvent::Copied {
                index: stats.files_copied,
                path: file_ref.path(),
                bytes,
            },
        );
    }

    Ok(stats)
}
