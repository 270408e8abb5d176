//! Producer/consumer pipeline: one enumerator thread feeding the copier
//! through a single-slot queue.

pub mod copy;
pub mod enumerator;

use crate::types::{DircatError, FileRef};
use std::ffi::OsStr;
use std::io::Write;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

pub use copy::{copy_all, copy_file_into};
pub use enumerator::enumerate;

/// The enumerator may run at most one item ahead of the copier.
pub const QUEUE_CAPACITY: usize = 1;

/// Totals for a successful pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CopyStats {
    /// Number of entries the enumerator handed to the queue.
    pub files_queued: usize,
    /// Number of files copied into the sink.
    pub files_copied: usize,
    /// Aggregate bytes copied.
    pub bytes_copied: u64,
    /// Wall time of the pipeline.
    pub elapsed: Duration,
}

/// Events emitted while the pipeline runs.
#[derive(Debug)]
pub enum PipelineEvent<'a> {
    /// The enumerator queued an entry.
    Discovered { name: &'a OsStr, path: &'a Path },
    /// A file was fully copied. `index` is 1-based.
    Copied {
        index: usize,
        path: &'a Path,
        bytes: u64,
    },
    /// Opening or copying a file failed; the pipeline stops after this.
    /// `index` is the 1-based position the file would have had.
    Failed {
        index: usize,
        path: &'a Path,
        error: &'a DircatError,
    },
    /// The queue was drained without errors.
    Complete { stats: &'a CopyStats },
}

/// Optional callback used to receive pipeline events.
///
/// Called from both the enumerator thread and the copier thread.
pub type EventCallback<'a> = dyn Fn(&PipelineEvent<'_>) + Send + Sync + 'a;

/// Concatenate `entries` into `sink`, in order.
///
/// Spawns the enumerator on a scoped thread and drives the copier on the
/// calling thread. Returns on the first open or copy error; bytes already
/// written stay in the sink. The enumerator thread is always joined before
/// this function returns; a panic on it is resumed on the caller.
pub fn run_pipeline<W: Write + ?Sized>(
    entries: Vec<FileRef>,
    sink: &mut W,
    buffer_size: usize,
    on_event: Option<&EventCallback<'_>>,
) -> Result<CopyStats, DircatError> {
    let started = Instant::now();
    let (queue_tx, queue_rx) = mpsc::channel::<FileRef>(QUEUE_CAPACITY);

    let result = thread::scope(|scope| {
        let enumerator = scope.spawn(move || enumerate(entries, queue_tx, on_event));
        // The receiver is dropped when copy_all returns, which unblocks the
        // enumerator if the copier stopped early.
        let copied = copy_all(queue_rx, sink, buffer_size, on_event);
        let queued = match enumerator.join() {
            Ok(queued) => queued,
            Err(panic) => std::panic::resume_unwind(panic),
        };
        tracing::debug!(queued, ok = copied.is_ok(), "pipeline finished");
        copied.map(|stats| CopyStats {
            files_queued: queued,
            ..stats
        })
    });

    let mut stats = result?;
    stats.elapsed = started.elapsed();
    emit_event(on_event, PipelineEvent::Complete { stats: &stats });
    Ok(stats)
}

fn emit_event(on_event: Option<&EventCallback<'_>>, event: PipelineEvent<'_>) {
    if let Some(callback) = on_event {
        callback(&event);
    }
}
