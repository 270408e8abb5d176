//! Enumerator: the producer side of the pipeline

use super::{emit_event, EventCallback, PipelineEvent};
use crate::types::FileRef;
use tokio::sync::mpsc;

/// Push every entry onto the queue in order, then close it.
///
/// Blocks while the queue is full. The queue is closed when `queue` is
/// dropped at the end of this function, including for an empty listing.
/// If the copier has already gone away the send fails and enumeration stops.
///
/// Returns the number of entries handed to the copier.
///
/// Must be called from a plain thread, not from inside an async runtime.
pub fn enumerate(
    entries: Vec<FileRef>,
    queue: mpsc::Sender<FileRef>,
    on_event: Option<&EventCallback<'_>>,
) -> usize {
    let mut sent = 0usize;

    for file_ref in entries {
        emit_event(
            on_event,
            PipelineEvent::Discovered {
                name: file_ref.name(),
                path: file_ref.path(),
            },
        );

        if let Err(mpsc::error::SendError(unsent)) = queue.blocking_send(file_ref) {
            tracing::debug!(
                path = %unsent.path().display(),
                "copier stopped, enumeration abandoned"
            );
            break;
        }
        sent += 1;
    }

    sent
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::thread;

    fn refs(names: &[&str]) -> Vec<FileRef> {
        names
            .iter()
            .map(|name| FileRef::new(Path::new("dir"), *name))
            .collect()
    }

    #[test]
    fn test_enumerate_preserves_order_and_closes_queue() {
        let (tx, mut rx) = mpsc::channel(1);
        let producer = thread::spawn(move || enumerate(refs(&["a", "b", "c"]), tx, None));

        let mut received = Vec::new();
        while let Some(file_ref) = rx.blocking_recv() {
            received.push(file_ref.name().to_string_lossy().into_owned());
        }

        assert_eq!(producer.join().expect("join producer"), 3);
        assert_eq!(received, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_enumerate_empty_listing_closes_immediately() {
        let (tx, mut rx) = mpsc::channel::<FileRef>(1);
        assert_eq!(enumerate(Vec::new(), tx, None), 0);
        assert!(rx.blocking_recv().is_none());
    }

    #[test]
    fn test_enumerate_stops_when_receiver_dropped() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        assert_eq!(enumerate(refs(&["a", "b"]), tx, None), 0);
    }

    #[test]
    fn test_enumerate_runs_at_most_one_ahead() {
        let (tx, mut rx) = mpsc::channel(1);
        let producer = thread::spawn(move || enumerate(refs(&["a", "b", "c"]), tx, None));

        // Take one item, then stop reading: the producer can buffer one more
        // and then blocks until the receiver is dropped.
        let first = rx.blocking_recv().expect("first item");
        assert_eq!(first.name(), "a");
        thread::sleep(std::time::Duration::from_millis(50));
        assert!(!producer.is_finished());

        drop(rx);
        let sent = producer.join().expect("join producer");
        assert!((1..=2).contains(&sent), "sent {sent} items");
    }
}
