//! Render sinks
//!
//! The view layer observes the sidebar only through published snapshots of
//! the sorted records.

use std::sync::{Arc, Mutex};

use tokio::sync::watch;

use crate::annotations::DocAnnotation;

/// Receives the sorted records after every applied change
pub trait RenderSink: Send + Sync {
    fn render(&self, annotations: Arc<[DocAnnotation]>);
}

impl<F> RenderSink for F
where
    F: Fn(Arc<[DocAnnotation]>) + Send + Sync,
{
    fn render(&self, annotations: Arc<[DocAnnotation]>) {
        self(annotations)
    }
}

/// Sink backed by a watch channel; subscribers see the latest snapshot
pub struct WatchSink {
    tx: watch::Sender<Arc<[DocAnnotation]>>,
}

impl WatchSink {
    /// Create a sink and its first subscriber
    pub fn new() -> (Self, watch::Receiver<Arc<[DocAnnotation]>>) {
        let (tx, rx) = watch::channel(Arc::from(Vec::new()));
        (Self { tx }, rx)
    }

    /// Add another subscriber
    pub fn subscribe(&self) -> watch::Receiver<Arc<[DocAnnotation]>> {
        self.tx.subscribe()
    }
}

impl RenderSink for WatchSink {
    fn render(&self, annotations: Arc<[DocAnnotation]>) {
        // send_replace keeps the value even with no live receivers
        self.tx.send_replace(annotations);
    }
}

/// Sink that keeps every published snapshot
#[derive(Default)]
pub struct RecordingSink {
    renders: Mutex<Vec<Arc<[DocAnnotation]>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All snapshots published so far
    pub fn renders(&self) -> Vec<Arc<[DocAnnotation]>> {
        match self.renders.lock() {
            Ok(renders) => renders.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Most recent snapshot
    pub fn last(&self) -> Option<Arc<[DocAnnotation]>> {
        self.renders().pop()
    }

    pub fn count(&self) -> usize {
        self.renders().len()
    }
}

impl RenderSink for RecordingSink {
    fn render(&self, annotations: Arc<[DocAnnotation]>) {
        match self.renders.lock() {
            Ok(mut renders) => renders.push(annotations),
            Err(poisoned) => poisoned.into_inner().push(annotations),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::{AnnotationKind, Position};

    fn snapshot(ids: &[&str]) -> Arc<[DocAnnotation]> {
        ids.iter()
            .map(|id| DocAnnotation::new(*id, AnnotationKind::TextHighlight, 1, Position::default()))
            .collect::<Vec<_>>()
            .into()
    }

    #[test]
    fn test_watch_sink_latest_wins() {
        let (sink, rx) = WatchSink::new();
        assert!(rx.borrow().is_empty());

        sink.render(snapshot(&["a"]));
        sink.render(snapshot(&["a", "b"]));

        assert_eq!(rx.borrow().len(), 2);
        assert_eq!(sink.subscribe().borrow().len(), 2);
    }

    #[test]
    fn test_recording_sink() {
        let sink = RecordingSink::new();
        sink.render(snapshot(&["a"]));
        sink.render(snapshot(&[]));

        assert_eq!(sink.count(), 2);
        assert!(sink.last().unwrap().is_empty());
    }

    #[test]
    fn test_closure_sink() {
        let counter = std::sync::atomic::AtomicUsize::new(0);
        let sink = |annotations: Arc<[DocAnnotation]>| {
            counter.fetch_add(annotations.len(), std::sync::atomic::Ordering::SeqCst);
        };
        sink.render(snapshot(&["a", "b"]));

        assert_eq!(counter.load(std::sync::atomic::Ordering::SeqCst), 2);
    }
}
