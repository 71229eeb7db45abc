//! UI data-stream publishing
//!
//! The populate loop and the to-do planner publish [`StreamEvent`]s through
//! the [`DataStreamSink`] trait; the chat transport that forwards them to
//! the browser is an external collaborator. [`BroadcastSink`] is the default
//! implementation, backed by a tokio broadcast channel so multiple
//! subscribers can observe the same event sequence independently.

use crate::types::StreamEvent;

/// Sink for UI data-stream events
///
/// One producer writes sequential events per document id; implementations
/// must tolerate events being dropped when nobody is listening.
pub trait DataStreamSink: Send + Sync {
    /// Publish one event
    fn write(&self, event: StreamEvent);
}

/// Broadcast-channel backed sink
///
/// Events are fanned out to every active subscriber. A subscriber that falls
/// behind the channel capacity receives a `RecvError::Lagged` and misses the
/// overwritten events; snapshot deltas make that safe, since only the latest
/// snapshot matters.
pub struct BroadcastSink {
    tx: tokio::sync::broadcast::Sender<StreamEvent>,
}

impl BroadcastSink {
    /// Create a sink with the given channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = tokio::sync::broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to events published through this sink
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<StreamEvent> {
        self.tx.subscribe()
    }
}

impl Default for BroadcastSink {
    fn default() -> Self {
        Self::new(1000)
    }
}

impl DataStreamSink for BroadcastSink {
    fn write(&self, event: StreamEvent) {
        // send() returns Err when there are no receivers; the event is
        // silently dropped and execution continues
        self.tx.send(event).ok();
    }
}
