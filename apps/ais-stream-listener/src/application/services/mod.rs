//! Application Services
//!
//! - `ListenerStatus`: shared connection state and message counters, read
//!   by the health endpoint

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;

use crate::domain::listener::ListenerState;

/// Live status of one feed listener.
///
/// Written by the event handler, read by the health server.
#[derive(Debug, Default)]
pub struct ListenerStatus {
    state: RwLock<ListenerState>,
    last_connected_at: RwLock<Option<DateTime<Utc>>>,
    last_position_at: RwLock<Option<DateTime<Utc>>>,
    last_error: RwLock<Option<String>>,
    messages_received: AtomicU64,
    lines_rendered: AtomicU64,
    messages_ignored: AtomicU64,
    messages_discarded: AtomicU64,
    feed_errors: AtomicU64,
}

/// Point-in-time copy of `ListenerStatus`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListenerSnapshot {
    /// Connection state.
    pub state: ListenerState,
    /// When the connection last opened.
    pub last_connected_at: Option<DateTime<Utc>>,
    /// When the last position line was rendered.
    pub last_position_at: Option<DateTime<Utc>>,
    /// Most recent feed or transport error.
    pub last_error: Option<String>,
    /// Messages examined while open.
    pub messages_received: u64,
    /// Lines appended to the display.
    pub lines_rendered: u64,
    /// Messages with a different tag.
    pub messages_ignored: u64,
    /// Messages dropped as malformed or incomplete.
    pub messages_discarded: u64,
    /// Error objects sent by the feed.
    pub feed_errors: u64,
}

impl ListenerStatus {
    /// Create a status in the `Connecting` state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the connection state.
    pub fn set_state(&self, state: ListenerState) {
        *self.state.write() = state;
        if state == ListenerState::Open {
            *self.last_connected_at.write() = Some(Utc::now());
            *self.last_error.write() = None;
        }
    }

    /// Record an error message without changing state.
    pub fn set_error(&self, message: String) {
        *self.last_error.write() = Some(message);
    }

    /// Record a rendered position line.
    pub fn record_rendered(&self, at: DateTime<Utc>) {
        self.messages_received.fetch_add(1, Ordering::Relaxed);
        self.lines_rendered.fetch_add(1, Ordering::Relaxed);
        *self.last_position_at.write() = Some(at);
    }

    /// Record a message with an uninteresting tag.
    pub fn record_ignored(&self) {
        self.messages_received.fetch_add(1, Ordering::Relaxed);
        self.messages_ignored.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a discarded message.
    pub fn record_discarded(&self) {
        self.messages_received.fetch_add(1, Ordering::Relaxed);
        self.messages_discarded.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an error object sent by the feed.
    pub fn record_feed_error(&self, message: String) {
        self.messages_received.fetch_add(1, Ordering::Relaxed);
        self.feed_errors.fetch_add(1, Ordering::Relaxed);
        self.set_error(message);
    }

    /// Get the current connection state.
    #[must_use]
    pub fn state(&self) -> ListenerState {
        *self.state.read()
    }

    /// Whether the connection is open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state() == ListenerState::Open
    }

    /// Take a consistent-enough snapshot for reporting.
    #[must_use]
    pub fn snapshot(&self) -> ListenerSnapshot {
        ListenerSnapshot {
            state: self.state(),
            last_connected_at: *self.last_connected_at.read(),
            last_position_at: *self.last_position_at.read(),
            last_error: self.last_error.read().clone(),
            messages_received: self.messages_received.load(Ordering::Relaxed),
            lines_rendered: self.lines_rendered.load(Ordering::Relaxed),
            messages_ignored: self.messages_ignored.load(Ordering::Relaxed),
            messages_discarded: self.messages_discarded.load(Ordering::Relaxed),
            feed_errors: self.feed_errors.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_connecting_with_zero_counters() {
        let status = ListenerStatus::new();
        let snapshot = status.snapshot();
        assert_eq!(snapshot.state, ListenerState::Connecting);
        assert_eq!(snapshot.messages_received, 0);
        assert!(snapshot.last_connected_at.is_none());
    }

    #[test]
    fn open_clears_last_error() {
        let status = ListenerStatus::new();
        status.set_error("boom".to_string());
        status.set_state(ListenerState::Open);

        let snapshot = status.snapshot();
        assert!(status.is_open());
        assert!(snapshot.last_error.is_none());
        assert!(snapshot.last_connected_at.is_some());
    }

    #[test]
    fn counters_accumulate() {
        let status = ListenerStatus::new();
        status.record_rendered(Utc::now());
        status.record_rendered(Utc::now());
        status.record_ignored();
        status.record_discarded();
        status.record_feed_error("Api Key Is Not Valid".to_string());

        let snapshot = status.snapshot();
        assert_eq!(snapshot.messages_received, 5);
        assert_eq!(snapshot.lines_rendered, 2);
        assert_eq!(snapshot.messages_ignored, 1);
        assert_eq!(snapshot.messages_discarded, 1);
        assert_eq!(snapshot.feed_errors, 1);
        assert_eq!(snapshot.last_error.as_deref(), Some("Api Key Is Not Valid"));
        assert!(snapshot.last_position_at.is_some());
    }
}
