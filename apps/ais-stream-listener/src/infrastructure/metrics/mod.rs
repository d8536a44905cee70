//! Prometheus Metrics Module
//!
//! Exposes listener metrics via Prometheus format for monitoring.
//!
//! # Metrics Categories
//!
//! - **Messages**: Counts of messages received, rendered, ignored, discarded
//! - **Connection**: Live feed connection state
//! - **Errors**: Error objects reported by the feed, dropped events
//!
//! # Integration
//!
//! Metrics are exposed at `/metrics` on the health server port.

use std::sync::OnceLock;

use metrics::{counter, describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::domain::listener::{DiscardReason, ListenerState};

/// Messages received from the feed.
pub const MESSAGES_RECEIVED: &str = "ais_listener_messages_received_total";
/// Lines appended to the display.
pub const LINES_RENDERED: &str = "ais_listener_lines_rendered_total";
/// Messages with a different tag.
pub const MESSAGES_IGNORED: &str = "ais_listener_messages_ignored_total";
/// Messages dropped, labelled by reason.
pub const MESSAGES_DISCARDED: &str = "ais_listener_messages_discarded_total";
/// Error objects sent by the feed.
pub const FEED_ERRORS: &str = "ais_listener_feed_errors_total";
/// Events dropped because the event channel was full.
pub const EVENTS_DROPPED: &str = "ais_listener_events_dropped_total";
/// Connection state (0 connecting, 1 open, 2 closed).
pub const CONNECTION_STATE: &str = "ais_listener_connection_state";

// =============================================================================
// Global Metrics Handle
// =============================================================================

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Initialize the Prometheus metrics recorder.
///
/// Later calls return the handle created by the first one.
///
/// # Panics
///
/// Panics if the recorder cannot be installed.
#[allow(clippy::expect_used)]
pub fn init_metrics() -> PrometheusHandle {
    PROMETHEUS_HANDLE
        .get_or_init(|| {
            let builder = PrometheusBuilder::new();
            let handle = builder
                .install_recorder()
                .expect("failed to install Prometheus recorder");

            register_metrics();
            handle
        })
        .clone()
}

/// Get the Prometheus handle for rendering metrics.
///
/// Returns `None` if metrics have not been initialized.
#[must_use]
pub fn get_metrics_handle() -> Option<PrometheusHandle> {
    PROMETHEUS_HANDLE.get().cloned()
}

// =============================================================================
// Metric Registration
// =============================================================================

fn register_metrics() {
    // Message counters
    describe_counter!(MESSAGES_RECEIVED, "Total messages received from the AIS feed");
    describe_counter!(LINES_RENDERED, "Total position lines rendered");
    describe_counter!(
        MESSAGES_IGNORED,
        "Total messages ignored because of their message type"
    );
    describe_counter!(MESSAGES_DISCARDED, "Total messages discarded by reason");

    // Error counters
    describe_counter!(FEED_ERRORS, "Total error objects sent by the AIS feed");

    describe_counter!(
        EVENTS_DROPPED,
        "Total listener events dropped because the event channel was full"
    );

    // Connection gauge
    describe_gauge!(
        CONNECTION_STATE,
        "Live feed connection state (0 connecting, 1 open, 2 closed)"
    );
}

// =============================================================================
// Metric Recording Functions
// =============================================================================

/// Record a message received from the feed.
pub fn record_message_received() {
    counter!(MESSAGES_RECEIVED).increment(1);
}

/// Record a rendered position line.
pub fn record_line_rendered() {
    counter!(LINES_RENDERED).increment(1);
}

/// Record an ignored message.
pub fn record_ignored() {
    counter!(MESSAGES_IGNORED).increment(1);
}

/// Record a discarded message.
pub fn record_discarded(reason: &DiscardReason) {
    counter!(MESSAGES_DISCARDED, "reason" => reason.label()).increment(1);
}

/// Record an error object from the feed.
pub fn record_feed_error() {
    counter!(FEED_ERRORS).increment(1);
}

/// Record an event dropped on a full event channel.
pub fn record_event_dropped() {
    counter!(EVENTS_DROPPED).increment(1);
}

/// Update the connection state gauge.
pub fn set_connection_state(state: ListenerState) {
    gauge!(CONNECTION_STATE).set(state.as_gauge());
}

// =============================================================================
// Tests
// =============================================================================
