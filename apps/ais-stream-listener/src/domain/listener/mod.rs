//! Listener Lifecycle Types
//!
//! Connection states, per-message outcomes and close reasons for the live
//! feed listener.

use std::fmt;

use serde::Serialize;

use super::position::{PositionReport, RenderedLine};

// =============================================================================
// Listener State
// =============================================================================

/// Connection lifecycle: `Connecting -> Open -> Closed`.
///
/// Transport errors fold into `Closed`; there is no way back out of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ListenerState {
    /// Connection not yet established.
    #[default]
    Connecting,
    /// Connection open, subscription sent.
    Open,
    /// Connection closed; the listener is inert.
    Closed,
}

impl ListenerState {
    /// Get the state name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Connecting => "connecting",
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }

    /// Numeric encoding used for the connection state gauge.
    #[must_use]
    pub const fn as_gauge(&self) -> f64 {
        match self {
            Self::Connecting => 0.0,
            Self::Open => 1.0,
            Self::Closed => 2.0,
        }
    }
}

impl fmt::Display for ListenerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Discard Reasons
// =============================================================================

/// Why an inbound message was dropped without rendering.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DiscardReason {
    /// Payload was not valid JSON (or not valid UTF-8).
    #[error("malformed payload: {0}")]
    MalformedJson(String),

    /// The envelope had no `Message.<tag>` object.
    #[error("missing {message_type} payload")]
    MissingPayload {
        /// Tag whose payload was expected.
        message_type: String,
    },

    /// A required field was absent or had the wrong type.
    #[error("missing field: {0}")]
    MissingField(&'static str),

    /// The report carried `"Valid": false`.
    #[error("report marked invalid by the feed")]
    MarkedInvalid,

    /// A coordinate was outside its valid range.
    #[error("{field} {value} out of range")]
    OutOfRange {
        /// Field name.
        field: &'static str,
        /// Offending value.
        value: f64,
    },
}

impl DiscardReason {
    /// Short label used for metrics.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::MalformedJson(_) => "malformed_json",
            Self::MissingPayload { .. } | Self::MissingField(_) => "missing_field",
            Self::MarkedInvalid => "marked_invalid",
            Self::OutOfRange { .. } => "out_of_range",
        }
    }
}

// =============================================================================
// Message Outcome
// =============================================================================

/// Result of handling one inbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageOutcome {
    /// Accepted: one line to append.
    Rendered {
        /// Extracted report.
        report: PositionReport,
        /// Line to append to the display surface.
        line: RenderedLine,
    },
    /// Tag did not match the tag of interest.
    Ignored {
        /// Tag carried by the message.
        message_type: String,
    },
    /// Message dropped.
    Discarded(DiscardReason),
    /// Feed reported an error (e.g. invalid API key).
    FeedError(String),
    /// Listener is not open; message not examined.
    Inert,
}

impl MessageOutcome {
    /// The rendered line, if any.
    #[must_use]
    pub const fn line(&self) -> Option<&RenderedLine> {
        match self {
            Self::Rendered { line, .. } => Some(line),
            _ => None,
        }
    }
}

// =============================================================================
// Close Reasons
// =============================================================================

/// Why the connection reached `Closed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseReason {
    /// Caller requested stop.
    Stopped,
    /// Configured run duration elapsed.
    TimeLimitReached,
    /// Server sent a close frame.
    RemoteClosed,
    /// Stream ended without a close frame.
    StreamEnded,
    /// Transport error mid-stream.
    Transport(String),
    /// Connection could not be established.
    ConnectFailed(String),
}

impl CloseReason {
    /// Whether the close was requested locally.
    #[must_use]
    pub const fn is_local(&self) -> bool {
        matches!(self, Self::Stopped | Self::TimeLimitReached)
    }
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stopped => f.write_str("stopped"),
            Self::TimeLimitReached => f.write_str("time limit reached"),
            Self::RemoteClosed => f.write_str("closed by server"),
            Self::StreamEnded => f.write_str("stream ended"),
            Self::Transport(e) => write!(f, "transport error: {e}"),
            Self::ConnectFailed(e) => write!(f, "connect failed: {e}"),
        }
    }
}
