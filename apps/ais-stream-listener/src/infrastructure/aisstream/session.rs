//! Feed Session State Machine
//!
//! Sans-IO core of the live feed listener. The network client feeds it
//! lifecycle events and frames; it answers with what to send and what to
//! render.
//!
//! ```text
//! Connecting ──on_open──► Open ──on_close / stop──► Closed
//!      └──────────────on_close / stop─────────────────┘
//! ```
//!
//! - The subscription request is released exactly once, on the first
//!   `Connecting -> Open` transition.
//! - Frames are only examined while `Open`; otherwise they are `Inert`.
//! - `Closed` is terminal.

use super::codec::{CodecError, JsonCodec};
use super::messages::{FeedMessage, SubscriptionRequest};
use crate::domain::listener::{ListenerState, MessageOutcome};

/// Tag reported for envelopes without a `MessageType`.
const UNTAGGED: &str = "<none>";

/// Per-connection listener state.
#[derive(Debug)]
pub struct FeedSession {
    state: ListenerState,
    subscription: SubscriptionRequest,
    message_type: String,
    codec: JsonCodec,
    subscriptions_sent: u32,
}

impl FeedSession {
    /// Create a session in the `Connecting` state.
    ///
    /// `message_type` is the tag of interest, e.g. `PositionReport`.
    #[must_use]
    pub fn new(subscription: SubscriptionRequest, message_type: impl Into<String>) -> Self {
        Self {
            state: ListenerState::Connecting,
            subscription,
            message_type: message_type.into(),
            codec: JsonCodec::new(),
            subscriptions_sent: 0,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> ListenerState {
        self.state
    }

    /// Tag of interest.
    #[must_use]
    pub fn message_type(&self) -> &str {
        &self.message_type
    }

    /// Number of subscription requests released so far (0 or 1).
    #[must_use]
    pub const fn subscriptions_sent(&self) -> u32 {
        self.subscriptions_sent
    }

    /// Connection opened. Returns the subscription to send, once.
    pub fn on_open(&mut self) -> Option<&SubscriptionRequest> {
        if self.state != ListenerState::Connecting {
            return None;
        }
        self.state = ListenerState::Open;
        self.subscriptions_sent += 1;
        Some(&self.subscription)
    }

    /// Handle a text frame.
    pub fn on_text(&self, text: &str) -> MessageOutcome {
        if self.state != ListenerState::Open {
            return MessageOutcome::Inert;
        }
        tracing::trace!(payload = %text, "Feed message received");
        self.classify(self.codec.decode(text))
    }

    /// Handle a binary frame carrying JSON.
    pub fn on_binary(&self, data: &[u8]) -> MessageOutcome {
        if self.state != ListenerState::Open {
            return MessageOutcome::Inert;
        }
        tracing::trace!(bytes = data.len(), "Binary feed message received");
        self.classify(self.codec.decode_bytes(data))
    }

    /// Connection closed. Returns `true` only for the first close.
    pub fn on_close(&mut self) -> bool {
        if self.state == ListenerState::Closed {
            return false;
        }
        self.state = ListenerState::Closed;
        true
    }

    /// Stop the session. Later frames are `Inert`.
    ///
    /// Returns `true` if the session was not already closed.
    pub fn stop(&mut self) -> bool {
        self.on_close()
    }

    fn classify(&self, decoded: Result<FeedMessage, CodecError>) -> MessageOutcome {
        let message = match decoded {
            Ok(message) => message,
            Err(e) => {
                tracing::debug!(error = %e, "Discarding malformed feed message");
                return MessageOutcome::Discarded(e.into());
            }
        };

        match message {
            FeedMessage::Error(error) => MessageOutcome::FeedError(error),
            FeedMessage::Untagged => MessageOutcome::Ignored {
                message_type: UNTAGGED.to_string(),
            },
            FeedMessage::Tagged { message_type, .. } if message_type != self.message_type => {
                MessageOutcome::Ignored { message_type }
            }
            FeedMessage::Tagged { body, .. } => {
                match self.codec.extract_position(body.as_ref(), &self.message_type) {
                    Ok(report) => {
                        let line = report.render();
                        MessageOutcome::Rendered { report, line }
                    }
                    Err(reason) => {
                        tracing::debug!(reason = %reason, "Discarding position report");
                        MessageOutcome::Discarded(reason)
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::geo::BoundingBox;
    use crate::domain::listener::DiscardReason;
    use crate::infrastructure::aisstream::messages::POSITION_REPORT;
    use proptest::prelude::*;

    const REFERENCE: &str = r#"{"MessageType":"PositionReport","Message":{"PositionReport":{"UserID":1,"Latitude":10.5,"Longitude":-3.2}}}"#;

    fn session() -> FeedSession {
        FeedSession::new(
            SubscriptionRequest::new("K", vec![BoundingBox::globe()]),
            POSITION_REPORT,
        )
    }

    fn open_session() -> FeedSession {
        let mut s = session();
        assert!(s.on_open().is_some());
        s
    }

    #[test]
    fn subscription_released_exactly_once() {
        let mut s = session();
        assert_eq!(s.subscriptions_sent(), 0);

        let request = s.on_open().cloned().unwrap();
        assert_eq!(request.api_key, "K");
        assert_eq!(s.state(), ListenerState::Open);

        assert!(s.on_open().is_none());
        assert_eq!(s.subscriptions_sent(), 1);
    }

    #[test]
    fn no_subscription_after_close() {
        let mut s = session();
        assert!(s.on_close());
        assert!(s.on_open().is_none());
        assert_eq!(s.subscriptions_sent(), 0);
    }

    #[test]
    fn frames_before_open_are_inert() {
        let s = session();
        assert_eq!(s.on_text(REFERENCE), MessageOutcome::Inert);
        assert_eq!(s.on_binary(REFERENCE.as_bytes()), MessageOutcome::Inert);
    }

    #[test]
    fn reference_report_renders_one_line() {
        let s = open_session();
        let outcome = s.on_text(REFERENCE);
        assert_eq!(
            outcome.line().map(|l| l.as_str()),
            Some("ShipId: 1 Latitude: 10.5 Longitude: -3.2")
        );
    }

    #[test]
    fn binary_frames_are_decoded() {
        let s = open_session();
        assert!(s.on_binary(REFERENCE.as_bytes()).line().is_some());
    }

    #[test]
    fn other_tag_is_ignored() {
        let s = open_session();
        assert_eq!(
            s.on_text(r#"{"MessageType":"StaticData","Message":{}}"#),
            MessageOutcome::Ignored {
                message_type: "StaticData".to_string()
            }
        );
    }

    #[test]
    fn malformed_json_is_discarded_and_session_stays_open() {
        let s = open_session();
        let outcome = s.on_text("not json");
        assert!(matches!(
            outcome,
            MessageOutcome::Discarded(DiscardReason::MalformedJson(_))
        ));
        assert_eq!(s.state(), ListenerState::Open);
        assert!(s.on_text(REFERENCE).line().is_some());
    }

    #[test]
    fn feed_error_is_surfaced() {
        let s = open_session();
        assert_eq!(
            s.on_text(r#"{"error":"Api Key Is Not Valid"}"#),
            MessageOutcome::FeedError("Api Key Is Not Valid".to_string())
        );
    }

    #[test]
    fn close_is_idempotent_and_makes_session_inert() {
        let mut s = open_session();
        assert!(s.on_close());
        assert!(!s.on_close());
        assert!(!s.stop());
        assert_eq!(s.on_text(REFERENCE), MessageOutcome::Inert);
    }

    #[test]
    fn stop_makes_session_inert() {
        let mut s = open_session();
        assert!(s.stop());
        assert_eq!(s.state(), ListenerState::Closed);
        assert_eq!(s.on_text(REFERENCE), MessageOutcome::Inert);
    }

    #[test]
    fn custom_tag_of_interest() {
        let mut s = FeedSession::new(
            SubscriptionRequest::new("K", vec![BoundingBox::globe()]),
            "StandardClassBPositionReport",
        );
        s.on_open();
        assert_eq!(s.message_type(), "StandardClassBPositionReport");

        let msg = r#"{"MessageType":"StandardClassBPositionReport","Message":{"StandardClassBPositionReport":{"UserID":9,"Latitude":1.0,"Longitude":2.0}}}"#;
        assert!(s.on_text(msg).line().is_some());
        assert!(matches!(s.on_text(REFERENCE), MessageOutcome::Ignored { .. }));
    }

    proptest! {
        #[test]
        fn well_formed_reports_render_exactly_one_line(
            id in 0u64..1_000_000_000,
            lat_milli in -90_000i32..=90_000,
            lon_milli in -180_000i32..=180_000,
        ) {
            let lat = f64::from(lat_milli) / 1000.0;
            let lon = f64::from(lon_milli) / 1000.0;
            let s = open_session();
            let msg = serde_json::json!({
                "MessageType": "PositionReport",
                "Message": {"PositionReport": {"UserID": id, "Latitude": lat, "Longitude": lon}}
            })
            .to_string();

            let outcome = s.on_text(&msg);
            let line = outcome.line().map(|l| l.as_str().to_string());
            prop_assert_eq!(line, Some(format!("ShipId: {id} Latitude: {lat} Longitude: {lon}")));
        }

        #[test]
        fn unrecognized_tags_render_nothing(tag in "[A-Za-z]{1,24}") {
            prop_assume!(tag != POSITION_REPORT);
            let s = open_session();
            let msg = serde_json::json!({"MessageType": tag, "Message": {}}).to_string();
            let outcome = s.on_text(&msg);
            prop_assert!(matches!(outcome, MessageOutcome::Ignored { .. }), "unexpected outcome");
        }

        #[test]
        fn arbitrary_text_never_panics_or_closes(text in ".*") {
            let s = open_session();
            let _ = s.on_text(&text);
            prop_assert_eq!(s.state(), ListenerState::Open);
        }
    }
}
