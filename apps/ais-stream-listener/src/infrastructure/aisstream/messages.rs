//! AIS Stream Message Types
//!
//! Wire format types for the AIS stream WebSocket protocol.
//!
//! # Outbound
//! - `SubscriptionRequest`: sent once after the connection opens
//!
//! # Inbound
//! - Envelope with a `MessageType` tag and a `Message` object keyed by tag
//! - Error object (`{"error": "..."}`), e.g. for an invalid key
//!
//! ```json
//! {
//!   "MessageType": "PositionReport",
//!   "MetaData": {"MMSI": 259000420, "ShipName": "AUGUSTSON"},
//!   "Message": {
//!     "PositionReport": {"UserID": 259000420, "Latitude": 66.02, "Longitude": 12.25, "Valid": true}
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::geo::BoundingBox;

/// Default message-type tag of interest.
pub const POSITION_REPORT: &str = "PositionReport";

/// Field names inside a position-bearing report.
pub mod fields {
    /// Envelope tag.
    pub const MESSAGE_TYPE: &str = "MessageType";
    /// Envelope payload.
    pub const MESSAGE: &str = "Message";
    /// Error text sent by the feed.
    pub const ERROR: &str = "error";
    /// Vessel identifier.
    pub const USER_ID: &str = "UserID";
    /// Latitude in degrees.
    pub const LATITUDE: &str = "Latitude";
    /// Longitude in degrees.
    pub const LONGITUDE: &str = "Longitude";
    /// Feed-side validity flag.
    pub const VALID: &str = "Valid";
}

// =============================================================================
// Outbound
// =============================================================================

/// Subscription request sent once per connection.
///
/// # Wire Format (JSON)
/// ```json
/// {"Apikey": "K", "BoundingBoxes": [[[-180, -90], [180, 90]]]}
/// ```
///
/// `FilterMessageTypes` is included only when non-empty.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionRequest {
    /// Access key.
    #[serde(rename = "Apikey")]
    pub api_key: String,

    /// Region filters.
    #[serde(rename = "BoundingBoxes")]
    pub bounding_boxes: Vec<BoundingBox>,

    /// Server-side message type filter.
    #[serde(
        rename = "FilterMessageTypes",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub filter_message_types: Vec<String>,
}

impl SubscriptionRequest {
    /// Create a request without a message type filter.
    #[must_use]
    pub fn new(api_key: impl Into<String>, bounding_boxes: Vec<BoundingBox>) -> Self {
        Self {
            api_key: api_key.into(),
            bounding_boxes,
            filter_message_types: Vec::new(),
        }
    }

    /// Restrict the server to the given message types.
    #[must_use]
    pub fn with_message_types(mut self, message_types: Vec<String>) -> Self {
        self.filter_message_types = message_types;
        self
    }
}

impl std::fmt::Debug for SubscriptionRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionRequest")
            .field("api_key", &"[REDACTED]")
            .field("bounding_boxes", &self.bounding_boxes)
            .field("filter_message_types", &self.filter_message_types)
            .finish()
    }
}

// =============================================================================
// Inbound
// =============================================================================

/// Decoded inbound frame, before payload extraction.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedMessage {
    /// Envelope with a type tag. `body` is the `Message` object, if present.
    Tagged {
        /// `MessageType` value.
        message_type: String,
        /// `Message` value.
        body: Option<Value>,
    },
    /// Error object from the feed.
    Error(String),
    /// JSON object with neither a tag nor an error.
    Untagged,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscription_omits_empty_filter() {
        let req = SubscriptionRequest::new("K", vec![BoundingBox::globe()]);
        let value = serde_json::to_value(&req).unwrap();

        assert_eq!(value["Apikey"], "K");
        assert!(value.get("FilterMessageTypes").is_none());
        assert_eq!(value["BoundingBoxes"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn subscription_with_filter() {
        let req = SubscriptionRequest::new("K", vec![BoundingBox::globe()])
            .with_message_types(vec![POSITION_REPORT.to_string()]);
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains(r#""FilterMessageTypes":["PositionReport"]"#));
    }

    #[test]
    fn subscription_debug_redacts_key() {
        let req = SubscriptionRequest::new("very-secret", vec![]);
        assert!(!format!("{req:?}").contains("very-secret"));
    }
}
