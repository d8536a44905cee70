//! Stream Codec Module
//!
//! JSON encoding and decoding for the AIS stream.
//!
//! Decoding happens in two steps: the frame is decoded into a `FeedMessage`
//! by inspecting the `MessageType` / `error` fields, then the payload for the
//! tag of interest is extracted into a validated `PositionReport`. Extraction
//! failures are typed `DiscardReason`s, never hard errors.

use serde_json::{Map, Value};

use super::messages::{FeedMessage, fields};
use crate::domain::geo::GeoError;
use crate::domain::listener::DiscardReason;
use crate::domain::position::{PositionReport, VesselId};

/// Codec errors.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// JSON encoding/decoding failed.
    #[error("JSON codec error: {0}")]
    Json(#[from] serde_json::Error),

    /// Binary frame was not UTF-8.
    #[error("invalid UTF-8 payload: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// Invalid message format.
    #[error("invalid message format: {0}")]
    InvalidFormat(String),
}

impl From<CodecError> for DiscardReason {
    fn from(err: CodecError) -> Self {
        Self::MalformedJson(err.to_string())
    }
}

/// JSON codec for the AIS stream.
#[derive(Debug, Default, Clone)]
pub struct JsonCodec;

impl JsonCodec {
    /// Create a new JSON codec.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Decode a text frame into a `FeedMessage`.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not JSON or not a JSON object.
    pub fn decode(&self, text: &str) -> Result<FeedMessage, CodecError> {
        let value: Value = serde_json::from_str(text.trim())?;

        let Value::Object(mut object) = value else {
            return Err(CodecError::InvalidFormat(format!(
                "expected JSON object, got: {}",
                kind_of(&value)
            )));
        };

        if let Some(error) = object.remove(fields::ERROR) {
            let text = match error {
                Value::String(s) => s,
                other => other.to_string(),
            };
            return Ok(FeedMessage::Error(text));
        }

        match object.remove(fields::MESSAGE_TYPE) {
            Some(Value::String(message_type)) => Ok(FeedMessage::Tagged {
                message_type,
                body: object.remove(fields::MESSAGE),
            }),
            _ => Ok(FeedMessage::Untagged),
        }
    }

    /// Decode a binary frame. The feed sends JSON in binary frames too.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not UTF-8 or fail `decode`.
    pub fn decode_bytes(&self, data: &[u8]) -> Result<FeedMessage, CodecError> {
        self.decode(std::str::from_utf8(data)?)
    }

    /// Extract the position report for `tag` from an envelope body.
    ///
    /// The report lives at `Message.<tag>` and needs `UserID`, `Latitude`
    /// and `Longitude`. A report with `"Valid": false` is rejected.
    ///
    /// # Errors
    ///
    /// Returns the reason the report cannot be used.
    pub fn extract_position(
        &self,
        body: Option<&Value>,
        tag: &str,
    ) -> Result<PositionReport, DiscardReason> {
        let report = body
            .and_then(|b| b.get(tag))
            .and_then(Value::as_object)
            .ok_or_else(|| DiscardReason::MissingPayload {
                message_type: tag.to_string(),
            })?;

        if report.get(fields::VALID).and_then(Value::as_bool) == Some(false) {
            return Err(DiscardReason::MarkedInvalid);
        }

        let vessel_id = vessel_id(report)?;
        let latitude = number(report, fields::LATITUDE)?;
        let longitude = number(report, fields::LONGITUDE)?;

        PositionReport::new(vessel_id, latitude, longitude).map_err(|e| match e {
            GeoError::LatitudeOutOfRange(value) => DiscardReason::OutOfRange {
                field: fields::LATITUDE,
                value,
            },
            GeoError::LongitudeOutOfRange(value) => DiscardReason::OutOfRange {
                field: fields::LONGITUDE,
                value,
            },
        })
    }

    /// Encode a value to JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn encode<T: serde::Serialize>(&self, value: &T) -> Result<String, CodecError> {
        Ok(serde_json::to_string(value)?)
    }
}

fn vessel_id(report: &Map<String, Value>) -> Result<VesselId, DiscardReason> {
    match report.get(fields::USER_ID) {
        Some(Value::Number(n)) => Ok(numeric_id(n)),
        Some(Value::String(s)) if !s.is_empty() => Ok(VesselId::Text(s.clone())),
        _ => Err(DiscardReason::MissingField(fields::USER_ID)),
    }
}

/// Whole numbers, including `1.0`, become numeric ids; anything else keeps
/// its JSON text.
#[allow(clippy::cast_possible_truncation)]
fn numeric_id(n: &serde_json::Number) -> VesselId {
    if let Some(id) = n.as_i64() {
        return VesselId::Numeric(id);
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() <= MAX_EXACT_INTEGER => {
            VesselId::Numeric(f as i64)
        }
        _ => VesselId::Text(n.to_string()),
    }
}

/// Largest integer an `f64` holds exactly.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

fn number(report: &Map<String, Value>, field: &'static str) -> Result<f64, DiscardReason> {
    report
        .get(field)
        .and_then(Value::as_f64)
        .ok_or(DiscardReason::MissingField(field))
}

const fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
