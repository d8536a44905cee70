//! Listener Configuration Settings
//!
//! Configuration types for the AIS stream listener, loaded from environment
//! variables.

use std::path::PathBuf;
use std::time::Duration;

use crate::domain::geo::BoundingBox;
use crate::infrastructure::aisstream::{
    API_KEY_ENV, AisStreamClientConfig, ApiKey, DEFAULT_STREAM_URL, POSITION_REPORT,
};

/// Environment variable names.
pub mod env {
    /// Stream endpoint.
    pub const URL: &str = "AISSTREAM_URL";
    /// Bounding boxes as JSON.
    pub const BOUNDING_BOXES: &str = "AISSTREAM_BOUNDING_BOXES";
    /// Tag of interest.
    pub const MESSAGE_TYPE: &str = "AISSTREAM_MESSAGE_TYPE";
    /// Server-side message type filter toggle.
    pub const FILTER_MESSAGE_TYPES: &str = "AISSTREAM_FILTER_MESSAGE_TYPES";
    /// Run duration in seconds.
    pub const RUN_SECS: &str = "LISTENER_RUN_SECS";
    /// Event channel capacity.
    pub const EVENT_BUFFER: &str = "LISTENER_EVENT_BUFFER";
    /// Health server port.
    pub const HEALTH_PORT: &str = "LISTENER_HEALTH_PORT";
    /// Coordinate file path.
    pub const COORDINATES_PATH: &str = "COORDINATES_PATH";
}

/// Default event channel capacity.
pub const DEFAULT_EVENT_BUFFER: usize = 1024;

/// Default health server port.
pub const DEFAULT_HEALTH_PORT: u16 = 8083;

/// Complete listener configuration.
#[derive(Debug, Clone)]
pub struct ListenerConfig {
    /// Access key.
    pub api_key: ApiKey,
    /// WebSocket endpoint.
    pub endpoint: String,
    /// Region filters.
    pub bounding_boxes: Vec<BoundingBox>,
    /// Tag of interest.
    pub message_type: String,
    /// Ask the server to send only `message_type`.
    pub filter_message_types: bool,
    /// Stop after this long.
    pub run_for: Option<Duration>,
    /// Event channel capacity.
    pub event_buffer: usize,
    /// Health check HTTP port.
    pub health_port: u16,
    /// Coordinate file served by the health server.
    pub coordinates_path: Option<PathBuf>,
}

impl ListenerConfig {
    /// Create a configuration with defaults for everything but the key.
    #[must_use]
    pub fn new(api_key: ApiKey) -> Self {
        Self {
            api_key,
            endpoint: DEFAULT_STREAM_URL.to_string(),
            bounding_boxes: vec![BoundingBox::globe()],
            message_type: POSITION_REPORT.to_string(),
            filter_message_types: false,
            run_for: None,
            event_buffer: DEFAULT_EVENT_BUFFER,
            health_port: DEFAULT_HEALTH_PORT,
            coordinates_path: None,
        }
    }

    /// Override the endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Override the bounding boxes.
    #[must_use]
    pub fn with_bounding_boxes(mut self, bounding_boxes: Vec<BoundingBox>) -> Self {
        self.bounding_boxes = bounding_boxes;
        self
    }

    /// Override the tag of interest.
    #[must_use]
    pub fn with_message_type(mut self, message_type: impl Into<String>) -> Self {
        self.message_type = message_type.into();
        self
    }

    /// Enable or disable the server-side message type filter.
    #[must_use]
    pub const fn with_message_type_filter(mut self, enabled: bool) -> Self {
        self.filter_message_types = enabled;
        self
    }

    /// Stop after `duration`.
    #[must_use]
    pub const fn with_run_for(mut self, duration: Duration) -> Self {
        self.run_for = Some(duration);
        self
    }

    /// Override the health server port.
    #[must_use]
    pub const fn with_health_port(mut self, port: u16) -> Self {
        self.health_port = port;
        self
    }

    /// Serve coordinates from `path`.
    #[must_use]
    pub fn with_coordinates_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.coordinates_path = Some(path.into());
        self
    }

    /// Create configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is missing or empty, or if an
    /// optional variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Same as [`ListenerConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(API_KEY_ENV)
            .ok_or_else(|| ConfigError::MissingEnvVar(API_KEY_ENV.to_string()))?;
        let api_key =
            ApiKey::new(api_key).map_err(|_| ConfigError::EmptyValue(API_KEY_ENV.to_string()))?;

        let mut config = Self::new(api_key);

        if let Some(url) = lookup(env::URL) {
            if url.trim().is_empty() {
                return Err(ConfigError::EmptyValue(env::URL.to_string()));
            }
            config.endpoint = url.trim().to_string();
        }

        if let Some(raw) = lookup(env::BOUNDING_BOXES) {
            config.bounding_boxes = parse_bounding_boxes(&raw)?;
        }

        if let Some(tag) = lookup(env::MESSAGE_TYPE) {
            if tag.trim().is_empty() {
                return Err(ConfigError::EmptyValue(env::MESSAGE_TYPE.to_string()));
            }
            config.message_type = tag.trim().to_string();
        }

        config.filter_message_types =
            parse_bool(env::FILTER_MESSAGE_TYPES, lookup(env::FILTER_MESSAGE_TYPES))?
                .unwrap_or(false);

        config.run_for = parse_number::<u64>(env::RUN_SECS, lookup(env::RUN_SECS))?
            .map(Duration::from_secs);

        config.event_buffer =
            parse_number::<usize>(env::EVENT_BUFFER, lookup(env::EVENT_BUFFER))?
                .unwrap_or(DEFAULT_EVENT_BUFFER);
        if config.event_buffer == 0 {
            return Err(ConfigError::Invalid {
                key: env::EVENT_BUFFER.to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        config.health_port = parse_number::<u16>(env::HEALTH_PORT, lookup(env::HEALTH_PORT))?
            .unwrap_or(DEFAULT_HEALTH_PORT);

        config.coordinates_path = lookup(env::COORDINATES_PATH)
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        Ok(config)
    }

    /// Client configuration for the stream connection.
    #[must_use]
    pub fn client_config(&self) -> AisStreamClientConfig {
        let config = AisStreamClientConfig::new(self.api_key.clone())
            .with_url(self.endpoint.clone())
            .with_bounding_boxes(self.bounding_boxes.clone())
            .with_message_type(self.message_type.clone())
            .with_message_type_filter(self.filter_message_types);
        match self.run_for {
            Some(duration) => config.with_run_for(duration),
            None => config,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Required environment variable is missing.
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    /// Environment variable has empty value.
    #[error("environment variable {0} cannot be empty")]
    EmptyValue(String),
    /// Environment variable is present but cannot be used.
    #[error("invalid value for {key}: {reason}")]
    Invalid {
        /// Variable name.
        key: String,
        /// What was wrong.
        reason: String,
    },
}

fn parse_bounding_boxes(raw: &str) -> Result<Vec<BoundingBox>, ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid {
        key: env::BOUNDING_BOXES.to_string(),
        reason,
    };
    let boxes: Vec<BoundingBox> = serde_json::from_str(raw).map_err(|e| invalid(e.to_string()))?;
    if boxes.is_empty() {
        return Err(invalid("at least one bounding box is required".to_string()));
    }
    Ok(boxes)
}

fn parse_bool(key: &str, value: Option<String>) -> Result<Option<bool>, ConfigError> {
    let Some(value) = value else {
        return Ok(None);
    };
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(Some(true)),
        "0" | "false" | "no" | "off" => Ok(Some(false)),
        other => Err(ConfigError::Invalid {
            key: key.to_string(),
            reason: format!("expected a boolean, got {other:?}"),
        }),
    }
}

fn parse_number<T>(key: &str, value: Option<String>) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .map(|v| {
            v.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
                key: key.to_string(),
                reason: e.to_string(),
            })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_with_only_key() {
        let config = ListenerConfig::from_lookup(lookup(&[(API_KEY_ENV, "K")])).unwrap();

        assert_eq!(config.api_key.expose(), "K");
        assert_eq!(config.endpoint, DEFAULT_STREAM_URL);
        assert_eq!(config.bounding_boxes, vec![BoundingBox::globe()]);
        assert_eq!(config.message_type, POSITION_REPORT);
        assert!(!config.filter_message_types);
        assert!(config.run_for.is_none());
        assert_eq!(config.event_buffer, DEFAULT_EVENT_BUFFER);
        assert_eq!(config.health_port, DEFAULT_HEALTH_PORT);
        assert!(config.coordinates_path.is_none());
    }

    #[test]
    fn missing_key_fails_fast() {
        let err = ListenerConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref k) if k == API_KEY_ENV));
    }

    #[test]
    fn empty_key_fails_fast() {
        let err = ListenerConfig::from_lookup(lookup(&[(API_KEY_ENV, "   ")])).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyValue(_)));
    }

    #[test]
    fn all_overrides() {
        let config = ListenerConfig::from_lookup(lookup(&[
            (API_KEY_ENV, "K"),
            (env::URL, "ws://localhost:9000"),
            (env::BOUNDING_BOXES, "[[[-11, 35], [30, 74]], [[0, 0], [1, 1]]]"),
            (env::MESSAGE_TYPE, "ShipStaticData"),
            (env::FILTER_MESSAGE_TYPES, "TRUE"),
            (env::RUN_SECS, "120"),
            (env::EVENT_BUFFER, "16"),
            (env::HEALTH_PORT, "9999"),
            (env::COORDINATES_PATH, "coords.json"),
        ]))
        .unwrap();

        assert_eq!(config.endpoint, "ws://localhost:9000");
        assert_eq!(config.bounding_boxes.len(), 2);
        assert_eq!(config.message_type, "ShipStaticData");
        assert!(config.filter_message_types);
        assert_eq!(config.run_for, Some(Duration::from_secs(120)));
        assert_eq!(config.event_buffer, 16);
        assert_eq!(config.health_port, 9999);
        assert_eq!(config.coordinates_path, Some(PathBuf::from("coords.json")));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let cases = [
            (env::BOUNDING_BOXES, "not json"),
            (env::BOUNDING_BOXES, "[]"),
            (env::BOUNDING_BOXES, "[[[-200, 0], [0, 0]]]"),
            (env::FILTER_MESSAGE_TYPES, "maybe"),
            (env::RUN_SECS, "-1"),
            (env::EVENT_BUFFER, "0"),
            (env::HEALTH_PORT, "70000"),
        ];
        for (key, value) in cases {
            let err = ListenerConfig::from_lookup(lookup(&[(API_KEY_ENV, "K"), (key, value)]))
                .unwrap_err();
            assert!(
                matches!(err, ConfigError::Invalid { key: ref k, .. } if k == key),
                "{key}={value} gave {err:?}"
            );
        }
    }

    #[test]
    fn empty_message_type_is_rejected() {
        let err =
            ListenerConfig::from_lookup(lookup(&[(API_KEY_ENV, "K"), (env::MESSAGE_TYPE, "")]))
                .unwrap_err();
        assert!(matches!(err, ConfigError::EmptyValue(_)));
    }

    #[test]
    fn builders_flow_into_client_config() {
        let config = ListenerConfig::new(ApiKey::new("K").unwrap())
            .with_endpoint("ws://127.0.0.1:1")
            .with_message_type("ShipStaticData")
            .with_message_type_filter(true)
            .with_run_for(Duration::from_secs(5))
            .with_health_port(0)
            .with_coordinates_path("c.json");

        let client = config.client_config();
        assert_eq!(client.url, "ws://127.0.0.1:1");
        assert_eq!(client.message_type, "ShipStaticData");
        assert!(client.filter_message_types);
        assert_eq!(client.run_for, Some(Duration::from_secs(5)));
        assert_eq!(
            client.subscription_request().filter_message_types,
            vec!["ShipStaticData"]
        );
    }

    #[test]
    fn debug_redacts_key() {
        let config = ListenerConfig::new(ApiKey::new("very-secret").unwrap());
        assert!(!format!("{config:?}").contains("very-secret"));
    }
}
