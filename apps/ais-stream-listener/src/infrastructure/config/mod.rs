//! Configuration Module
//!
//! Configuration loading for the listener service.

mod settings;

pub use settings::{
    ConfigError, DEFAULT_EVENT_BUFFER, DEFAULT_HEALTH_PORT, ListenerConfig, env as env_keys,
};
