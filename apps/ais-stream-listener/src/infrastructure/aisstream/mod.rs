//! AIS Stream WebSocket Adapter
//!
//! Live feed client for the AIS stream service:
//!
//! - **Credentials**: access key loaded from the environment
//! - **Messages**: subscription request and inbound envelope types (JSON)
//! - **Session**: sans-IO connection state machine
//! - **Client**: tokio-tungstenite driver for one connection

pub mod client;
pub mod codec;
pub mod credentials;
pub mod messages;
pub mod session;

pub use client::{
    AisStreamClient, AisStreamClientConfig, ClientError, DEFAULT_STREAM_URL, FeedEvent,
};
pub use codec::{CodecError, JsonCodec};
pub use credentials::{API_KEY_ENV, ApiKey, CredentialsError};
pub use messages::{FeedMessage, POSITION_REPORT, SubscriptionRequest};
pub use session::FeedSession;
