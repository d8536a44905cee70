//! AIS Stream WebSocket Client
//!
//! Connects to the AIS stream endpoint, sends the subscription request once
//! the connection opens, and renders every accepted position report on the
//! display surface.
//!
//! # Stream URL
//!
//! - Default: `wss://stream.aisstream.io/v0/stream`
//!
//! # Lifecycle
//!
//! One connection per client. There is no reconnect: once `run` returns the
//! client is inert. Callers wanting resilience wrap it with their own policy.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

use super::codec::{CodecError, JsonCodec};
use super::credentials::ApiKey;
use super::messages::{POSITION_REPORT, SubscriptionRequest};
use super::session::FeedSession;
use crate::application::ports::DisplaySurface;
use crate::domain::geo::BoundingBox;
use crate::domain::listener::{CloseReason, DiscardReason, ListenerState, MessageOutcome};
use crate::domain::position::PositionReport;
use crate::infrastructure::metrics;

/// Default AIS stream endpoint.
pub const DEFAULT_STREAM_URL: &str = "wss://stream.aisstream.io/v0/stream";

// =============================================================================
// Error Type
// =============================================================================

/// Errors that can occur in the AIS stream client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// WebSocket connection failed.
    #[error("WebSocket connection failed: {0}")]
    ConnectionFailed(String),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// Codec error.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// `run` was called more than once.
    #[error("client already started")]
    AlreadyStarted,

    /// Connection closed without a close frame.
    #[error("connection closed")]
    ConnectionClosed,
}

// =============================================================================
// Client Events
// =============================================================================

/// Events emitted by the AIS stream client.
#[derive(Debug, Clone)]
pub enum FeedEvent {
    /// Connection opened.
    Connected,
    /// Subscription request sent.
    Subscribed {
        /// Number of bounding boxes in the request.
        bounding_boxes: usize,
    },
    /// Position report accepted and rendered.
    Position(PositionReport),
    /// Message with a different tag.
    Ignored {
        /// Tag carried by the message.
        message_type: String,
    },
    /// Message dropped.
    Discarded(DiscardReason),
    /// Error object sent by the feed.
    FeedError(String),
    /// Connection closed; emitted once.
    Closed(CloseReason),
}

// =============================================================================
// Client Configuration
// =============================================================================

/// Configuration for the AIS stream client.
#[derive(Debug, Clone)]
pub struct AisStreamClientConfig {
    /// WebSocket URL.
    pub url: String,
    /// Access key.
    pub api_key: ApiKey,
    /// Region filters sent in the subscription.
    pub bounding_boxes: Vec<BoundingBox>,
    /// Tag of interest.
    pub message_type: String,
    /// Ask the server to send only `message_type`.
    pub filter_message_types: bool,
    /// Stop after this long.
    pub run_for: Option<Duration>,
}

impl AisStreamClientConfig {
    /// Create a configuration with the default endpoint, a whole-globe
    /// bounding box and `PositionReport` as the tag of interest.
    #[must_use]
    pub fn new(api_key: ApiKey) -> Self {
        Self {
            url: DEFAULT_STREAM_URL.to_string(),
            api_key,
            bounding_boxes: vec![BoundingBox::globe()],
            message_type: POSITION_REPORT.to_string(),
            filter_message_types: false,
            run_for: None,
        }
    }

    /// Override the endpoint URL.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
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

    /// Stop the client after `duration`.
    #[must_use]
    pub const fn with_run_for(mut self, duration: Duration) -> Self {
        self.run_for = Some(duration);
        self
    }

    /// Build the subscription request for this configuration.
    #[must_use]
    pub fn subscription_request(&self) -> SubscriptionRequest {
        let request =
            SubscriptionRequest::new(self.api_key.expose(), self.bounding_boxes.clone());
        if self.filter_message_types {
            request.with_message_types(vec![self.message_type.clone()])
        } else {
            request
        }
    }
}

// =============================================================================
// AIS Stream Client
// =============================================================================

/// AIS stream WebSocket client.
///
/// Owns one connection, its session state and the display surface it
/// renders to.
pub struct AisStreamClient {
    config: AisStreamClientConfig,
    codec: JsonCodec,
    session: Mutex<FeedSession>,
    display: Arc<dyn DisplaySurface>,
    event_tx: mpsc::Sender<FeedEvent>,
    cancel: CancellationToken,
    started: AtomicBool,
}

impl AisStreamClient {
    /// Create a new client.
    #[must_use]
    pub fn new(
        config: AisStreamClientConfig,
        display: Arc<dyn DisplaySurface>,
        event_tx: mpsc::Sender<FeedEvent>,
        cancel: CancellationToken,
    ) -> Self {
        let session = FeedSession::new(config.subscription_request(), config.message_type.clone());
        Self {
            config,
            codec: JsonCodec::new(),
            session: Mutex::new(session),
            display,
            event_tx,
            cancel,
            started: AtomicBool::new(false),
        }
    }

    /// Current connection state.
    #[must_use]
    pub fn state(&self) -> ListenerState {
        self.session.lock().state()
    }

    /// Request the client to stop.
    ///
    /// The connection is closed and later frames are not examined.
    /// Calling this more than once has no further effect.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Run the connection until stopped, closed by the server, or failed.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be opened, the transport
    /// fails mid-stream, or the client was already started.
    pub async fn run(&self) -> Result<(), ClientError> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(ClientError::AlreadyStarted);
        }

        if self.cancel.is_cancelled() {
            self.close(CloseReason::Stopped);
            return Ok(());
        }

        tracing::info!(url = %self.config.url, "Connecting to AIS stream");

        let connect = tokio_tungstenite::connect_async(self.config.url.as_str());
        let ws_stream = tokio::select! {
            () = self.cancel.cancelled() => {
                self.close(CloseReason::Stopped);
                return Ok(());
            }
            result = connect => match result {
                Ok((ws_stream, _response)) => ws_stream,
                Err(e) => {
                    tracing::warn!(error = %e, "AIS stream connection failed");
                    self.close(CloseReason::ConnectFailed(e.to_string()));
                    return Err(ClientError::ConnectionFailed(e.to_string()));
                }
            },
        };

        let (mut write, mut read) = ws_stream.split();

        let request = self.session.lock().on_open().cloned();
        tracing::info!("AIS stream socket is open");
        self.emit(FeedEvent::Connected);

        if let Some(request) = request {
            let json = match self.codec.encode(&request) {
                Ok(json) => json,
                Err(e) => {
                    self.close(CloseReason::Transport(e.to_string()));
                    return Err(e.into());
                }
            };
            tracing::debug!(
                bounding_boxes = request.bounding_boxes.len(),
                filter = ?request.filter_message_types,
                "Sending subscription request"
            );
            if let Err(e) = write.send(Message::Text(json.into())).await {
                self.close(CloseReason::Transport(e.to_string()));
                return Err(e.into());
            }
            self.emit(FeedEvent::Subscribed {
                bounding_boxes: request.bounding_boxes.len(),
            });
        }

        let time_limit = time_limit(self.config.run_for);
        tokio::pin!(time_limit);

        loop {
            tokio::select! {
                biased;

                () = self.cancel.cancelled() => {
                    let _ = write.send(Message::Close(None)).await;
                    self.close(CloseReason::Stopped);
                    return Ok(());
                }
                () = &mut time_limit => {
                    tracing::info!("AIS stream run time elapsed");
                    let _ = write.send(Message::Close(None)).await;
                    self.close(CloseReason::TimeLimitReached);
                    return Ok(());
                }
                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            let outcome = self.session.lock().on_text(&text);
                            self.dispatch(outcome);
                        }
                        Some(Ok(Message::Binary(data))) => {
                            let outcome = self.session.lock().on_binary(&data);
                            self.dispatch(outcome);
                        }
                        Some(Ok(Message::Ping(data))) => {
                            if let Err(e) = write.send(Message::Pong(data)).await {
                                self.close(CloseReason::Transport(e.to_string()));
                                return Err(e.into());
                            }
                        }
                        Some(Ok(Message::Close(frame))) => {
                            tracing::info!(frame = ?frame, "Server sent close frame");
                            self.close(CloseReason::RemoteClosed);
                            return Ok(());
                        }
                        Some(Ok(_)) => {
                            // Pong and raw frames need no handling
                        }
                        Some(Err(e)) => {
                            tracing::warn!(error = %e, "AIS stream transport error");
                            self.close(CloseReason::Transport(e.to_string()));
                            return Err(e.into());
                        }
                        None => {
                            tracing::info!("AIS stream ended");
                            self.close(CloseReason::StreamEnded);
                            return Err(ClientError::ConnectionClosed);
                        }
                    }
                }
            }
        }
    }

    /// Apply a message outcome: render, then report.
    fn dispatch(&self, outcome: MessageOutcome) {
        match outcome {
            MessageOutcome::Rendered { report, line } => {
                self.display.append_line(&line);
                tracing::debug!(line = %line, "Position rendered");
                self.emit(FeedEvent::Position(report));
            }
            MessageOutcome::Ignored { message_type } => {
                tracing::trace!(message_type = %message_type, "Ignoring message type");
                self.emit(FeedEvent::Ignored { message_type });
            }
            MessageOutcome::Discarded(reason) => {
                self.emit(FeedEvent::Discarded(reason));
            }
            MessageOutcome::FeedError(error) => {
                tracing::warn!(error = %error, "AIS stream reported an error");
                self.emit(FeedEvent::FeedError(error));
            }
            MessageOutcome::Inert => {}
        }
    }

    /// Mark the session closed and report it, once.
    fn close(&self, reason: CloseReason) {
        let first = if reason.is_local() {
            self.session.lock().stop()
        } else {
            self.session.lock().on_close()
        };
        if first {
            tracing::info!(reason = %reason, "AIS stream socket is closed");
            self.emit(FeedEvent::Closed(reason));
        }
    }

    /// Report an event without waiting on the receiver.
    ///
    /// A full channel drops the event; rendering and stop never wait on
    /// observers. The closing event is the exception and is delivered once
    /// the receiver catches up.
    fn emit(&self, event: FeedEvent) {
        match self.event_tx.try_send(event) {
            Ok(()) | Err(TrySendError::Closed(_)) => {}
            Err(TrySendError::Full(event @ FeedEvent::Closed(_))) => {
                let tx = self.event_tx.clone();
                tokio::spawn(async move {
                    let _ = tx.send(event).await;
                });
            }
            Err(TrySendError::Full(event)) => {
                metrics::record_event_dropped();
                tracing::debug!(event = ?event, "Event channel full, dropping event");
            }
        }
    }
}

fn time_limit(run_for: Option<Duration>) -> impl Future<Output = ()> {
    async move {
        match run_for {
            Some(duration) => tokio::time::sleep(duration).await,
            None => std::future::pending().await,
        }
    }
}
