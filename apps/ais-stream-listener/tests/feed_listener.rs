//! Live Feed Listener Integration Tests
//!
//! Runs the client against a local WebSocket server that records what the
//! client sends and replays a scripted feed.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

use ais_stream_listener::{
    AisStreamClient, AisStreamClientConfig, ApiKey, CloseReason, DiscardReason, FeedEvent,
    ListenerState, MemoryDisplay,
};

const REFERENCE: &str = r#"{"MessageType":"PositionReport","Message":{"PositionReport":{"UserID":1,"Latitude":10.5,"Longitude":-3.2}}}"#;
const STATIC_DATA: &str = r#"{"MessageType":"StaticData","Message":{}}"#;

/// Start a one-connection feed server.
///
/// The server reads the first client frame, sends `script`, optionally
/// closes, then keeps reading until the connection ends. It returns every
/// text frame the client sent.
async fn spawn_feed(script: Vec<Message>, close_after: bool) -> (String, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        let mut received = Vec::new();

        if let Some(Ok(Message::Text(text))) = ws.next().await {
            received.push(text.as_str().to_string());
        }

        for msg in script {
            ws.send(msg).await.unwrap();
        }

        if close_after {
            let _ = ws.close(None).await;
        }

        while let Some(Ok(msg)) = ws.next().await {
            if let Message::Text(text) = msg {
                received.push(text.as_str().to_string());
            }
        }
        received
    });

    (format!("ws://{addr}"), handle)
}

fn client_for(
    url: &str,
    display: &Arc<MemoryDisplay>,
) -> (Arc<AisStreamClient>, mpsc::Receiver<FeedEvent>) {
    let (tx, rx) = mpsc::channel(64);
    let config = AisStreamClientConfig::new(ApiKey::new("K").unwrap()).with_url(url);
    let client = AisStreamClient::new(config, display.clone(), tx, CancellationToken::new());
    (Arc::new(client), rx)
}

fn drain(rx: &mut mpsc::Receiver<FeedEvent>) -> Vec<FeedEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn close_reasons(events: &[FeedEvent]) -> Vec<CloseReason> {
    events
        .iter()
        .filter_map(|e| match e {
            FeedEvent::Closed(reason) => Some(reason.clone()),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn subscription_sent_once_with_globe_box() {
    let (url, server) = spawn_feed(vec![], true).await;
    let display = Arc::new(MemoryDisplay::new());
    let (client, _rx) = client_for(&url, &display);

    timeout(Duration::from_secs(5), client.run())
        .await
        .unwrap()
        .unwrap();

    let received = server.await.unwrap();
    assert_eq!(received.len(), 1, "subscription must be sent exactly once");

    assert_eq!(
        received[0],
        r#"{"Apikey":"K","BoundingBoxes":[[[-180,-90],[180,90]]]}"#
    );
}

#[tokio::test]
async fn scripted_feed_renders_only_position_reports() {
    let binary_report = REFERENCE.replace(r#""UserID":1"#, r#""UserID":2"#);
    let script = vec![
        Message::text(STATIC_DATA),
        Message::text("not json"),
        Message::text(REFERENCE),
        Message::binary(binary_report.into_bytes()),
    ];
    let (url, server) = spawn_feed(script, true).await;
    let display = Arc::new(MemoryDisplay::new());
    let (client, mut rx) = client_for(&url, &display);

    timeout(Duration::from_secs(5), client.run())
        .await
        .unwrap()
        .unwrap();
    server.await.unwrap();

    assert_eq!(
        display.lines(),
        vec![
            "ShipId: 1 Latitude: 10.5 Longitude: -3.2",
            "ShipId: 2 Latitude: 10.5 Longitude: -3.2",
        ]
    );

    let events = drain(&mut rx);
    assert!(matches!(events[0], FeedEvent::Connected));
    assert!(matches!(
        events[1],
        FeedEvent::Subscribed { bounding_boxes: 1 }
    ));
    assert!(matches!(
        &events[2],
        FeedEvent::Ignored { message_type } if message_type == "StaticData"
    ));
    assert!(matches!(
        events[3],
        FeedEvent::Discarded(DiscardReason::MalformedJson(_))
    ));
    assert!(matches!(events[4], FeedEvent::Position(_)));
    assert!(matches!(events[5], FeedEvent::Position(_)));
    assert_eq!(close_reasons(&events), vec![CloseReason::RemoteClosed]);
    assert_eq!(client.state(), ListenerState::Closed);
}

#[tokio::test]
async fn feed_error_is_reported_not_rendered() {
    let script = vec![Message::text(r#"{"error":"Api Key Is Not Valid"}"#)];
    let (url, server) = spawn_feed(script, true).await;
    let display = Arc::new(MemoryDisplay::new());
    let (client, mut rx) = client_for(&url, &display);

    timeout(Duration::from_secs(5), client.run())
        .await
        .unwrap()
        .unwrap();
    server.await.unwrap();

    assert!(display.is_empty());
    let events = drain(&mut rx);
    assert!(events.iter().any(
        |e| matches!(e, FeedEvent::FeedError(msg) if msg == "Api Key Is Not Valid")
    ));
}

#[tokio::test]
async fn stop_closes_connection_once() {
    let (url, server) = spawn_feed(vec![Message::text(REFERENCE)], false).await;
    let display = Arc::new(MemoryDisplay::new());
    let (client, mut rx) = client_for(&url, &display);

    let runner = {
        let client = Arc::clone(&client);
        tokio::spawn(async move { client.run().await })
    };

    timeout(Duration::from_secs(5), async {
        while display.len() < 1 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();

    client.stop();
    client.stop();

    timeout(Duration::from_secs(5), runner)
        .await
        .unwrap()
        .unwrap()
        .unwrap();

    let received = timeout(Duration::from_secs(5), server)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(received.len(), 1, "no sends after the subscription");

    assert_eq!(display.len(), 1);
    assert_eq!(client.state(), ListenerState::Closed);
    assert_eq!(close_reasons(&drain(&mut rx)), vec![CloseReason::Stopped]);
}

#[tokio::test]
async fn run_for_stops_after_time_limit() {
    let (url, server) = spawn_feed(vec![], false).await;
    let display = Arc::new(MemoryDisplay::new());
    let (tx, mut rx) = mpsc::channel(64);
    let config = AisStreamClientConfig::new(ApiKey::new("K").unwrap())
        .with_url(url)
        .with_run_for(Duration::from_millis(200));
    let client = AisStreamClient::new(config, display.clone(), tx, CancellationToken::new());

    timeout(Duration::from_secs(5), client.run())
        .await
        .unwrap()
        .unwrap();
    timeout(Duration::from_secs(5), server)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(
        close_reasons(&drain(&mut rx)),
        vec![CloseReason::TimeLimitReached]
    );
}

#[tokio::test]
async fn independent_listeners_do_not_interfere() {
    let (url_a, server_a) = spawn_feed(vec![Message::text(REFERENCE)], true).await;
    let (url_b, server_b) = spawn_feed(vec![Message::text(STATIC_DATA)], true).await;
    let display_a = Arc::new(MemoryDisplay::new());
    let display_b = Arc::new(MemoryDisplay::new());
    let (client_a, _rx_a) = client_for(&url_a, &display_a);
    let (client_b, _rx_b) = client_for(&url_b, &display_b);

    let (a, b) = tokio::join!(client_a.run(), client_b.run());
    a.unwrap();
    b.unwrap();
    server_a.await.unwrap();
    server_b.await.unwrap();

    assert_eq!(display_a.len(), 1);
    assert!(display_b.is_empty());
}

#[tokio::test]
async fn undrained_events_do_not_block_rendering_or_stop() {
    let script = vec![Message::text(REFERENCE); 5];
    let (url, server) = spawn_feed(script, false).await;
    let display = Arc::new(MemoryDisplay::new());
    let (tx, mut rx) = mpsc::channel(1);
    let config = AisStreamClientConfig::new(ApiKey::new("K").unwrap()).with_url(url);
    let client = Arc::new(AisStreamClient::new(
        config,
        display.clone(),
        tx,
        CancellationToken::new(),
    ));

    let runner = {
        let client = Arc::clone(&client);
        tokio::spawn(async move { client.run().await })
    };

    timeout(Duration::from_secs(5), async {
        while display.len() < 5 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();

    client.stop();
    timeout(Duration::from_secs(5), runner)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    timeout(Duration::from_secs(5), server)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(display.len(), 5);
    assert_eq!(client.state(), ListenerState::Closed);

    assert!(matches!(rx.recv().await, Some(FeedEvent::Connected)));
    assert!(matches!(
        timeout(Duration::from_secs(5), rx.recv()).await.unwrap(),
        Some(FeedEvent::Closed(CloseReason::Stopped))
    ));
}
