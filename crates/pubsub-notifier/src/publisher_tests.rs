//! Tests for `Publisher`.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use pubsub_notifier_core::Normalizer;
use pubsub_notifier_core::event::{FsEvent, LogEvent, ProviderEvent, RoutingAttributes};

use super::*;
use crate::topic::testing::{FailingTopic, RecordingTopic, StallingTopic};

const TS: i64 = 1_700_000_000_000_000_000;

fn upload() -> Envelope {
    Normalizer::new("").fs_event(&FsEvent {
        timestamp: TS,
        action: "upload".into(),
        username: "alice".into(),
        virtual_path: "/a/b.txt".into(),
        protocol: "SFTP".into(),
        status: 1,
        session_id: "sess-1".into(),
        ..FsEvent::default()
    })
}

#[tokio::test]
async fn publishes_body_and_attributes() {
    let topic = Arc::new(RecordingTopic::default());
    let publisher = Publisher::new(topic.clone(), Duration::from_secs(1));

    publisher.publish(&upload()).await.unwrap();

    let messages = topic.messages().await;
    assert_eq!(messages.len(), 1);
    let body: Value = serde_json::from_slice(&messages[0].body).unwrap();
    assert_eq!(body["timestamp"], "2023-11-14T22:13:20Z");
    assert_eq!(body["virtual_path"], "/a/b.txt");
    assert_eq!(
        messages[0].attributes,
        RoutingAttributes::from([("action".to_string(), "upload".to_string())])
    );
}

#[tokio::test]
async fn provider_attributes_include_object_type() {
    let topic = Arc::new(RecordingTopic::default());
    let publisher = Publisher::new(topic.clone(), Duration::from_secs(1));
    let envelope = Normalizer::new("").provider_event(&ProviderEvent::legacy(
        TS,
        "add",
        "admin",
        "user",
        "bob",
        "10.0.0.1",
        vec![0x7b, 0x7d],
    ));

    publisher.publish(&envelope).await.unwrap();

    let messages = topic.messages().await;
    assert_eq!(messages[0].attributes.get("action").unwrap(), "add");
    assert_eq!(messages[0].attributes.get("object_type").unwrap(), "user");
}

#[tokio::test]
async fn log_attributes_carry_raw_kind() {
    let topic = Arc::new(RecordingTopic::default());
    let publisher = Publisher::new(topic.clone(), Duration::from_secs(1));
    let envelope = Normalizer::new("").log_event(&LogEvent {
        timestamp: TS,
        event: 99,
        protocol: "SSH".into(),
        username: "mallory".into(),
        ..LogEvent::default()
    });

    publisher.publish(&envelope).await.unwrap();

    let messages = topic.messages().await;
    assert_eq!(messages[0].attributes.get("action").unwrap(), "log");
    assert_eq!(messages[0].attributes.get("event").unwrap(), "99");
}

#[tokio::test]
async fn stalled_send_fails_at_deadline() {
    let publisher = Publisher::new(Arc::new(StallingTopic), Duration::from_millis(50));

    let start = std::time::Instant::now();
    let err = publisher.publish(&upload()).await.unwrap_err();

    assert!(err.is_timeout());
    assert!(err.is_fatal());
    assert!(start.elapsed() >= Duration::from_millis(50));
    assert!(start.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn transport_error_is_fatal_but_not_timeout() {
    let publisher = Publisher::new(Arc::new(FailingTopic), Duration::from_secs(1));

    let err = publisher.publish(&upload()).await.unwrap_err();

    assert!(matches!(err, PublishError::Transport(TopicError::Send(_))));
    assert!(err.is_fatal());
    assert!(!err.is_timeout());
}

#[tokio::test]
async fn out_of_range_timeout_fails_without_sending() {
    let topic = Arc::new(RecordingTopic::default());
    let publisher = Publisher::new(topic.clone(), Duration::from_secs(u64::MAX));

    let err = publisher.publish(&upload()).await.unwrap_err();

    assert!(matches!(err, PublishError::InvalidTimeout(_)));
    assert!(err.is_fatal());
    assert!(topic.messages().await.is_empty());
}

#[test]
fn encode_error_is_not_fatal() {
    let json_err = serde_json::from_str::<Value>("{").unwrap_err();
    let err = PublishError::from(json_err);
    assert!(!err.is_fatal());
    assert!(!err.is_timeout());
}
