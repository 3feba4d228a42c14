//! Message topic abstraction and its backends.
//!
//! The relay only ever sees [`Topic`]: a shared, concurrency-safe handle
//! with `send` and `shutdown`. Backends are chosen by the topic URL scheme:
//!
//! | Scheme         | Backend                         | Server                       |
//! |----------------|---------------------------------|------------------------------|
//! | `mem://`       | in-process broadcast            | n/a                          |
//! | `nats://`      | NATS core publish (`nats`)      | `NATS_SERVER_URL`            |
//! | `rabbit://`    | AMQP exchange (`rabbit`)        | `RABBIT_SERVER_URL`          |
//! | `kafka://`     | Kafka topic (`kafka`)           | `KAFKA_BROKERS`              |
//! | `awssns://`    | SNS topic ARN (`sns-sqs`)       | AWS default credential chain |
//! | `awssqs://`    | SQS queue URL (`sns-sqs`)       | AWS default credential chain |
//! | `gcppubsub://` | Google Pub/Sub topic (`pubsub`) | Application Default Creds    |
//!
//! Anything after `?` is a query string of backend options, e.g.
//! `awssns:///arn:aws:sns:us-east-2:123456789012:events?region=us-east-2`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::time::{Instant, timeout_at};
use tracing::{debug, info};

use pubsub_notifier_core::event::RoutingAttributes;

#[cfg(feature = "kafka")]
pub mod kafka;
pub mod mem;
#[cfg(feature = "nats")]
pub mod nats;
#[cfg(feature = "pubsub")]
pub mod pubsub;
#[cfg(feature = "rabbit")]
pub mod rabbit;
#[cfg(feature = "sns-sqs")]
pub mod sns_sqs;
#[cfg(test)]
pub(crate) mod testing;

#[cfg(feature = "kafka")]
pub use kafka::KafkaTopic;
pub use mem::MemTopic;
#[cfg(feature = "nats")]
pub use nats::NatsTopic;
#[cfg(feature = "pubsub")]
pub use pubsub::PubSubTopic;
#[cfg(feature = "rabbit")]
pub use rabbit::RabbitTopic;
#[cfg(feature = "sns-sqs")]
pub use sns_sqs::{SnsTopic, SqsTopic};

/// Errors reported by topic backends.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TopicError {
    /// The topic URL could not be parsed.
    #[error("invalid topic url '{0}'")]
    InvalidUrl(String),

    /// No backend is compiled in for this scheme.
    #[error("unsupported topic scheme '{0}'")]
    UnsupportedScheme(String),

    /// Connecting to the broker failed.
    #[error("connection failed: {0}")]
    Connection(String),

    /// The broker did not accept the message.
    #[error("send failed: {0}")]
    Send(String),

    /// Closing the topic failed.
    #[error("shutdown failed: {0}")]
    Shutdown(String),

    /// The topic was already shut down.
    #[error("topic is closed")]
    Closed,

    /// The timeout cannot be turned into a deadline on this clock.
    #[error("timeout {0:?} is out of range")]
    InvalidTimeout(Duration),

    /// An open or shutdown did not finish before its deadline.
    #[error("{operation} did not complete within {timeout:?}")]
    DeadlineExceeded {
        operation: &'static str,
        timeout: Duration,
    },
}

/// One message as handed to the broker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicMessage {
    pub body: Bytes,
    pub attributes: RoutingAttributes,
}

/// A publish destination opened once per process.
///
/// Implementations must be safe to call from many tasks at once. Callers
/// bound every call with a deadline and drop the future when it passes, so
/// `send` must not leave the handle in a broken state when cancelled.
#[async_trait]
pub trait Topic: Send + Sync {
    /// Short backend name for logs.
    fn kind(&self) -> &'static str;

    /// Deliver one message.
    async fn send(&self, message: TopicMessage) -> Result<(), TopicError>;

    /// Flush and release broker resources.
    async fn shutdown(&self) -> Result<(), TopicError>;
}

/// Scheme, destination name and backend options of a topic URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicUrl<'a> {
    pub scheme: &'a str,
    pub name: &'a str,
    pub query: Option<&'a str>,
}

impl<'a> TopicUrl<'a> {
    /// Value of the first `key=value` pair in the query string.
    pub fn param(&self, key: &str) -> Option<&'a str> {
        self.query?
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .find_map(|(k, v)| (k == key).then_some(v))
    }
}

/// Split `scheme://name[?query]`. Scheme and name must be non-empty.
pub fn parse_topic_url(url: &str) -> Result<TopicUrl<'_>, TopicError> {
    let (scheme, rest) = url
        .split_once("://")
        .ok_or_else(|| TopicError::InvalidUrl(url.to_string()))?;
    let (name, query) = match rest.split_once('?') {
        Some((name, query)) => (name, Some(query).filter(|q| !q.is_empty())),
        None => (rest, None),
    };
    if scheme.is_empty() || name.is_empty() {
        return Err(TopicError::InvalidUrl(url.to_string()));
    }
    Ok(TopicUrl {
        scheme,
        name,
        query,
    })
}

/// The instant `timeout` from now.
pub fn deadline_after(timeout: Duration) -> Result<Instant, TopicError> {
    Instant::now()
        .checked_add(timeout)
        .ok_or(TopicError::InvalidTimeout(timeout))
}

/// Open the topic named by `url`, giving up after `timeout`.
pub async fn open_topic(url: &str, timeout: Duration) -> Result<Arc<dyn Topic>, TopicError> {
    let parsed = parse_topic_url(url)?;
    let deadline = deadline_after(timeout)?;
    let topic = timeout_at(deadline, connect(&parsed))
        .await
        .map_err(|_| TopicError::DeadlineExceeded {
            operation: "open",
            timeout,
        })??;
    info!(kind = topic.kind(), name = parsed.name, "Topic opened");
    Ok(topic)
}

async fn connect(url: &TopicUrl<'_>) -> Result<Arc<dyn Topic>, TopicError> {
    match url.scheme {
        "mem" => Ok(Arc::new(MemTopic::new(url.name))),
        #[cfg(feature = "nats")]
        "nats" => {
            let server = server_url("NATS_SERVER_URL", nats::DEFAULT_SERVER_URL);
            Ok(Arc::new(NatsTopic::connect(&server, url.name).await?))
        }
        #[cfg(feature = "rabbit")]
        "rabbit" => {
            let server = server_url("RABBIT_SERVER_URL", rabbit::DEFAULT_SERVER_URL);
            Ok(Arc::new(RabbitTopic::connect(&server, url.name).await?))
        }
        #[cfg(feature = "kafka")]
        "kafka" => {
            let brokers = server_url("KAFKA_BROKERS", kafka::DEFAULT_BROKERS);
            Ok(Arc::new(KafkaTopic::connect(&brokers, url.name)?))
        }
        #[cfg(feature = "sns-sqs")]
        "awssns" => Ok(Arc::new(SnsTopic::connect(url).await?)),
        #[cfg(feature = "sns-sqs")]
        "awssqs" => Ok(Arc::new(SqsTopic::connect(url).await?)),
        #[cfg(feature = "pubsub")]
        "gcppubsub" => Ok(Arc::new(PubSubTopic::connect(url).await?)),
        other => Err(TopicError::UnsupportedScheme(other.to_string())),
    }
}

#[cfg(any(feature = "nats", feature = "rabbit", feature = "kafka"))]
fn server_url(env_key: &str, default: &str) -> String {
    std::env::var(env_key).unwrap_or_else(|_| default.to_string())
}

/// Shut the topic down, giving up after `timeout`.
pub async fn shutdown_topic(topic: &dyn Topic, timeout: Duration) -> Result<(), TopicError> {
    let deadline = deadline_after(timeout)?;
    timeout_at(deadline, topic.shutdown())
        .await
        .map_err(|_| TopicError::DeadlineExceeded {
            operation: "shutdown",
            timeout,
        })??;
    debug!(kind = topic.kind(), "Topic shut down");
    Ok(())
}
