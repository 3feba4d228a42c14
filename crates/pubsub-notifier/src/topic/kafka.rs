//! Kafka producer backend.
//!
//! `kafka://<topic>` produces each message to `<topic>` without a key, with
//! the routing attributes as record headers. Brokers come from
//! `KAFKA_BROKERS` as a comma-separated `host:port` list. The producer waits
//! for all in-sync replicas before a send succeeds.

use std::time::Duration;

use async_trait::async_trait;
use rdkafka::ClientConfig;
use rdkafka::message::{Header, OwnedHeaders};
use rdkafka::producer::{FutureProducer, FutureRecord, Producer};
use rdkafka::util::Timeout;
use tracing::debug;

use super::{Topic, TopicError, TopicMessage};

pub const DEFAULT_BROKERS: &str = "127.0.0.1:9092";

const FLUSH_TIMEOUT: Duration = Duration::from_secs(10);

pub struct KafkaTopic {
    producer: FutureProducer,
    topic: String,
}

impl KafkaTopic {
    /// Creating the producer does not contact the brokers; an unreachable
    /// cluster shows up on the first send.
    pub fn connect(brokers: &str, topic: &str) -> Result<Self, TopicError> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("client.id", "pubsub-notifier")
            .set("acks", "all")
            .create()
            .map_err(|e| TopicError::Connection(format!("Failed to create producer: {e}")))?;

        debug!(brokers = %brokers, topic = %topic, "Created Kafka producer");

        Ok(Self {
            producer,
            topic: topic.to_string(),
        })
    }
}

fn headers_for(message: &TopicMessage) -> OwnedHeaders {
    message
        .attributes
        .iter()
        .fold(OwnedHeaders::new(), |headers, (key, value)| {
            headers.insert(Header {
                key: key.as_str(),
                value: Some(value.as_str()),
            })
        })
}

#[async_trait]
impl Topic for KafkaTopic {
    fn kind(&self) -> &'static str {
        "kafka"
    }

    async fn send(&self, message: TopicMessage) -> Result<(), TopicError> {
        let record = FutureRecord::<(), [u8]>::to(&self.topic)
            .payload(&message.body[..])
            .headers(headers_for(&message));

        // The caller's deadline bounds the wait for queue space.
        self.producer
            .send(record, Timeout::Never)
            .await
            .map_err(|(e, _)| TopicError::Send(format!("Failed to produce: {e}")))?;
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), TopicError> {
        let producer = self.producer.clone();
        tokio::task::spawn_blocking(move || producer.flush(FLUSH_TIMEOUT))
            .await
            .map_err(|e| TopicError::Shutdown(e.to_string()))?
            .map_err(|e| TopicError::Shutdown(format!("flush: {e}")))
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use bytes::Bytes;
    use pubsub_notifier_core::event::RoutingAttributes;
    use rdkafka::message::Headers;

    use super::*;

    #[test]
    fn attributes_become_record_headers() {
        let message = TopicMessage {
            body: Bytes::from_static(b"{}"),
            attributes: RoutingAttributes::from([
                ("action".to_string(), "add".to_string()),
                ("object_type".to_string(), "user".to_string()),
            ]),
        };
        let headers = headers_for(&message);
        assert_eq!(headers.count(), 2);

        let action = headers.get(0);
        assert_eq!(action.key, "action");
        assert_eq!(action.value, Some(&b"add"[..]));

        let object_type = headers.get(1);
        assert_eq!(object_type.key, "object_type");
        assert_eq!(object_type.value, Some(&b"user"[..]));
    }

    #[test]
    fn producer_is_created_without_reaching_brokers() {
        let topic = KafkaTopic::connect("127.0.0.1:1", "events").unwrap();
        assert_eq!(topic.kind(), "kafka");
        assert_eq!(topic.topic, "events");
    }
}
