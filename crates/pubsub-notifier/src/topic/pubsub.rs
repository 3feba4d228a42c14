//! Google Cloud Pub/Sub backend.
//!
//! `gcppubsub://projects/<project>/topics/<topic>` (or the short form
//! `gcppubsub://<project>/<topic>`) publishes to an existing topic with the
//! routing attributes as message attributes. Authentication uses
//! Application Default Credentials; `PUBSUB_EMULATOR_HOST` points the
//! client at an emulator.

use std::collections::HashMap;

use async_trait::async_trait;
use google_cloud_googleapis::pubsub::v1::PubsubMessage;
use google_cloud_pubsub::client::{Client, ClientConfig};
use google_cloud_pubsub::publisher::Publisher;
use tracing::debug;

use super::{Topic, TopicError, TopicMessage, TopicUrl};

/// Fully qualified `projects/<project>/topics/<topic>` name.
pub fn topic_path(name: &str) -> Result<String, TopicError> {
    let parts: Vec<&str> = name.split('/').collect();
    match parts.as_slice() {
        ["projects", project, "topics", topic] if !project.is_empty() && !topic.is_empty() => {
            Ok(name.to_string())
        }
        [project, topic] if !project.is_empty() && !topic.is_empty() => {
            Ok(format!("projects/{project}/topics/{topic}"))
        }
        _ => Err(TopicError::InvalidUrl(format!(
            "gcppubsub://{name}: expected projects/<project>/topics/<topic>"
        ))),
    }
}

pub struct PubSubTopic {
    publisher: Publisher,
    topic: String,
}

impl PubSubTopic {
    pub async fn connect(url: &TopicUrl<'_>) -> Result<Self, TopicError> {
        let topic = topic_path(url.name)?;

        let config = ClientConfig::default().with_auth().await.map_err(|e| {
            TopicError::Connection(format!("Failed to configure Pub/Sub auth: {e}"))
        })?;
        let client = Client::new(config)
            .await
            .map_err(|e| TopicError::Connection(format!("Failed to create Pub/Sub client: {e}")))?;

        let handle = client.topic(&topic);
        let exists = handle
            .exists(None)
            .await
            .map_err(|e| TopicError::Connection(format!("Failed to look up {topic}: {e}")))?;
        if !exists {
            return Err(TopicError::Connection(format!("topic {topic} does not exist")));
        }

        debug!(topic = %topic, "Connected to Google Pub/Sub");

        Ok(Self {
            publisher: handle.new_publisher(None),
            topic,
        })
    }
}

fn message_for(message: &TopicMessage) -> PubsubMessage {
    let attributes: HashMap<String, String> = message
        .attributes
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    PubsubMessage {
        data: message.body.to_vec().into(),
        attributes,
        ..Default::default()
    }
}

#[async_trait]
impl Topic for PubSubTopic {
    fn kind(&self) -> &'static str {
        "gcppubsub"
    }

    async fn send(&self, message: TopicMessage) -> Result<(), TopicError> {
        self.publisher
            .publish(message_for(&message))
            .await
            .get()
            .await
            .map_err(|e| TopicError::Send(format!("Failed to publish to {}: {e}", self.topic)))?;
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), TopicError> {
        // Publisher handles share their background tasks; shutting down a
        // clone flushes and stops them all.
        let mut publisher = self.publisher.clone();
        publisher.shutdown().await;
        Ok(())
    }
}
