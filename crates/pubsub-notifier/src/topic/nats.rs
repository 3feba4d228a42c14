//! NATS core publish backend.
//!
//! `nats://<subject>` publishes each message on `<subject>` with the routing
//! attributes as NATS headers. The server comes from `NATS_SERVER_URL`.
//! Every send is followed by a flush so a broken connection surfaces as a
//! send error instead of a silently buffered message.

use async_nats::{Client, ConnectOptions, HeaderMap};
use async_trait::async_trait;
use tracing::debug;

use super::{Topic, TopicError, TopicMessage};

pub const DEFAULT_SERVER_URL: &str = "nats://127.0.0.1:4222";

pub struct NatsTopic {
    client: Client,
    subject: String,
}

impl NatsTopic {
    pub async fn connect(server_url: &str, subject: &str) -> Result<Self, TopicError> {
        let options = ConnectOptions::default().name("pubsub-notifier");
        let client = async_nats::connect_with_options(server_url, options)
            .await
            .map_err(|e| TopicError::Connection(format!("{server_url}: {e}")))?;

        debug!(server = %server_url, subject = %subject, "Connected to NATS");

        Ok(Self {
            client,
            subject: subject.to_string(),
        })
    }
}

fn headers_for(message: &TopicMessage) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for (key, value) in &message.attributes {
        headers.insert(key.as_str(), value.as_str());
    }
    headers
}

#[async_trait]
impl Topic for NatsTopic {
    fn kind(&self) -> &'static str {
        "nats"
    }

    async fn send(&self, message: TopicMessage) -> Result<(), TopicError> {
        let headers = headers_for(&message);
        self.client
            .publish_with_headers(self.subject.clone(), headers, message.body)
            .await
            .map_err(|e| TopicError::Send(e.to_string()))?;
        self.client
            .flush()
            .await
            .map_err(|e| TopicError::Send(format!("flush: {e}")))
    }

    async fn shutdown(&self) -> Result<(), TopicError> {
        self.client
            .flush()
            .await
            .map_err(|e| TopicError::Shutdown(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use bytes::Bytes;
    use pubsub_notifier_core::event::RoutingAttributes;

    use super::*;

    #[test]
    fn attributes_become_headers() {
        let message = TopicMessage {
            body: Bytes::from_static(b"{}"),
            attributes: RoutingAttributes::from([
                ("action".to_string(), "add".to_string()),
                ("object_type".to_string(), "user".to_string()),
            ]),
        };
        let headers = headers_for(&message);
        assert_eq!(headers.get("action").unwrap().as_str(), "add");
        assert_eq!(headers.get("object_type").unwrap().as_str(), "user");
    }
}
