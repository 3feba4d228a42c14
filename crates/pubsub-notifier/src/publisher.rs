//! Bounded publishing of envelopes to the shared topic.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::time::timeout_at;
use tracing::debug;

use pubsub_notifier_core::Envelope;

use crate::topic::{Topic, TopicError, TopicMessage, deadline_after};

/// Why a publish did not complete.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// The envelope could not be serialized. The event is dropped.
    #[error("failed to encode envelope: {0}")]
    Encode(#[from] serde_json::Error),

    /// The publish timeout is too large to compute a deadline from.
    #[error("publish timeout {0:?} is out of range")]
    InvalidTimeout(Duration),

    /// The topic did not acknowledge within the publish timeout.
    #[error("publish deadline exceeded after {0:?}")]
    DeadlineExceeded(Duration),

    /// The topic rejected the message.
    #[error("publish failed: {0}")]
    Transport(#[source] TopicError),
}

impl PublishError {
    /// Delivery failures end the process; encoding failures only drop the
    /// event.
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::InvalidTimeout(_) | Self::DeadlineExceeded(_) | Self::Transport(_)
        )
    }

    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::DeadlineExceeded(_))
    }
}

/// Sends envelopes with a fixed per-call deadline.
///
/// Cloning shares the underlying topic.
#[derive(Clone)]
pub struct Publisher {
    topic: Arc<dyn Topic>,
    timeout: Duration,
}

impl Publisher {
    pub fn new(topic: Arc<dyn Topic>, timeout: Duration) -> Self {
        Self { topic, timeout }
    }

    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Encode `envelope` and send it with its routing attributes.
    ///
    /// The send future is dropped, and with it the in-flight send, once the
    /// deadline passes.
    pub async fn publish(&self, envelope: &Envelope) -> Result<(), PublishError> {
        let body = envelope.encode()?;
        let message = TopicMessage {
            body: Bytes::from(body),
            attributes: envelope.attributes(),
        };

        let deadline =
            deadline_after(self.timeout).map_err(|_| PublishError::InvalidTimeout(self.timeout))?;
        timeout_at(deadline, self.topic.send(message))
            .await
            .map_err(|_| PublishError::DeadlineExceeded(self.timeout))?
            .map_err(PublishError::Transport)?;

        debug!(
            category = %envelope.category(),
            action = %envelope.action(),
            topic = self.topic.kind(),
            "Envelope published"
        );
        Ok(())
    }
}

#[cfg(test)]
#[allow(
    clippy::panic,
    clippy::expect_used,
    clippy::unwrap_used
)]
#[path = "publisher_tests.rs"]
mod tests;
