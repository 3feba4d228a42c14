//! In-process topic backed by a tokio broadcast channel.
//!
//! Useful for local runs and tests: messages are fanned out to every
//! subscriber created with [`MemTopic::subscribe`]. Sending with no
//! subscribers succeeds and the message is discarded.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::debug;

use super::{Topic, TopicError, TopicMessage};

/// Channel capacity for broadcast.
const CHANNEL_CAPACITY: usize = 1024;

pub struct MemTopic {
    name: String,
    sender: broadcast::Sender<TopicMessage>,
    closed: AtomicBool,
}

impl MemTopic {
    pub fn new(name: impl Into<String>) -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            name: name.into(),
            sender,
            closed: AtomicBool::new(false),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Receive every message sent after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<TopicMessage> {
        self.sender.subscribe()
    }
}

#[async_trait]
impl Topic for MemTopic {
    fn kind(&self) -> &'static str {
        "mem"
    }

    async fn send(&self, message: TopicMessage) -> Result<(), TopicError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(TopicError::Closed);
        }
        let receivers = self.sender.send(message).unwrap_or(0);
        debug!(topic = %self.name, receivers, "Message published");
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), TopicError> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Err(TopicError::Shutdown(format!(
                "topic '{}' already shut down",
                self.name
            )));
        }
        Ok(())
    }
}
