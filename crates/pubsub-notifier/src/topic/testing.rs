//! Fake topics for tests.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{Topic, TopicError, TopicMessage};

/// Accepts every message and keeps it for inspection.
#[derive(Default)]
pub struct RecordingTopic {
    messages: Mutex<Vec<TopicMessage>>,
}

impl RecordingTopic {
    pub async fn messages(&self) -> Vec<TopicMessage> {
        self.messages.lock().await.clone()
    }
}

#[async_trait]
impl Topic for RecordingTopic {
    fn kind(&self) -> &'static str {
        "recording"
    }

    async fn send(&self, message: TopicMessage) -> Result<(), TopicError> {
        // Yield so concurrent senders interleave.
        tokio::task::yield_now().await;
        self.messages.lock().await.push(message);
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), TopicError> {
        Ok(())
    }
}

/// Never completes a send or a shutdown.
#[derive(Default)]
pub struct StallingTopic;

#[async_trait]
impl Topic for StallingTopic {
    fn kind(&self) -> &'static str {
        "stalling"
    }

    async fn send(&self, _message: TopicMessage) -> Result<(), TopicError> {
        std::future::pending().await
    }

    async fn shutdown(&self) -> Result<(), TopicError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(())
    }
}

/// Rejects every send with a transport error.
#[derive(Default)]
pub struct FailingTopic;

#[async_trait]
impl Topic for FailingTopic {
    fn kind(&self) -> &'static str {
        "failing"
    }

    async fn send(&self, _message: TopicMessage) -> Result<(), TopicError> {
        Err(TopicError::Send("broker unavailable".into()))
    }

    async fn shutdown(&self) -> Result<(), TopicError> {
        Ok(())
    }
}
