//! The three host entry points.
//!
//! Each call normalizes its event, publishes the envelope and either
//! acknowledges it or, on delivery failure, logs the event and raises the
//! fatal signal. Calls share no mutable state and may overlap freely.

use tracing::warn;

use pubsub_notifier_core::Normalizer;
use pubsub_notifier_core::event::{Envelope, EventCategory, FsEvent, LogEvent, ProviderEvent};

use crate::fatal::{DeliveryFailure, FatalSignal};
use crate::publisher::{PublishError, Publisher};

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// The event was dropped; serving continues.
    #[error("{category} event dropped: {source}")]
    Encode {
        category: EventCategory,
        #[source]
        source: PublishError,
    },

    /// The event could not be delivered; the process is terminating.
    #[error("{category} event not delivered: {source}")]
    Delivery {
        category: EventCategory,
        #[source]
        source: PublishError,
    },
}

impl NotifyError {
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Delivery { .. })
    }
}

#[derive(Clone)]
pub struct EventNotifier {
    normalizer: Normalizer,
    publisher: Publisher,
    fatal: FatalSignal,
}

impl EventNotifier {
    pub const fn new(normalizer: Normalizer, publisher: Publisher, fatal: FatalSignal) -> Self {
        Self {
            normalizer,
            publisher,
            fatal,
        }
    }

    pub async fn notify_fs_event(&self, event: &FsEvent) -> Result<(), NotifyError> {
        self.dispatch(self.normalizer.fs_event(event)).await
    }

    pub async fn notify_provider_event(&self, event: &ProviderEvent) -> Result<(), NotifyError> {
        self.dispatch(self.normalizer.provider_event(event)).await
    }

    pub async fn notify_log_event(&self, event: &LogEvent) -> Result<(), NotifyError> {
        self.dispatch(self.normalizer.log_event(event)).await
    }

    async fn dispatch(&self, envelope: Envelope) -> Result<(), NotifyError> {
        let category = envelope.category();
        let Err(source) = self.publisher.publish(&envelope).await else {
            return Ok(());
        };

        warn!(
            category = %category,
            action = %envelope.action(),
            username = envelope.actor(),
            target = envelope.target(),
            timeout = source.is_timeout(),
            error = %source,
            "Unable to send event"
        );

        if !source.is_fatal() {
            return Err(NotifyError::Encode { category, source });
        }

        self.fatal.raise(DeliveryFailure {
            category,
            action: envelope.action().into_owned(),
            actor: envelope.actor().to_string(),
            target: envelope.target().to_string(),
            error: source.to_string(),
        });
        Err(NotifyError::Delivery { category, source })
    }
}

#[cfg(test)]
#[allow(
    clippy::panic,
    clippy::expect_used,
    clippy::unwrap_used
)]
#[path = "notifier_tests.rs"]
mod tests;
