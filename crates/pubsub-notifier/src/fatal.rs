//! Process-terminating delivery failures.
//!
//! A failed publish is not retried and not reported back as a soft error:
//! the relay stops serving, releases the topic and exits. Handlers raise a
//! [`DeliveryFailure`] on the [`FatalSignal`]; the main task owns the
//! receiving end and drives the shutdown.

use std::fmt;

use tokio::sync::mpsc;
use tracing::error;

use pubsub_notifier_core::event::EventCategory;

/// Exit code for failures before the server is serving.
pub const EXIT_STARTUP_FAILURE: u8 = 1;

/// Exit code after a delivery failure.
pub const EXIT_DELIVERY_FAILURE: u8 = 2;

/// Exit code when the gRPC server fails after it started serving.
pub const EXIT_SERVE_FAILURE: u8 = 3;

/// Diagnostic context of the publish that failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryFailure {
    pub category: EventCategory,
    pub action: String,
    pub actor: String,
    pub target: String,
    pub error: String,
}

impl fmt::Display for DeliveryFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unable to deliver {} event '{}' for user '{}' ({}): {}",
            self.category, self.action, self.actor, self.target, self.error
        )
    }
}

/// Sending half of the fatal channel. Cheap to clone.
#[derive(Debug, Clone)]
pub struct FatalSignal {
    tx: mpsc::UnboundedSender<DeliveryFailure>,
}

impl FatalSignal {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<DeliveryFailure>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Hand the failure to the main task.
    ///
    /// With nobody left to drive an orderly shutdown the process exits
    /// immediately.
    pub fn raise(&self, failure: DeliveryFailure) {
        if let Err(mpsc::error::SendError(failure)) = self.tx.send(failure) {
            error!(
                category = %failure.category,
                action = %failure.action,
                error = %failure.error,
                "Fatal channel closed, exiting"
            );
            std::process::exit(i32::from(EXIT_DELIVERY_FAILURE));
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    fn failure() -> DeliveryFailure {
        DeliveryFailure {
            category: EventCategory::Filesystem,
            action: "upload".into(),
            actor: "alice".into(),
            target: "/a/b.txt".into(),
            error: "publish deadline exceeded after 30s".into(),
        }
    }

    #[tokio::test]
    async fn raised_failure_reaches_receiver() {
        let (signal, mut rx) = FatalSignal::channel();
        signal.clone().raise(failure());
        assert_eq!(rx.recv().await.unwrap(), failure());
    }

    #[test]
    fn display_names_event_and_error() {
        let text = failure().to_string();
        assert!(text.contains("fs event 'upload'"));
        assert!(text.contains("alice"));
        assert!(text.contains("/a/b.txt"));
        assert!(text.contains("deadline exceeded"));
    }
}
