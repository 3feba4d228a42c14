//! Process lifecycle: open the topic, serve the host, release the topic.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::Server;
use tonic_health::ServingStatus;
use tonic_health::server::health_reporter;
use tracing::{error, info};

use pubsub_notifier_core::{Normalizer, RelayConfig};
use pubsub_notifier_proto::methods::HEALTH_SERVICE_NAME;
use pubsub_notifier_proto::plugin::grpc_controller_server::GrpcControllerServer;
use pubsub_notifier_proto::v1::notifier_server::NotifierServer;

use crate::fatal::{
    DeliveryFailure, EXIT_DELIVERY_FAILURE, EXIT_SERVE_FAILURE, EXIT_STARTUP_FAILURE, FatalSignal,
};
use crate::notifier::EventNotifier;
use crate::publisher::Publisher;
use crate::server::{ControllerService, NotifierService, announce};
use crate::topic::{Topic, TopicError, open_topic, shutdown_topic};

/// Failures that end the process before or while serving.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("failed to open topic: {0}")]
    OpenTopic(#[source] TopicError),

    #[error("failed to listen on {addr}: {source}")]
    Listen {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to write handshake: {0}")]
    Handshake(#[source] io::Error),

    #[error("failed to install signal handler: {0}")]
    Signal(#[source] io::Error),

    /// The server broke after the handshake; the host already saw us up.
    #[error("gRPC server error: {0}")]
    Serve(#[from] tonic::transport::Error),
}

impl RunError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Serve(_) => EXIT_SERVE_FAILURE,
            Self::OpenTopic(_) | Self::Listen { .. } | Self::Handshake(_) | Self::Signal(_) => {
                EXIT_STARTUP_FAILURE
            }
        }
    }
}

/// How serving ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Host request or signal.
    Stopped,
    /// A publish failed; the process must exit abnormally.
    DeliveryFailed(DeliveryFailure),
}

impl Outcome {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Stopped => 0,
            Self::DeliveryFailed(_) => EXIT_DELIVERY_FAILURE,
        }
    }
}

/// Run the relay until it is told to stop or a delivery fails.
///
/// The topic is shut down on every path that gets past opening it.
pub async fn run(config: &RelayConfig) -> Result<Outcome, RunError> {
    let topic = open_topic(&config.topic_url, config.open_timeout())
        .await
        .map_err(RunError::OpenTopic)?;

    let result = async {
        let listener = bind(&config.listen_addr).await?;
        serve(listener, config, Arc::clone(&topic), true).await
    }
    .await;

    if let Err(e) = shutdown_topic(topic.as_ref(), config.shutdown_timeout()).await {
        error!(error = %e, kind = topic.kind(), "Failed to close topic");
    }
    result
}

async fn bind(addr: &str) -> Result<TcpListener, RunError> {
    TcpListener::bind(addr)
        .await
        .map_err(|source| RunError::Listen {
            addr: addr.to_string(),
            source,
        })
}

/// Serve the host on an already bound listener.
///
/// With `handshake` set the listener address is announced on stdout once
/// the services are registered.
pub(crate) async fn serve(
    listener: TcpListener,
    config: &RelayConfig,
    topic: Arc<dyn Topic>,
    handshake: bool,
) -> Result<Outcome, RunError> {
    let local_addr: SocketAddr = listener.local_addr().map_err(|source| RunError::Listen {
        addr: config.listen_addr.clone(),
        source,
    })?;

    let (fatal, mut fatal_rx) = FatalSignal::channel();
    let notifier = EventNotifier::new(
        Normalizer::new(&config.instance_id),
        Publisher::new(topic, config.publish_timeout()),
        fatal,
    );

    let (stop_tx, mut stop_rx) = watch::channel(false);

    let (health, health_service) = health_reporter();
    health
        .set_service_status(HEALTH_SERVICE_NAME, ServingStatus::Serving)
        .await;

    let router = Server::builder()
        .add_service(health_service)
        .add_service(NotifierServer::new(NotifierService::new(notifier)))
        .add_service(GrpcControllerServer::new(ControllerService::new(stop_tx)));

    #[cfg(unix)]
    let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        .map_err(RunError::Signal)?;

    if handshake {
        announce(local_addr).map_err(RunError::Handshake)?;
    }
    info!(
        addr = %local_addr,
        topic = %config.topic_url,
        instance_id = %config.instance_id,
        "Relay serving"
    );

    let stop = async move {
        #[cfg(unix)]
        let sigterm_future = sigterm.recv();
        #[cfg(not(unix))]
        let sigterm_future = std::future::pending::<Option<()>>();

        tokio::select! {
            _ = tokio::signal::ctrl_c() => info!("Received Ctrl+C shutdown signal"),
            _ = sigterm_future => info!("Received SIGTERM shutdown signal"),
            _ = stop_rx.wait_for(|stop| *stop) => {}
        }
    };
    let server = router.serve_with_incoming_shutdown(TcpListenerStream::new(listener), stop);

    tokio::select! {
        result = server => {
            result?;
            info!("Relay stopped");
            Ok(Outcome::Stopped)
        }
        Some(failure) = fatal_rx.recv() => {
            error!(
                category = %failure.category,
                action = %failure.action,
                username = %failure.actor,
                target = %failure.target,
                error = %failure.error,
                "Delivery failed, terminating"
            );
            Ok(Outcome::DeliveryFailed(failure))
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::panic,
    clippy::expect_used,
    clippy::unwrap_used
)]
#[path = "app_tests.rs"]
mod tests;
