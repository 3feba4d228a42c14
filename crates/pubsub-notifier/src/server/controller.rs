//! `plugin.GRPCController` implementation.

use tokio::sync::watch;
use tonic::{Request, Response, Status};
use tracing::{info, instrument};

use pubsub_notifier_proto::methods::METHOD_CONTROLLER_SHUTDOWN;
use pubsub_notifier_proto::plugin::Empty;
use pubsub_notifier_proto::plugin::grpc_controller_server::GrpcController;

/// Turns a host `Shutdown` request into a graceful server stop.
pub struct ControllerService {
    stop: watch::Sender<bool>,
}

impl ControllerService {
    pub const fn new(stop: watch::Sender<bool>) -> Self {
        Self { stop }
    }
}

#[tonic::async_trait]
impl GrpcController for ControllerService {
    #[instrument(skip(self, _request), fields(rpc = METHOD_CONTROLLER_SHUTDOWN))]
    async fn shutdown(&self, _request: Request<Empty>) -> Result<Response<Empty>, Status> {
        info!("Host requested shutdown");
        self.stop.send_replace(true);
        Ok(Response::new(Empty {}))
    }
}
