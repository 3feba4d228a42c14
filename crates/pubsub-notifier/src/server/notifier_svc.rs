//! `notifier.v1.Notifier` gRPC implementation.

use tonic::{Request, Response, Status};
use tracing::instrument;

use pubsub_notifier_proto::methods::{
    METHOD_NOTIFY_FS_EVENT, METHOD_NOTIFY_LOG_EVENT, METHOD_NOTIFY_PROVIDER_EVENT,
};
use pubsub_notifier_proto::v1 as pb;
use pubsub_notifier_proto::v1::notifier_server::Notifier;

use crate::notifier::{EventNotifier, NotifyError};
use crate::server::convert::{
    fs_event_from_proto, log_event_from_proto, provider_event_from_proto,
};

pub struct NotifierService {
    notifier: EventNotifier,
}

impl NotifierService {
    pub const fn new(notifier: EventNotifier) -> Self {
        Self { notifier }
    }
}

pub fn notify_error_to_status(err: &NotifyError) -> Status {
    match err {
        NotifyError::Encode { .. } => Status::internal(err.to_string()),
        NotifyError::Delivery { .. } => Status::unavailable(err.to_string()),
    }
}

#[tonic::async_trait]
impl Notifier for NotifierService {
    #[instrument(skip(self, request), fields(rpc = METHOD_NOTIFY_FS_EVENT))]
    async fn notify_fs_event(
        &self,
        request: Request<pb::FsEvent>,
    ) -> Result<Response<pb::NotifyResponse>, Status> {
        let event = fs_event_from_proto(request.into_inner());
        self.notifier
            .notify_fs_event(&event)
            .await
            .map_err(|e| notify_error_to_status(&e))?;
        Ok(Response::new(pb::NotifyResponse {}))
    }

    #[instrument(skip(self, request), fields(rpc = METHOD_NOTIFY_PROVIDER_EVENT))]
    async fn notify_provider_event(
        &self,
        request: Request<pb::ProviderEvent>,
    ) -> Result<Response<pb::NotifyResponse>, Status> {
        let event = provider_event_from_proto(request.into_inner());
        self.notifier
            .notify_provider_event(&event)
            .await
            .map_err(|e| notify_error_to_status(&e))?;
        Ok(Response::new(pb::NotifyResponse {}))
    }

    #[instrument(skip(self, request), fields(rpc = METHOD_NOTIFY_LOG_EVENT))]
    async fn notify_log_event(
        &self,
        request: Request<pb::LogEvent>,
    ) -> Result<Response<pb::NotifyResponse>, Status> {
        let event = log_event_from_proto(request.into_inner());
        self.notifier
            .notify_log_event(&event)
            .await
            .map_err(|e| notify_error_to_status(&e))?;
        Ok(Response::new(pb::NotifyResponse {}))
    }
}
