//! Host event → envelope mapping.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::envelope::{Envelope, FsEnvelope, LogEnvelope, ProviderEnvelope};
use super::host::{FsEvent, LogEvent, ProviderEvent};
use super::opaque::OpaquePayload;
use super::timestamp::format_timestamp;

/// Builds envelopes from host events.
///
/// Pure and infallible: the same input always produces the same envelope,
/// and no wall-clock time is sampled. Cheap to clone and share across
/// concurrent calls.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    instance_id: Option<Arc<str>>,
}

impl Normalizer {
    /// `instance_id` is stamped on every envelope; empty means unset.
    pub fn new(instance_id: &str) -> Self {
        Self {
            instance_id: (!instance_id.is_empty()).then(|| Arc::from(instance_id)),
        }
    }

    pub fn instance_id(&self) -> Option<&str> {
        self.instance_id.as_deref()
    }

    pub fn fs_event(&self, event: &FsEvent) -> Envelope {
        let metadata: BTreeMap<String, String> = event
            .metadata
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        Envelope::Filesystem(FsEnvelope {
            timestamp: format_timestamp(event.timestamp),
            action: event.action.clone(),
            username: event.username.clone(),
            fs_path: event.fs_path.clone(),
            fs_target_path: non_empty(&event.fs_target_path),
            virtual_path: event.virtual_path.clone(),
            virtual_target_path: non_empty(&event.virtual_target_path),
            ssh_cmd: non_empty(&event.ssh_cmd),
            file_size: non_zero(event.file_size),
            elapsed: non_zero(event.elapsed),
            status: event.status,
            protocol: event.protocol.clone(),
            ip: non_empty(&event.ip),
            session_id: event.session_id.clone(),
            fs_provider: event.fs_provider,
            bucket: non_empty(&event.bucket),
            endpoint: non_empty(&event.endpoint),
            open_flags: non_zero(event.open_flags),
            role: non_empty(&event.role),
            metadata: (!metadata.is_empty()).then_some(metadata),
            instance_id: self.instance_id_field(),
        })
    }

    pub fn provider_event(&self, event: &ProviderEvent) -> Envelope {
        Envelope::Provider(ProviderEnvelope {
            timestamp: format_timestamp(event.timestamp),
            action: event.action.clone(),
            username: event.username.clone(),
            ip: non_empty(&event.ip),
            object_type: event.object_type.clone(),
            object_name: event.object_name.clone(),
            object_data: OpaquePayload::from(event.object_data.as_slice()),
            role: non_empty(&event.role),
            instance_id: self.instance_id_field(),
        })
    }

    pub fn log_event(&self, event: &LogEvent) -> Envelope {
        Envelope::Log(LogEnvelope {
            timestamp: format_timestamp(event.timestamp),
            event: event.event,
            protocol: event.protocol.clone(),
            username: event.username.clone(),
            ip: non_empty(&event.ip),
            message: non_empty(&event.message),
            role: non_empty(&event.role),
            instance_id: self.instance_id_field(),
        })
    }

    fn instance_id_field(&self) -> Option<String> {
        self.instance_id.as_deref().map(str::to_string)
    }
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

fn non_zero<T: Default + PartialEq>(n: T) -> Option<T> {
    (n != T::default()).then_some(n)
}
