//! Protobuf request messages → host event records.

use pubsub_notifier_core::event::{FsEvent, LogEvent, ProviderEvent};
use pubsub_notifier_proto::v1 as pb;

pub fn fs_event_from_proto(msg: pb::FsEvent) -> FsEvent {
    FsEvent {
        timestamp: msg.timestamp,
        action: msg.action,
        username: msg.username,
        fs_path: msg.fs_path,
        fs_target_path: msg.fs_target_path,
        virtual_path: msg.virtual_path,
        virtual_target_path: msg.virtual_target_path,
        ssh_cmd: msg.ssh_cmd,
        protocol: msg.protocol,
        ip: msg.ip,
        session_id: msg.session_id,
        file_size: msg.file_size,
        elapsed: msg.elapsed,
        status: msg.status,
        fs_provider: msg.fs_provider,
        bucket: msg.bucket,
        endpoint: msg.endpoint,
        open_flags: msg.open_flags,
        role: msg.role,
        metadata: msg.metadata,
    }
}

pub fn provider_event_from_proto(msg: pb::ProviderEvent) -> ProviderEvent {
    ProviderEvent {
        timestamp: msg.timestamp,
        action: msg.action,
        username: msg.username,
        ip: msg.ip,
        object_type: msg.object_type,
        object_name: msg.object_name,
        object_data: msg.object_data,
        role: msg.role,
    }
}

pub fn log_event_from_proto(msg: pb::LogEvent) -> LogEvent {
    LogEvent {
        timestamp: msg.timestamp,
        event: msg.event,
        protocol: msg.protocol,
        username: msg.username,
        ip: msg.ip,
        message: msg.message,
        role: msg.role,
    }
}
