//! Event records as the host hands them over.
//!
//! Each record is the superset of every schema generation the host has
//! shipped. Older hosts leave newer fields at their zero value, which the
//! normalizer treats as "not applicable".

use std::collections::HashMap;

/// A file transfer or filesystem operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FsEvent {
    /// Nanoseconds since the Unix epoch.
    pub timestamp: i64,
    pub action: String,
    pub username: String,
    pub fs_path: String,
    /// Rename/copy destination on the storage backend.
    pub fs_target_path: String,
    pub virtual_path: String,
    /// Rename/copy destination as seen by the user.
    pub virtual_target_path: String,
    pub ssh_cmd: String,
    pub protocol: String,
    pub ip: String,
    pub session_id: String,
    pub file_size: i64,
    /// Elapsed time in milliseconds.
    pub elapsed: i64,
    /// Outcome code; meaning depends on the host version and is not
    /// interpreted here.
    pub status: i32,
    /// Storage provider kind (local, S3, GCS, ...).
    pub fs_provider: i32,
    pub bucket: String,
    pub endpoint: String,
    pub open_flags: i32,
    pub role: String,
    pub metadata: HashMap<String, String>,
}

impl FsEvent {
    /// Build an event from the positional argument list used by the first
    /// schema generation. Fields introduced later stay unset.
    #[allow(clippy::too_many_arguments)]
    pub fn legacy(
        timestamp: i64,
        action: &str,
        username: &str,
        fs_path: &str,
        fs_target_path: &str,
        ssh_cmd: &str,
        protocol: &str,
        ip: &str,
        virtual_path: &str,
        virtual_target_path: &str,
        session_id: &str,
        file_size: i64,
        status: i32,
    ) -> Self {
        Self {
            timestamp,
            action: action.to_string(),
            username: username.to_string(),
            fs_path: fs_path.to_string(),
            fs_target_path: fs_target_path.to_string(),
            ssh_cmd: ssh_cmd.to_string(),
            protocol: protocol.to_string(),
            ip: ip.to_string(),
            virtual_path: virtual_path.to_string(),
            virtual_target_path: virtual_target_path.to_string(),
            session_id: session_id.to_string(),
            file_size,
            status,
            ..Self::default()
        }
    }
}

/// A mutation of a persisted object (user, admin, folder, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderEvent {
    /// Nanoseconds since the Unix epoch.
    pub timestamp: i64,
    pub action: String,
    pub username: String,
    pub ip: String,
    pub object_type: String,
    pub object_name: String,
    /// Serialized object, opaque to the relay.
    pub object_data: Vec<u8>,
    pub role: String,
}

impl ProviderEvent {
    /// Build an event from the positional argument list used by the first
    /// schema generation.
    pub fn legacy(
        timestamp: i64,
        action: &str,
        username: &str,
        object_type: &str,
        object_name: &str,
        ip: &str,
        object_data: Vec<u8>,
    ) -> Self {
        Self {
            timestamp,
            action: action.to_string(),
            username: username.to_string(),
            ip: ip.to_string(),
            object_type: object_type.to_string(),
            object_name: object_name.to_string(),
            object_data,
            ..Self::default()
        }
    }
}

/// An authentication or protocol log entry.
///
/// Only hosts that support log events send these.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogEvent {
    /// Nanoseconds since the Unix epoch.
    pub timestamp: i64,
    /// Raw event kind; see [`super::LogEventKind`].
    pub event: i32,
    pub protocol: String,
    pub username: String,
    pub ip: String,
    pub message: String,
    pub role: String,
}
