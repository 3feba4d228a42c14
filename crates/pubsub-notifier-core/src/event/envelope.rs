//! Canonical wire envelopes.
//!
//! One struct per event category. Required fields are always serialized;
//! optional fields are `Option`s skipped when `None`, so consumers can tell
//! "not applicable" apart from an explicit empty value.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::kind::log_event_label;
use super::opaque::OpaquePayload;

/// Routing metadata published next to the payload.
///
/// Ordered so the attribute set for a given envelope is deterministic.
pub type RoutingAttributes = BTreeMap<String, String>;

pub const ATTR_ACTION: &str = "action";
pub const ATTR_OBJECT_TYPE: &str = "object_type";
pub const ATTR_EVENT: &str = "event";

/// `action` attribute value marking log events.
pub const LOG_ACTION: &str = "log";

/// Filesystem event envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FsEnvelope {
    pub timestamp: String,
    pub action: String,
    pub username: String,
    pub fs_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fs_target_path: Option<String>,
    pub virtual_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub virtual_target_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssh_cmd: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed: Option<i64>,
    pub status: i32,
    pub protocol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    pub session_id: String,
    pub fs_provider: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_flags: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,
}

/// Object-store/provider event envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderEnvelope {
    pub timestamp: String,
    pub action: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    pub object_type: String,
    pub object_name: String,
    pub object_data: OpaquePayload,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,
}

/// Authentication/log event envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEnvelope {
    pub timestamp: String,
    /// Raw event kind, never replaced by its label.
    pub event: i32,
    pub protocol: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,
}

/// Event category, used for log fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventCategory {
    Filesystem,
    Provider,
    Log,
}

impl EventCategory {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Filesystem => "fs",
            Self::Provider => "provider",
            Self::Log => "log",
        }
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized event, ready to be encoded and published.
///
/// Serialized without a tag: the wire payload is the bare variant object.
/// One envelope exists per call, so variants are not boxed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
#[allow(clippy::large_enum_variant)]
pub enum Envelope {
    Filesystem(FsEnvelope),
    Provider(ProviderEnvelope),
    Log(LogEnvelope),
}

impl Envelope {
    pub const fn category(&self) -> EventCategory {
        match self {
            Self::Filesystem(_) => EventCategory::Filesystem,
            Self::Provider(_) => EventCategory::Provider,
            Self::Log(_) => EventCategory::Log,
        }
    }

    /// Encode the envelope as a JSON object.
    pub fn encode(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    /// Routing attributes for broker-side filtering.
    pub fn attributes(&self) -> RoutingAttributes {
        let mut attrs = RoutingAttributes::new();
        match self {
            Self::Filesystem(ev) => {
                attrs.insert(ATTR_ACTION.into(), ev.action.clone());
            }
            Self::Provider(ev) => {
                attrs.insert(ATTR_ACTION.into(), ev.action.clone());
                attrs.insert(ATTR_OBJECT_TYPE.into(), ev.object_type.clone());
            }
            Self::Log(ev) => {
                attrs.insert(ATTR_ACTION.into(), LOG_ACTION.into());
                attrs.insert(ATTR_EVENT.into(), ev.event.to_string());
            }
        }
        attrs
    }

    /// Action name for diagnostics; log events report their kind label.
    pub fn action(&self) -> Cow<'_, str> {
        match self {
            Self::Filesystem(ev) => Cow::Borrowed(&ev.action),
            Self::Provider(ev) => Cow::Borrowed(&ev.action),
            Self::Log(ev) => log_event_label(ev.event),
        }
    }

    /// The user the event is about.
    pub fn actor(&self) -> &str {
        match self {
            Self::Filesystem(ev) => &ev.username,
            Self::Provider(ev) => &ev.username,
            Self::Log(ev) => &ev.username,
        }
    }

    /// Path or identifier the event targets, for diagnostics.
    pub fn target(&self) -> &str {
        match self {
            Self::Filesystem(ev) => &ev.virtual_path,
            Self::Provider(ev) => &ev.object_name,
            Self::Log(ev) => ev.ip.as_deref().unwrap_or_default(),
        }
    }
}

impl From<FsEnvelope> for Envelope {
    fn from(ev: FsEnvelope) -> Self {
        Self::Filesystem(ev)
    }
}

impl From<ProviderEnvelope> for Envelope {
    fn from(ev: ProviderEnvelope) -> Self {
        Self::Provider(ev)
    }
}

impl From<LogEnvelope> for Envelope {
    fn from(ev: LogEnvelope) -> Self {
        Self::Log(ev)
    }
}
