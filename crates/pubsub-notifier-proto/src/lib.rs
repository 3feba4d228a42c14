//! pubsub-notifier Protocol Buffers
//!
//! Generated protobuf code for the host-facing contract:
//! - `Notifier` service receiving filesystem, provider and log events
//! - `GRPCController` service the host uses to stop the plugin process

#![allow(clippy::derive_partial_eq_without_eq)]

pub mod methods;

/// Notifier v1 API definitions.
pub mod v1 {
    tonic::include_proto!("notifier.v1");
}

/// Plugin controller definitions shared with the host's plugin runtime.
pub mod plugin {
    tonic::include_proto!("plugin");
}

// Re-export v1 as the default API version for convenience
pub use v1::*;
