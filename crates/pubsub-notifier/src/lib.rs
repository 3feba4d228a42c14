//! pubsub-notifier Relay Library
//!
//! Core functionality for the notifier relay:
//! - Topic abstraction with in-memory, NATS and AMQP backends
//! - Bounded publishing of normalized envelopes
//! - Host-facing gRPC services and plugin handshake
//! - Fatal delivery-failure handling and process lifecycle

pub mod app;
pub mod fatal;
pub mod notifier;
pub mod publisher;
pub mod server;
pub mod topic;
