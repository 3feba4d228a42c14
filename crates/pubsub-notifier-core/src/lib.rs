//! pubsub-notifier Core Library
//!
//! Shared functionality for the notifier relay:
//! - Host event records and their legacy call shapes
//! - Normalization into canonical wire envelopes
//! - Configuration resolution and hierarchy
//! - Common error types

pub mod config;
pub mod error;
pub mod event;
pub mod tracing_init;
pub mod version;

pub use config::RelayConfig;
pub use error::{Error, Result};
pub use event::{Envelope, Normalizer};
