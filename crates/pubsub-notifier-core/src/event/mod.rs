//! Host events and their canonical wire envelopes.
//!
//! The host hands over one of three event records; [`Normalizer`] turns it
//! into an [`Envelope`] with stable field names, explicit optionality and a
//! UTC timestamp, ready to be encoded and published.

mod envelope;
mod host;
mod kind;
mod normalize;
mod opaque;
mod timestamp;

pub use envelope::{
    Envelope, EventCategory, FsEnvelope, LogEnvelope, ProviderEnvelope, RoutingAttributes,
};
pub use host::{FsEvent, LogEvent, ProviderEvent};
pub use kind::{LogEventKind, log_event_label};
pub use normalize::Normalizer;
pub use opaque::OpaquePayload;
pub use timestamp::format_timestamp;
