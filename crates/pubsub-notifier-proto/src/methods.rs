//! Named constants for gRPC method strings and well-known service names.
//!
//! Shared between the server implementation and log/trace fields so that
//! method names stay in sync without duplicating string literals.

/// Service name reported as `SERVING` through `grpc.health.v1.Health`.
///
/// The host's plugin runtime checks this name before dispatching events.
pub const HEALTH_SERVICE_NAME: &str = "plugin";

/// `Notifier/NotifyFsEvent`
pub const METHOD_NOTIFY_FS_EVENT: &str = "Notifier/NotifyFsEvent";

/// `Notifier/NotifyProviderEvent`
pub const METHOD_NOTIFY_PROVIDER_EVENT: &str = "Notifier/NotifyProviderEvent";

/// `Notifier/NotifyLogEvent`
pub const METHOD_NOTIFY_LOG_EVENT: &str = "Notifier/NotifyLogEvent";

/// `GRPCController/Shutdown`
pub const METHOD_CONTROLLER_SHUTDOWN: &str = "GRPCController/Shutdown";
