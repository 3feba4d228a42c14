//! gRPC surface the host talks to.

pub mod controller;
pub mod convert;
pub mod handshake;
pub mod notifier_svc;

#[cfg(test)]
#[allow(
    clippy::panic,
    clippy::expect_used,
    clippy::unwrap_used
)]

pub use controller::ControllerService;
pub use handshake::announce;
pub use notifier_svc::NotifierService;
