//! pubsub-notifier
//!
//! Plugin process that receives host events over gRPC and publishes them to
//! a message topic.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};

use pubsub_notifier::app::{self, Outcome};
use pubsub_notifier::fatal::EXIT_STARTUP_FAILURE;
use pubsub_notifier_core::config::{RelayConfig, load_config};
use pubsub_notifier_core::tracing_init::init_tracing;
use pubsub_notifier_core::version::version_string;

#[derive(Parser, Debug)]
#[command(name = "pubsub-notifier")]
#[command(
    version,
    about = "pubsub-notifier - relays host events to a message topic"
)]
struct Args {
    /// Topic URL, e.g. `nats://file.events` or `rabbit://audit`.
    topic_url: Option<String>,

    /// Identifier stamped on every published event.
    instance_id: Option<String>,

    /// JSON config file.
    #[arg(long, env = "PUBSUB_NOTIFIER_CONFIG")]
    config: Option<PathBuf>,

    /// Address the gRPC server listens on.
    #[arg(long)]
    addr: Option<String>,

    /// Publish deadline in seconds.
    #[arg(long)]
    publish_timeout: Option<u64>,

    /// Default log level when `RUST_LOG` is not set.
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Output logs as JSON (for structured log aggregation).
    #[arg(long)]
    log_json: bool,
}

fn resolve_config(args: &Args) -> anyhow::Result<RelayConfig> {
    let mut config = load_config(args.config.as_deref())?;

    if let Some(url) = &args.topic_url {
        config.topic_url.clone_from(url);
    }
    if let Some(id) = &args.instance_id {
        config.instance_id.clone_from(id);
    }
    if let Some(addr) = &args.addr {
        config.listen_addr.clone_from(addr);
    }
    if let Some(secs) = args.publish_timeout {
        config.publish_timeout_secs = secs;
    }

    config.validate().context("invalid configuration")?;
    Ok(config)
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    init_tracing(&format!("pubsub_notifier={}", args.log_level), args.log_json);

    let config = match resolve_config(&args) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %format!("{e:#}"), "Startup failed");
            return ExitCode::from(EXIT_STARTUP_FAILURE);
        }
    };

    info!(
        version = %version_string(),
        topic = %config.topic_url,
        "Starting pubsub-notifier"
    );

    match app::run(&config).await {
        Ok(Outcome::Stopped) => ExitCode::SUCCESS,
        Ok(outcome @ Outcome::DeliveryFailed(_)) => ExitCode::from(outcome.exit_code()),
        Err(e) => {
            error!(error = %e, "Relay failed");
            ExitCode::from(e.exit_code())
        }
    }
}
