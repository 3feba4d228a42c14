//! Configuration resolution for the notifier relay.
//!
//! Implements hierarchical config resolution:
//! 1. Built-in defaults
//! 2. Config file (JSON, passed with `--config`)
//! 3. Environment variables (`PUBSUB_NOTIFIER_*`)
//! 4. CLI arguments (highest priority, applied by the binary)

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Default deadline, in seconds, for publishing one event and for opening and
/// closing the topic.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Largest accepted timeout, in seconds (one day).
pub const MAX_TIMEOUT_SECS: u64 = 86_400;

/// Default gRPC listen address. Port 0 lets the OS pick a free port, which is
/// then announced to the host through the handshake line.
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:0";

/// Complete relay configuration.
///
/// Read-only once the process starts serving.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Topic URL; the scheme selects the broker backend.
    pub topic_url: String,
    /// Identifier echoed into every envelope. Empty means unset.
    pub instance_id: String,
    /// Deadline for a single publish.
    pub publish_timeout_secs: u64,
    /// Deadline for opening the topic at startup.
    pub open_timeout_secs: u64,
    /// Deadline for shutting the topic down at exit.
    pub shutdown_timeout_secs: u64,
    /// Address the gRPC server binds to.
    pub listen_addr: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            topic_url: String::new(),
            instance_id: String::new(),
            publish_timeout_secs: DEFAULT_TIMEOUT_SECS,
            open_timeout_secs: DEFAULT_TIMEOUT_SECS,
            shutdown_timeout_secs: DEFAULT_TIMEOUT_SECS,
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
        }
    }
}

impl RelayConfig {
    pub const fn publish_timeout(&self) -> Duration {
        Duration::from_secs(self.publish_timeout_secs)
    }

    pub const fn open_timeout(&self) -> Duration {
        Duration::from_secs(self.open_timeout_secs)
    }

    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }

    /// Check the invariants the relay relies on before serving.
    pub fn validate(&self) -> Result<()> {
        if self.topic_url.trim().is_empty() {
            return Err(Error::Config(
                "topic url is required (first positional argument)".into(),
            ));
        }
        for (name, value) in [
            ("publish_timeout_secs", self.publish_timeout_secs),
            ("open_timeout_secs", self.open_timeout_secs),
            ("shutdown_timeout_secs", self.shutdown_timeout_secs),
        ] {
            if value == 0 {
                return Err(Error::Config(format!("{name} must be greater than zero")));
            }
            if value > MAX_TIMEOUT_SECS {
                return Err(Error::Config(format!(
                    "{name} must be at most {MAX_TIMEOUT_SECS}"
                )));
            }
        }
        Ok(())
    }
}

/// Load configuration with hierarchical resolution.
///
/// CLI overrides are applied afterwards by the caller.
pub fn load_config(config_file: Option<&Path>) -> Result<RelayConfig> {
    let mut config = match config_file {
        Some(path) => load_config_file(path)?,
        None => RelayConfig::default(),
    };
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

fn load_config_file(path: &Path) -> Result<RelayConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;
    let config = serde_json::from_str(&content).map_err(|e| {
        Error::Config(format!("Failed to parse config file {}: {}", path.display(), e))
    })?;
    debug!(path = %path.display(), "Loaded config file");
    Ok(config)
}

fn apply_env_overrides(config: &mut RelayConfig, var: impl Fn(&str) -> Option<String>) {
    if let Some(val) = var("PUBSUB_NOTIFIER_TOPIC_URL") {
        config.topic_url = val;
    }
    if let Some(val) = var("PUBSUB_NOTIFIER_INSTANCE_ID") {
        config.instance_id = val;
    }
    if let Some(val) = var("PUBSUB_NOTIFIER_LISTEN_ADDR") {
        config.listen_addr = val;
    }
    if let Some(n) = var("PUBSUB_NOTIFIER_PUBLISH_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
        config.publish_timeout_secs = n;
    }
    if let Some(n) = var("PUBSUB_NOTIFIER_OPEN_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
        config.open_timeout_secs = n;
    }
    if let Some(n) = var("PUBSUB_NOTIFIER_SHUTDOWN_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
        config.shutdown_timeout_secs = n;
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;

    #[test]
    fn default_config_has_30s_timeouts() {
        let config = RelayConfig::default();
        assert_eq!(config.publish_timeout(), Duration::from_secs(30));
        assert_eq!(config.open_timeout(), Duration::from_secs(30));
        assert_eq!(config.shutdown_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn missing_topic_url_is_rejected() {
        let err = RelayConfig::default().validate().unwrap_err();
        assert!(matches!(err, Error::Config(ref m) if m.contains("topic url")));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let config = RelayConfig {
            topic_url: "mem://events".into(),
            publish_timeout_secs: 0,
            ..RelayConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("publish_timeout_secs"));
    }

    #[test]
    fn oversized_timeouts_are_rejected() {
        for config in [
            RelayConfig {
                publish_timeout_secs: u64::MAX,
                ..valid()
            },
            RelayConfig {
                open_timeout_secs: MAX_TIMEOUT_SECS + 1,
                ..valid()
            },
            RelayConfig {
                shutdown_timeout_secs: u64::MAX,
                ..valid()
            },
        ] {
            let err = config.validate().unwrap_err();
            assert!(err.to_string().contains("must be at most"), "{err}");
        }
        let at_limit = RelayConfig {
            publish_timeout_secs: MAX_TIMEOUT_SECS,
            ..valid()
        };
        assert!(at_limit.validate().is_ok());
    }

    fn valid() -> RelayConfig {
        RelayConfig {
            topic_url: "mem://events".into(),
            ..RelayConfig::default()
        }
    }

    #[test]
    fn valid_config_passes() {
        let config = RelayConfig {
            topic_url: "mem://events".into(),
            ..RelayConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_file_fields_override_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"topic_url": "nats://events", "instance_id": "node-a", "publish_timeout_secs": 5}}"#
        )
        .unwrap();

        let config = load_config_file(file.path()).unwrap();
        assert_eq!(config.topic_url, "nats://events");
        assert_eq!(config.instance_id, "node-a");
        assert_eq!(config.publish_timeout_secs, 5);
        assert_eq!(config.shutdown_timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.listen_addr, DEFAULT_LISTEN_ADDR);
    }

    #[test]
    fn unreadable_config_file_is_a_config_error() {
        let err = load_config(Some(Path::new("/nonexistent/notifier.json"))).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn malformed_config_file_is_a_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let err = load_config_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }

    #[test]
    fn env_overrides_win_over_file_values() {
        let env: HashMap<&str, &str> = [
            ("PUBSUB_NOTIFIER_TOPIC_URL", "rabbit://audit"),
            ("PUBSUB_NOTIFIER_PUBLISH_TIMEOUT_SECS", "12"),
            ("PUBSUB_NOTIFIER_SHUTDOWN_TIMEOUT_SECS", "not-a-number"),
        ]
        .into_iter()
        .collect();

        let mut config = RelayConfig {
            topic_url: "mem://events".into(),
            ..RelayConfig::default()
        };
        apply_env_overrides(&mut config, |k| env.get(k).map(ToString::to_string));

        assert_eq!(config.topic_url, "rabbit://audit");
        assert_eq!(config.publish_timeout_secs, 12);
        // Unparseable numbers leave the previous value in place.
        assert_eq!(config.shutdown_timeout_secs, DEFAULT_TIMEOUT_SECS);
    }
}
