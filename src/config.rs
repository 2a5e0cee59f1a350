//! Application configuration loading and validation.
//!
//! Configuration is loaded from a TOML file with an environment variable
//! override for the change-feed URL (`CASCADE_FEED_URL`), which often
//! carries an access token and should stay out of config files.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use tracing_subscriber::{fmt, EnvFilter};
use url::Url;

use crate::delivery::RetryPolicy;
use crate::domain::Consumer;
use crate::error::{ConfigError, Result};
use crate::registry::DEFAULT_SUSPENSION_THRESHOLD;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub source: SourceConfig,
    #[serde(default)]
    pub delivery: DeliveryConfig,
    #[serde(default)]
    pub registry: RegistryConfig,
    /// Registered consumer endpoints.
    #[serde(default)]
    pub consumers: Vec<ConsumerEntry>,
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Change-feed polling configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Feed endpoint. Overridden by `CASCADE_FEED_URL` when set.
    pub feed_url: String,
    /// Wait between polls when the feed is idle.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Maximum records requested per poll.
    #[serde(default = "default_page_limit")]
    pub page_limit: u32,
}

fn default_poll_interval_ms() -> u64 {
    1_000
}

fn default_page_limit() -> u32 {
    100
}

impl SourceConfig {
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Delivery retry and transport configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DeliveryConfig {
    /// Transport calls per delivery, first attempt included.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Wait before the first retry.
    #[serde(default = "default_first_interval_ms")]
    pub first_interval_ms: u64,
    /// Growth factor applied to the wait after each retry.
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
    /// Upper bound on any single wait.
    #[serde(default = "default_max_interval_ms")]
    pub max_interval_ms: u64,
    /// Per-request timeout for delivery calls.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_first_interval_ms() -> u64 {
    5_000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_max_interval_ms() -> u64 {
    60_000
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            first_interval_ms: default_first_interval_ms(),
            backoff_multiplier: default_backoff_multiplier(),
            max_interval_ms: default_max_interval_ms(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl DeliveryConfig {
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            first_interval: Duration::from_millis(self.first_interval_ms),
            backoff_multiplier: self.backoff_multiplier,
            max_interval: Duration::from_millis(self.max_interval_ms),
        }
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Consumer registry configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RegistryConfig {
    /// Consecutive failures before a consumer is suspended.
    #[serde(default = "default_suspension_threshold")]
    pub suspension_threshold: u32,
}

fn default_suspension_threshold() -> u32 {
    DEFAULT_SUSPENSION_THRESHOLD
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            suspension_threshold: default_suspension_threshold(),
        }
    }
}

/// One registered consumer endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ConsumerEntry {
    pub endpoint: String,
    /// Extra headers attached to every delivery request.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_admin_bind")]
    pub bind: String,
}

fn default_admin_bind() -> String {
    "127.0.0.1:8070".to_string()
}

const fn default_true() -> bool {
    true
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind: default_admin_bind(),
        }
    }
}

/// Run-state persistence configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Path of the JSON run-state file.
    #[serde(default = "default_run_file")]
    pub run_file: PathBuf,
}

fn default_run_file() -> PathBuf {
    PathBuf::from("/var/lib/cascade/run.json")
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            run_file: default_run_file(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;

        let mut config: Self = toml::from_str(&content).map_err(ConfigError::Parse)?;

        // Feed URLs often embed credentials; the env var wins over the file
        if let Ok(feed_url) = std::env::var("CASCADE_FEED_URL") {
            config.source.feed_url = feed_url;
        }

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.source.feed_url.is_empty() {
            return Err(ConfigError::MissingField { field: "feed_url" }.into());
        }
        Url::parse(&self.source.feed_url).map_err(|e| ConfigError::InvalidValue {
            field: "feed_url",
            reason: e.to_string(),
        })?;

        if self.delivery.max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_attempts",
                reason: "must be at least 1".to_string(),
            }
            .into());
        }
        if self.delivery.backoff_multiplier < 1.0 {
            return Err(ConfigError::InvalidValue {
                field: "backoff_multiplier",
                reason: "must be at least 1.0".to_string(),
            }
            .into());
        }
        if self.registry.suspension_threshold == 0 {
            return Err(ConfigError::InvalidValue {
                field: "suspension_threshold",
                reason: "must be at least 1".to_string(),
            }
            .into());
        }

        let mut seen = std::collections::BTreeSet::new();
        for consumer in &self.consumers {
            Url::parse(&consumer.endpoint).map_err(|e| ConfigError::InvalidValue {
                field: "consumers.endpoint",
                reason: format!("{}: {e}", consumer.endpoint),
            })?;
            if !seen.insert(consumer.endpoint.as_str()) {
                return Err(ConfigError::DuplicateConsumer {
                    endpoint: consumer.endpoint.clone(),
                }
                .into());
            }
        }

        Ok(())
    }

    /// Consumers as domain objects, all starting active.
    #[must_use]
    pub fn consumers(&self) -> Vec<Consumer> {
        self.consumers
            .iter()
            .map(|entry| {
                Consumer::new(entry.endpoint.as_str()).with_headers(entry.headers.clone())
            })
            .collect()
    }

    pub fn init_logging(&self) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&self.logging.level));

        match self.logging.format.as_str() {
            "json" => {
                fmt().json().with_env_filter(filter).init();
            }
            _ => {
                fmt().with_env_filter(filter).init();
            }
        }
    }
}
