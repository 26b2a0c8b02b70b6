//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all relay settings.
//! Configuration is loaded from a TOML file, then environment variables
//! override the values deployments usually inject: `BOT_TOKEN` (or
//! `TELEGRAM_BOT_TOKEN`), `REDIS_HOST`, `REDIS_PORT`, `REDIS_DB`,
//! `REDIS_PASSWORD`, `REDIS_CHANNEL` (comma-separated) and `LOG_LEVEL`.
//!
//! # Example
//!
//! ```no_run
//! use arbrelay::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::logging::{LoggingConfig, LOG_FORMATS};
use super::reconnection::ReconnectionConfig;
use super::store::StoreConfig;
use super::telegram::TelegramAppConfig;
use crate::adapter::outbound::redis::RedisSettings;
use crate::application::dispatch::DeliveryConfig;
use crate::error::{ConfigError, Result};
use crate::port::outbound::dedup::DedupConfig;

/// Main application configuration.
///
/// Every section is optional; an empty file yields the defaults.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Redis connection and channel list.
    #[serde(default)]
    pub bus: RedisSettings,

    /// Bus reconnection backoff and circuit breaker.
    #[serde(default)]
    pub reconnection: ReconnectionConfig,

    /// Duplicate suppression window.
    #[serde(default)]
    pub dedup: DedupConfig,

    /// Broadcast fan-out limits.
    #[serde(default)]
    pub delivery: DeliveryConfig,

    /// Subscriber list location.
    #[serde(default)]
    pub store: StoreConfig,

    /// Telegram bot settings.
    #[serde(default)]
    pub telegram: TelegramAppConfig,
}

impl Config {
    /// Parse configuration from TOML content and apply environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed, an override cannot be
    /// parsed, or validation fails.
    #[allow(clippy::result_large_err)]
    pub fn parse_toml(content: &str) -> Result<Self> {
        Self::parse_with_env(content, |key| std::env::var(key).ok())
    }

    /// Like [`Config::parse_toml`], reading overrides through `lookup`.
    #[allow(clippy::result_large_err)]
    pub fn parse_with_env<F>(content: &str, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.apply_overrides(lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or
    /// [`Config::parse_toml`] fails.
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Load `path` if it exists, otherwise defaults plus environment.
    #[allow(clippy::result_large_err)]
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Self::parse_toml("")
        }
    }

    /// Initialize the global tracing subscriber.
    pub fn init_logging(&self) {
        self.logging.init();
    }

    /// Copy with the Redis password and bot token masked.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut redacted = self.clone();
        if redacted.bus.password.is_some() {
            redacted.bus.password = Some("***".into());
        }
        if redacted.telegram.bot_token.is_some() {
            redacted.telegram.bot_token = Some("***".into());
        }
        redacted
    }

    /// Render as TOML with secrets masked.
    #[allow(clippy::result_large_err)]
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(&self.redacted()).map_err(ConfigError::Render)?)
    }

    /// Non-fatal problems worth surfacing before a run.
    #[must_use]
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.telegram.enabled && self.telegram.token().is_none() {
            warnings.push("Telegram enabled but no bot token (set BOT_TOKEN)".to_string());
        }
        if !self.telegram.enabled {
            warnings.push("Telegram disabled; broadcasts are only logged".to_string());
        }
        if self.store.ephemeral {
            warnings.push("Ephemeral store; subscribers are lost on exit".to_string());
        }
        if !self.dedup.enabled {
            warnings.push("Deduplication disabled".to_string());
        }
        warnings
    }

    #[allow(clippy::result_large_err)]
    fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(token) = var("BOT_TOKEN").or_else(|| var("TELEGRAM_BOT_TOKEN")) {
            self.telegram.bot_token = Some(token.trim().to_string());
        }
        if let Some(host) = var("REDIS_HOST") {
            self.bus.host = host.trim().to_string();
        }
        if let Some(port) = var("REDIS_PORT") {
            self.bus.port = parse_env("REDIS_PORT", &port)?;
        }
        if let Some(db) = var("REDIS_DB") {
            self.bus.db = parse_env("REDIS_DB", &db)?;
        }
        if let Some(password) = var("REDIS_PASSWORD") {
            self.bus.password = Some(password);
        }
        if let Some(channels) = var("REDIS_CHANNEL") {
            self.bus.channels = channels
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(ToOwned::to_owned)
                .collect();
        }
        if let Some(level) = var("LOG_LEVEL") {
            self.logging.level = level.trim().to_lowercase();
        }
        Ok(())
    }

    /// Validate configuration values.
    #[allow(clippy::result_large_err)]
    pub fn validate(&self) -> Result<()> {
        if !LOG_FORMATS.contains(&self.logging.format.as_str()) {
            return Err(invalid("logging.format", "must be \"pretty\" or \"json\""));
        }

        if self.bus.host.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "bus.host" }.into());
        }
        if self.bus.port == 0 {
            return Err(invalid("bus.port", "must be greater than 0"));
        }
        if self.bus.db < 0 {
            return Err(invalid("bus.db", "must be 0 or greater"));
        }
        if self.bus.channels.is_empty() {
            return Err(ConfigError::MissingField {
                field: "bus.channels",
            }
            .into());
        }
        if self.bus.channels.iter().any(|c| c.trim().is_empty()) {
            return Err(invalid("bus.channels", "channel names must not be empty"));
        }
        if self.bus.connect_timeout_ms == 0 {
            return Err(invalid("bus.connect_timeout_ms", "must be greater than 0"));
        }
        if self.bus.poll_interval_ms == 0 {
            return Err(invalid("bus.poll_interval_ms", "must be greater than 0"));
        }

        let reconnection = &self.reconnection;
        if reconnection.initial_delay_ms == 0 {
            return Err(invalid("initial_delay_ms", "must be greater than 0"));
        }
        if reconnection.max_delay_ms < reconnection.initial_delay_ms {
            return Err(invalid("max_delay_ms", "must be >= initial_delay_ms"));
        }
        if reconnection.backoff_multiplier < 1.0 {
            return Err(invalid("backoff_multiplier", "must be >= 1.0"));
        }
        if reconnection.max_consecutive_failures == 0 {
            return Err(invalid("max_consecutive_failures", "must be greater than 0"));
        }
        if reconnection.circuit_breaker_cooldown_ms == 0 {
            return Err(invalid("circuit_breaker_cooldown_ms", "must be greater than 0"));
        }
        if reconnection.max_retries == Some(0) {
            return Err(invalid("max_retries", "must be greater than 0 when set"));
        }

        if self.dedup.window_ms == 0 {
            return Err(invalid("dedup.window_ms", "must be greater than 0"));
        }
        if self.dedup.max_entries == 0 {
            return Err(invalid("dedup.max_entries", "must be greater than 0"));
        }

        if self.delivery.send_timeout_ms == 0 {
            return Err(invalid("delivery.send_timeout_ms", "must be greater than 0"));
        }
        if self.delivery.max_concurrency == 0 {
            return Err(invalid("delivery.max_concurrency", "must be greater than 0"));
        }

        if !self.store.ephemeral && self.store.path.as_os_str().is_empty() {
            return Err(ConfigError::MissingField { field: "store.path" }.into());
        }

        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> crate::error::Error {
    ConfigError::InvalidValue {
        field,
        reason: reason.to_string(),
    }
    .into()
}

#[allow(clippy::result_large_err)]
fn parse_env<T: std::str::FromStr>(field: &'static str, raw: &str) -> Result<T> {
    raw.trim().parse().map_err(|_| {
        ConfigError::InvalidValue {
            field,
            reason: format!("cannot parse {raw:?}"),
        }
        .into()
    })
}
