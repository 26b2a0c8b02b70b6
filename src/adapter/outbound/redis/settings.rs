//! Redis connection settings.

use serde::{Deserialize, Serialize};

/// Where the bus lives and which channels to follow.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RedisSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Logical database index.
    #[serde(default)]
    pub db: i64,
    /// Password for `AUTH`, if the server requires one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Channels to subscribe to.
    #[serde(default = "default_channels")]
    pub channels: Vec<String>,
    /// Give up on a connection attempt after this long (milliseconds).
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// How long one poll waits before reporting the bus as idle (milliseconds).
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_host() -> String {
    "localhost".to_string()
}

const fn default_port() -> u16 {
    6379
}

/// Channel the publisher side uses for new opportunities.
pub const DEFAULT_CHANNEL: &str = "arbitrage-opportunity";

fn default_channels() -> Vec<String> {
    vec![DEFAULT_CHANNEL.to_string()]
}

const fn default_connect_timeout_ms() -> u64 {
    5_000
}

const fn default_poll_interval_ms() -> u64 {
    1_000
}

impl Default for RedisSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            db: 0,
            password: None,
            channels: default_channels(),
            connect_timeout_ms: default_connect_timeout_ms(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl RedisSettings {
    /// Connection parameters for the redis client.
    #[must_use]
    pub fn connection_info(&self) -> redis::ConnectionInfo {
        redis::ConnectionInfo {
            addr: redis::ConnectionAddr::Tcp(self.host.clone(), self.port),
            redis: redis::RedisConnectionInfo {
                db: self.db,
                password: self.password.clone(),
                ..Default::default()
            },
        }
    }

    /// `redis://host:port/db` with the password masked, for logs.
    #[must_use]
    pub fn display_url(&self) -> String {
        let auth = if self.password.is_some() { ":***@" } else { "" };
        format!("redis://{auth}{}:{}/{}", self.host, self.port, self.db)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_local_redis() {
        let settings = RedisSettings::default();
        assert_eq!(settings.host, "localhost");
        assert_eq!(settings.port, 6379);
        assert_eq!(settings.db, 0);
        assert_eq!(settings.channels, vec!["arbitrage-opportunity".to_string()]);
    }

    #[test]
    fn test_display_url_masks_password() {
        let settings = RedisSettings {
            password: Some("hunter2".into()),
            db: 3,
            ..Default::default()
        };
        let url = settings.display_url();
        assert_eq!(url, "redis://:***@localhost:6379/3");
        assert!(!url.contains("hunter2"));
    }

    #[test]
    fn test_connection_info_carries_credentials() {
        let settings = RedisSettings {
            host: "cache.internal".into(),
            port: 6380,
            db: 2,
            password: Some("secret".into()),
            ..Default::default()
        };
        let info = settings.connection_info();
        assert_eq!(
            info.addr,
            redis::ConnectionAddr::Tcp("cache.internal".into(), 6380)
        );
        assert_eq!(info.redis.db, 2);
        assert_eq!(info.redis.password.as_deref(), Some("secret"));
    }
}
