use std::collections::HashMap;
use std::fs;

use arbrelay::error::{ConfigError, Error};
use arbrelay::infrastructure::config::Config;
use arbrelay::port::outbound::dedup::DedupStrategy;
use tempfile::TempDir;

const TEMPLATE: &str = include_str!("../config.toml.example");

fn no_env(_: &str) -> Option<String> {
    None
}

#[test]
fn shipped_template_matches_defaults() {
    let parsed = Config::parse_with_env(TEMPLATE, no_env).unwrap();
    let defaults = Config::parse_with_env("", no_env).unwrap();

    assert_eq!(parsed.bus.channels, defaults.bus.channels);
    assert_eq!(parsed.bus.port, 6379);
    assert_eq!(parsed.dedup.window_ms, defaults.dedup.window_ms);
    assert_eq!(parsed.dedup.strategy, DedupStrategy::Structural);
    assert_eq!(parsed.reconnection.max_retries, None);
    assert!(parsed.telegram.enabled);
}

#[test]
fn environment_overrides_file_values() {
    let env: HashMap<&str, &str> = HashMap::from([
        ("BOT_TOKEN", "123:abc"),
        ("REDIS_HOST", "redis.internal"),
        ("REDIS_PORT", "6380"),
        ("REDIS_CHANNEL", "arbitrage-trade-execution, arbitrage-opportunity"),
    ]);
    let config = Config::parse_with_env(TEMPLATE, |key| env.get(key).map(|v| v.to_string()))
        .unwrap();

    assert_eq!(config.telegram.token(), Some("123:abc"));
    assert_eq!(config.bus.host, "redis.internal");
    assert_eq!(config.bus.port, 6380);
    assert_eq!(
        config.bus.channels,
        vec!["arbitrage-trade-execution", "arbitrage-opportunity"]
    );
}

#[test]
fn load_reads_a_file_and_rejects_bad_values() {
    let dir = TempDir::new().unwrap();
    let good = dir.path().join("good.toml");
    let bad = dir.path().join("bad.toml");
    fs::write(&good, "[dedup]\nwindow_ms = 1000\n").unwrap();
    fs::write(&bad, "[delivery]\nmax_concurrency = 0\n").unwrap();

    assert_eq!(Config::load(&good).unwrap().dedup.window_ms, 1000);
    assert!(matches!(
        Config::load(&bad),
        Err(Error::Config(ConfigError::InvalidValue { .. }))
    ));
}

#[test]
fn missing_file_is_a_read_error_but_defaults_are_available() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("absent.toml");

    assert!(matches!(
        Config::load(&missing),
        Err(Error::Config(ConfigError::ReadFile(_)))
    ));
    assert!(Config::load_or_default(&missing).is_ok());
}

#[test]
fn rendered_config_hides_secrets() {
    let config = Config::parse_with_env("[bus]\npassword = \"hunter2\"\n", |key| {
        (key == "BOT_TOKEN").then(|| "123:secret".to_string())
    })
    .unwrap();

    let rendered = config.to_toml().unwrap();
    assert!(!rendered.contains("hunter2"));
    assert!(!rendered.contains("123:secret"));
    assert!(Config::parse_with_env(&rendered, no_env).is_ok());
}
