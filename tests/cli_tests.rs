//! CLI integration tests.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Binary isolated from the caller's environment and any `.env` file.
fn arbrelay(dir: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("arbrelay");
    cmd.current_dir(dir)
        .env("HOME", dir)
        .env_remove("RUST_LOG")
        .env_remove("LOG_LEVEL")
        .env_remove("BOT_TOKEN")
        .env_remove("TELEGRAM_BOT_TOKEN")
        .env_remove("REDIS_HOST")
        .env_remove("REDIS_PORT")
        .env_remove("REDIS_DB")
        .env_remove("REDIS_PASSWORD")
        .env_remove("REDIS_CHANNEL");
    cmd
}

/// Config whose subscriber list lives inside `dir`.
fn write_config(dir: &Path) -> PathBuf {
    let path = dir.join("config.toml");
    let store = dir.join("subscribers.json");
    fs::write(
        &path,
        format!("[store]\npath = {:?}\n", store.display().to_string()),
    )
    .unwrap();
    path
}

#[test]
fn test_help() {
    let dir = TempDir::new().unwrap();
    arbrelay(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("subscribers"))
        .stdout(predicate::str::contains("publish"));
}

#[test]
fn test_version() {
    let dir = TempDir::new().unwrap();
    arbrelay(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("arbrelay"));
}

#[test]
fn test_config_init_then_validate() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("arbrelay.toml");

    arbrelay(dir.path())
        .args(["config", "init"])
        .arg(&path)
        .assert()
        .success();
    assert!(path.exists());

    arbrelay(dir.path())
        .args(["config", "validate", "-c"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("valid"))
        .stdout(predicate::str::contains("BOT_TOKEN"));
}

#[test]
fn test_config_init_refuses_to_overwrite() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("arbrelay.toml");
    fs::write(&path, "# mine\n").unwrap();

    arbrelay(dir.path())
        .args(["config", "init"])
        .arg(&path)
        .assert()
        .failure();
    assert_eq!(fs::read_to_string(&path).unwrap(), "# mine\n");

    arbrelay(dir.path())
        .args(["config", "init", "--force"])
        .arg(&path)
        .assert()
        .success();
}

#[test]
fn test_invalid_config_exits_nonzero() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "[bus]\nport = 0\n").unwrap();

    arbrelay(dir.path())
        .args(["config", "validate", "-c"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("bus.port"));
}

#[test]
fn test_config_show_json_masks_secrets() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[bus]\npassword = \"hunter2\"\n").unwrap();

    let output = arbrelay(dir.path())
        .env("BOT_TOKEN", "123:secret")
        .args(["--json", "config", "show", "-c"])
        .arg(&path)
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let value: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(value["command"], "config.show");
    assert_eq!(value["config"]["bus"]["password"], "***");
    assert_eq!(value["config"]["telegram"]["bot_token"], "***");
    assert!(!stdout.contains("hunter2"));
}

#[test]
fn test_subscribers_add_list_remove() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path());

    for chat_id in ["111", "-1001234"] {
        arbrelay(dir.path())
            .args(["subscribers", "add", chat_id, "-c"])
            .arg(&config)
            .assert()
            .success();
    }

    arbrelay(dir.path())
        .args(["--json", "subscribers", "list", "-c"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""count":2"#))
        .stdout(predicate::str::contains("-1001234"));

    arbrelay(dir.path())
        .args(["subscribers", "remove", "111", "-c"])
        .arg(&config)
        .assert()
        .success();

    let saved = fs::read_to_string(dir.path().join("subscribers.json")).unwrap();
    let saved: serde_json::Value = serde_json::from_str(&saved).unwrap();
    assert_eq!(saved["subscribers"], serde_json::json!([-1001234]));
}

#[test]
fn test_publish_requires_a_payload() {
    let dir = TempDir::new().unwrap();
    arbrelay(dir.path()).arg("publish").assert().failure();
}
