//! Handler for the `config` command group.

use std::fs;
use std::path::Path;

use crate::adapter::inbound::cli::output;
use crate::error::{ConfigError, Result};
use crate::infrastructure::config::settings::Config;

/// Default config template with documentation.
const CONFIG_TEMPLATE: &str = include_str!("../../../../config.toml.example");

/// Load `path`, falling back to defaults plus environment when it is absent.
#[allow(clippy::result_large_err)]
pub fn load(path: &Path) -> Result<Config> {
    Config::load_or_default(path)
}

/// Execute `config init`.
pub fn execute_init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(ConfigError::InvalidValue {
            field: "config",
            reason: "file already exists (use --force to overwrite)".to_string(),
        }
        .into());
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    fs::write(path, CONFIG_TEMPLATE)?;
    output::section("Config Initialized");
    output::success("Created configuration file");
    output::field("Path", path.display());
    output::section("Next Steps");
    output::note("1. Set BOT_TOKEN in the environment or a .env file");
    output::note(&format!("2. Run: arbrelay check bus -c {}", path.display()));
    output::note(&format!("3. Run: arbrelay run -c {}", path.display()));
    Ok(())
}

/// Execute `config show`.
pub fn execute_show(path: &Path) -> Result<()> {
    let config = load(path)?;

    if output::is_json() {
        output::json_output(serde_json::json!({
            "command": "config.show",
            "path": path.display().to_string(),
            "exists": path.exists(),
            "config": serde_json::to_value(config.redacted())?,
        }));
        return Ok(());
    }

    output::section("Effective Configuration");
    output::field("Path", path.display());
    if !path.exists() {
        output::note("(file not found, showing defaults and environment)");
    }
    output::section("TOML");
    output::lines(&config.to_toml()?);
    Ok(())
}

/// Execute `config validate`.
pub fn execute_validate(path: &Path) -> Result<()> {
    output::section("Config Validation");
    output::field("Path", path.display());
    let config = Config::load(path)?;
    output::success("Config file is valid");

    let warnings = config.warnings();
    if !warnings.is_empty() {
        output::section("Warnings");
        for warning in &warnings {
            output::warning(warning);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_template_parses() {
        let config = Config::parse_with_env(CONFIG_TEMPLATE, |_| None).unwrap();
        assert_eq!(config.bus.channels, vec!["arbitrage-opportunity"]);
    }

    #[test]
    fn test_init_writes_template() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/config.toml");

        execute_init(&path, false).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), CONFIG_TEMPLATE);
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "# mine").unwrap();

        assert!(execute_init(&path, false).is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), "# mine");

        execute_init(&path, true).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), CONFIG_TEMPLATE);
    }

    #[test]
    fn test_validate_rejects_bad_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[delivery]\nmax_concurrency = 0\n").unwrap();

        assert!(execute_validate(&path).is_err());
    }

    #[test]
    fn test_validate_requires_existing_file() {
        let dir = TempDir::new().unwrap();
        assert!(execute_validate(&dir.path().join("missing.toml")).is_err());
    }
}
