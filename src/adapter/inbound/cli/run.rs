//! Handler for the `run` command.

use crate::adapter::inbound::cli::command::RunArgs;
use crate::adapter::inbound::cli::{config, output};
use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use crate::infrastructure::orchestration;

/// Execute the run command.
pub async fn execute(args: &RunArgs) -> Result<()> {
    let mut config = config::load(&args.config)?;
    apply_overrides(&mut config, args, output::is_json());

    config.init_logging();
    if !output::is_quiet() {
        print_startup(&config);
    }

    orchestration::run(config).await
}

fn apply_overrides(config: &mut Config, args: &RunArgs, force_json_logs: bool) {
    if args.ephemeral {
        config.store.ephemeral = true;
    }
    if let Some(level) = &args.log_level {
        config.logging.level.clone_from(level);
    }
    if args.json_logs || force_json_logs {
        config.logging.format = "json".to_string();
    }
}

fn print_startup(config: &Config) {
    output::header(env!("CARGO_PKG_VERSION"));
    output::field("Redis", config.bus.display_url());
    output::field("Channels", config.bus.channels.join(", "));
    output::field(
        "Store",
        if config.store.ephemeral {
            "memory (ephemeral)".to_string()
        } else {
            config.store.path.display().to_string()
        },
    );
    output::field(
        "Telegram",
        if config.telegram.enabled {
            "enabled"
        } else {
            "disabled"
        },
    );
    for warning in config.warnings() {
        output::warning(&warning);
    }
}
