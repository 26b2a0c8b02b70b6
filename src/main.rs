use std::process::ExitCode;

use arbrelay::adapter::inbound::cli::command::{
    CheckCommand, Cli, Commands, ConfigCommand, SubscribersCommand,
};
use arbrelay::adapter::inbound::cli::output::{self, OutputConfig};
use arbrelay::adapter::inbound::cli::{check, config, publish, run, subscribers};
use arbrelay::error::Result;
use clap::Parser;

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    output::configure(OutputConfig::new(cli.json, cli.quiet));

    match dispatch(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

async fn dispatch(command: Commands) -> Result<()> {
    match command {
        Commands::Run(args) => run::execute(&args).await,
        Commands::Config(ConfigCommand::Init(args)) => config::execute_init(&args.path, args.force),
        Commands::Config(ConfigCommand::Show(args)) => config::execute_show(&args.config),
        Commands::Config(ConfigCommand::Validate(args)) => config::execute_validate(&args.config),
        Commands::Subscribers(SubscribersCommand::List(args)) => {
            subscribers::execute_list(&args.config)
        }
        Commands::Subscribers(SubscribersCommand::Add(args)) => {
            subscribers::execute_add(&args.config, args.chat_id)
        }
        Commands::Subscribers(SubscribersCommand::Remove(args)) => {
            subscribers::execute_remove(&args.config, args.chat_id)
        }
        Commands::Check(CheckCommand::Bus(args)) => check::execute_bus(&args.config).await,
        Commands::Check(CheckCommand::Telegram(args)) => {
            check::execute_telegram(&args.config).await
        }
        Commands::Publish(args) => publish::execute(&args).await,
    }
}
