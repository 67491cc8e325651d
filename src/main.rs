use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;
mod pid;

use immo_estimator::{config, init_tracing};

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    // Logging settings come from the config file when it is readable; commands
    // that need the config load it again and report errors themselves
    let (log_level, log_format) = match config::load_config(&args.config) {
        Ok(cfg) => (cfg.server.log_level, cfg.server.log_format),
        Err(_) => ("info".to_string(), "text".to_string()),
    };
    init_tracing(&log_level, &log_format);

    match args.get_command() {
        cli::Commands::Start { pid_file } => {
            commands::start::execute(&args.config, pid_file).await?;
        }
        cli::Commands::Stop {
            pid_file,
            force,
            timeout,
        } => {
            commands::stop::execute(pid_file, force, timeout).await?;
        }
        cli::Commands::Reload { pid_file } => {
            commands::reload::execute(pid_file).await?;
        }
        cli::Commands::Estimate(estimate_args) => {
            commands::estimate::execute(&args.config, &estimate_args)?;
        }
        cli::Commands::Districts => {
            commands::districts::execute(&args.config)?;
        }
        cli::Commands::Test => {
            commands::test::execute(&args.config)?;
        }
        cli::Commands::Config { action } => match action {
            cli::ConfigCommands::Show => commands::config::show(&args.config)?,
            cli::ConfigCommands::Validate => commands::config::validate(&args.config)?,
        },
        cli::Commands::Version => {
            println!("Immo Estimator v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
