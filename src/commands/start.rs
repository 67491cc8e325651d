use anyhow::Result;
use colored::Colorize;
use immo_estimator::{config, server};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::pid::PidFile;

/// Execute the start command
///
/// Loads configuration, takes the PID file lock and runs the server until shutdown.
pub async fn execute(config_path: &Path, pid_file: Option<PathBuf>) -> Result<()> {
    println!("{}", "Starting estimator in foreground mode...".green());

    let cfg = config::load_config(config_path)?;
    info!("Configuration loaded from {}", config_path.display());

    // Prevent a second instance on the same PID file
    let _pid_file = PidFile::create(pid_file)?;

    server::start_server(cfg).await?;

    Ok(())
}
