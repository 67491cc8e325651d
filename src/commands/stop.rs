use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::info;

use crate::pid::PidFile;

#[cfg(unix)]
use immo_estimator::signals::send_signal_to_pid;
#[cfg(unix)]
use nix::libc;
#[cfg(unix)]
use tokio::signal::unix::SignalKind;

/// Execute the stop command
///
/// Sends SIGTERM, waits up to `timeout` seconds for the server to exit and,
/// with `force`, follows up with SIGKILL.
pub async fn execute(pid_file: Option<PathBuf>, force: bool, timeout: u64) -> Result<()> {
    #[cfg(not(unix))]
    {
        let _ = (pid_file, force, timeout);
        anyhow::bail!("Stop command is not supported on this platform");
    }

    #[cfg(unix)]
    {
        let pid = PidFile::read(pid_file)?;

        println!("{} {}", "Stopping estimator".yellow(), format!("(PID: {})", pid).cyan());
        info!("Sending SIGTERM to PID {}", pid);

        send_signal_to_pid(pid, SignalKind::terminate())?;
        println!("  Sent SIGTERM, waiting for graceful shutdown...");

        if wait_for_exit(pid, Duration::from_secs(timeout)).await {
            println!("{}", "  Estimator stopped successfully".green());
            info!("Estimator stopped successfully");
            return Ok(());
        }

        if !force {
            anyhow::bail!(
                "Timeout after {} seconds. Use --force to kill immediately.",
                timeout
            );
        }

        println!("{}", "  Timeout reached, force killing...".red());
        info!("Force killing PID {}", pid);
        send_signal_to_pid(pid, SignalKind::from_raw(libc::SIGKILL))?;

        if wait_for_exit(pid, Duration::from_secs(1)).await {
            println!("{}", "  Estimator force stopped".yellow());
            Ok(())
        } else {
            anyhow::bail!("Failed to kill process even with SIGKILL");
        }
    }
}

/// Poll until `pid` is gone or `timeout` elapses
#[cfg(unix)]
async fn wait_for_exit(pid: u32, timeout: Duration) -> bool {
    let start = Instant::now();
    loop {
        if !PidFile::is_process_running(pid) {
            return true;
        }
        if start.elapsed() >= timeout {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(250)).await;
    }
}
