use anyhow::{bail, Context, Result};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::PathBuf;
use tracing::{info, warn};

const DEFAULT_PID_PATH: &str = "./run/estimator.pid";

/// PID file with an exclusive lock, removed on drop
#[derive(Debug)]
pub struct PidFile {
    path: PathBuf,
    file: File,
}

impl PidFile {
    /// Create and lock a PID file
    ///
    /// Fails if another live process holds it; a stale PID file is taken over.
    pub fn create(path: Option<PathBuf>) -> Result<Self> {
        let path = path.unwrap_or_else(|| PathBuf::from(DEFAULT_PID_PATH));

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create PID file directory: {:?}", parent))?;
        }

        // Not truncated on open: the old PID is needed if the lock is held
        #[allow(clippy::suspicious_open_options)]
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(&path)
            .with_context(|| format!("Failed to open PID file: {:?}", path))?;

        if file.try_lock_exclusive().is_err() {
            let old_pid = Self::read_pid_from_file(&mut file)
                .context("Failed to read PID from locked file")?;

            if Self::is_process_running(old_pid) {
                bail!(
                    "Estimator already running (PID: {}). Use 'estimator stop' first.",
                    old_pid
                );
            }

            warn!("Taking over stale PID file (old PID: {} is not running)", old_pid);
            file.lock_exclusive()
                .context("Failed to acquire lock even after detecting stale PID")?;
        }

        let pid = std::process::id();
        file.set_len(0)?;
        file.seek(SeekFrom::Start(0))?;
        writeln!(file, "{}", pid)?;
        file.flush()?;

        info!("PID file {:?} created with PID {}", path, pid);

        Ok(PidFile { path, file })
    }

    /// Read PID from an existing PID file (for stop/reload commands)
    pub fn read(path: Option<PathBuf>) -> Result<u32> {
        let path = path.unwrap_or_else(|| PathBuf::from(DEFAULT_PID_PATH));

        if !path.exists() {
            bail!("PID file not found: {:?}. Is the estimator running?", path);
        }

        let mut file =
            File::open(&path).with_context(|| format!("Failed to open PID file: {:?}", path))?;

        Self::read_pid_from_file(&mut file)
    }

    fn read_pid_from_file(file: &mut File) -> Result<u32> {
        file.seek(SeekFrom::Start(0))?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        let pid = contents
            .trim()
            .parse::<u32>()
            .with_context(|| format!("Invalid PID in file: '{}'", contents.trim()))?;

        // 0 and values above i32::MAX address process groups when passed to kill(2)
        if pid == 0 || pid > i32::MAX as u32 {
            bail!("Invalid PID in file: {} is not a single process id", pid);
        }

        Ok(pid)
    }

    /// Check if a process with the given PID is running
    #[cfg(unix)]
    pub fn is_process_running(pid: u32) -> bool {
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid;

        let Ok(raw_pid) = i32::try_from(pid) else {
            return false;
        };
        if raw_pid <= 0 {
            return false;
        }

        match kill(Pid::from_raw(raw_pid), Signal::SIGCONT) {
            Ok(_) => true,
            Err(nix::errno::Errno::ESRCH) => false,
            // exists, but owned by someone else
            Err(nix::errno::Errno::EPERM) => true,
            Err(_) => false,
        }
    }

    #[cfg(not(unix))]
    pub fn is_process_running(_pid: u32) -> bool {
        warn!("Process detection not implemented for this platform");
        false
    }
}

impl Drop for PidFile {
    fn drop(&mut self) {
        if let Err(e) = self.file.unlock() {
            warn!("Failed to unlock PID file: {}", e);
        }

        if let Err(e) = std::fs::remove_file(&self.path) {
            warn!("Failed to remove PID file {:?}: {}", self.path, e);
        } else {
            info!("PID file removed: {:?}", self.path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_create_and_drop_pid_file() {
        let dir = tempfile::tempdir().unwrap();
        let pid_path = dir.path().join("run").join("estimator.pid");

        let pid_file = PidFile::create(Some(pid_path.clone())).unwrap();
        let written: u32 = fs::read_to_string(&pid_path).unwrap().trim().parse().unwrap();
        assert_eq!(written, std::process::id());

        drop(pid_file);
        assert!(!pid_path.exists());
    }

    #[test]
    fn test_read_pid_file() {
        let dir = tempfile::tempdir().unwrap();
        let pid_path = dir.path().join("estimator.pid");
        fs::write(&pid_path, "12345\n").unwrap();

        assert_eq!(PidFile::read(Some(pid_path)).unwrap(), 12345);
    }

    #[test]
    fn test_read_invalid_or_missing_pid_file() {
        let dir = tempfile::tempdir().unwrap();
        let pid_path = dir.path().join("estimator.pid");
        assert!(PidFile::read(Some(pid_path.clone())).is_err());

        fs::write(&pid_path, "not-a-pid").unwrap();
        assert!(PidFile::read(Some(pid_path)).is_err());
    }

    #[test]
    fn test_read_rejects_process_group_pids() {
        let dir = tempfile::tempdir().unwrap();
        let pid_path = dir.path().join("estimator.pid");

        for contents in ["0\n", "4294967295\n", "2147483648\n"] {
            fs::write(&pid_path, contents).unwrap();
            let err = PidFile::read(Some(pid_path.clone())).unwrap_err();
            assert!(err.to_string().contains("not a single process id"), "{}", err);
        }

        fs::write(&pid_path, "2147483647\n").unwrap();
        assert_eq!(PidFile::read(Some(pid_path)).unwrap(), i32::MAX as u32);
    }

    #[test]
    #[cfg(unix)]
    fn test_is_process_running() {
        assert!(PidFile::is_process_running(std::process::id()));
        assert!(!PidFile::is_process_running(999999));
        assert!(!PidFile::is_process_running(0));
        assert!(!PidFile::is_process_running(u32::MAX));
    }
}
