use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_POLL_INTERVAL_SECS: u64 = 1;
const DEFAULT_PID_CACHE_TTL_SECS: u64 = 300;
const DEFAULT_JOIN_TIMEOUT_SECS: u64 = 3;
const DEFAULT_IGNORED_COMMANDS: &[&str] = &["git status", "git diff"];
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    /// Seconds between two scans of the process table.
    /// Default: 1
    pub poll_interval_secs: Option<u64>,
    /// Seconds between sweeps of exited PIDs from the seen cache (never less than 60).
    /// Default: 300
    pub pid_cache_ttl_secs: Option<u64>,
    /// Command line prefixes that are never recorded.
    /// Default: ["git status", "git diff"]
    pub ignored_commands: Option<Vec<String>>,
    /// Directory the daily record files are written to.
    /// Default: <data dir>/gitwatch
    pub storage_path: Option<PathBuf>,
    /// argv[0] that marks a process as git, also the program run for queries.
    /// Default: "git"
    pub git_executable: Option<String>,
    /// Log filter used when RUST_LOG is not set.
    /// Default: "info"
    pub log_level: Option<String>,
    /// Append logs to this file instead of stderr.
    pub log_file: Option<PathBuf>,
    /// Seconds stop() waits for the scan loop before giving up on it.
    /// Default: 3
    pub join_timeout_secs: Option<u64>,
}

impl Config {
    /// Load configuration from ~/.config/gitwatch/config.toml
    ///
    /// - File missing: returns default config (Ok)
    /// - File exists but invalid TOML: returns Err so caller can show warning
    /// - Field missing: uses its default
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from an explicit path, which must exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Values below one second are raised to one second.
    pub fn poll_interval(&self) -> Duration {
        let secs = self
            .poll_interval_secs
            .unwrap_or(DEFAULT_POLL_INTERVAL_SECS)
            .max(1);
        Duration::from_secs(secs)
    }

    pub fn pid_cache_ttl(&self) -> Duration {
        Duration::from_secs(
            self.pid_cache_ttl_secs
                .unwrap_or(DEFAULT_PID_CACHE_TTL_SECS),
        )
    }

    pub fn join_timeout(&self) -> Duration {
        Duration::from_secs(self.join_timeout_secs.unwrap_or(DEFAULT_JOIN_TIMEOUT_SECS))
    }

    /// An explicit empty list means nothing is ignored.
    pub fn ignored_commands(&self) -> Vec<String> {
        match &self.ignored_commands {
            Some(list) => list.clone(),
            None => DEFAULT_IGNORED_COMMANDS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    pub fn storage_path(&self) -> PathBuf {
        match &self.storage_path {
            Some(path) => path.clone(),
            None => dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("gitwatch"),
        }
    }

    /// Blank values fall back to "git".
    pub fn git_executable(&self) -> &str {
        match &self.git_executable {
            Some(exe) if !exe.trim().is_empty() => exe.trim(),
            _ => crate::command::GIT_PROGRAM,
        }
    }

    pub fn log_level(&self) -> &str {
        match &self.log_level {
            Some(level) if !level.trim().is_empty() => level.trim(),
            _ => DEFAULT_LOG_LEVEL,
        }
    }

    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|d| d.join(".config").join("gitwatch").join("config.toml"))
    }
}
