use anyhow::Result;
use std::collections::HashSet;
use std::path::PathBuf;
use sysinfo::{ProcessRefreshKind, ProcessesToUpdate, System, UpdateKind, Users};

/// One row of the OS process table.
///
/// Fields the OS would not reveal (another user's cwd, a zombie's argv) are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessInfo {
    pub pid: u32,
    /// argv, one entry per argument
    pub command_line: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub user: Option<String>,
    /// Lifecycle state as the OS reports it (`Run`, `Sleep`, `Zombie`, ...)
    pub status: String,
}

impl ProcessInfo {
    /// argv joined with single spaces, the way a process listing shows it.
    pub fn command_text(&self) -> String {
        self.command_line.join(" ")
    }

    pub fn program(&self) -> Option<&str> {
        self.command_line.first().map(String::as_str)
    }
}

/// Process data source trait
pub trait ProcessDataSource: Send + Sync {
    fn list_processes(&self) -> Result<Vec<ProcessInfo>>;

    /// PIDs of every process alive right now.
    fn live_pids(&self) -> Result<HashSet<u32>> {
        Ok(self.list_processes()?.into_iter().map(|p| p.pid).collect())
    }
}

/// Reads the process table through sysinfo.
pub struct SystemProcessDataSource;

impl Default for SystemProcessDataSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemProcessDataSource {
    pub fn new() -> Self {
        Self
    }

    fn snapshot(refresh: ProcessRefreshKind) -> System {
        let mut system = System::new();
        system.refresh_processes_specifics(ProcessesToUpdate::All, refresh);
        system
    }
}

impl ProcessDataSource for SystemProcessDataSource {
    fn list_processes(&self) -> Result<Vec<ProcessInfo>> {
        let system = Self::snapshot(
            ProcessRefreshKind::new()
                .with_cmd(UpdateKind::Always)
                .with_cwd(UpdateKind::Always)
                .with_user(UpdateKind::Always),
        );
        let users = Users::new_with_refreshed_list();

        let processes = system
            .processes()
            .iter()
            .map(|(pid, process)| ProcessInfo {
                pid: pid.as_u32(),
                // Non-UTF-8 arguments are replaced rather than dropped
                command_line: process
                    .cmd()
                    .iter()
                    .map(|arg| arg.to_string_lossy().into_owned())
                    .collect(),
                cwd: process.cwd().map(|p| p.to_path_buf()),
                user: process
                    .user_id()
                    .and_then(|uid| users.get_user_by_id(uid))
                    .map(|user| user.name().to_string()),
                status: process.status().to_string(),
            })
            .collect();

        Ok(processes)
    }

    fn live_pids(&self) -> Result<HashSet<u32>> {
        let system = Self::snapshot(ProcessRefreshKind::new());
        Ok(system.processes().keys().map(|pid| pid.as_u32()).collect())
    }
}

/// Name of this host, or `"unknown"` when the OS will not say.
pub fn hostname() -> String {
    System::host_name().unwrap_or_else(|| "unknown".to_string())
}
