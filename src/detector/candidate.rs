use super::ScanError;
use crate::datasource::ProcessInfo;
use crate::command::GIT_PROGRAM;
use chrono::{DateTime, Local};
use std::path::PathBuf;

/// A git process seen during one tick. Never outlives the tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessCandidate {
    pub pid: u32,
    /// The command line as the process reported it
    pub command_line: String,
    /// The same command with argv[0] spelled as plain `git`, for classification
    pub git_command: String,
    pub working_directory: PathBuf,
    pub owner: String,
    pub status: String,
    pub observed_at: DateTime<Local>,
}

/// Git process detector
pub struct GitProcessDetector {
    /// argv[0] a process must have to count as git
    executable: String,
}

impl Default for GitProcessDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl GitProcessDetector {
    pub fn new() -> Self {
        Self {
            executable: GIT_PROGRAM.to_string(),
        }
    }

    pub fn with_executable(mut self, executable: impl Into<String>) -> Self {
        self.executable = executable.into();
        self
    }

    pub fn executable(&self) -> &str {
        &self.executable
    }

    /// Whether the first token of the command line is the git executable.
    pub fn is_candidate(&self, proc: &ProcessInfo) -> bool {
        proc.program() == Some(self.executable.as_str())
    }

    /// Gather what a record needs about `proc`.
    pub fn candidate(
        &self,
        proc: &ProcessInfo,
        now: DateTime<Local>,
    ) -> Result<ProcessCandidate, ScanError> {
        if proc.command_line.is_empty() {
            return Err(ScanError::MissingCommandLine { pid: proc.pid });
        }
        let working_directory = proc
            .cwd
            .clone()
            .ok_or(ScanError::InaccessibleCwd { pid: proc.pid })?;

        let git_command = std::iter::once(GIT_PROGRAM)
            .chain(proc.command_line.iter().skip(1).map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ");

        Ok(ProcessCandidate {
            pid: proc.pid,
            command_line: proc.command_text(),
            git_command,
            working_directory,
            owner: proc.user.clone().unwrap_or_else(|| "unknown".to_string()),
            status: proc.status.clone(),
            observed_at: now,
        })
    }
}
