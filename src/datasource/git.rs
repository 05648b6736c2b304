use crate::git::GitError;
use std::path::Path;
use std::process::Command;
use std::sync::Arc;
use tracing::trace;

/// Runs git with the given arguments inside a working directory.
///
/// This is the only place the git binary is executed, so tests can swap in
/// canned output.
pub trait GitRunner: Send + Sync {
    /// Run `git <args>` in `cwd` and return its stdout.
    fn run(&self, args: &[&str], cwd: &Path) -> Result<String, GitError>;
}

impl<R: GitRunner + ?Sized> GitRunner for Arc<R> {
    fn run(&self, args: &[&str], cwd: &Path) -> Result<String, GitError> {
        (**self).run(args, cwd)
    }
}

/// Runs the real git executable.
pub struct SystemGitRunner {
    program: String,
}

impl Default for SystemGitRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemGitRunner {
    pub fn new() -> Self {
        Self::with_program(crate::command::GIT_PROGRAM)
    }

    /// Use a different executable (e.g. an absolute path to git).
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl GitRunner for SystemGitRunner {
    fn run(&self, args: &[&str], cwd: &Path) -> Result<String, GitError> {
        if !cwd.is_dir() {
            return Err(GitError::MissingDirectory {
                path: cwd.to_path_buf(),
            });
        }

        trace!(cwd = %cwd.display(), args = ?args, "running git");

        // Queries must never write: no index refresh, no credential prompts.
        let output = Command::new(&self.program)
            .args(args)
            .current_dir(cwd)
            .env("GIT_OPTIONAL_LOCKS", "0")
            .env("GIT_TERMINAL_PROMPT", "0")
            .env("LC_ALL", "C")
            .output()
            .map_err(|source| GitError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(GitError::NonZeroExit {
                args: args.join(" "),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        // Non-UTF-8 bytes in file contents are replaced rather than rejected
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
