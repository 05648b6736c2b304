use super::scanner::ScanLoop;
use crate::config::Config;
use crate::datasource::{GitRunner, ProcessDataSource};
use crate::recorder::Recorder;
use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout, Duration};
use tracing::{debug, error, info, warn};

/// Knobs for the scan loop and its lifecycle.
#[derive(Debug, Clone)]
pub struct MonitorOptions {
    pub poll_interval: Duration,
    pub pid_cache_ttl: Duration,
    pub ignored_commands: Vec<String>,
    pub git_executable: String,
    pub join_timeout: Duration,
    /// Shown in [`MonitorStatus`] only; the recorder decides where records go
    pub storage_path: Option<PathBuf>,
}

impl Default for MonitorOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl MonitorOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            poll_interval: config.poll_interval(),
            pid_cache_ttl: config.pid_cache_ttl(),
            ignored_commands: config.ignored_commands(),
            git_executable: config.git_executable().to_string(),
            join_timeout: config.join_timeout(),
            storage_path: config.storage_path.clone(),
        }
    }
}

/// Snapshot returned by [`GitMonitor::status`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonitorStatus {
    pub running: bool,
    pub tracked_pids: usize,
    pub storage_path: Option<PathBuf>,
    pub ignored_commands: Vec<String>,
}

enum MonitorState {
    /// `None` once the loop was abandoned by a timed-out stop or lost to a panic
    Stopped(Option<ScanLoop>),
    Running {
        shutdown: watch::Sender<bool>,
        handle: JoinHandle<Option<ScanLoop>>,
    },
    Stopping,
}

/// Runs the scan loop on the tokio runtime until told to stop.
///
/// Start and stop may be called from any task; the loop's own state is only
/// touched by the loop.
pub struct GitMonitor {
    state: Mutex<MonitorState>,
    tracked: Arc<AtomicUsize>,
    options: MonitorOptions,
}

impl GitMonitor {
    pub fn new(
        options: MonitorOptions,
        source: Arc<dyn ProcessDataSource>,
        runner: Arc<dyn GitRunner>,
        recorder: Arc<dyn Recorder>,
    ) -> Self {
        let scanner = ScanLoop::new(&options, source, runner, recorder);
        Self::with_scanner(options, scanner)
    }

    pub fn with_scanner(options: MonitorOptions, scanner: ScanLoop) -> Self {
        Self {
            tracked: scanner.tracked_counter(),
            state: Mutex::new(MonitorState::Stopped(Some(scanner))),
            options,
        }
    }

    fn state(&self) -> MutexGuard<'_, MonitorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Begin scanning in the background. Returns immediately.
    ///
    /// Must be called from inside a tokio runtime. Starting a running monitor
    /// is a no-op.
    pub fn start(&self) -> Result<()> {
        let runtime = tokio::runtime::Handle::try_current()
            .context("GitMonitor::start needs a tokio runtime")?;

        let mut state = self.state();
        let scanner = match std::mem::replace(&mut *state, MonitorState::Stopping) {
            MonitorState::Stopped(Some(scanner)) => scanner,
            MonitorState::Stopped(None) => {
                *state = MonitorState::Stopped(None);
                bail!("scan loop was lost by an earlier stop or panic and cannot be restarted");
            }
            MonitorState::Running { shutdown, handle } => {
                let exited = handle.is_finished();
                *state = MonitorState::Running { shutdown, handle };
                if exited {
                    bail!("scan loop has exited; stop the monitor before starting it again");
                }
                warn!("monitor is already running");
                return Ok(());
            }
            MonitorState::Stopping => {
                bail!("monitor is stopping");
            }
        };

        let (shutdown, shutdown_rx) = watch::channel(false);
        let handle = runtime.spawn(run_loop(scanner, self.options.poll_interval, shutdown_rx));
        *state = MonitorState::Running { shutdown, handle };

        info!(
            interval_secs = self.options.poll_interval.as_secs(),
            ignored = ?self.options.ignored_commands,
            "git monitor started"
        );
        Ok(())
    }

    /// Ask the loop to finish its current tick and exit.
    ///
    /// Waits at most the configured join timeout. Safe to call repeatedly and
    /// from any task.
    pub async fn stop(&self) {
        let (shutdown, mut handle) = {
            let mut state = self.state();
            match std::mem::replace(&mut *state, MonitorState::Stopping) {
                MonitorState::Running { shutdown, handle } => (shutdown, handle),
                other => {
                    *state = other;
                    debug!("monitor is not running");
                    return;
                }
            }
        };

        // The loop may already be gone; that is fine.
        let _ = shutdown.send(true);

        let scanner = match timeout(self.options.join_timeout, &mut handle).await {
            Ok(Ok(scanner)) => scanner,
            Ok(Err(err)) => {
                error!(error = %err, "scan loop ended abnormally");
                None
            }
            Err(_) => {
                warn!(
                    timeout_secs = self.options.join_timeout.as_secs(),
                    "scan loop did not stop in time, abandoning it"
                );
                None
            }
        };

        *self.state() = MonitorState::Stopped(scanner);
        info!("git monitor stopped");
    }

    /// False once the loop has exited, even if `stop` was never called.
    pub fn is_running(&self) -> bool {
        match &*self.state() {
            MonitorState::Running { handle, .. } => !handle.is_finished(),
            _ => false,
        }
    }

    pub fn status(&self) -> MonitorStatus {
        MonitorStatus {
            running: self.is_running(),
            tracked_pids: self.tracked.load(Ordering::Relaxed),
            storage_path: self.options.storage_path.clone(),
            ignored_commands: self.options.ignored_commands.clone(),
        }
    }
}

async fn run_loop(
    mut scanner: ScanLoop,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> Option<ScanLoop> {
    loop {
        if *shutdown.borrow() {
            break;
        }

        // Ticks shell out to git, so keep them off the async workers.
        let joined = tokio::task::spawn_blocking(move || {
            let report = scanner.tick();
            (scanner, report)
        })
        .await;

        match joined {
            Ok((returned, report)) => {
                scanner = returned;
                if report.recorded > 0 || report.skipped > 0 {
                    debug!(?report, "tick finished");
                }
            }
            Err(err) => {
                error!(error = %err, "scan tick panicked, scan loop exited");
                return None;
            }
        }

        tokio::select! {
            _ = sleep(interval) => {}
            changed = shutdown.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }

    Some(scanner)
}
