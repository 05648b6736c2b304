//! One pass over the process table.

use super::MonitorOptions;
use crate::analysis::{describe, hosting_record, CommandAnalyzer};
use crate::datasource::{hostname, GitRunner, ProcessDataSource};
use crate::detector::{GitProcessDetector, ProcessCandidate, SeenPidCache, Sweep};
use crate::models::ActivityRecord;
use crate::recorder::Recorder;
use chrono::Local;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// What one tick did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Git processes seen in the table, recorded before or not
    pub candidates: usize,
    pub recorded: usize,
    /// Admitted but matched the ignore list
    pub ignored: usize,
    /// Git processes whose details could not be read
    pub skipped: usize,
    pub sweep: Option<Sweep>,
    /// The process table itself could not be read
    pub listing_failed: bool,
}

/// Owns everything a tick touches: the seen cache, the analyzer and its
/// commit correlation. Ticks run strictly one after another.
pub struct ScanLoop {
    source: Arc<dyn ProcessDataSource>,
    detector: GitProcessDetector,
    seen: SeenPidCache,
    analyzer: CommandAnalyzer<Arc<dyn GitRunner>>,
    recorder: Arc<dyn Recorder>,
    ignored_commands: Vec<String>,
    hostname: String,
    tracked: Arc<AtomicUsize>,
}

impl ScanLoop {
    pub fn new(
        options: &MonitorOptions,
        source: Arc<dyn ProcessDataSource>,
        runner: Arc<dyn GitRunner>,
        recorder: Arc<dyn Recorder>,
    ) -> Self {
        Self {
            source,
            detector: GitProcessDetector::new().with_executable(options.git_executable.clone()),
            seen: SeenPidCache::new(options.pid_cache_ttl, Instant::now()),
            analyzer: CommandAnalyzer::new(runner),
            recorder,
            ignored_commands: options.ignored_commands.clone(),
            hostname: hostname(),
            tracked: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Hostname written into records instead of the real one.
    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = hostname.into();
        self
    }

    /// Live count of PIDs in the seen cache, readable from other threads.
    pub fn tracked_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.tracked)
    }

    pub fn tracked_pids(&self) -> usize {
        self.seen.len()
    }

    pub fn analyzer(&self) -> &CommandAnalyzer<Arc<dyn GitRunner>> {
        &self.analyzer
    }

    pub fn analyzer_mut(&mut self) -> &mut CommandAnalyzer<Arc<dyn GitRunner>> {
        &mut self.analyzer
    }

    fn is_ignored(&self, command: &str) -> bool {
        self.ignored_commands
            .iter()
            .any(|prefix| command.starts_with(prefix.as_str()))
    }

    /// Scan the process table once, record new git invocations, then sweep
    /// exited PIDs if a sweep is due.
    pub fn tick(&mut self) -> TickReport {
        let mut report = TickReport::default();
        let now = Instant::now();

        let processes = match self.source.list_processes() {
            Ok(processes) => processes,
            Err(err) => {
                error!(error = %err, "failed to list processes, retrying next tick");
                report.listing_failed = true;
                return report;
            }
        };

        for proc in &processes {
            if !self.detector.is_candidate(proc) {
                continue;
            }
            report.candidates += 1;
            if self.seen.contains(proc.pid) {
                continue;
            }

            // Not admitted on failure, so the next tick tries again.
            let candidate = match self.detector.candidate(proc, Local::now()) {
                Ok(candidate) => candidate,
                Err(err) => {
                    warn!(pid = proc.pid, error = %err, "skipping git process");
                    report.skipped += 1;
                    continue;
                }
            };

            if !self.seen.admit(candidate.pid, now) {
                continue;
            }

            if self.is_ignored(&candidate.command_line) {
                debug!(pid = candidate.pid, command = %candidate.command_line, "ignored command");
                report.ignored += 1;
                continue;
            }

            self.record(candidate);
            report.recorded += 1;
        }

        report.sweep = Some(self.seen.maybe_evict(now, self.source.as_ref()));
        self.tracked.store(self.seen.len(), Ordering::Relaxed);

        report
    }

    fn record(&mut self, candidate: ProcessCandidate) {
        let analysis = self
            .analyzer
            .analyze(&candidate.git_command, &candidate.working_directory);
        let description = analysis.as_ref().map(describe);
        let hosting = analysis
            .as_ref()
            .and_then(|a| hosting_record(candidate.observed_at, a));

        let entry = ActivityRecord {
            timestamp: candidate.observed_at,
            command: candidate.command_line,
            working_directory: candidate.working_directory,
            username: candidate.owner,
            hostname: self.hostname.clone(),
            pid: candidate.pid,
            status: candidate.status,
            analysis,
            description,
            hosting_record: hosting,
        };

        if let Err(err) = self.recorder.record(&entry) {
            error!(pid = entry.pid, error = %err, "failed to store activity record");
            return;
        }

        info!(
            pid = entry.pid,
            cwd = %entry.working_directory.display(),
            command = %entry.command,
            "recorded git command"
        );
        if let Some(hosting) = &entry.hosting_record {
            info!(pid = entry.pid, "{}", hosting);
        } else if let Some(description) = &entry.description {
            debug!(pid = entry.pid, "{}", description);
        }
    }
}
