//! Where finished activity records go.

use crate::models::ActivityRecord;
use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Local};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Persists one record per recorded git invocation.
pub trait Recorder: Send + Sync {
    fn record(&self, entry: &ActivityRecord) -> Result<()>;
}

/// Appends records as JSON lines to one file per local day.
///
/// Layout under the storage directory:
/// - `YYYYMMDD.jsonl`: every record
/// - `hosting_records/hosting_records_YYYYMM.txt`: one line per push to a hosted repository
pub struct JsonlRecorder {
    dir: PathBuf,
}

impl JsonlRecorder {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Day file a record observed at `timestamp` is written to.
    pub fn day_file(&self, timestamp: DateTime<Local>) -> PathBuf {
        self.dir
            .join(format!("{}.jsonl", timestamp.format("%Y%m%d")))
    }

    pub fn hosting_file(&self, timestamp: DateTime<Local>) -> PathBuf {
        self.dir.join("hosting_records").join(format!(
            "hosting_records_{}.txt",
            timestamp.format("%Y%m")
        ))
    }

    fn append_line(path: &Path, line: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open record file: {}", path.display()))?;
        writeln!(file, "{}", line)
            .with_context(|| format!("Failed to write record file: {}", path.display()))?;
        Ok(())
    }
}

impl Recorder for JsonlRecorder {
    fn record(&self, entry: &ActivityRecord) -> Result<()> {
        let line = serde_json::to_string(entry).context("Failed to serialize activity record")?;
        Self::append_line(&self.day_file(entry.timestamp), &line)?;

        if let Some(hosting) = &entry.hosting_record {
            Self::append_line(&self.hosting_file(entry.timestamp), hosting)?;
        }

        Ok(())
    }
}

/// Keeps records in memory. Clones share the same list.
#[derive(Debug, Clone, Default)]
pub struct MemoryRecorder {
    records: Arc<Mutex<Vec<ActivityRecord>>>,
}

impl MemoryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    pub fn records(&self) -> Vec<ActivityRecord> {
        match self.records.lock() {
            Ok(records) => records.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Recorder for MemoryRecorder {
    fn record(&self, entry: &ActivityRecord) -> Result<()> {
        self.records
            .lock()
            .map_err(|_| anyhow!("memory recorder lock poisoned"))?
            .push(entry.clone());
        Ok(())
    }
}
