use super::analysis::Analysis;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One recorded git invocation, as handed to a [`Recorder`](crate::recorder::Recorder).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub timestamp: DateTime<Local>,
    pub command: String,
    pub working_directory: PathBuf,
    pub username: String,
    pub hostname: String,
    pub pid: u32,
    /// Process state when it was observed (e.g. `Run`, `Sleep`)
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<Analysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// One-line summary of a push to a hosted repository
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hosting_record: Option<String>,
}
