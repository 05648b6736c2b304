use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How a file changed in a commit, from the letter in `--name-status` output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Added,
    Modified,
    Deleted,
    Renamed,
    Copied,
}

impl ChangeType {
    /// Map a status code such as `A`, `M` or `R100`. Anything unrecognised counts as modified.
    pub fn from_status(code: &str) -> Self {
        match code.chars().next() {
            Some('A') => ChangeType::Added,
            Some('D') => ChangeType::Deleted,
            Some('R') => ChangeType::Renamed,
            Some('C') => ChangeType::Copied,
            _ => ChangeType::Modified,
        }
    }

    /// Whether the file still has content after the commit worth excerpting.
    pub fn has_content(&self) -> bool {
        matches!(self, ChangeType::Added | ChangeType::Modified)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChange {
    pub filename: String,
    pub change_type: ChangeType,
    /// Leading lines of the file after the commit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff: Option<String>,
}

/// Totals from the `--stat` summary line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitStats {
    pub files_changed: u32,
    pub insertions: u32,
    pub deletions: u32,
}

/// One commit as reported by `git log`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitDetail {
    pub hash: String,
    pub author: String,
    pub email: String,
    pub timestamp: DateTime<Utc>,
    pub subject: String,
    pub changed_files: Vec<FileChange>,
}

impl CommitDetail {
    /// `Name <email>`, or just the name when git reported no email.
    pub fn author_line(&self) -> String {
        if self.email.is_empty() {
            self.author.clone()
        } else {
            format!("{} <{}>", self.author, self.email)
        }
    }
}

/// A local commit that the remote branch does not have yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnpushedCommit {
    pub detail: CommitDetail,
    pub stats: CommitStats,
}
