use super::commit::{CommitStats, FileChange};
use crate::command::CommandKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Enrichment of a recognised command. Built fresh per invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Analysis {
    Commit(CommitAnalysis),
    Push(PushAnalysis),
    Merge(MergeAnalysis),
    Pull(PullAnalysis),
    Checkout(CheckoutAnalysis),
    Add(AddAnalysis),
    Remote(RemoteAnalysis),
}

impl Analysis {
    pub fn kind(&self) -> CommandKind {
        match self {
            Analysis::Commit(_) => CommandKind::Commit,
            Analysis::Push(_) => CommandKind::Push,
            Analysis::Merge(_) => CommandKind::Merge,
            Analysis::Pull(_) => CommandKind::Pull,
            Analysis::Checkout(_) => CommandKind::Checkout,
            Analysis::Add(_) => CommandKind::Add,
            Analysis::Remote(_) => CommandKind::Remote,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitAnalysis {
    pub hash: String,
    /// `Name <email>`
    pub author: String,
    pub date: DateTime<Utc>,
    /// The `-m` message when one was given, else the commit subject
    pub message: String,
    pub files: Vec<FileChange>,
    pub stats: CommitStats,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushAnalysis {
    pub remote: String,
    pub remote_url: Option<String>,
    pub branch: String,
    /// Commits on `branch` the remote did not have yet, newest first
    pub commits: Vec<CommitAnalysis>,
    /// Browser URL of the repository on its hosting service
    pub hosting_repo: Option<String>,
    /// The last commit seen in the same working directory
    pub associated_commit: Option<CommitAnalysis>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeAnalysis {
    pub source_branch: Option<String>,
    pub target_branch: Option<String>,
    pub has_conflict: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullAnalysis {
    pub remote: String,
    pub branch: Option<String>,
    pub current_branch: Option<String>,
    pub before_pull_commit: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutAnalysis {
    pub target: Option<String>,
    pub is_branch: bool,
    pub create_branch: bool,
    pub previous_branch: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddAnalysis {
    pub files: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteAnalysis {
    pub action: String,
    pub name: Option<String>,
    pub url: Option<String>,
}
