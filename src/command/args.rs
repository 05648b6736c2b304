//! Typed arguments extracted for each recognised sub-command.

use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InitArgs {
    pub directory: Option<String>,
    pub bare: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CloneArgs {
    pub repository_url: Option<String>,
    /// Explicit destination, or the URL's basename without `.git`
    pub destination: Option<String>,
    pub depth: Option<String>,
    pub branch: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BranchArgs {
    pub list: bool,
    pub delete: bool,
    pub branch_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CheckoutArgs {
    pub branch_name: Option<String>,
    pub create_new: bool,
    /// The target names a file in the working directory, so this restores it
    pub is_file: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AddArgs {
    pub paths: Vec<String>,
    pub all: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommitArgs {
    pub message: Option<String>,
    pub amend: bool,
    pub all: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeArgs {
    pub branch_name: Option<String>,
    pub no_ff: bool,
    pub ff_only: bool,
    pub squash: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PushArgs {
    pub remote: String,
    pub branch: Option<String>,
    pub force: bool,
    pub all: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullArgs {
    pub remote: String,
    pub branch: Option<String>,
    pub rebase: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CherryPickArgs {
    pub commit_hash: Option<String>,
    pub no_commit: bool,
    pub edit: bool,
    #[serde(rename = "continue")]
    pub continue_pick: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteArgs {
    /// `list` when no verb is given
    pub action: String,
    pub name: Option<String>,
    pub url: Option<String>,
}

/// Arguments of a classified command, one variant per [`CommandKind`](super::CommandKind).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CommandArgs {
    Init(InitArgs),
    Clone(CloneArgs),
    Branch(BranchArgs),
    Checkout(CheckoutArgs),
    Add(AddArgs),
    Commit(CommitArgs),
    Merge(MergeArgs),
    Push(PushArgs),
    Pull(PullArgs),
    CherryPick(CherryPickArgs),
    Remote(RemoteArgs),
    Unknown,
}
