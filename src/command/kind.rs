use serde::{Deserialize, Serialize};
use std::fmt;

/// Git sub-commands the classifier recognises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommandKind {
    Init,
    Clone,
    Branch,
    Checkout,
    Add,
    Commit,
    Merge,
    Push,
    Pull,
    CherryPick,
    Remote,
    Unknown,
}

impl CommandKind {
    /// Recognised sub-commands in match order. `Unknown` is the fallback and not listed.
    pub const RECOGNISED: [CommandKind; 11] = [
        CommandKind::Init,
        CommandKind::Clone,
        CommandKind::Branch,
        CommandKind::Checkout,
        CommandKind::Add,
        CommandKind::Commit,
        CommandKind::Merge,
        CommandKind::Push,
        CommandKind::Pull,
        CommandKind::CherryPick,
        CommandKind::Remote,
    ];

    /// The keyword typed after `git` for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandKind::Init => "init",
            CommandKind::Clone => "clone",
            CommandKind::Branch => "branch",
            CommandKind::Checkout => "checkout",
            CommandKind::Add => "add",
            CommandKind::Commit => "commit",
            CommandKind::Merge => "merge",
            CommandKind::Push => "push",
            CommandKind::Pull => "pull",
            CommandKind::CherryPick => "cherry-pick",
            CommandKind::Remote => "remote",
            CommandKind::Unknown => "unknown",
        }
    }

    /// Look up a sub-command keyword. Anything unrecognised is `Unknown`.
    pub fn from_keyword(keyword: &str) -> Self {
        Self::RECOGNISED
            .into_iter()
            .find(|kind| kind.as_str() == keyword)
            .unwrap_or(CommandKind::Unknown)
    }

    /// One-line, human readable summary of what the sub-command does.
    pub fn summary(&self) -> &'static str {
        match self {
            CommandKind::Init => "Create an empty git repository",
            CommandKind::Clone => "Clone a remote repository locally",
            CommandKind::Branch => "Create, list or delete branches",
            CommandKind::Checkout => "Switch branches or restore working tree files",
            CommandKind::Add => "Add file contents to the index",
            CommandKind::Commit => "Record changes to the repository",
            CommandKind::Merge => "Join two development histories together",
            CommandKind::Push => "Update remote refs with local commits",
            CommandKind::Pull => "Fetch from a remote and integrate with a local branch",
            CommandKind::CherryPick => "Apply the changes introduced by existing commits",
            CommandKind::Remote => "Manage tracked repositories",
            CommandKind::Unknown => "Git command",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
