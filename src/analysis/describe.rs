//! Human-readable text derived from an [`Analysis`].

use crate::models::{Analysis, CheckoutAnalysis, PushAnalysis, RemoteAnalysis};
use chrono::{DateTime, Local};

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{} {}", count, noun)
    } else {
        format!("{} {}s", count, noun)
    }
}

/// One-line (push: up to two lines) description of what the command did.
pub fn describe(analysis: &Analysis) -> String {
    match analysis {
        Analysis::Commit(commit) => format!(
            "Committed {} (+{}/-{}): {}",
            plural(commit.files.len(), "file"),
            commit.stats.insertions,
            commit.stats.deletions,
            commit.message
        ),
        Analysis::Push(push) => describe_push(push),
        Analysis::Merge(merge) => {
            let mut text = format!(
                "Merged {} into {}",
                merge.source_branch.as_deref().unwrap_or("unknown branch"),
                merge.target_branch.as_deref().unwrap_or("current branch")
            );
            if merge.has_conflict {
                text.push_str(" (conflicts)");
            }
            text
        }
        Analysis::Pull(pull) => match &pull.branch {
            Some(branch) => format!("Pulled {}/{}", pull.remote, branch),
            None => format!("Pulled from {}", pull.remote),
        },
        Analysis::Checkout(checkout) => describe_checkout(checkout),
        Analysis::Add(add) => format!("Staged {}", plural(add.files.len(), "file")),
        Analysis::Remote(remote) => describe_remote(remote),
    }
}

fn describe_push(push: &PushAnalysis) -> String {
    let mut text = format!(
        "Pushed {} to {}/{}",
        plural(push.commits.len(), "commit"),
        push.remote,
        push.branch
    );
    if let Some(repo) = &push.hosting_repo {
        text.push_str(&format!(" ({})", repo));
    }
    if let Some(commit) = &push.associated_commit {
        if !commit.message.is_empty() {
            text.push_str(&format!("\nLatest commit: {}", commit.message));
        }
    }
    if !push.commits.is_empty() {
        let total: usize = push.commits.iter().map(|c| c.files.len()).sum();
        text.push_str(&format!(", {} changed in total", plural(total, "file")));
    }
    text
}

fn describe_checkout(checkout: &CheckoutAnalysis) -> String {
    let Some(target) = &checkout.target else {
        return "Checked out".to_string();
    };
    if !checkout.is_branch {
        return format!("Restored {}", target);
    }
    if checkout.create_branch {
        return format!("Created and switched to branch {}", target);
    }
    match &checkout.previous_branch {
        Some(previous) => format!("Switched from {} to branch {}", previous, target),
        None => format!("Switched to branch {}", target),
    }
}

fn describe_remote(remote: &RemoteAnalysis) -> String {
    let name = remote.name.as_deref().unwrap_or("?");
    match (remote.action.as_str(), &remote.url) {
        ("list", _) => "Listed remotes".to_string(),
        ("add", Some(url)) => format!("Added remote {} ({})", name, url),
        ("set-url", Some(url)) => format!("Changed URL of remote {} to {}", name, url),
        ("remove" | "rm", _) => format!("Removed remote {}", name),
        (action, _) => format!("Ran remote {}", action),
    }
}

/// Summary line for a push to a recognised hosting service, `None` for anything else.
pub fn hosting_record(timestamp: DateTime<Local>, analysis: &Analysis) -> Option<String> {
    let Analysis::Push(push) = analysis else {
        return None;
    };
    let repo = push.hosting_repo.as_ref()?;
    let message = push
        .associated_commit
        .as_ref()
        .map(|c| c.message.as_str())
        .unwrap_or("no commit message");

    Some(format!(
        "{} updated @{}, {}",
        timestamp.format("%Y-%m-%d %H:%M:%S"),
        repo,
        message
    ))
}
