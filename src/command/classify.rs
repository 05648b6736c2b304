use super::args::*;
use super::kind::CommandKind;
use super::tokens::{has_flag, has_short_flag, option_value, positionals, split_words, Token};
use serde::Serialize;
use std::path::Path;

/// Program name a command line must start with.
pub const GIT_PROGRAM: &str = "git";

const CLONE_VALUED: &[&str] = &[
    "--depth",
    "--branch",
    "-b",
    "--origin",
    "-o",
    "--template",
    "--reference",
    "--separate-git-dir",
    "-c",
    "--config",
    "-j",
    "--jobs",
    "--filter",
    "--shallow-since",
    "--shallow-exclude",
    "-u",
    "--upload-pack",
];
const BRANCH_VALUED: &[&str] = &["-u", "--set-upstream-to", "--contains", "--merged"];
const MERGE_VALUED: &[&str] = &[
    "-m",
    "--message",
    "-s",
    "--strategy",
    "-X",
    "--strategy-option",
    "-F",
    "--file",
];
const PUSH_VALUED: &[&str] = &["-o", "--push-option", "--repo", "--receive-pack", "--exec"];
const PULL_VALUED: &[&str] = &["-s", "--strategy", "-X", "--strategy-option", "--depth"];
const CHERRY_PICK_VALUED: &[&str] = &["-m", "--mainline", "-X", "--strategy-option", "--strategy"];

/// A git command line, classified. Produced once per raw string and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GitCommand {
    pub kind: CommandKind,
    /// The command line exactly as it was classified
    pub raw_text: String,
    #[serde(rename = "arguments")]
    pub args: CommandArgs,
}

impl GitCommand {
    pub fn summary(&self) -> &'static str {
        self.kind.summary()
    }
}

/// Classify a raw command line without touching the filesystem.
///
/// Returns `None` unless the text starts with `git` followed by whitespace.
/// A `checkout` target is always reported as a branch here; use [`classify_in`]
/// to detect file restores.
pub fn classify(raw: &str) -> Option<GitCommand> {
    classify_with(raw, None)
}

/// Like [`classify`], but resolves whether a `checkout` target is a file in `cwd`.
pub fn classify_in(raw: &str, cwd: &Path) -> Option<GitCommand> {
    classify_with(raw, Some(cwd))
}

fn classify_with(raw: &str, cwd: Option<&Path>) -> Option<GitCommand> {
    let rest = raw.strip_prefix(GIT_PROGRAM)?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }

    let rest = rest.trim_start();
    let (keyword, remainder) = match rest.find(char::is_whitespace) {
        Some(idx) => (&rest[..idx], &rest[idx..]),
        None => (rest, ""),
    };

    let kind = CommandKind::from_keyword(keyword);
    let tokens = split_words(remainder);

    let args = match kind {
        CommandKind::Init => CommandArgs::Init(parse_init(&tokens)),
        CommandKind::Clone => CommandArgs::Clone(parse_clone(&tokens)),
        CommandKind::Branch => CommandArgs::Branch(parse_branch(&tokens)),
        CommandKind::Checkout => CommandArgs::Checkout(parse_checkout(&tokens, cwd)),
        CommandKind::Add => CommandArgs::Add(parse_add(&tokens)),
        CommandKind::Commit => CommandArgs::Commit(parse_commit(&tokens)),
        CommandKind::Merge => CommandArgs::Merge(parse_merge(&tokens)),
        CommandKind::Push => CommandArgs::Push(parse_push(&tokens)),
        CommandKind::Pull => CommandArgs::Pull(parse_pull(&tokens)),
        CommandKind::CherryPick => CommandArgs::CherryPick(parse_cherry_pick(&tokens)),
        CommandKind::Remote => CommandArgs::Remote(parse_remote(&tokens)),
        CommandKind::Unknown => CommandArgs::Unknown,
    };

    Some(GitCommand {
        kind,
        raw_text: raw.to_string(),
        args,
    })
}

fn first_text(tokens: &[&Token]) -> Option<String> {
    tokens.first().map(|t| t.text.clone())
}

fn parse_init(tokens: &[Token]) -> InitArgs {
    let pos = positionals(tokens, &["--template", "--separate-git-dir", "-b", "--initial-branch"]);
    InitArgs {
        directory: first_text(&pos),
        bare: has_flag(tokens, &["--bare"]),
    }
}

/// Basename of a repository URL with any trailing `/` and `.git` removed.
pub fn repository_basename(url: &str) -> Option<String> {
    let trimmed = url.trim_end_matches('/');
    let base = trimmed.rsplit(['/', ':', '\\']).next().unwrap_or(trimmed);
    let base = base.strip_suffix(".git").unwrap_or(base);
    if base.is_empty() {
        None
    } else {
        Some(base.to_string())
    }
}

fn parse_clone(tokens: &[Token]) -> CloneArgs {
    let pos = positionals(tokens, CLONE_VALUED);
    let repository_url = first_text(&pos);
    let destination = pos
        .get(1)
        .map(|t| t.text.clone())
        .or_else(|| repository_url.as_deref().and_then(repository_basename));

    CloneArgs {
        repository_url,
        destination,
        depth: option_value(tokens, &["--depth"]),
        branch: option_value(tokens, &["--branch", "-b"]),
    }
}

fn parse_branch(tokens: &[Token]) -> BranchArgs {
    let delete = has_flag(tokens, &["-d", "-D", "--delete"]);
    let moving = has_flag(tokens, &["-m", "-M", "--move", "-c", "-C", "--copy"]);

    // `git branch -m old new` names the branch being created: skip the first name.
    let mut branch_name = None;
    let mut previous: Option<&Token> = None;
    for token in tokens {
        if !token.is_flag() {
            let after_rename = previous
                .map(|p| matches!(p.text.as_str(), "-b" | "-m" | "-M"))
                .unwrap_or(false);
            if !after_rename {
                branch_name = Some(token.text.clone());
                break;
            }
        }
        previous = Some(token);
    }

    BranchArgs {
        list: positionals(tokens, BRANCH_VALUED).is_empty() && !delete && !moving,
        delete,
        branch_name,
    }
}

fn parse_checkout(tokens: &[Token], cwd: Option<&Path>) -> CheckoutArgs {
    let create_idx = tokens
        .iter()
        .position(|t| t.is_flag() && matches!(t.text.as_str(), "-b" | "-B"));

    if let Some(idx) = create_idx {
        return CheckoutArgs {
            branch_name: tokens
                .get(idx + 1)
                .filter(|t| !t.is_flag())
                .map(|t| t.text.clone()),
            create_new: true,
            is_file: false,
        };
    }

    // `git checkout -- path` always names a path.
    let after_separator = tokens
        .iter()
        .position(|t| !t.quoted && t.text == "--")
        .map(|sep| tokens[..sep].iter().all(|t| t.is_flag()))
        .unwrap_or(false);
    let pos = positionals(tokens, &["--orphan", "--conflict"]);
    let branch_name = first_text(&pos);
    let on_disk = match (&branch_name, cwd) {
        (Some(name), Some(dir)) => dir.join(name).exists(),
        _ => false,
    };

    CheckoutArgs {
        branch_name,
        create_new: false,
        is_file: after_separator || on_disk,
    }
}

fn parse_add(tokens: &[Token]) -> AddArgs {
    let paths: Vec<String> = positionals(tokens, &["--chmod", "--pathspec-from-file"])
        .into_iter()
        .map(|t| t.text.clone())
        .collect();
    let paths = if paths.is_empty() {
        vec![".".to_string()]
    } else {
        paths
    };

    AddArgs {
        all: has_flag(tokens, &["-A", "--all"]) || paths == ["."],
        paths,
    }
}

/// Commit message from `-m`, `--message`, or a `-am` cluster.
///
/// A quoted value wins outright. An unquoted value runs until the next flag, which
/// is how a process table shows `-m "two words"` once the quotes are gone.
fn commit_message(tokens: &[Token]) -> Option<String> {
    for (i, token) in tokens.iter().enumerate() {
        if !token.is_flag() {
            continue;
        }
        if let Some(value) = token.text.strip_prefix("--message=") {
            return Some(value.to_string());
        }

        let takes_message = token.text == "--message"
            || (!token.text.starts_with("--")
                && token.text.ends_with('m')
                && token.text[1..].chars().all(|c| c.is_ascii_alphabetic()));
        if !takes_message {
            continue;
        }

        let rest = &tokens[i + 1..];
        let first = rest.first()?;
        if first.quoted {
            return Some(first.text.clone());
        }
        let words: Vec<&str> = rest
            .iter()
            .take_while(|t| !t.is_flag() && !t.quoted)
            .map(|t| t.text.as_str())
            .collect();
        if words.is_empty() {
            return None;
        }
        return Some(words.join(" "));
    }
    None
}

fn parse_commit(tokens: &[Token]) -> CommitArgs {
    CommitArgs {
        message: commit_message(tokens),
        amend: has_flag(tokens, &["--amend"]),
        all: has_flag(tokens, &["--all"]) || has_short_flag(tokens, 'a'),
    }
}

fn parse_merge(tokens: &[Token]) -> MergeArgs {
    let pos = positionals(tokens, MERGE_VALUED);
    MergeArgs {
        branch_name: first_text(&pos),
        no_ff: has_flag(tokens, &["--no-ff"]),
        ff_only: has_flag(tokens, &["--ff-only"]),
        squash: has_flag(tokens, &["--squash"]),
    }
}

fn parse_push(tokens: &[Token]) -> PushArgs {
    let pos = positionals(tokens, PUSH_VALUED);
    PushArgs {
        remote: first_text(&pos).unwrap_or_else(|| "origin".to_string()),
        branch: pos.get(1).map(|t| t.text.clone()),
        force: has_flag(tokens, &["-f", "--force"]),
        all: has_flag(tokens, &["--all"]),
    }
}

fn parse_pull(tokens: &[Token]) -> PullArgs {
    let pos = positionals(tokens, PULL_VALUED);
    PullArgs {
        remote: first_text(&pos).unwrap_or_else(|| "origin".to_string()),
        branch: pos.get(1).map(|t| t.text.clone()),
        rebase: tokens
            .iter()
            .any(|t| t.is_flag() && (t.text == "--rebase" || t.text.starts_with("--rebase="))),
    }
}

fn parse_cherry_pick(tokens: &[Token]) -> CherryPickArgs {
    let pos = positionals(tokens, CHERRY_PICK_VALUED);
    CherryPickArgs {
        commit_hash: first_text(&pos),
        no_commit: has_flag(tokens, &["-n", "--no-commit"]),
        edit: has_flag(tokens, &["-e", "--edit"]),
        continue_pick: has_flag(tokens, &["--continue"]),
    }
}

fn parse_remote(tokens: &[Token]) -> RemoteArgs {
    let pos = positionals(tokens, &["-t", "-m"]);
    let action = first_text(&pos).unwrap_or_else(|| "list".to_string());
    let name = pos.get(1).map(|t| t.text.clone());
    let url = match action.as_str() {
        "add" | "set-url" => pos.get(2).map(|t| t.text.clone()),
        _ => None,
    };

    RemoteArgs { action, name, url }
}
