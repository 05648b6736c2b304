//! Parsers for the text git prints. No process execution here.

use crate::models::{ChangeType, CommitDetail, CommitStats, FileChange};
use chrono::{DateTime, Utc};
use regex::Regex;
use std::sync::OnceLock;

/// `--pretty` format used for every commit listing: hash, author, email, unix time, subject.
pub const COMMIT_FORMAT: &str = "--pretty=format:%H|%an|%ae|%at|%s";

/// Returned instead of content for files git treats as binary.
pub const BINARY_SENTINEL: &str = "[binary file, content not shown]";
/// Returned when the file content could not be read from the commit.
pub const UNAVAILABLE_SENTINEL: &str = "[file content unavailable]";

const EXCERPT_LINES: usize = 10;
const EXCERPT_MAX_CHARS: usize = 2000;

/// Parse one `COMMIT_FORMAT` line. The subject may itself contain `|`.
pub fn parse_commit_header(line: &str) -> Option<CommitDetail> {
    let mut parts = line.trim_end_matches('\r').splitn(5, '|');
    let hash = parts.next()?.trim();
    let author = parts.next()?;
    let email = parts.next()?;
    let secs: i64 = parts.next()?.trim().parse().ok()?;
    let subject = parts.next()?;

    if hash.is_empty() {
        return None;
    }

    Some(CommitDetail {
        hash: hash.to_string(),
        author: author.to_string(),
        email: email.to_string(),
        timestamp: DateTime::<Utc>::from_timestamp(secs, 0)?,
        subject: subject.to_string(),
        changed_files: Vec::new(),
    })
}

/// Parse `--name-status` lines (`M\tpath`, `R100\told\tnew`). Renames report the new path.
pub fn parse_name_status(text: &str) -> Vec<FileChange> {
    text.lines()
        .filter_map(|line| {
            let mut fields = line.trim_end_matches('\r').split('\t');
            let code = fields.next()?.trim();
            let path = fields.last()?;
            if code.is_empty() || path.is_empty() {
                return None;
            }
            Some(FileChange {
                filename: path.to_string(),
                change_type: ChangeType::from_status(code),
                diff: None,
            })
        })
        .collect()
}

/// Parse the output of `git log -1 --name-status COMMIT_FORMAT`.
pub fn parse_commit_with_files(text: &str) -> Option<CommitDetail> {
    let mut lines = text.lines().skip_while(|l| l.trim().is_empty());
    let mut detail = parse_commit_header(lines.next()?)?;
    let rest: Vec<&str> = lines.collect();
    detail.changed_files = parse_name_status(&rest.join("\n"));
    Some(detail)
}

fn stat_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(\d+) files? changed(?:, (\d+) insertions?\(\+\))?(?:, (\d+) deletions?\(-\))?",
        )
        .expect("stat summary regex is valid")
    })
}

/// Parse the summary line at the end of `git show --stat`.
///
/// Counts that git leaves out (no insertions, no deletions) are zero.
pub fn parse_stat_summary(text: &str) -> CommitStats {
    let Some(last) = text.lines().rev().find(|l| !l.trim().is_empty()) else {
        return CommitStats::default();
    };
    let Some(caps) = stat_regex().captures(last) else {
        return CommitStats::default();
    };

    let count = |idx: usize| {
        caps.get(idx)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0)
    };

    CommitStats {
        files_changed: count(1),
        insertions: count(2),
        deletions: count(3),
    }
}

fn hosting_regexes() -> &'static [Regex; 2] {
    static RE: OnceLock<[Regex; 2]> = OnceLock::new();
    RE.get_or_init(|| {
        [
            Regex::new(r"https://github\.com/([^/\s]+)/([^/\s]+?)(?:\.git)?/?$")
                .expect("https hosting regex is valid"),
            Regex::new(r"git@github\.com:([^/\s]+)/([^/\s]+?)(?:\.git)?/?$")
                .expect("ssh hosting regex is valid"),
        ]
    })
}

/// Browser URL for a GitHub remote, from either the HTTPS or SSH form.
pub fn hosting_repo_url(remote_url: &str) -> Option<String> {
    let remote_url = remote_url.trim();
    hosting_regexes().iter().find_map(|re| {
        re.captures(remote_url)
            .map(|caps| format!("https://github.com/{}/{}", &caps[1], &caps[2]))
    })
}

/// True if `git check-attr -a` output marks the file as binary.
pub fn is_binary_attr(output: &str) -> bool {
    output.contains("binary: set") || output.contains("diff: unset")
}

/// First lines of a file, with a notice appended when the file is large.
pub fn excerpt(content: &str) -> String {
    let head: Vec<&str> = content.lines().take(EXCERPT_LINES).collect();
    let head = head.join("\n");
    if content.chars().count() > EXCERPT_MAX_CHARS {
        format!(
            "{}\n...\n[file too large, showing first {} lines]",
            head, EXCERPT_LINES
        )
    } else {
        head
    }
}

/// Paths from `git status --porcelain` that are staged, modified or untracked.
pub fn parse_porcelain_changes(text: &str) -> Vec<String> {
    text.lines()
        .filter_map(|line| {
            if line.len() < 4 {
                return None;
            }
            let status = line[..2].trim();
            let path = line[3..].trim();
            let path = path.rsplit(" -> ").next().unwrap_or(path);
            if path.is_empty() {
                return None;
            }
            match status {
                "A" | "M" | "AM" | "MM" | "??" => Some(path.to_string()),
                _ => None,
            }
        })
        .collect()
}
