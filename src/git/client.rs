use super::parse::{
    excerpt, is_binary_attr, parse_commit_header, parse_commit_with_files, parse_name_status,
    parse_porcelain_changes, parse_stat_summary, BINARY_SENTINEL, COMMIT_FORMAT,
    UNAVAILABLE_SENTINEL,
};
use crate::datasource::GitRunner;
use crate::models::{CommitDetail, CommitStats, UnpushedCommit};
use std::path::Path;
use tracing::{debug, warn};

/// Read-only queries against a working directory.
///
/// Every query degrades to `None`, `false` or an empty list when git fails; the
/// failure is logged and never returned to the caller.
pub struct GitClient<R> {
    runner: R,
}

impl<R: GitRunner> GitClient<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    fn query(&self, dir: &Path, args: &[&str]) -> Option<String> {
        match self.runner.run(args, dir) {
            Ok(out) => Some(out),
            Err(err) => {
                warn!(cwd = %dir.display(), error = %err, "git query failed");
                None
            }
        }
    }

    /// Like `query`, for calls where failure is an expected answer.
    fn query_quiet(&self, dir: &Path, args: &[&str]) -> Option<String> {
        match self.runner.run(args, dir) {
            Ok(out) => Some(out),
            Err(err) => {
                debug!(cwd = %dir.display(), error = %err, "git check returned no result");
                None
            }
        }
    }

    fn query_line(&self, dir: &Path, args: &[&str]) -> Option<String> {
        self.query(dir, args)
            .map(|out| out.trim().to_string())
            .filter(|line| !line.is_empty())
    }

    /// `None` on a detached HEAD, which `--abbrev-ref` reports as `HEAD`.
    pub fn current_branch(&self, dir: &Path) -> Option<String> {
        self.query_line(dir, &["rev-parse", "--abbrev-ref", "HEAD"])
            .filter(|branch| branch != "HEAD")
    }

    pub fn head_commit_hash(&self, dir: &Path) -> Option<String> {
        self.query_line(dir, &["rev-parse", "HEAD"])
    }

    /// The HEAD commit with the files it touched.
    pub fn last_commit_detail(&self, dir: &Path) -> Option<CommitDetail> {
        let out = self.query(dir, &["log", "-1", "--name-status", COMMIT_FORMAT])?;
        let detail = parse_commit_with_files(&out);
        if detail.is_none() {
            warn!(cwd = %dir.display(), "could not parse last commit");
        }
        detail
    }

    /// Leading lines of `path` as of `commit`, or a sentinel for binary or unreadable files.
    pub fn file_diff_excerpt(&self, dir: &Path, commit: &str, path: &str) -> String {
        if let Some(attrs) = self.query(dir, &["check-attr", "-a", "--", path]) {
            if is_binary_attr(&attrs) {
                return BINARY_SENTINEL.to_string();
            }
        }

        let spec = format!("{}:{}", commit, path);
        match self.query(dir, &["show", "--format=", &spec]) {
            Some(content) => excerpt(&content),
            None => UNAVAILABLE_SENTINEL.to_string(),
        }
    }

    pub fn commit_stats(&self, dir: &Path, commit: &str) -> Option<CommitStats> {
        self.query(dir, &["show", "--stat", "--format=", commit])
            .map(|out| parse_stat_summary(&out))
    }

    pub fn remote_url(&self, dir: &Path, remote: &str) -> Option<String> {
        self.query_line(dir, &["remote", "get-url", remote])
    }

    /// Whether the local remote-tracking ref `remote/branch` exists.
    pub fn remote_branch_exists(&self, dir: &Path, remote: &str, branch: &str) -> bool {
        let refname = format!("refs/remotes/{}/{}", remote, branch);
        self.query_quiet(dir, &["rev-parse", "--verify", "--quiet", &refname])
            .is_some()
    }

    /// Commits on `branch` that `remote/branch` does not contain, newest first.
    ///
    /// With no remote-tracking ref the whole history of `branch` counts.
    pub fn unpushed_commits(&self, dir: &Path, remote: &str, branch: &str) -> Vec<UnpushedCommit> {
        let range = if self.remote_branch_exists(dir, remote, branch) {
            format!("{}/{}..{}", remote, branch, branch)
        } else {
            branch.to_string()
        };

        let Some(out) = self.query(dir, &["log", COMMIT_FORMAT, &range, "--"]) else {
            return Vec::new();
        };

        out.lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| {
                let commit = parse_commit_header(line);
                if commit.is_none() {
                    warn!(cwd = %dir.display(), line, "skipping unparsable log line");
                }
                commit
            })
            .map(|mut detail| {
                detail.changed_files = self
                    .query(dir, &["show", "--name-status", "--pretty=format:", &detail.hash])
                    .map(|files| parse_name_status(&files))
                    .unwrap_or_default();
                let stats = self.commit_stats(dir, &detail.hash).unwrap_or_default();
                UnpushedCommit { detail, stats }
            })
            .collect()
    }

    pub fn has_merge_conflict(&self, dir: &Path) -> bool {
        self.query(dir, &["status"])
            .map(|out| out.contains("Unmerged paths"))
            .unwrap_or(false)
    }

    /// Paths `git status --porcelain` reports as staged, modified or untracked.
    pub fn changed_paths(&self, dir: &Path) -> Vec<String> {
        self.query(dir, &["status", "--porcelain"])
            .map(|out| parse_porcelain_changes(&out))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::testing::FakeGitRunner;
    use crate::models::ChangeType;
    use std::path::PathBuf;

    fn dir() -> PathBuf {
        PathBuf::from("/repo")
    }

    #[test]
    fn test_current_branch_and_head() {
        let runner = FakeGitRunner::new()
            .respond("rev-parse --abbrev-ref HEAD", "main\n")
            .respond("rev-parse HEAD", "abc123\n");
        let client = GitClient::new(runner);
        assert_eq!(client.current_branch(&dir()), Some("main".to_string()));
        assert_eq!(client.head_commit_hash(&dir()), Some("abc123".to_string()));
    }

    #[test]
    fn test_detached_head_has_no_branch() {
        let runner = FakeGitRunner::new().respond("rev-parse --abbrev-ref HEAD", "HEAD\n");
        let client = GitClient::new(runner);
        assert_eq!(client.current_branch(&dir()), None);
    }

    #[test]
    fn test_failures_degrade_to_empty() {
        let client = GitClient::new(FakeGitRunner::new());
        assert_eq!(client.current_branch(&dir()), None);
        assert_eq!(client.last_commit_detail(&dir()), None);
        assert_eq!(client.commit_stats(&dir(), "abc"), None);
        assert_eq!(client.remote_url(&dir(), "origin"), None);
        assert!(client.unpushed_commits(&dir(), "origin", "main").is_empty());
        assert!(!client.has_merge_conflict(&dir()));
        assert!(client.changed_paths(&dir()).is_empty());
    }

    #[test]
    fn test_last_commit_detail() {
        let runner = FakeGitRunner::new().respond(
            "log -1 --name-status --pretty=format:%H|%an|%ae|%at|%s",
            "abc|Ann|ann@x.org|1700000000|add parser\n\nA\tsrc/parser.rs\nM\tsrc/lib.rs\n",
        );
        let client = GitClient::new(runner);
        let detail = client.last_commit_detail(&dir()).unwrap();
        assert_eq!(detail.hash, "abc");
        assert_eq!(detail.subject, "add parser");
        assert_eq!(detail.changed_files.len(), 2);
        assert_eq!(detail.changed_files[0].change_type, ChangeType::Added);
    }

    #[test]
    fn test_file_diff_excerpt_binary() {
        let runner = FakeGitRunner::new()
            .respond("check-attr -a -- logo.png", "logo.png: binary: set\n")
            .respond("show --format= abc:logo.png", "\u{89}PNG");
        let client = GitClient::new(runner);
        assert_eq!(client.file_diff_excerpt(&dir(), "abc", "logo.png"), BINARY_SENTINEL);
    }

    #[test]
    fn test_file_diff_excerpt_text_and_missing() {
        let runner = FakeGitRunner::new()
            .respond("check-attr -a -- a.txt", "")
            .respond("show --format= abc:a.txt", "one\ntwo\n");
        let client = GitClient::new(runner);
        assert_eq!(client.file_diff_excerpt(&dir(), "abc", "a.txt"), "one\ntwo");
        assert_eq!(
            client.file_diff_excerpt(&dir(), "abc", "missing.txt"),
            UNAVAILABLE_SENTINEL
        );
    }

    #[test]
    fn test_remote_url_trimmed() {
        let runner =
            FakeGitRunner::new().respond("remote get-url origin", "git@github.com:o/r.git\n");
        let client = GitClient::new(runner);
        assert_eq!(
            client.remote_url(&dir(), "origin"),
            Some("git@github.com:o/r.git".to_string())
        );
    }

    #[test]
    fn test_unpushed_commits_without_remote_ref() {
        let runner = FakeGitRunner::new()
            .respond(
                "log --pretty=format:%H|%an|%ae|%at|%s main --",
                "bbb|Ann|a@x|1700000100|second\naaa|Ann|a@x|1700000000|first\n",
            )
            .respond("show --name-status --pretty=format: bbb", "M\tsrc/lib.rs\n")
            .respond("show --name-status --pretty=format: aaa", "A\tsrc/lib.rs\nA\tCargo.toml\n")
            .respond("show --stat --format= bbb", " 1 file changed, 3 insertions(+)\n")
            .respond("show --stat --format= aaa", " 2 files changed, 40 insertions(+)\n");
        let client = GitClient::new(runner);

        let commits = client.unpushed_commits(&dir(), "origin", "main");
        assert_eq!(commits.len(), 2);
        assert_eq!(commits[0].detail.hash, "bbb");
        assert_eq!(commits[0].detail.changed_files.len(), 1);
        assert_eq!(commits[0].stats.insertions, 3);
        assert_eq!(commits[1].detail.changed_files.len(), 2);
        assert_eq!(commits[1].stats.files_changed, 2);
    }

    #[test]
    fn test_unpushed_commits_uses_range_when_remote_ref_exists() {
        let runner = FakeGitRunner::new()
            .respond("rev-parse --verify --quiet refs/remotes/origin/main", "ccc\n")
            .respond(
                "log --pretty=format:%H|%an|%ae|%at|%s origin/main..main --",
                "ddd|Bo|b@x|1700000200|only new one\n",
            );
        let client = GitClient::new(runner);

        let commits = client.unpushed_commits(&dir(), "origin", "main");
        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].detail.subject, "only new one");
        // Missing per-commit queries leave empty files and zero stats.
        assert!(commits[0].detail.changed_files.is_empty());
        assert_eq!(commits[0].stats, CommitStats::default());
    }

    #[test]
    fn test_has_merge_conflict() {
        let runner = FakeGitRunner::new().respond(
            "status",
            "On branch main\nYou have unmerged paths.\n\nUnmerged paths:\n\tboth modified: a.rs\n",
        );
        let client = GitClient::new(runner);
        assert!(client.has_merge_conflict(&dir()));

        let runner = FakeGitRunner::new().respond("status", "On branch main\nnothing to commit\n");
        let client = GitClient::new(runner);
        assert!(!client.has_merge_conflict(&dir()));
    }

    #[test]
    fn test_changed_paths() {
        let runner =
            FakeGitRunner::new().respond("status --porcelain", "A  a.rs\n?? b.rs\n D c.rs\n");
        let client = GitClient::new(runner);
        assert_eq!(client.changed_paths(&dir()), vec!["a.rs", "b.rs"]);
    }

    #[test]
    fn test_queries_never_write() {
        let runner = FakeGitRunner::new();
        let client = GitClient::new(runner);
        let d = dir();
        client.current_branch(&d);
        client.head_commit_hash(&d);
        client.last_commit_detail(&d);
        client.file_diff_excerpt(&d, "abc", "a.rs");
        client.commit_stats(&d, "abc");
        client.remote_url(&d, "origin");
        client.unpushed_commits(&d, "origin", "main");
        client.has_merge_conflict(&d);
        client.changed_paths(&d);

        let read_only = ["rev-parse", "log", "check-attr", "show", "remote", "status"];
        for call in client.runner().calls() {
            let verb = call.split(' ').next().unwrap();
            assert!(read_only.contains(&verb), "unexpected git call: {call}");
            assert!(!call.starts_with("remote add") && !call.starts_with("remote set-url"));
        }
    }
}
