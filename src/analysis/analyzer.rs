use crate::command::{classify_in, CommandArgs};
use crate::command::args::{
    AddArgs, CheckoutArgs, CommitArgs, MergeArgs, PullArgs, PushArgs, RemoteArgs,
};
use crate::datasource::GitRunner;
use crate::git::{hosting_repo_url, GitClient};
use crate::models::{
    AddAnalysis, Analysis, CheckoutAnalysis, CommitAnalysis, CommitDetail, CommitStats,
    MergeAnalysis, PullAnalysis, PushAnalysis, RemoteAnalysis,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

/// Branch assumed for a push when neither the command nor HEAD names one.
const FALLBACK_PUSH_BRANCH: &str = "master";

/// Turns a raw git command line into an [`Analysis`] by querying the repository.
///
/// Remembers the last commit analysed in each working directory so a later
/// push from the same directory can point back at it.
pub struct CommandAnalyzer<R> {
    client: GitClient<R>,
    last_commits: HashMap<PathBuf, CommitAnalysis>,
}

impl<R: GitRunner> CommandAnalyzer<R> {
    pub fn new(runner: R) -> Self {
        Self::with_client(GitClient::new(runner))
    }

    pub fn with_client(client: GitClient<R>) -> Self {
        Self {
            client,
            last_commits: HashMap::new(),
        }
    }

    pub fn client(&self) -> &GitClient<R> {
        &self.client
    }

    /// Analyse `raw` as run in `cwd`.
    ///
    /// `None` means no analysis is available: the text is not a git command, the
    /// sub-command is not one that gets enriched, or the repository could not be read.
    pub fn analyze(&mut self, raw: &str, cwd: &Path) -> Option<Analysis> {
        let command = classify_in(raw, cwd)?;

        let analysis = match &command.args {
            CommandArgs::Commit(args) => self.analyze_commit(args, cwd).map(Analysis::Commit),
            CommandArgs::Push(args) => Some(Analysis::Push(self.analyze_push(args, cwd))),
            CommandArgs::Merge(args) => Some(Analysis::Merge(self.analyze_merge(args, cwd))),
            CommandArgs::Pull(args) => Some(Analysis::Pull(self.analyze_pull(args, cwd))),
            CommandArgs::Checkout(args) => {
                Some(Analysis::Checkout(self.analyze_checkout(args, cwd)))
            }
            CommandArgs::Add(args) => Some(Analysis::Add(self.analyze_add(args, cwd))),
            CommandArgs::Remote(args) => Some(Analysis::Remote(analyze_remote(args))),
            _ => {
                debug!(kind = %command.kind, "no analysis for sub-command");
                None
            }
        };

        if let Some(Analysis::Commit(commit)) = &analysis {
            self.last_commits.insert(cwd.to_path_buf(), commit.clone());
        }

        analysis
    }

    /// The last commit analysed in `dir`, if any.
    pub fn last_commit(&self, dir: &Path) -> Option<&CommitAnalysis> {
        self.last_commits.get(dir)
    }

    /// Drop the remembered commit for `dir`.
    pub fn forget(&mut self, dir: &Path) -> Option<CommitAnalysis> {
        self.last_commits.remove(dir)
    }

    pub fn tracked_directories(&self) -> usize {
        self.last_commits.len()
    }

    fn analyze_commit(&self, args: &CommitArgs, cwd: &Path) -> Option<CommitAnalysis> {
        if !cwd.is_dir() {
            debug!(cwd = %cwd.display(), "commit directory is gone, skipping analysis");
            return None;
        }

        let Some(detail) = self.client.last_commit_detail(cwd) else {
            error!(cwd = %cwd.display(), "could not read the commit just made");
            return None;
        };

        let stats = self.client.commit_stats(cwd, &detail.hash).unwrap_or_default();
        let mut commit = commit_analysis(detail, stats);

        for file in commit.files.iter_mut() {
            if file.change_type.has_content() {
                file.diff = Some(
                    self.client
                        .file_diff_excerpt(cwd, &commit.hash, &file.filename),
                );
            }
        }

        if let Some(message) = &args.message {
            commit.message = message.clone();
        }

        Some(commit)
    }

    fn analyze_push(&self, args: &PushArgs, cwd: &Path) -> PushAnalysis {
        let branch = args
            .branch
            .clone()
            .or_else(|| self.client.current_branch(cwd))
            .unwrap_or_else(|| FALLBACK_PUSH_BRANCH.to_string());

        let remote_url = self.client.remote_url(cwd, &args.remote);
        let hosting_repo = remote_url.as_deref().and_then(hosting_repo_url);

        let commits = self
            .client
            .unpushed_commits(cwd, &args.remote, &branch)
            .into_iter()
            .map(|c| commit_analysis(c.detail, c.stats))
            .collect();

        PushAnalysis {
            remote: args.remote.clone(),
            remote_url,
            branch,
            commits,
            hosting_repo,
            associated_commit: self.last_commits.get(cwd).cloned(),
        }
    }

    fn analyze_merge(&self, args: &MergeArgs, cwd: &Path) -> MergeAnalysis {
        MergeAnalysis {
            source_branch: args.branch_name.clone(),
            target_branch: self.client.current_branch(cwd),
            has_conflict: self.client.has_merge_conflict(cwd),
        }
    }

    fn analyze_pull(&self, args: &PullArgs, cwd: &Path) -> PullAnalysis {
        let current_branch = self.client.current_branch(cwd);
        PullAnalysis {
            remote: args.remote.clone(),
            branch: args.branch.clone().or_else(|| current_branch.clone()),
            current_branch,
            before_pull_commit: self.client.head_commit_hash(cwd),
        }
    }

    fn analyze_checkout(&self, args: &CheckoutArgs, cwd: &Path) -> CheckoutAnalysis {
        CheckoutAnalysis {
            target: args.branch_name.clone(),
            is_branch: !args.is_file,
            create_branch: args.create_new,
            previous_branch: self.client.current_branch(cwd),
        }
    }

    fn analyze_add(&self, args: &AddArgs, cwd: &Path) -> AddAnalysis {
        let files = if args.all {
            self.client.changed_paths(cwd)
        } else {
            args.paths
                .iter()
                .filter(|path| cwd.join(path).exists())
                .cloned()
                .collect()
        };
        AddAnalysis { files }
    }
}

fn analyze_remote(args: &RemoteArgs) -> RemoteAnalysis {
    RemoteAnalysis {
        action: args.action.clone(),
        name: args.name.clone(),
        url: args.url.clone(),
    }
}

fn commit_analysis(detail: CommitDetail, stats: CommitStats) -> CommitAnalysis {
    CommitAnalysis {
        author: detail.author_line(),
        hash: detail.hash,
        date: detail.timestamp,
        message: detail.subject,
        files: detail.changed_files,
        stats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::parse::BINARY_SENTINEL;
    use crate::git::testing::FakeGitRunner;
    use crate::models::ChangeType;
    use std::fs;
    use std::sync::Arc;

    const LAST_COMMIT: &str = "log -1 --name-status --pretty=format:%H|%an|%ae|%at|%s";

    fn committed_repo() -> FakeGitRunner {
        FakeGitRunner::new()
            .respond(
                LAST_COMMIT,
                "abc123|Ann|ann@x.org|1700000000|fix parser\n\nM\tsrc/lib.rs\nA\tlogo.png\nD\told.rs\n",
            )
            .respond("show --stat --format= abc123", " 3 files changed, 12 insertions(+), 4 deletions(-)\n")
            .respond("check-attr -a -- src/lib.rs", "")
            .respond("show --format= abc123:src/lib.rs", "pub mod parser;\n")
            .respond("check-attr -a -- logo.png", "logo.png: binary: set\n")
    }

    #[test]
    fn test_non_git_text_has_no_analysis() {
        let dir = tempfile::tempdir().unwrap();
        let mut analyzer = CommandAnalyzer::new(FakeGitRunner::new());
        assert_eq!(analyzer.analyze("ls -la", dir.path()), None);
        assert_eq!(analyzer.analyze("git status", dir.path()), None);
        assert_eq!(analyzer.analyze("git clone https://h/u/r.git", dir.path()), None);
    }

    #[test]
    fn test_commit_analysis() {
        let dir = tempfile::tempdir().unwrap();
        let mut analyzer = CommandAnalyzer::new(committed_repo());

        let Some(Analysis::Commit(commit)) =
            analyzer.analyze("git commit -m \"fix the parser\"", dir.path())
        else {
            panic!("expected commit analysis");
        };

        assert_eq!(commit.hash, "abc123");
        assert_eq!(commit.author, "Ann <ann@x.org>");
        assert_eq!(commit.message, "fix the parser");
        assert_eq!(commit.stats.insertions, 12);
        assert_eq!(commit.files.len(), 3);
        assert_eq!(commit.files[0].diff.as_deref(), Some("pub mod parser;"));
        assert_eq!(commit.files[1].diff.as_deref(), Some(BINARY_SENTINEL));
        assert_eq!(commit.files[2].change_type, ChangeType::Deleted);
        assert_eq!(commit.files[2].diff, None);

        assert_eq!(analyzer.last_commit(dir.path()), Some(&commit));
    }

    #[test]
    fn test_commit_message_falls_back_to_subject() {
        let dir = tempfile::tempdir().unwrap();
        let mut analyzer = CommandAnalyzer::new(committed_repo());
        let Some(Analysis::Commit(commit)) = analyzer.analyze("git commit --amend", dir.path())
        else {
            panic!("expected commit analysis");
        };
        assert_eq!(commit.message, "fix parser");
    }

    #[test]
    fn test_commit_in_missing_directory() {
        let mut analyzer = CommandAnalyzer::new(committed_repo());
        let gone = Path::new("/definitely/not/a/real/dir");
        assert_eq!(analyzer.analyze("git commit -m x", gone), None);
        assert_eq!(analyzer.tracked_directories(), 0);
    }

    #[test]
    fn test_push_links_previous_commit() {
        let dir = tempfile::tempdir().unwrap();
        let runner = committed_repo()
            .respond("remote get-url origin", "https://github.com/ann/parser.git\n")
            .respond("rev-parse --abbrev-ref HEAD", "main\n")
            .respond(
                "log --pretty=format:%H|%an|%ae|%at|%s main --",
                "abc123|Ann|ann@x.org|1700000000|fix parser\n",
            );
        let mut analyzer = CommandAnalyzer::new(runner);

        analyzer.analyze("git commit -m \"fix the parser\"", dir.path());
        let Some(Analysis::Push(push)) = analyzer.analyze("git push", dir.path()) else {
            panic!("expected push analysis");
        };

        assert_eq!(push.remote, "origin");
        assert_eq!(push.branch, "main");
        assert_eq!(push.hosting_repo.as_deref(), Some("https://github.com/ann/parser"));
        assert_eq!(push.commits.len(), 1);
        let associated = push.associated_commit.unwrap();
        assert_eq!(associated.hash, "abc123");
        assert_eq!(associated.message, "fix the parser");

        // Reading the correlation does not consume it.
        assert!(analyzer.last_commit(dir.path()).is_some());
    }

    #[test]
    fn test_push_in_other_directory_has_no_association() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        let mut analyzer = CommandAnalyzer::new(committed_repo());

        analyzer.analyze("git commit -m one", a.path());
        let Some(Analysis::Push(push)) = analyzer.analyze("git push upstream dev", b.path()) else {
            panic!("expected push analysis");
        };
        assert_eq!(push.remote, "upstream");
        assert_eq!(push.branch, "dev");
        assert_eq!(push.associated_commit, None);
        assert_eq!(push.remote_url, None);
        assert!(push.commits.is_empty());
    }

    #[test]
    fn test_push_from_detached_head_uses_fallback_branch() {
        let dir = tempfile::tempdir().unwrap();
        let runner = Arc::new(FakeGitRunner::new().respond("rev-parse --abbrev-ref HEAD", "HEAD\n"));
        let mut analyzer = CommandAnalyzer::new(Arc::clone(&runner));

        let Some(Analysis::Push(push)) = analyzer.analyze("git push", dir.path()) else {
            panic!("expected push analysis");
        };
        assert_eq!(push.branch, FALLBACK_PUSH_BRANCH);

        let calls = runner.calls();
        assert!(calls.iter().all(|call| !call.contains("origin/HEAD")));
        assert!(calls.iter().all(|call| !call.ends_with(" HEAD --")));
    }

    #[test]
    fn test_push_branch_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let mut analyzer = CommandAnalyzer::new(FakeGitRunner::new());
        let Some(Analysis::Push(push)) = analyzer.analyze("git push", dir.path()) else {
            panic!("expected push analysis");
        };
        assert_eq!(push.branch, FALLBACK_PUSH_BRANCH);
    }

    #[test]
    fn test_forget_drops_correlation() {
        let dir = tempfile::tempdir().unwrap();
        let mut analyzer = CommandAnalyzer::new(committed_repo());
        analyzer.analyze("git commit -m x", dir.path());
        assert!(analyzer.forget(dir.path()).is_some());
        assert!(analyzer.last_commit(dir.path()).is_none());
    }

    #[test]
    fn test_merge_and_pull() {
        let dir = tempfile::tempdir().unwrap();
        let runner = FakeGitRunner::new()
            .respond("rev-parse --abbrev-ref HEAD", "main\n")
            .respond("rev-parse HEAD", "def456\n")
            .respond("status", "Unmerged paths:\n\tboth modified: a.rs\n");
        let mut analyzer = CommandAnalyzer::new(runner);

        let Some(Analysis::Merge(merge)) = analyzer.analyze("git merge feature", dir.path()) else {
            panic!("expected merge analysis");
        };
        assert_eq!(merge.source_branch.as_deref(), Some("feature"));
        assert_eq!(merge.target_branch.as_deref(), Some("main"));
        assert!(merge.has_conflict);

        let Some(Analysis::Pull(pull)) = analyzer.analyze("git pull --rebase", dir.path()) else {
            panic!("expected pull analysis");
        };
        assert_eq!(pull.remote, "origin");
        assert_eq!(pull.branch.as_deref(), Some("main"));
        assert_eq!(pull.before_pull_commit.as_deref(), Some("def456"));
    }

    #[test]
    fn test_checkout_branch_and_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("README.md"), "hi").unwrap();
        let runner = FakeGitRunner::new().respond("rev-parse --abbrev-ref HEAD", "main\n");
        let mut analyzer = CommandAnalyzer::new(runner);

        let Some(Analysis::Checkout(co)) = analyzer.analyze("git checkout -b feature/x", dir.path())
        else {
            panic!("expected checkout analysis");
        };
        assert_eq!(co.target.as_deref(), Some("feature/x"));
        assert!(co.is_branch);
        assert!(co.create_branch);
        assert_eq!(co.previous_branch.as_deref(), Some("main"));

        let Some(Analysis::Checkout(co)) = analyzer.analyze("git checkout README.md", dir.path())
        else {
            panic!("expected checkout analysis");
        };
        assert!(!co.is_branch);
    }

    #[test]
    fn test_add_explicit_and_all() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.rs"), "").unwrap();
        let runner = FakeGitRunner::new().respond("status --porcelain", "A  a.rs\n?? b.rs\n");
        let mut analyzer = CommandAnalyzer::new(runner);

        let Some(Analysis::Add(add)) = analyzer.analyze("git add a.rs missing.rs", dir.path())
        else {
            panic!("expected add analysis");
        };
        assert_eq!(add.files, vec!["a.rs"]);

        let Some(Analysis::Add(add)) = analyzer.analyze("git add .", dir.path()) else {
            panic!("expected add analysis");
        };
        assert_eq!(add.files, vec!["a.rs", "b.rs"]);
    }

    #[test]
    fn test_remote_analysis() {
        let dir = tempfile::tempdir().unwrap();
        let mut analyzer = CommandAnalyzer::new(FakeGitRunner::new());
        let Some(Analysis::Remote(remote)) = analyzer.analyze(
            "git remote add origin git@github.com:ann/parser.git",
            dir.path(),
        ) else {
            panic!("expected remote analysis");
        };
        assert_eq!(remote.action, "add");
        assert_eq!(remote.name.as_deref(), Some("origin"));
        assert_eq!(remote.url.as_deref(), Some("git@github.com:ann/parser.git"));
    }
}
