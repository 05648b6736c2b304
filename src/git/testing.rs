use super::GitError;
use crate::datasource::GitRunner;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

/// Canned git output keyed by the space-joined argument list.
///
/// Unregistered calls fail with a non-zero exit, like a real git refusing.
#[derive(Default)]
pub(crate) struct FakeGitRunner {
    responses: HashMap<String, String>,
    calls: Mutex<Vec<String>>,
}

impl FakeGitRunner {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond(mut self, args: &str, stdout: &str) -> Self {
        self.responses.insert(args.to_string(), stdout.to_string());
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl GitRunner for FakeGitRunner {
    fn run(&self, args: &[&str], _cwd: &Path) -> Result<String, GitError> {
        let key = args.join(" ");
        self.calls.lock().unwrap().push(key.clone());
        self.responses
            .get(&key)
            .cloned()
            .ok_or(GitError::NonZeroExit {
                args: key,
                code: Some(128),
                stderr: "fatal: not stubbed".to_string(),
            })
    }
}
