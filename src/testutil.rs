//! In-memory doubles shared by unit tests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::git::{GitError, GitOutput, GitRunner};
use crate::tags::TagTool;

/// Records every git invocation (rendered as `"fetch fork"` etc.) and
/// optionally fails calls whose rendering starts with a scripted prefix.
#[derive(Default)]
pub struct RecordingGit {
    calls: RefCell<Vec<String>>,
    fail_on: Vec<&'static str>,
}

impl RecordingGit {
    pub fn failing_on(prefixes: &[&'static str]) -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            fail_on: prefixes.to_vec(),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl GitRunner for RecordingGit {
    fn run(&self, _cwd: &Path, args: &[&str]) -> Result<GitOutput, GitError> {
        let rendered = args.join(" ");
        self.calls.borrow_mut().push(rendered.clone());
        if self.fail_on.iter().any(|p| rendered.starts_with(p)) {
            return Err(GitError::Exit {
                command: format!("git {rendered}"),
                code: 1,
                stderr: "scripted failure".to_owned(),
            });
        }
        Ok(GitOutput::default())
    }
}

/// Tag store backed by a map — the [`TagTool`] double.
#[derive(Default)]
pub struct MemoryTags {
    store: RefCell<HashMap<PathBuf, Vec<String>>>,
}

impl MemoryTags {
    pub fn seed(&self, path: &Path, tags: &[&str]) {
        self.store.borrow_mut().insert(
            path.to_owned(),
            tags.iter().map(|t| (*t).to_owned()).collect(),
        );
    }

    pub fn get(&self, path: &Path) -> Vec<String> {
        self.store.borrow().get(path).cloned().unwrap_or_default()
    }
}

impl TagTool for MemoryTags {
    fn read(&self, path: &Path) -> Result<Vec<String>> {
        Ok(self.get(path))
    }

    fn apply(&self, path: &Path, tags: &[String]) -> Result<()> {
        let mut store = self.store.borrow_mut();
        let current = store.entry(path.to_owned()).or_default();
        for tag in tags {
            if !current.contains(tag) {
                current.push(tag.clone());
            }
        }
        Ok(())
    }

    fn remove(&self, path: &Path, tags: &[String]) -> Result<()> {
        let mut store = self.store.borrow_mut();
        if let Some(current) = store.get_mut(path) {
            current.retain(|tag| !tags.contains(tag));
        }
        Ok(())
    }
}
