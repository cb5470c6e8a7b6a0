//! Shared test helpers for forgesync integration tests.
//!
//! All tests use temp directories — no side effects outside them. Remote
//! repositories are local bare repos; their filesystem paths stand in for
//! SSH URLs, which git clones and fetches just the same.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use anyhow::Result;

use forgesync::tags::TagTool;
use forgesync_github::{Forge, ForgeError, GistDescriptor, ListTarget, RepoDescriptor};

/// Run git, asserting success, returning stdout.
pub fn git(dir: &Path, args: &[&str]) -> String {
    let out = try_git(dir, args);
    assert!(
        out.status.success(),
        "git {:?} failed in {}: {}",
        args,
        dir.display(),
        String::from_utf8_lossy(&out.stderr)
    );
    String::from_utf8_lossy(&out.stdout).into_owned()
}

pub fn try_git(dir: &Path, args: &[&str]) -> Output {
    Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("failed to spawn git")
}

/// Initialize a working repo with a `main` branch, identity config, and one
/// commit.
pub fn seed_repo(dir: &Path) {
    std::fs::create_dir_all(dir).unwrap();
    git(dir, &["init", "-b", "main"]);
    configure_identity(dir);
    std::fs::write(dir.join("README.md"), "# seed\n").unwrap();
    git(dir, &["add", "-A"]);
    git(dir, &["commit", "-m", "initial commit"]);
}

pub fn configure_identity(dir: &Path) {
    git(dir, &["config", "user.email", "tester@example.com"]);
    git(dir, &["config", "user.name", "Tester"]);
}

/// Create a bare "remote" named `{name}.git` under `parent`, seeded with one
/// commit on `main`. Returns the bare path — usable wherever an SSH URL is
/// expected.
pub fn init_remote(parent: &Path, name: &str) -> PathBuf {
    let seed = parent.join(format!("{name}-seed"));
    seed_repo(&seed);
    let bare = parent.join(format!("{name}.git"));
    git(
        parent,
        &[
            "clone",
            "--bare",
            seed.to_str().unwrap(),
            bare.to_str().unwrap(),
        ],
    );
    std::fs::remove_dir_all(&seed).unwrap();
    bare
}

/// Push a new commit to a bare remote's `main` via a throwaway writer clone.
pub fn push_commit(bare: &Path, file: &str, content: &str, message: &str) {
    let writer = tempfile::tempdir().unwrap();
    git(
        writer.path(),
        &["clone", bare.to_str().unwrap(), "writer"],
    );
    let clone = writer.path().join("writer");
    configure_identity(&clone);
    std::fs::write(clone.join(file), content).unwrap();
    git(&clone, &["add", "-A"]);
    git(&clone, &["commit", "-m", message]);
    git(&clone, &["push", "origin", "main"]);
}

/// Local commit inside an existing clone, without pushing.
pub fn commit_local(repo: &Path, file: &str, content: &str, message: &str) {
    std::fs::write(repo.join(file), content).unwrap();
    git(repo, &["add", "-A"]);
    git(repo, &["commit", "-m", message]);
}

/// Minimal repo descriptor pointing at a local bare remote.
pub fn descriptor(name: &str, owner: &str, url: &Path) -> RepoDescriptor {
    RepoDescriptor {
        name: name.to_owned(),
        owner: owner.to_owned(),
        is_private: false,
        is_fork: false,
        parent: None,
        ssh_url: url.to_string_lossy().into_owned(),
        has_wiki: false,
        topics: Vec::new(),
        language: None,
    }
}

/// Tag store backed by a map — stands in for the external tag utility.
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

/// In-memory forge serving fixed descriptor lists.
#[derive(Default)]
pub struct FakeForge {
    pub login: String,
    pub repos: Vec<RepoDescriptor>,
    pub starred: Vec<RepoDescriptor>,
    pub gists: Vec<GistDescriptor>,
    pub starred_gists: Vec<GistDescriptor>,
    pub topics: HashMap<String, Vec<String>>,
}

impl FakeForge {
    pub fn new(login: &str) -> Self {
        Self {
            login: login.to_owned(),
            ..Self::default()
        }
    }

    /// Register topics served by `list_topics` for `owner/name`.
    pub fn set_topics(&mut self, full_name: &str, topics: &[&str]) {
        self.topics.insert(
            full_name.to_owned(),
            topics.iter().map(|t| (*t).to_owned()).collect(),
        );
    }
}

impl Forge for FakeForge {
    fn viewer_login(&self) -> Result<String, ForgeError> {
        Ok(self.login.clone())
    }

    fn list_repositories(&self, _target: &ListTarget) -> Result<Vec<RepoDescriptor>, ForgeError> {
        Ok(self.repos.clone())
    }

    fn list_starred(&self) -> Result<Vec<RepoDescriptor>, ForgeError> {
        Ok(self.starred.clone())
    }

    fn get_repository(&self, owner: &str, name: &str) -> Result<RepoDescriptor, ForgeError> {
        self.repos
            .iter()
            .chain(self.starred.iter())
            .find(|repo| repo.owner == owner && repo.name == name)
            .cloned()
            .ok_or(ForgeError::Status {
                url: format!("fake:/repos/{owner}/{name}"),
                code: 404,
            })
    }

    fn list_topics(&self, owner: &str, name: &str) -> Result<Vec<String>, ForgeError> {
        Ok(self
            .topics
            .get(&format!("{owner}/{name}"))
            .cloned()
            .unwrap_or_default())
    }

    fn list_gists(&self, _target: &ListTarget) -> Result<Vec<GistDescriptor>, ForgeError> {
        Ok(self.gists.clone())
    }

    fn list_starred_gists(&self) -> Result<Vec<GistDescriptor>, ForgeError> {
        Ok(self.starred_gists.clone())
    }
}
