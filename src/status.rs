//! Local status scanning.
//!
//! Walks the mirror tree for git repositories and reports working-tree
//! dirtiness plus unpushed-commit state per branch. With WIP mode on, dirty
//! repositories get their changes committed to a dedicated snapshot branch
//! and pushed before being reported — "changes preserved" rather than
//! "dirty".

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};

use crate::git::{Git, GitError};

/// Working-tree condition of one repository.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RepoState {
    Clean,
    Dirty,
    /// Was dirty; the changes now live on the WIP snapshot branch, pushed
    /// upstream.
    ChangesPreserved,
}

/// Unpushed-commit count for one local branch.
#[derive(Clone, Debug, Serialize)]
pub struct BranchStatus {
    pub name: String,
    pub unpushed: u64,
}

/// Status of one mirrored repository.
#[derive(Debug, Serialize)]
pub struct RepoSummary {
    pub name: String,
    pub path: PathBuf,
    /// Category inferred from path segments. Display grouping only — never
    /// fed back into any engine decision.
    pub category: String,
    pub state: RepoState,
    pub branches: Vec<BranchStatus>,
}

impl RepoSummary {
    pub fn has_unpushed(&self) -> bool {
        self.branches.iter().any(|branch| branch.unpushed > 0)
    }

    pub fn unpushed_total(&self) -> u64 {
        self.branches.iter().map(|branch| branch.unpushed).sum()
    }
}

#[derive(Clone, Debug)]
pub struct StatusOptions {
    /// Commit and push dirty working trees to the snapshot branch before
    /// reporting.
    pub wip: bool,
    /// Snapshot branch name.
    pub wip_branch: String,
}

impl Default for StatusOptions {
    fn default() -> Self {
        Self {
            wip: false,
            wip_branch: crate::config::DEFAULT_WIP_BRANCH.to_owned(),
        }
    }
}

/// Scan every git repository under `root`, sorted by name for display.
///
/// A repository whose status check fails (anything other than the expected
/// no-upstream case) is logged and dropped from the summaries; the scan
/// itself continues.
pub fn scan(git: &Git, root: &Path, opts: &StatusOptions) -> Vec<RepoSummary> {
    let mut repos = Vec::new();
    collect_repos(root, 0, &mut repos);

    let mut summaries = Vec::new();
    for path in repos {
        match scan_repo(git, &path, opts) {
            Ok(summary) => summaries.push(summary),
            Err(err) => {
                warn!(path = %path.display(), "status check failed: {err}");
                println!("  \u{2717} {}: {err}", path.display());
            }
        }
    }
    summaries.sort_by(|a, b| a.name.cmp(&b.name));
    summaries
}

/// Max directory depth under the scan root before giving up:
/// `{user|organization}/{identity}/{family}/{segment}/{owner}/{repo}`.
const MAX_DEPTH: usize = 6;

fn collect_repos(dir: &Path, depth: usize, out: &mut Vec<PathBuf>) {
    if depth > MAX_DEPTH {
        return;
    }
    let Ok(read) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in read.filter_map(std::result::Result::ok) {
        let path = entry.path();
        if path.is_symlink() || !path.is_dir() {
            continue;
        }
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        if path.join(".git").exists() {
            out.push(path);
        } else {
            let had_children = out.len();
            collect_repos(&path, depth + 1, out);
            if out.len() == had_children {
                debug!(path = %path.display(), "not a git repository, skipping");
            }
        }
    }
}

fn scan_repo(git: &Git, path: &Path, opts: &StatusOptions) -> Result<RepoSummary, GitError> {
    let dirty = !git.status_short(path)?.trim().is_empty();

    let mut state = if dirty { RepoState::Dirty } else { RepoState::Clean };
    if dirty && opts.wip {
        match preserve_wip(git, path, &opts.wip_branch) {
            Ok(()) => state = RepoState::ChangesPreserved,
            Err(err) => {
                warn!(path = %path.display(), "failed to preserve work in progress: {err}");
            }
        }
    }

    let mut branches = Vec::new();
    for branch in git.local_branches(path)? {
        let unpushed = git.unpushed_count(path, &branch)?;
        branches.push(BranchStatus {
            name: branch,
            unpushed,
        });
    }

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    Ok(RepoSummary {
        name,
        category: category_hint(path),
        path: path.to_owned(),
        state,
        branches,
    })
}

/// Snapshot uncommitted work: new branch, stage everything, commit with a
/// timestamped message, push the branch upstream.
fn preserve_wip(git: &Git, path: &Path, branch: &str) -> Result<(), GitError> {
    git.checkout_new_branch(path, branch)?;
    git.add_all(path)?;
    let message = format!(
        "wip: snapshot {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    git.commit(path, &message)?;
    git.push_set_upstream(path, "origin", branch)?;
    Ok(())
}

/// Category label from path segments, e.g. "public repos". Presentation
/// only.
pub fn category_hint(path: &Path) -> String {
    let components: Vec<String> = path
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    for window in components.windows(2) {
        let (family, segment) = (window[0].as_str(), window[1].as_str());
        if matches!(family, "repos" | "gists")
            && matches!(segment, "public" | "private" | "forked" | "starred")
        {
            return format!("{segment} {family}");
        }
    }
    "uncategorized".to_owned()
}
