//! Reconciliation engine.
//!
//! Walks one category directory, matches each local entry against the
//! remote registry slice by exact name, and applies the category's update
//! protocol to matches: fetch/pull (dual-remote for forks), tag refresh,
//! submodule update. Local entries with no remote match fall under the
//! prune policy.
//!
//! Forks reconcile `fork` strictly before `upstream`: `fork` is the
//! authoritative local push target and may carry independent commits that
//! must be visible before upstream history is merged in. Pulling upstream
//! first could manufacture rebase conflicts against not-yet-visible fork
//! state.
//!
//! Pruning deletes the directory outright, uncommitted work included — no
//! dirtiness check happens first. That mirrors the long-standing behavior
//! of this tool family; run `status` before `sync --prune` if in doubt.

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::git::{Git, GitError, has_submodules};
use crate::tags::{self, TagTool};

/// One remote registry item as the engine sees it: a name to match on and
/// the freshly derived tag set for the refresh step. Built from descriptors
/// by the sync driver; the engine never touches forge types.
#[derive(Clone, Debug)]
pub struct RemoteEntry {
    pub name: String,
    pub tags: Vec<String>,
}

impl RemoteEntry {
    pub fn new(name: impl Into<String>, tags: Vec<String>) -> Self {
        Self {
            name: name.into(),
            tags,
        }
    }
}

/// Per-category knobs for one reconcile pass.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReconcileOptions {
    /// Entries nest one level deeper, under parent-owner directories, and
    /// get the dual-remote (`fork`/`upstream`) update protocol.
    pub fork_layout: bool,
    /// Delete local entries with no matching remote.
    pub prune: bool,
    /// Pull with `--rebase` instead of `--ff-only`.
    pub rebase_on_pull: bool,
    /// After a rebasing pull on a non-fork, push the result back to origin.
    pub push_after_rebase: bool,
    /// After pulling upstream into a fork, push the result to `fork`.
    pub push_to_fork: bool,
    /// Ask for rebase semantics when a submodule pointer moved upstream.
    pub rebase_submodules: bool,
}

/// Counts for the end-of-category summary line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub updated: usize,
    pub pruned: usize,
    /// Unmatched entries left alone because pruning was off.
    pub kept: usize,
    pub failed: usize,
}

/// A directory discovered under the category path. Recomputed on every
/// pass, never cached across runs.
#[derive(Debug)]
struct LocalEntry {
    name: String,
    path: PathBuf,
}

/// Reconcile one category directory against its remote registry slice.
///
/// A category path that does not exist is nothing to reconcile (the
/// category was disabled at clone time) and returns an empty report.
/// Per-entry failures are reported and counted; they never abort the pass.
pub fn reconcile(
    git: &Git,
    tagger: &dyn TagTool,
    dir: &Path,
    remotes: &[RemoteEntry],
    opts: &ReconcileOptions,
) -> ReconcileReport {
    let mut report = ReconcileReport::default();
    if !dir.exists() {
        return report;
    }

    for entry in scan_entries(dir, opts.fork_layout) {
        // `{name}.wiki` directories belong to the repo named `{name}`:
        // matched together, updated with the plain protocol, pruned only
        // when the repo itself is gone.
        let (match_name, is_wiki) = match entry.name.strip_suffix(".wiki") {
            Some(base) => (base, true),
            None => (entry.name.as_str(), false),
        };

        match remotes.iter().find(|remote| remote.name == match_name) {
            Some(remote) => match update_entry(git, tagger, &entry.path, remote, is_wiki, opts) {
                Ok(()) => {
                    println!("  \u{2713} {}", entry.name);
                    report.updated += 1;
                }
                Err(err) => {
                    println!("  \u{2717} {}: {err}", entry.name);
                    report.failed += 1;
                }
            },
            None if opts.prune => match std::fs::remove_dir_all(&entry.path) {
                Ok(()) => {
                    println!("  \u{2713} {}: pruned (no matching remote)", entry.name);
                    report.pruned += 1;
                }
                Err(err) => {
                    println!("  \u{2717} {}: failed to prune - {err}", entry.name);
                    report.failed += 1;
                }
            },
            None => {
                report.kept += 1;
            }
        }
    }

    if opts.fork_layout && opts.prune {
        remove_empty_owner_dirs(dir);
    }

    report
}

/// The update protocol for one matched entry. Any step failure aborts the
/// entry's remaining steps; completed steps stay done.
fn update_entry(
    git: &Git,
    tagger: &dyn TagTool,
    path: &Path,
    remote: &RemoteEntry,
    is_wiki: bool,
    opts: &ReconcileOptions,
) -> Result<(), GitError> {
    if opts.fork_layout && !is_wiki {
        git.fetch(path, "fork")?;
        git.pull(path, "fork", opts.rebase_on_pull)?;
        git.fetch(path, "upstream")?;
        git.pull(path, "upstream", opts.rebase_on_pull)?;
        if opts.push_to_fork {
            git.push(path, "fork")?;
        }
    } else {
        git.fetch(path, "origin")?;
        git.pull(path, "origin", opts.rebase_on_pull)?;
        if opts.rebase_on_pull && opts.push_after_rebase {
            git.push(path, "origin")?;
        }
    }

    if !is_wiki {
        tags::sync_tags(tagger, path, &remote.tags, true);

        // The most failure-tolerant step, deliberately last: a broken
        // submodule must not undo the tag refresh that already happened.
        if has_submodules(path)
            && let Err(err) = git.submodule_update(path, opts.rebase_submodules)
        {
            warn!(path = %path.display(), "submodule update failed: {err}");
        }
    }

    Ok(())
}

fn scan_entries(dir: &Path, fork_layout: bool) -> Vec<LocalEntry> {
    if !fork_layout {
        return subdirs(dir);
    }
    // Fork categories nest one level: owner dirs, then the entries.
    let mut entries = Vec::new();
    for owner in subdirs(dir) {
        entries.extend(subdirs(&owner.path));
    }
    entries
}

/// Immediate subdirectories. Symlinks and non-directories are skipped, as
/// are names that are not valid Unicode. Sorted for consistent output.
fn subdirs(dir: &Path) -> Vec<LocalEntry> {
    let Ok(read) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut out: Vec<LocalEntry> = read
        .filter_map(std::result::Result::ok)
        .filter(|entry| {
            let path = entry.path();
            !path.is_symlink() && path.is_dir()
        })
        .filter_map(|entry| {
            let name = entry.file_name().into_string().ok()?;
            Some(LocalEntry {
                name,
                path: entry.path(),
            })
        })
        .collect();
    out.sort_by(|a, b| a.name.cmp(&b.name));
    out
}

/// Pruning the last fork under an owner directory leaves the owner
/// directory empty; sweep those away too.
fn remove_empty_owner_dirs(dir: &Path) {
    for owner in subdirs(dir) {
        let empty = std::fs::read_dir(&owner.path)
            .map(|mut entries| entries.next().is_none())
            .unwrap_or(false);
        if empty && let Err(err) = std::fs::remove_dir(&owner.path) {
            warn!(path = %owner.path.display(), "failed to remove empty owner dir: {err}");
        }
    }
}
