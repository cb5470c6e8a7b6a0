//! Clone execution.
//!
//! One-time acquisition of a repository, gist, or wiki into its category
//! path. Cloning is idempotent: an existing target directory means "already
//! cloned" and is never an error. Fork clones additionally establish the
//! dual-remote topology (`fork` = the user's fork, push target; `upstream` =
//! the parent, pull source) that every later sync assumes.

use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::warn;

use forgesync_github::{Forge, RepoDescriptor};

use crate::git::{Git, GitError, has_submodules};
use crate::tags::{self, TagTool};

/// What a clone call did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CloneStatus {
    /// A fresh clone was made.
    Cloned,
    /// The target directory already existed; nothing was touched.
    AlreadyCloned,
    /// Nothing to clone (no wiki flag, or the wiki remote does not exist).
    Skipped,
}

/// Clone a non-fork entity into `dest_dir/name`. The name is used verbatim
/// as the directory name. If the resulting working tree carries a submodule
/// manifest, submodules are initialized recursively.
pub fn clone_non_fork(
    git: &Git,
    dest_dir: &Path,
    name: &str,
    url: &str,
) -> Result<CloneStatus, GitError> {
    let target = dest_dir.join(name);
    if target.exists() {
        return Ok(CloneStatus::AlreadyCloned);
    }

    git.clone_into(dest_dir, url, name)?;
    if has_submodules(&target) {
        git.submodule_update(&target, false)?;
    }
    Ok(CloneStatus::Cloned)
}

/// Clone a fork with the dual-remote topology.
///
/// The destination is `fork_dir/{parent_owner}/{name}` — forks are
/// namespaced under the **parent's** owner so that two users' forks of the
/// same upstream never collide and stay discoverable by upstream identity.
///
/// Steps, each short-circuiting the rest on failure: clone; rename `origin`
/// to `fork`; probe the parent remote (abort before touching remote config
/// further if unreachable); add `upstream`; point the default branch's
/// tracked remote at `upstream` and its push remote at `fork`; tag the
/// directory with the **parent's** topics/language (the fork's own are
/// typically empty); optionally clone the parent's wiki alongside.
///
/// Completed steps are not rolled back — a mid-sequence failure can leave a
/// partially configured clone that needs manual correction.
pub fn clone_fork(
    git: &Git,
    forge: &dyn Forge,
    tagger: &dyn TagTool,
    repo: &RepoDescriptor,
    fork_dir: &Path,
    wikis_enabled: bool,
) -> Result<CloneStatus> {
    let parent = resolve_parent(forge, repo)?;

    let owner_dir = fork_dir.join(&parent.owner);
    let target = owner_dir.join(&repo.name);
    if target.exists() {
        return Ok(CloneStatus::AlreadyCloned);
    }

    std::fs::create_dir_all(&owner_dir)
        .with_context(|| format!("Failed to create {}", owner_dir.display()))?;

    git.clone_into(&owner_dir, &repo.ssh_url, &repo.name)?;
    if has_submodules(&target) {
        git.submodule_update(&target, false)?;
    }

    git.remote_rename(&target, "origin", "fork")?;

    if !git.remote_exists(&owner_dir, &parent.ssh_url)? {
        bail!(
            "upstream {} is unreachable at {}",
            parent.full_name(),
            parent.ssh_url
        );
    }
    git.remote_add(&target, "upstream", &parent.ssh_url)?;

    let branch = git.default_branch(&target, "fork")?;
    git.config_set(&target, &format!("branch.{branch}.remote"), "upstream")?;
    git.config_set(&target, &format!("branch.{branch}.pushRemote"), "fork")?;

    let tags = tags::tag_set(&parent.topics, parent.language.as_deref());
    tags::sync_tags(tagger, &target, &tags, false);

    if wikis_enabled {
        if let Err(err) = clone_wiki(git, &owner_dir, &repo.name, &parent.ssh_url, parent.has_wiki)
        {
            warn!(repo = %repo.full_name(), "wiki clone failed: {err}");
        }
    }

    Ok(CloneStatus::Cloned)
}

/// Clone the wiki repository next to its repo as `{name}.wiki`.
///
/// No-op unless the descriptor reports a wiki. The wiki remote is probed
/// first: a `has_wiki` flag with no actual git remote behind it (an empty
/// wiki) is expected and skipped, not an error.
pub fn clone_wiki(
    git: &Git,
    dest_dir: &Path,
    name: &str,
    ssh_url: &str,
    has_wiki: bool,
) -> Result<CloneStatus, GitError> {
    if !has_wiki {
        return Ok(CloneStatus::Skipped);
    }

    let wiki_name = format!("{name}.wiki");
    if dest_dir.join(&wiki_name).exists() {
        return Ok(CloneStatus::AlreadyCloned);
    }

    let url = wiki_url(ssh_url);
    if !git.remote_exists(dest_dir, &url)? {
        return Ok(CloneStatus::Skipped);
    }

    git.clone_into(dest_dir, &url, &wiki_name)?;
    Ok(CloneStatus::Cloned)
}

/// Wiki clone URL for a repository URL: `.../name.git` → `.../name.wiki.git`.
pub fn wiki_url(ssh_url: &str) -> String {
    match ssh_url.strip_suffix(".git") {
        Some(base) => format!("{base}.wiki.git"),
        None => format!("{ssh_url}.wiki"),
    }
}

/// The fork's parent: embedded in the descriptor when the payload carried
/// it, otherwise resolved with a dedicated full-repository read.
fn resolve_parent(forge: &dyn Forge, repo: &RepoDescriptor) -> Result<RepoDescriptor> {
    if let Some(parent) = &repo.parent {
        return Ok((**parent).clone());
    }
    let full = forge
        .get_repository(&repo.owner, &repo.name)
        .with_context(|| format!("Failed to read {} to resolve its parent", repo.full_name()))?;
    match full.parent {
        Some(parent) => Ok(*parent),
        None => bail!(
            "{} is listed as a fork but has no parent repository",
            repo.full_name()
        ),
    }
}
