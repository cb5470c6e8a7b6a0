//! `forgesync clone` — one-time acquisition of everything the account owns
//! (and stars) into the mirror tree.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use tracing::warn;

use forgesync_github::{Forge, GistDescriptor, GithubClient, RepoDescriptor};

use crate::classify::{classify_gist, classify_repo};
use crate::clone::{self, CloneStatus};
use crate::config::RunConfig;
use crate::git::{Git, GitRunner, SystemGit};
use crate::layout::{Category, Layout};
use crate::tags::{self, TagCommand, TagTool};

use super::{ForgeArgs, SelectionArgs, fetch_listings, resolve_identity, run_config};

/// Mirror an account's repositories, gists, and wikis to local disk
///
/// Lists everything the account owns (and stars), classifies each entity
/// into exactly one category — forked beats private beats public; starred
/// is its own listing — and clones whatever is not already present.
/// Existing clones are left alone; `forgesync sync` is the update path.
///
/// Forks get a dual-remote setup: `fork` points at your fork (pushes go
/// there), `upstream` at the parent (pulls come from there), nested under
/// the parent owner's name on disk.
#[derive(Args, Debug)]
pub struct CloneArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    #[command(flatten)]
    pub forge: ForgeArgs,
}

pub fn run(args: &CloneArgs) -> Result<()> {
    let cfg = run_config(&args.selection, args.forge.api_url.as_deref())?;
    let client = GithubClient::new(&cfg.api_url, &args.forge.token)
        .context("Failed to build the forge client")?;
    run_with(&client, &SystemGit, &TagCommand::default(), &cfg)
}

/// Driver body, generic over the collaborators so tests can substitute an
/// in-memory forge and a recording tag store.
pub fn run_with(
    forge: &dyn Forge,
    runner: &dyn GitRunner,
    tagger: &dyn TagTool,
    cfg: &RunConfig,
) -> Result<()> {
    let git = Git::new(runner);

    let (kind, login, target) = resolve_identity(forge, cfg)?;
    let layout = Layout::resolve(&cfg.base_dir, kind, &login, &cfg.categories);
    layout.create_enabled().with_context(|| {
        format!(
            "Failed to create mirror directories under {}",
            layout.root().display()
        )
    })?;

    let listings = fetch_listings(forge, cfg, &layout, &target, &login)?;

    let mut tally = Tally::default();

    for repo in &listings.repos {
        let category = classify_repo(repo);
        let Some(dir) = layout.dir(category) else {
            continue;
        };
        let outcome = acquire_repo(&git, forge, tagger, repo, category, dir, cfg);
        tally.record(&repo.full_name(), outcome);
    }

    if let Some(dir) = layout.dir(Category::StarredRepos) {
        for repo in &listings.starred {
            let outcome = acquire_repo(&git, forge, tagger, repo, Category::StarredRepos, dir, cfg);
            tally.record(&repo.full_name(), outcome);
        }
    }

    for gist in &listings.gists {
        let Some(dir) = layout.dir(classify_gist(gist)) else {
            continue;
        };
        tally.record(&gist.display_name, acquire_gist(&git, gist, dir));
    }

    if let Some(dir) = layout.dir(Category::StarredGists) {
        for gist in &listings.starred_gists {
            tally.record(&gist.display_name, acquire_gist(&git, gist, dir));
        }
    }

    println!();
    println!(
        "Results: {} cloned, {} already present, {} failed",
        tally.cloned, tally.present, tally.failed
    );
    Ok(())
}

/// Clone one repository into its category directory. Per-entity failures
/// are the caller's to report; they never abort the run.
pub(crate) fn acquire_repo(
    git: &Git,
    forge: &dyn Forge,
    tagger: &dyn TagTool,
    repo: &RepoDescriptor,
    category: Category,
    dir: &Path,
    cfg: &RunConfig,
) -> Result<CloneStatus> {
    if category.nests_by_parent_owner() {
        return clone::clone_fork(git, forge, tagger, repo, dir, cfg.categories.wikis);
    }

    let status = clone::clone_non_fork(git, dir, &repo.name, &repo.ssh_url)?;
    if status == CloneStatus::Cloned {
        apply_fresh_tags(forge, tagger, repo, &dir.join(&repo.name));
        if cfg.categories.wikis
            && let Err(err) = clone::clone_wiki(git, dir, &repo.name, &repo.ssh_url, repo.has_wiki)
        {
            warn!(repo = %repo.full_name(), "wiki clone failed: {err}");
        }
    }
    Ok(status)
}

pub(crate) fn acquire_gist(git: &Git, gist: &GistDescriptor, dir: &Path) -> Result<CloneStatus> {
    Ok(clone::clone_non_fork(
        git,
        dir,
        &gist.display_name,
        &gist.pull_url,
    )?)
}

/// Tag a freshly cloned repository from the dedicated topics endpoint.
/// A topics fetch failure is fatal for this repository's tagging step only.
fn apply_fresh_tags(forge: &dyn Forge, tagger: &dyn TagTool, repo: &RepoDescriptor, path: &Path) {
    match forge.list_topics(&repo.owner, &repo.name) {
        Ok(topics) => {
            let tags = tags::tag_set(&topics, repo.language.as_deref());
            tags::sync_tags(tagger, path, &tags, false);
        }
        Err(err) => {
            warn!(repo = %repo.full_name(), "failed to fetch topics: {err}");
        }
    }
}

#[derive(Default)]
struct Tally {
    cloned: usize,
    present: usize,
    failed: usize,
}

impl Tally {
    fn record(&mut self, name: &str, outcome: Result<CloneStatus>) {
        match outcome {
            Ok(CloneStatus::Cloned) => {
                println!("  \u{2713} {name}");
                self.cloned += 1;
            }
            Ok(CloneStatus::AlreadyCloned) => self.present += 1,
            Ok(CloneStatus::Skipped) => {}
            Err(err) => {
                println!("  \u{2717} {name}: {err:#}");
                self.failed += 1;
            }
        }
    }
}
