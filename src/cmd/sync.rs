//! `forgesync sync` — bring the local mirror back in line with the remote
//! listing: acquire what is new, fetch/pull what exists, optionally prune
//! what is gone.

use anyhow::{Context, Result};
use clap::Args;

use forgesync_github::{GithubClient, Forge, RepoDescriptor};

use crate::classify::{classify_gist, classify_repo};
use crate::config::RunConfig;
use crate::git::{Git, GitRunner, SystemGit};
use crate::layout::{Category, Layout};
use crate::reconcile::{self, ReconcileOptions, ReconcileReport, RemoteEntry};
use crate::tags::{self, TagCommand, TagTool};

use super::{ForgeArgs, Listings, SelectionArgs, fetch_listings, resolve_identity, run_config};

/// Update the local mirror from the remote listing
///
/// Walks each category directory and matches every local clone against the
/// remote listing by name. Matches are fetched and pulled (forks pull their
/// `fork` remote first, then `upstream`), their filesystem tags refreshed,
/// and their submodules updated. Remotes with no local clone yet are
/// acquired. Local clones whose remote is gone are pruned with `--prune` —
/// the directory is deleted outright, uncommitted work included; run
/// `forgesync status` first if unsure.
#[derive(Args, Debug)]
pub struct SyncArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    #[command(flatten)]
    pub forge: ForgeArgs,

    /// Delete local clones whose remote no longer appears in any listing
    #[arg(long)]
    pub prune: bool,

    /// Pull with rebase instead of fast-forward only
    #[arg(long)]
    pub pull_with_rebase: bool,

    /// After a rebasing pull, push the result back to origin
    #[arg(long)]
    pub push_after_rebase: bool,

    /// After pulling upstream into a fork, push the result to the fork remote
    #[arg(long)]
    pub push_to_fork_remotes: bool,

    /// Use rebase semantics when submodule pointers moved upstream
    #[arg(long)]
    pub rebase_submodules: bool,
}

/// Sync behavior knobs, separated from the flag struct so tests can drive
/// the driver directly.
#[derive(Clone, Copy, Debug, Default)]
pub struct SyncOptions {
    pub prune: bool,
    pub rebase_on_pull: bool,
    pub push_after_rebase: bool,
    pub push_to_fork: bool,
    pub rebase_submodules: bool,
}

impl SyncArgs {
    fn options(&self) -> SyncOptions {
        SyncOptions {
            prune: self.prune,
            rebase_on_pull: self.pull_with_rebase,
            push_after_rebase: self.push_after_rebase,
            push_to_fork: self.push_to_fork_remotes,
            rebase_submodules: self.rebase_submodules,
        }
    }
}

pub fn run(args: &SyncArgs) -> Result<()> {
    let cfg = run_config(&args.selection, args.forge.api_url.as_deref())?;
    let client = GithubClient::new(&cfg.api_url, &args.forge.token)
        .context("Failed to build the forge client")?;
    run_with(&client, &SystemGit, &TagCommand::default(), &cfg, &args.options())
}

pub fn run_with(
    forge: &dyn Forge,
    runner: &dyn GitRunner,
    tagger: &dyn TagTool,
    cfg: &RunConfig,
    opts: &SyncOptions,
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

    let mut totals = ReconcileReport::default();
    let mut cloned = 0usize;

    // Fixed category order: repos first, then gists.
    for (category, dir) in layout.entries() {
        println!("Syncing {}...", category.label());

        // Acquire remotes with no local clone yet. Idempotent — an
        // existing clone is a no-op here and updated below.
        if category.is_gist() {
            for gist in gist_slice(&listings, category) {
                match super::clone::acquire_gist(&git, gist, dir) {
                    Ok(crate::clone::CloneStatus::Cloned) => {
                        println!("  \u{2713} {}: cloned", gist.display_name);
                        cloned += 1;
                    }
                    Ok(_) => {}
                    Err(err) => println!("  \u{2717} {}: {err:#}", gist.display_name),
                }
            }
        } else {
            for repo in repo_slice(&listings, category) {
                match super::clone::acquire_repo(&git, forge, tagger, repo, category, dir, cfg) {
                    Ok(crate::clone::CloneStatus::Cloned) => {
                        println!("  \u{2713} {}: cloned", repo.full_name());
                        cloned += 1;
                    }
                    Ok(_) => {}
                    Err(err) => println!("  \u{2717} {}: {err:#}", repo.full_name()),
                }
            }
        }

        // Reconcile what is on disk against the registry slice.
        let entries: Vec<RemoteEntry> = if category.is_gist() {
            gist_slice(&listings, category)
                .map(|gist| RemoteEntry::new(gist.display_name.clone(), Vec::new()))
                .collect()
        } else {
            repo_slice(&listings, category)
                .map(|repo| {
                    RemoteEntry::new(
                        repo.name.clone(),
                        tags::tag_set(&repo.topics, repo.language.as_deref()),
                    )
                })
                .collect()
        };

        let report = reconcile::reconcile(
            &git,
            tagger,
            dir,
            &entries,
            &ReconcileOptions {
                fork_layout: category.nests_by_parent_owner(),
                prune: opts.prune,
                rebase_on_pull: opts.rebase_on_pull,
                push_after_rebase: opts.push_after_rebase,
                push_to_fork: opts.push_to_fork,
                rebase_submodules: opts.rebase_submodules,
            },
        );
        totals.updated += report.updated;
        totals.pruned += report.pruned;
        totals.kept += report.kept;
        totals.failed += report.failed;
    }

    println!();
    println!(
        "Results: {} updated, {} cloned, {} pruned, {} failed",
        totals.updated, cloned, totals.pruned, totals.failed
    );
    if totals.kept > 0 {
        println!(
            "{} local clone(s) have no matching remote (use --prune to delete)",
            totals.kept
        );
    }
    Ok(())
}

/// The remote registry slice for one repo category: the ownership listing
/// filtered by classification, or the starred listing wholesale (starred is
/// its own listing, independent of fork/visibility flags).
fn repo_slice<'a>(
    listings: &'a Listings,
    category: Category,
) -> Box<dyn Iterator<Item = &'a RepoDescriptor> + 'a> {
    match category {
        Category::StarredRepos => Box::new(listings.starred.iter()),
        _ => Box::new(
            listings
                .repos
                .iter()
                .filter(move |repo| classify_repo(repo) == category),
        ),
    }
}

fn gist_slice<'a>(
    listings: &'a Listings,
    category: Category,
) -> Box<dyn Iterator<Item = &'a forgesync_github::GistDescriptor> + 'a> {
    match category {
        Category::StarredGists => Box::new(listings.starred_gists.iter()),
        _ => Box::new(
            listings
                .gists
                .iter()
                .filter(move |gist| classify_gist(gist) == category),
        ),
    }
}
