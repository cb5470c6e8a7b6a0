//! Command drivers: flag surfaces and the wiring between the forge client,
//! the git layer, and the engines. All flag combinations resolve into the
//! immutable [`RunConfig`] before any work starts.

pub mod clone;
pub mod doctor;
pub mod status;
pub mod sync;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use forgesync_github::{Forge, GistDescriptor, ListTarget, RepoDescriptor};

use crate::config::{Categories, DEFAULT_API_URL, DEFAULT_WIP_BRANCH, FileConfig, RunConfig};
use crate::layout::{Category, IdentityKind, Layout};

/// Category selection and identity flags shared by all subcommands.
#[derive(Args, Debug, Default)]
pub struct SelectionArgs {
    /// Mirror a named organization instead of the authenticated user
    #[arg(long, value_name = "NAME")]
    pub organization: Option<String>,

    /// Skip listed repositories owned by an organization the user belongs
    /// to — they are clonable through that organization's own listing
    #[arg(long)]
    pub dedupe_org_repos_created_by_user: bool,

    /// Root directory of the local mirror tree
    #[arg(long, value_name = "PATH")]
    pub base_dir: Option<PathBuf>,

    /// Skip public repositories
    #[arg(long)]
    pub no_public_repos: bool,
    /// Skip private repositories
    #[arg(long)]
    pub no_private_repos: bool,
    /// Skip forked repositories
    #[arg(long)]
    pub no_forked_repos: bool,
    /// Skip starred repositories
    #[arg(long)]
    pub no_starred_repos: bool,
    /// Skip wikis
    #[arg(long)]
    pub no_wikis: bool,
    /// Skip repositories entirely
    #[arg(long)]
    pub no_repos: bool,
    /// Skip public gists
    #[arg(long)]
    pub no_public_gists: bool,
    /// Skip private gists
    #[arg(long)]
    pub no_private_gists: bool,
    /// Skip forked gists
    #[arg(long)]
    pub no_forked_gists: bool,
    /// Skip starred gists
    #[arg(long)]
    pub no_starred_gists: bool,
    /// Skip gists entirely
    #[arg(long)]
    pub no_gists: bool,

    /// Only public repositories (disables all sibling categories)
    #[arg(long)]
    pub only_public_repos: bool,
    /// Only private repositories (disables all sibling categories)
    #[arg(long)]
    pub only_private_repos: bool,
    /// Only forked repositories (disables all sibling categories)
    #[arg(long)]
    pub only_forked_repos: bool,
    /// Only starred repositories (disables all sibling categories)
    #[arg(long)]
    pub only_starred_repos: bool,
    /// Only public gists (disables all sibling categories)
    #[arg(long)]
    pub only_public_gists: bool,
    /// Only private gists (disables all sibling categories)
    #[arg(long)]
    pub only_private_gists: bool,
    /// Only forked gists (disables all sibling categories)
    #[arg(long)]
    pub only_forked_gists: bool,
    /// Only starred gists (disables all sibling categories)
    #[arg(long)]
    pub only_starred_gists: bool,
}

impl SelectionArgs {
    /// Resolve the no-/only- flag combinations into the enabled category
    /// set. Any `--only-*` flag starts from nothing and enables the named
    /// categories; `--no-*` flags then disable on top.
    pub fn categories(&self) -> Categories {
        let any_only = self.only_public_repos
            || self.only_private_repos
            || self.only_forked_repos
            || self.only_starred_repos
            || self.only_public_gists
            || self.only_private_gists
            || self.only_forked_gists
            || self.only_starred_gists;

        let mut categories = if any_only {
            let mut categories = Categories::none();
            categories.public_repos = self.only_public_repos;
            categories.private_repos = self.only_private_repos;
            categories.forked_repos = self.only_forked_repos;
            categories.starred_repos = self.only_starred_repos;
            categories.public_gists = self.only_public_gists;
            categories.private_gists = self.only_private_gists;
            categories.forked_gists = self.only_forked_gists;
            categories.starred_gists = self.only_starred_gists;
            // Wikis ride along with whatever repo categories survive.
            categories.wikis = categories.any_repos();
            categories
        } else {
            Categories::all()
        };

        if self.no_repos {
            categories.public_repos = false;
            categories.private_repos = false;
            categories.forked_repos = false;
            categories.starred_repos = false;
            categories.wikis = false;
        }
        if self.no_gists {
            categories.public_gists = false;
            categories.private_gists = false;
            categories.forked_gists = false;
            categories.starred_gists = false;
        }
        if self.no_public_repos {
            categories.public_repos = false;
        }
        if self.no_private_repos {
            categories.private_repos = false;
        }
        if self.no_forked_repos {
            categories.forked_repos = false;
        }
        if self.no_starred_repos {
            categories.starred_repos = false;
        }
        if self.no_public_gists {
            categories.public_gists = false;
        }
        if self.no_private_gists {
            categories.private_gists = false;
        }
        if self.no_forked_gists {
            categories.forked_gists = false;
        }
        if self.no_starred_gists {
            categories.starred_gists = false;
        }
        if self.no_wikis {
            categories.wikis = false;
        }

        categories
    }
}

/// Forge access flags, on the subcommands that talk to the API.
#[derive(Args, Debug)]
pub struct ForgeArgs {
    /// Personal access token for the forge API
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: String,

    /// Forge API endpoint
    #[arg(long, value_name = "URL")]
    pub api_url: Option<String>,
}

/// Resolve flags plus the optional config file into the run configuration.
pub fn run_config(selection: &SelectionArgs, api_url_flag: Option<&str>) -> Result<RunConfig> {
    let file = FileConfig::load()?;

    let base_dir = match selection.base_dir.clone().or(file.base_dir) {
        Some(dir) => dir,
        None => dirs::home_dir()
            .context("Cannot determine a home directory; pass --base-dir")?
            .join("forgesync"),
    };
    let api_url = api_url_flag
        .map(str::to_owned)
        .or(file.api_url)
        .unwrap_or_else(|| DEFAULT_API_URL.to_owned());

    Ok(RunConfig {
        base_dir,
        api_url,
        organization: selection.organization.clone(),
        dedupe_org_repos: selection.dedupe_org_repos_created_by_user,
        categories: selection.categories(),
        wip_branch: file.wip_branch.unwrap_or_else(|| DEFAULT_WIP_BRANCH.to_owned()),
    })
}

/// Who this run mirrors, and how listings are scoped. Authenticating the
/// primary identity is the one forge failure that is fatal for the run.
pub(crate) fn resolve_identity(
    forge: &dyn Forge,
    cfg: &RunConfig,
) -> Result<(IdentityKind, String, ListTarget)> {
    match &cfg.organization {
        Some(org) => Ok((
            IdentityKind::Organization,
            org.clone(),
            ListTarget::Organization(org.clone()),
        )),
        None => {
            let login = forge
                .viewer_login()
                .context("Failed to authenticate with the forge")?;
            Ok((IdentityKind::User, login, ListTarget::Viewer))
        }
    }
}

/// Everything one run needs from the forge, fetched up front.
pub(crate) struct Listings {
    pub repos: Vec<RepoDescriptor>,
    pub starred: Vec<RepoDescriptor>,
    pub gists: Vec<GistDescriptor>,
    pub starred_gists: Vec<GistDescriptor>,
}

pub(crate) fn fetch_listings(
    forge: &dyn Forge,
    cfg: &RunConfig,
    layout: &Layout,
    target: &ListTarget,
    login: &str,
) -> Result<Listings> {
    let own_repos_wanted = cfg.categories.public_repos
        || cfg.categories.private_repos
        || cfg.categories.forked_repos;
    let own_gists_wanted = cfg.categories.public_gists
        || cfg.categories.private_gists
        || cfg.categories.forked_gists;

    let mut repos = if own_repos_wanted {
        forge
            .list_repositories(target)
            .context("Failed to list repositories")?
    } else {
        Vec::new()
    };
    if cfg.organization.is_none() && cfg.dedupe_org_repos {
        repos.retain(|repo| repo.owner == login);
    }

    let starred = if layout.dir(Category::StarredRepos).is_some() {
        forge
            .list_starred()
            .context("Failed to list starred repositories")?
    } else {
        Vec::new()
    };

    let gists = if own_gists_wanted {
        forge.list_gists(target).context("Failed to list gists")?
    } else {
        Vec::new()
    };

    let starred_gists = if layout.dir(Category::StarredGists).is_some() {
        forge
            .list_starred_gists()
            .context("Failed to list starred gists")?
    } else {
        Vec::new()
    };

    Ok(Listings {
        repos,
        starred,
        gists,
        starred_gists,
    })
}
