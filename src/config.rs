//! Run configuration.
//!
//! All branching behavior is resolved once, up front, into an immutable
//! [`RunConfig`] that every component takes as an explicit parameter — there
//! is no ambient or global state. Defaults come from an optional
//! `.forgesync.toml` (current directory, then the user config dir), loaded
//! the same way flags are: before anything touches the network or the disk.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::layout::Category;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_WIP_BRANCH: &str = "forgesync-wip";

/// Which mirror categories this run touches. A disabled category is never
/// created on disk and entities classified into it are skipped silently.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Categories {
    pub public_repos: bool,
    pub private_repos: bool,
    pub forked_repos: bool,
    pub starred_repos: bool,
    pub public_gists: bool,
    pub private_gists: bool,
    pub forked_gists: bool,
    pub starred_gists: bool,
    /// Wikis ride along with their repository category rather than having
    /// a path of their own.
    pub wikis: bool,
}

impl Default for Categories {
    fn default() -> Self {
        Self::all()
    }
}

impl Categories {
    pub const fn all() -> Self {
        Self {
            public_repos: true,
            private_repos: true,
            forked_repos: true,
            starred_repos: true,
            public_gists: true,
            private_gists: true,
            forked_gists: true,
            starred_gists: true,
            wikis: true,
        }
    }

    /// Everything off — the starting point for `--only-*` resolution.
    pub const fn none() -> Self {
        Self {
            public_repos: false,
            private_repos: false,
            forked_repos: false,
            starred_repos: false,
            public_gists: false,
            private_gists: false,
            forked_gists: false,
            starred_gists: false,
            wikis: false,
        }
    }

    pub fn enabled(&self, category: Category) -> bool {
        match category {
            Category::PublicRepos => self.public_repos,
            Category::PrivateRepos => self.private_repos,
            Category::ForkedRepos => self.forked_repos,
            Category::StarredRepos => self.starred_repos,
            Category::PublicGists => self.public_gists,
            Category::PrivateGists => self.private_gists,
            Category::ForkedGists => self.forked_gists,
            Category::StarredGists => self.starred_gists,
        }
    }

    pub fn any_repos(&self) -> bool {
        self.public_repos || self.private_repos || self.forked_repos || self.starred_repos
    }

    pub fn any_gists(&self) -> bool {
        self.public_gists || self.private_gists || self.forked_gists || self.starred_gists
    }
}

/// Optional file-based defaults from `.forgesync.toml`.
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    /// Root of the local mirror tree.
    #[serde(default)]
    pub base_dir: Option<PathBuf>,
    /// Forge API endpoint.
    #[serde(default)]
    pub api_url: Option<String>,
    /// Branch name used by `status --wip` snapshots.
    #[serde(default)]
    pub wip_branch: Option<String>,
}

impl FileConfig {
    /// Load config from `.forgesync.toml`.
    ///
    /// Checks the current directory first, then falls back to
    /// `~/.config/forgesync/config.toml`. A missing file is not an error;
    /// an unparseable one is.
    pub fn load() -> Result<Self> {
        let local = PathBuf::from(".forgesync.toml");
        let user = dirs::config_dir().map(|dir| dir.join("forgesync").join("config.toml"));

        let path = if local.exists() {
            local
        } else if let Some(user) = user.filter(|p| p.exists()) {
            user
        } else {
            return Ok(Self::default());
        };

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }
}

/// The resolved configuration for one invocation. Computed once in the
/// command driver; immutable afterwards.
#[derive(Clone, Debug)]
pub struct RunConfig {
    pub base_dir: PathBuf,
    pub api_url: String,
    /// Mirror a named organization instead of the authenticated user.
    pub organization: Option<String>,
    /// In user mode, skip listed repositories owned by someone else (an
    /// organization the user belongs to) — they are clonable through that
    /// organization's own listing.
    pub dedupe_org_repos: bool,
    pub categories: Categories,
    pub wip_branch: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_enables_everything() {
        let categories = Categories::default();
        for category in Category::ALL {
            assert!(categories.enabled(category), "{category:?} should be on");
        }
        assert!(categories.wikis);
    }

    #[test]
    fn none_disables_everything() {
        let categories = Categories::none();
        for category in Category::ALL {
            assert!(!categories.enabled(category), "{category:?} should be off");
        }
        assert!(!categories.any_repos());
        assert!(!categories.any_gists());
    }

    #[test]
    fn file_config_parses_partial_toml() {
        let config: FileConfig = toml::from_str("base_dir = \"/srv/mirror\"").expect("valid toml");
        assert_eq!(
            config.base_dir.as_deref(),
            Some(std::path::Path::new("/srv/mirror"))
        );
        assert!(config.api_url.is_none());
        assert!(config.wip_branch.is_none());
    }

    #[test]
    fn file_config_rejects_broken_toml() {
        assert!(toml::from_str::<FileConfig>("base_dir = ").is_err());
    }
}
