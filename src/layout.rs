//! Path layout resolution.
//!
//! Given a base directory, an account identity, and the enabled categories,
//! [`Layout::resolve`] deterministically computes the on-disk mirror tree:
//!
//! ```text
//! {base}/user/{login}/repos/{public,private,forked,starred}/...
//! {base}/user/{login}/gists/{public,private,forked,starred}/...
//! {base}/organization/{name}/...        (same, minus starred)
//! ```
//!
//! Forked repositories nest one extra level under the parent owner's login
//! (`.../forked/{parent_owner}/{name}`) so two users' forks of the same
//! upstream never collide. Wikis live as `{name}.wiki` siblings of their
//! repository. Only enabled categories are ever created on disk; a disabled
//! category's absence is not an error anywhere downstream.

use std::path::{Path, PathBuf};

use crate::config::Categories;

/// Whether the mirrored account is a user or an organization.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdentityKind {
    User,
    Organization,
}

impl IdentityKind {
    fn segment(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Organization => "organization",
        }
    }
}

/// The mutually exclusive classification governing where an entity lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    PublicRepos,
    PrivateRepos,
    ForkedRepos,
    StarredRepos,
    PublicGists,
    PrivateGists,
    ForkedGists,
    StarredGists,
}

impl Category {
    /// Fixed enumeration order: repos first, then gists — also the order
    /// the sync engine processes categories in.
    pub const ALL: [Self; 8] = [
        Self::PublicRepos,
        Self::PrivateRepos,
        Self::ForkedRepos,
        Self::StarredRepos,
        Self::PublicGists,
        Self::PrivateGists,
        Self::ForkedGists,
        Self::StarredGists,
    ];

    pub fn family(self) -> &'static str {
        match self {
            Self::PublicRepos | Self::PrivateRepos | Self::ForkedRepos | Self::StarredRepos => {
                "repos"
            }
            Self::PublicGists | Self::PrivateGists | Self::ForkedGists | Self::StarredGists => {
                "gists"
            }
        }
    }

    pub fn segment(self) -> &'static str {
        match self {
            Self::PublicRepos | Self::PublicGists => "public",
            Self::PrivateRepos | Self::PrivateGists => "private",
            Self::ForkedRepos | Self::ForkedGists => "forked",
            Self::StarredRepos | Self::StarredGists => "starred",
        }
    }

    /// Human label for progress output, e.g. "public repos".
    pub fn label(self) -> String {
        format!("{} {}", self.segment(), self.family())
    }

    pub fn is_gist(self) -> bool {
        self.family() == "gists"
    }

    /// Only forked repositories get the extra parent-owner nesting and the
    /// dual-remote treatment; forked gists are a placement category only.
    pub fn nests_by_parent_owner(self) -> bool {
        self == Self::ForkedRepos
    }

    /// Organizations cannot star, so the starred categories do not exist
    /// under an organization root.
    fn allowed_for(self, kind: IdentityKind) -> bool {
        match self {
            Self::StarredRepos | Self::StarredGists => kind == IdentityKind::User,
            _ => true,
        }
    }
}

/// The resolved mirror tree for one identity: category → absolute path,
/// restricted to categories that are enabled and allowed for the identity.
#[derive(Clone, Debug)]
pub struct Layout {
    root: PathBuf,
    dirs: Vec<(Category, PathBuf)>,
}

impl Layout {
    pub fn resolve(
        base_dir: &Path,
        kind: IdentityKind,
        identity: &str,
        categories: &Categories,
    ) -> Self {
        let root = base_dir.join(kind.segment()).join(identity);
        let dirs = Category::ALL
            .into_iter()
            .filter(|category| category.allowed_for(kind) && categories.enabled(*category))
            .map(|category| {
                let path = root.join(category.family()).join(category.segment());
                (category, path)
            })
            .collect();
        Self { root, dirs }
    }

    /// Identity root (`{base}/{user|organization}/{name}`).
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path for a category, or `None` when it is disabled or not allowed
    /// for this identity.
    pub fn dir(&self, category: Category) -> Option<&Path> {
        self.dirs
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, path)| path.as_path())
    }

    /// Enabled categories with their paths, in fixed enumeration order.
    pub fn entries(&self) -> impl Iterator<Item = (Category, &Path)> {
        self.dirs.iter().map(|(c, p)| (*c, p.as_path()))
    }

    /// Create the directories for enabled categories. Failure here is fatal
    /// for the run — there is nowhere to mirror into.
    pub fn create_enabled(&self) -> std::io::Result<()> {
        for (_, path) in &self.dirs {
            std::fs::create_dir_all(path)?;
        }
        Ok(())
    }
}
