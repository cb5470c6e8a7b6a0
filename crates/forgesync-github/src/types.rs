//! Descriptor model for forge-hosted entities.
//!
//! Descriptors are immutable snapshots of one listing call: constructed by
//! parsing an API payload, never persisted, never mutated. A payload missing
//! a required field fails the parse with
//! [`ForgeError::MissingField`](crate::ForgeError::MissingField) instead of
//! producing a partially-populated value.

/// A remote repository as reported by the forge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RepoDescriptor {
    /// Repository name (without the owner prefix).
    pub name: String,
    /// Owner login.
    pub owner: String,
    /// Whether the repository is private.
    pub is_private: bool,
    /// Whether the repository is a fork.
    pub is_fork: bool,
    /// Parent repository, when the payload embedded it. Listing payloads
    /// report `is_fork` without a parent; callers resolve it through
    /// [`Forge::get_repository`](crate::Forge::get_repository).
    pub parent: Option<Box<RepoDescriptor>>,
    /// SSH clone URL.
    pub ssh_url: String,
    /// Whether the forge reports a wiki. The wiki git remote may still not
    /// exist (an empty wiki), so cloning probes first.
    pub has_wiki: bool,
    /// Topic labels.
    pub topics: Vec<String>,
    /// Primary language, if the forge detected one.
    pub language: Option<String>,
}

impl RepoDescriptor {
    /// `owner/name`, the way operators refer to the repository in logs.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

/// A gist as reported by the forge.
///
/// Gists have no canonical name, so `display_name` is derived from the
/// first file name (alphabetically, for determinism), falling back to the
/// gist id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GistDescriptor {
    /// Opaque gist id.
    pub id: String,
    /// Derived name used for the local directory.
    pub display_name: String,
    /// Whether the gist is public.
    pub is_public: bool,
    /// Whether the gist is a fork of another gist.
    pub is_fork: bool,
    /// Git clone URL.
    pub pull_url: String,
    /// Owner login.
    pub owner: String,
}
