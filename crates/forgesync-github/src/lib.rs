//! Forge API abstraction for forgesync.
//!
//! This crate defines the [`Forge`] trait — the single interface through
//! which the forgesync engines see a hosted git service. The engines never
//! import an HTTP client directly; they depend on this crate and program
//! against the trait, which also gives tests an easy seam for in-memory
//! fakes.
//!
//! All trait methods are synchronous and blocking. Whatever the transport
//! does underneath, the caller observes one request completing (or failing)
//! before the next begins.
//!
//! # Crate layout
//!
//! - [`types`] — the descriptor model ([`RepoDescriptor`], [`GistDescriptor`]).
//! - [`error`] — the [`ForgeError`] enum returned by all trait methods.
//! - [`github`] — the [`GithubClient`] REST v3 implementation.

pub mod error;
pub mod github;
pub mod types;

pub use error::ForgeError;
pub use github::GithubClient;
pub use types::{GistDescriptor, RepoDescriptor};

/// Which account a listing call is scoped to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListTarget {
    /// The authenticated user. Includes private repositories and secret
    /// gists the token can see.
    Viewer,
    /// A named organization, accessed through a personal token.
    Organization(String),
}

/// A hosted git service exposing repositories, gists, and metadata.
///
/// Every method is blocking and returns a typed [`ForgeError`] on failure
/// (network-layer error, non-2xx status, empty body, undecodable body, or a
/// payload missing a required field).
pub trait Forge {
    /// Login of the authenticated user. Failure here is fatal for a run —
    /// nothing else can be scoped without an identity.
    fn viewer_login(&self) -> Result<String, ForgeError>;

    /// List the repositories owned by the target, including private ones
    /// where the token allows.
    fn list_repositories(&self, target: &ListTarget) -> Result<Vec<RepoDescriptor>, ForgeError>;

    /// List the repositories starred by the authenticated user.
    fn list_starred(&self) -> Result<Vec<RepoDescriptor>, ForgeError>;

    /// Read a single repository in full. Needed to resolve a fork's parent,
    /// which listing payloads do not embed.
    fn get_repository(&self, owner: &str, name: &str) -> Result<RepoDescriptor, ForgeError>;

    /// List the topic labels attached to a repository.
    fn list_topics(&self, owner: &str, name: &str) -> Result<Vec<String>, ForgeError>;

    /// List the gists owned by the target. Organizations cannot own gists;
    /// the call returns an empty list for them.
    fn list_gists(&self, target: &ListTarget) -> Result<Vec<GistDescriptor>, ForgeError>;

    /// List the gists starred by the authenticated user.
    fn list_starred_gists(&self) -> Result<Vec<GistDescriptor>, ForgeError>;
}
