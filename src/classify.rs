//! Classification and placement.
//!
//! The single place category decisions are made. Every other component
//! consumes the result; none re-derives it. The decision order is fixed:
//! fork status wins over visibility, so a private fork is Forked, not
//! Private.
//!
//! Starred entities never pass through here — they arrive via a separate
//! "starred" listing and are placed under the Starred category regardless
//! of their own fork/visibility flags (a starred fork of a private repo
//! still lands under Starred). The drivers assign
//! [`Category::StarredRepos`]/[`Category::StarredGists`] directly.

use forgesync_github::{GistDescriptor, RepoDescriptor};

use crate::layout::Category;

/// Category for a repository from an ownership listing.
pub fn classify_repo(repo: &RepoDescriptor) -> Category {
    if repo.is_fork {
        Category::ForkedRepos
    } else if repo.is_private {
        Category::PrivateRepos
    } else {
        Category::PublicRepos
    }
}

/// Category for a gist from an ownership listing.
pub fn classify_gist(gist: &GistDescriptor) -> Category {
    if gist.is_fork {
        Category::ForkedGists
    } else if gist.is_public {
        Category::PublicGists
    } else {
        Category::PrivateGists
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn repo(is_fork: bool, is_private: bool) -> RepoDescriptor {
        RepoDescriptor {
            name: "widget".to_owned(),
            owner: "alice".to_owned(),
            is_private,
            is_fork,
            parent: None,
            ssh_url: "git@github.com:alice/widget.git".to_owned(),
            has_wiki: false,
            topics: Vec::new(),
            language: None,
        }
    }

    fn gist(is_fork: bool, is_public: bool) -> GistDescriptor {
        GistDescriptor {
            id: "abc123".to_owned(),
            display_name: "notes.md".to_owned(),
            is_public,
            is_fork,
            pull_url: "https://gist.github.com/abc123.git".to_owned(),
            owner: "alice".to_owned(),
        }
    }

    #[test]
    fn fork_wins_over_visibility() {
        assert_eq!(classify_repo(&repo(true, true)), Category::ForkedRepos);
        assert_eq!(classify_repo(&repo(true, false)), Category::ForkedRepos);
        assert_eq!(classify_repo(&repo(false, true)), Category::PrivateRepos);
        assert_eq!(classify_repo(&repo(false, false)), Category::PublicRepos);
    }

    #[test]
    fn gist_fork_wins_over_visibility() {
        assert_eq!(classify_gist(&gist(true, true)), Category::ForkedGists);
        assert_eq!(classify_gist(&gist(true, false)), Category::ForkedGists);
        assert_eq!(classify_gist(&gist(false, true)), Category::PublicGists);
        assert_eq!(classify_gist(&gist(false, false)), Category::PrivateGists);
    }

    proptest! {
        /// Exactly one category, and fork always takes precedence, for any
        /// flag combination.
        #[test]
        fn classification_is_exclusive(is_fork in any::<bool>(), is_private in any::<bool>()) {
            let category = classify_repo(&repo(is_fork, is_private));
            if is_fork {
                prop_assert_eq!(category, Category::ForkedRepos);
            } else if is_private {
                prop_assert_eq!(category, Category::PrivateRepos);
            } else {
                prop_assert_eq!(category, Category::PublicRepos);
            }
            prop_assert!(!category.is_gist());
        }
    }
}
