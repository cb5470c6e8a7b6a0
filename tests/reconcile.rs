//! Reconciliation against real git fixtures: fast-forward updates, prune
//! policy, and tag refresh.

mod common;

use common::*;

use forgesync::git::{Git, SystemGit};
use forgesync::reconcile::{ReconcileOptions, RemoteEntry, reconcile};

#[test]
fn unmatched_local_is_kept_without_prune() {
    let tmp = tempfile::tempdir().unwrap();
    let category = tmp.path().join("public");
    let baz = category.join("baz");
    seed_repo(&baz);
    std::fs::write(baz.join("uncommitted.txt"), "work in progress").unwrap();

    let tags = MemoryTags::default();
    let report = reconcile(
        &Git::new(&SystemGit),
        &tags,
        &category,
        &[],
        &ReconcileOptions::default(),
    );

    assert_eq!(report.kept, 1);
    assert_eq!(report.pruned, 0);
    assert!(baz.join("uncommitted.txt").is_file());
}

#[test]
fn unmatched_local_is_removed_with_prune() {
    let tmp = tempfile::tempdir().unwrap();
    let category = tmp.path().join("public");
    let baz = category.join("baz");
    seed_repo(&baz);
    // Pruning does not check dirtiness first: uncommitted work goes too.
    std::fs::write(baz.join("uncommitted.txt"), "work in progress").unwrap();

    let tags = MemoryTags::default();
    let opts = ReconcileOptions {
        prune: true,
        ..ReconcileOptions::default()
    };
    let report = reconcile(&Git::new(&SystemGit), &tags, &category, &[], &opts);

    assert_eq!(report.pruned, 1);
    assert!(!baz.exists());
}

#[test]
fn matched_entry_fast_forwards_to_the_remote() {
    let tmp = tempfile::tempdir().unwrap();
    let bare = init_remote(tmp.path(), "bar");
    let category = tmp.path().join("public");
    std::fs::create_dir_all(&category).unwrap();
    git(
        &category,
        &["clone", bare.to_str().unwrap(), "bar"],
    );

    // Remote advances after the clone.
    push_commit(&bare, "new.txt", "fresh", "add new file");

    let tags = MemoryTags::default();
    let report = reconcile(
        &Git::new(&SystemGit),
        &tags,
        &category,
        &[RemoteEntry::new("bar", vec![])],
        &ReconcileOptions::default(),
    );

    assert_eq!(report.updated, 1);
    assert_eq!(report.failed, 0);
    assert!(category.join("bar/new.txt").is_file());
}

#[test]
fn matched_entry_gets_tags_refreshed_non_additively() {
    let tmp = tempfile::tempdir().unwrap();
    let bare = init_remote(tmp.path(), "bar");
    let category = tmp.path().join("public");
    std::fs::create_dir_all(&category).unwrap();
    git(
        &category,
        &["clone", bare.to_str().unwrap(), "bar"],
    );

    let repo = category.join("bar");
    let tags = MemoryTags::default();
    tags.seed(&repo, &["a", "b", "c"]);

    reconcile(
        &Git::new(&SystemGit),
        &tags,
        &category,
        &[RemoteEntry::new(
            "bar",
            vec!["b".to_owned(), "d".to_owned()],
        )],
        &ReconcileOptions::default(),
    );

    assert_eq!(tags.get(&repo), vec!["b", "d"]);
}

#[test]
fn local_ahead_of_remote_still_updates_cleanly() {
    let tmp = tempfile::tempdir().unwrap();
    let bare = init_remote(tmp.path(), "bar");
    let category = tmp.path().join("public");
    std::fs::create_dir_all(&category).unwrap();
    git(
        &category,
        &["clone", bare.to_str().unwrap(), "bar"],
    );
    let repo = category.join("bar");
    configure_identity(&repo);
    commit_local(&repo, "local.txt", "unpushed", "local work");

    let tags = MemoryTags::default();
    let report = reconcile(
        &Git::new(&SystemGit),
        &tags,
        &category,
        &[RemoteEntry::new("bar", vec![])],
        &ReconcileOptions::default(),
    );

    // Fast-forward pull of an already-current branch is a no-op, not a
    // failure; the unpushed commit survives.
    assert_eq!(report.updated, 1);
    assert!(repo.join("local.txt").is_file());
}
