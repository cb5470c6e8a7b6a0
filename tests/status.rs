//! Status scanner tests: dirtiness, per-branch unpushed counts, the
//! missing-upstream case, and WIP preservation.

mod common;

use common::*;

use forgesync::git::{Git, SystemGit};
use forgesync::status::{RepoState, StatusOptions, scan};

#[test]
fn clean_repo_reports_clean() {
    let tmp = tempfile::tempdir().unwrap();
    let bare = init_remote(tmp.path(), "widget");
    let root = tmp.path().join("mirror");
    std::fs::create_dir_all(&root).unwrap();
    git(&root, &["clone", bare.to_str().unwrap(), "widget"]);

    let summaries = scan(&Git::new(&SystemGit), &root, &StatusOptions::default());

    assert_eq!(summaries.len(), 1);
    let widget = &summaries[0];
    assert_eq!(widget.name, "widget");
    assert_eq!(widget.state, RepoState::Clean);
    assert!(!widget.has_unpushed());
}

#[test]
fn dirty_and_unpushed_are_detected() {
    let tmp = tempfile::tempdir().unwrap();
    let bare = init_remote(tmp.path(), "widget");
    let root = tmp.path().join("mirror");
    std::fs::create_dir_all(&root).unwrap();
    git(&root, &["clone", bare.to_str().unwrap(), "widget"]);

    let repo = root.join("widget");
    configure_identity(&repo);
    commit_local(&repo, "one.txt", "1", "first unpushed");
    commit_local(&repo, "two.txt", "2", "second unpushed");
    std::fs::write(repo.join("scratch.txt"), "uncommitted").unwrap();

    let summaries = scan(&Git::new(&SystemGit), &root, &StatusOptions::default());

    let widget = &summaries[0];
    assert_eq!(widget.state, RepoState::Dirty);
    assert_eq!(widget.unpushed_total(), 2);
    let main = widget
        .branches
        .iter()
        .find(|branch| branch.name == "main")
        .expect("main branch tracked");
    assert_eq!(main.unpushed, 2);
}

#[test]
fn branch_without_upstream_counts_zero_not_error() {
    let tmp = tempfile::tempdir().unwrap();
    let bare = init_remote(tmp.path(), "widget");
    let root = tmp.path().join("mirror");
    std::fs::create_dir_all(&root).unwrap();
    git(&root, &["clone", bare.to_str().unwrap(), "widget"]);

    let repo = root.join("widget");
    configure_identity(&repo);
    git(&repo, &["checkout", "-b", "lonely"]);
    commit_local(&repo, "solo.txt", "x", "commit on lonely");

    let summaries = scan(&Git::new(&SystemGit), &root, &StatusOptions::default());

    assert_eq!(summaries.len(), 1, "no-upstream must not drop the repo");
    let lonely = summaries[0]
        .branches
        .iter()
        .find(|branch| branch.name == "lonely")
        .expect("lonely branch listed");
    assert_eq!(lonely.unpushed, 0);
}

#[test]
fn wip_mode_preserves_dirty_trees() {
    let tmp = tempfile::tempdir().unwrap();
    let bare = init_remote(tmp.path(), "widget");
    let root = tmp.path().join("mirror");
    std::fs::create_dir_all(&root).unwrap();
    git(&root, &["clone", bare.to_str().unwrap(), "widget"]);

    let repo = root.join("widget");
    configure_identity(&repo);
    std::fs::write(repo.join("scratch.txt"), "uncommitted").unwrap();

    let opts = StatusOptions {
        wip: true,
        wip_branch: "forgesync-wip".to_owned(),
    };
    let summaries = scan(&Git::new(&SystemGit), &root, &opts);

    let widget = &summaries[0];
    assert_eq!(widget.state, RepoState::ChangesPreserved);

    // The snapshot branch made it to the remote.
    let refs = git(&bare, &["show-ref"]);
    assert!(
        refs.contains("refs/heads/forgesync-wip"),
        "remote refs were: {refs}"
    );

    // And the working tree is clean afterwards — the changes are committed.
    assert!(git(&repo, &["status", "--porcelain"]).trim().is_empty());
}

#[test]
fn clean_repos_are_untouched_by_wip_mode() {
    let tmp = tempfile::tempdir().unwrap();
    let bare = init_remote(tmp.path(), "widget");
    let root = tmp.path().join("mirror");
    std::fs::create_dir_all(&root).unwrap();
    git(&root, &["clone", bare.to_str().unwrap(), "widget"]);

    let opts = StatusOptions {
        wip: true,
        wip_branch: "forgesync-wip".to_owned(),
    };
    let summaries = scan(&Git::new(&SystemGit), &root, &opts);

    assert_eq!(summaries[0].state, RepoState::Clean);
    let refs = git(&bare, &["show-ref"]);
    assert!(!refs.contains("forgesync-wip"));
}
