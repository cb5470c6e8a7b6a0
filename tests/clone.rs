//! Tests for the clone executor: idempotence, failure reporting, and wiki
//! probing. Each test builds its own local bare remote in a temp dir.

mod common;

use common::*;

use forgesync::clone::{CloneStatus, clone_non_fork, clone_wiki};
use forgesync::git::{Git, SystemGit};

#[test]
fn clone_is_idempotent() {
    let tmp = tempfile::tempdir().unwrap();
    let bare = init_remote(tmp.path(), "widget");
    let dest = tmp.path().join("public");
    std::fs::create_dir_all(&dest).unwrap();

    let git_ops = Git::new(&SystemGit);
    let url = bare.to_str().unwrap();

    let first = clone_non_fork(&git_ops, &dest, "widget", url).unwrap();
    assert_eq!(first, CloneStatus::Cloned);
    assert!(dest.join("widget/README.md").is_file());

    let second = clone_non_fork(&git_ops, &dest, "widget", url).unwrap();
    assert_eq!(second, CloneStatus::AlreadyCloned);
    assert!(dest.join("widget/README.md").is_file());
}

#[test]
fn clone_of_missing_remote_fails() {
    let tmp = tempfile::tempdir().unwrap();
    let dest = tmp.path().join("public");
    std::fs::create_dir_all(&dest).unwrap();

    let git_ops = Git::new(&SystemGit);
    let missing = tmp.path().join("nope.git");

    let result = clone_non_fork(&git_ops, &dest, "widget", missing.to_str().unwrap());
    assert!(result.is_err());
    assert!(!dest.join("widget").exists());
}

#[test]
fn wiki_skipped_when_descriptor_has_no_wiki() {
    let tmp = tempfile::tempdir().unwrap();
    let bare = init_remote(tmp.path(), "widget");
    let dest = tmp.path().join("public");
    std::fs::create_dir_all(&dest).unwrap();

    let git_ops = Git::new(&SystemGit);
    let status = clone_wiki(&git_ops, &dest, "widget", bare.to_str().unwrap(), false).unwrap();

    assert_eq!(status, CloneStatus::Skipped);
    assert!(!dest.join("widget.wiki").exists());
}

#[test]
fn wiki_flag_without_remote_is_not_an_error() {
    // has_wiki can be true while the wiki git remote does not exist (an
    // empty wiki) — the probe turns that into a quiet skip.
    let tmp = tempfile::tempdir().unwrap();
    let bare = init_remote(tmp.path(), "widget");
    let dest = tmp.path().join("public");
    std::fs::create_dir_all(&dest).unwrap();

    let git_ops = Git::new(&SystemGit);
    let status = clone_wiki(&git_ops, &dest, "widget", bare.to_str().unwrap(), true).unwrap();

    assert_eq!(status, CloneStatus::Skipped);
    assert!(!dest.join("widget.wiki").exists());
}

#[test]
fn wiki_cloned_when_remote_exists() {
    let tmp = tempfile::tempdir().unwrap();
    let bare = init_remote(tmp.path(), "widget");
    // The wiki remote lives at `{url minus .git}.wiki.git`.
    init_remote(tmp.path(), "widget.wiki");
    let dest = tmp.path().join("public");
    std::fs::create_dir_all(&dest).unwrap();

    let git_ops = Git::new(&SystemGit);
    let status = clone_wiki(&git_ops, &dest, "widget", bare.to_str().unwrap(), true).unwrap();

    assert_eq!(status, CloneStatus::Cloned);
    assert!(dest.join("widget.wiki/README.md").is_file());

    // And idempotent, like the repo clone itself.
    let again = clone_wiki(&git_ops, &dest, "widget", bare.to_str().unwrap(), true).unwrap();
    assert_eq!(again, CloneStatus::AlreadyCloned);
}
