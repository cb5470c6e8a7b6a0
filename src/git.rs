//! Version-control command layer.
//!
//! Everything forgesync does to a working tree goes through [`GitRunner`] —
//! a synchronous command-execution seam, so the engines can be driven by a
//! recording double in tests. [`SystemGit`] is the real implementation,
//! shelling out to the `git` binary. [`Git`] layers the named operations the
//! engines speak (fetch, pull, remote-rename, ...) on top of the runner.

use std::fmt;
use std::path::Path;
use std::process::Command;

/// Captured output of one successful git invocation.
#[derive(Clone, Debug, Default)]
pub struct GitOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Error from one git invocation. Carries the rendered command line and, when
/// git actually ran, the exit code and stderr — enough context for an
/// operator to retry by hand.
#[derive(Debug)]
pub enum GitError {
    /// The git binary could not be spawned at all.
    Spawn {
        command: String,
        source: std::io::Error,
    },
    /// git ran and exited non-zero.
    Exit {
        command: String,
        code: i32,
        stderr: String,
    },
}

impl GitError {
    /// Exit code, if git actually ran.
    pub fn code(&self) -> Option<i32> {
        match self {
            Self::Spawn { .. } => None,
            Self::Exit { code, .. } => Some(*code),
        }
    }
}

impl fmt::Display for GitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spawn { command, source } => {
                write!(f, "failed to run `{command}`: {source}")
            }
            Self::Exit {
                command,
                code,
                stderr,
            } => {
                write!(f, "`{command}` exited with code {code}")?;
                if !stderr.is_empty() {
                    write!(f, ": {stderr}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for GitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Spawn { source, .. } => Some(source),
            Self::Exit { .. } => None,
        }
    }
}

/// Runs `git` with the given arguments in a working directory.
///
/// One method on purpose: the trait exists so tests can record and script
/// invocations, not to re-model git.
pub trait GitRunner {
    /// Run `git <args>` in `cwd`. A non-zero exit is [`GitError::Exit`].
    fn run(&self, cwd: &Path, args: &[&str]) -> Result<GitOutput, GitError>;
}

/// The real runner: spawns the `git` binary and blocks until it exits.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemGit;

impl GitRunner for SystemGit {
    fn run(&self, cwd: &Path, args: &[&str]) -> Result<GitOutput, GitError> {
        let rendered = render(args);
        let output = Command::new("git")
            .args(args)
            .current_dir(cwd)
            .output()
            .map_err(|source| GitError::Spawn {
                command: rendered.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(GitError::Exit {
                command: rendered,
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }

        Ok(GitOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

fn render(args: &[&str]) -> String {
    let mut rendered = String::from("git");
    for arg in args {
        rendered.push(' ');
        rendered.push_str(arg);
    }
    rendered
}

/// Whether a working tree carries a submodule manifest.
pub fn has_submodules(repo: &Path) -> bool {
    repo.join(".gitmodules").is_file()
}

/// The named git operations the engines use, layered over a [`GitRunner`].
pub struct Git<'a> {
    runner: &'a dyn GitRunner,
}

impl<'a> Git<'a> {
    pub fn new(runner: &'a dyn GitRunner) -> Self {
        Self { runner }
    }

    /// `git clone <url> <dir_name>` inside `parent_dir`.
    pub fn clone_into(
        &self,
        parent_dir: &Path,
        url: &str,
        dir_name: &str,
    ) -> Result<(), GitError> {
        self.runner
            .run(parent_dir, &["clone", url, dir_name])
            .map(drop)
    }

    pub fn fetch(&self, repo: &Path, remote: &str) -> Result<(), GitError> {
        self.runner.run(repo, &["fetch", remote]).map(drop)
    }

    /// Pull from `remote` into the current branch: fast-forward only by
    /// default, rebase when asked.
    pub fn pull(&self, repo: &Path, remote: &str, rebase: bool) -> Result<(), GitError> {
        let mode = if rebase { "--rebase" } else { "--ff-only" };
        self.runner.run(repo, &["pull", mode, remote]).map(drop)
    }

    pub fn push(&self, repo: &Path, remote: &str) -> Result<(), GitError> {
        self.runner.run(repo, &["push", remote]).map(drop)
    }

    /// `git push -u <remote> <branch>` — publishes a new branch and records
    /// its upstream.
    pub fn push_set_upstream(
        &self,
        repo: &Path,
        remote: &str,
        branch: &str,
    ) -> Result<(), GitError> {
        self.runner
            .run(repo, &["push", "-u", remote, branch])
            .map(drop)
    }

    pub fn remote_rename(&self, repo: &Path, old: &str, new: &str) -> Result<(), GitError> {
        self.runner
            .run(repo, &["remote", "rename", old, new])
            .map(drop)
    }

    pub fn remote_add(&self, repo: &Path, name: &str, url: &str) -> Result<(), GitError> {
        self.runner
            .run(repo, &["remote", "add", name, url])
            .map(drop)
    }

    pub fn config_set(&self, repo: &Path, key: &str, value: &str) -> Result<(), GitError> {
        self.runner.run(repo, &["config", key, value]).map(drop)
    }

    /// Existence probe for a remote URL. A non-zero exit means the remote
    /// does not exist or is unreachable — an answer, not an error. Only a
    /// spawn failure propagates.
    pub fn remote_exists(&self, cwd: &Path, url: &str) -> Result<bool, GitError> {
        match self.runner.run(cwd, &["ls-remote", url, "HEAD"]) {
            Ok(_) => Ok(true),
            Err(GitError::Exit { .. }) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Default branch of `remote`, from its symbolic HEAD ref. Falls back to
    /// the checked-out branch when the symref is missing (clones of empty or
    /// odd remotes).
    pub fn default_branch(&self, repo: &Path, remote: &str) -> Result<String, GitError> {
        let symref = format!("refs/remotes/{remote}/HEAD");
        match self.runner.run(repo, &["symbolic-ref", &symref]) {
            Ok(output) => {
                let target = output.stdout.trim();
                let prefix = format!("refs/remotes/{remote}/");
                Ok(target
                    .strip_prefix(prefix.as_str())
                    .unwrap_or(target)
                    .to_owned())
            }
            Err(GitError::Exit { .. }) => self.current_branch(repo),
            Err(err) => Err(err),
        }
    }

    pub fn current_branch(&self, repo: &Path) -> Result<String, GitError> {
        let output = self
            .runner
            .run(repo, &["rev-parse", "--abbrev-ref", "HEAD"])?;
        Ok(output.stdout.trim().to_owned())
    }

    pub fn submodule_update(&self, repo: &Path, rebase: bool) -> Result<(), GitError> {
        let mut args = vec!["submodule", "update", "--init", "--recursive"];
        if rebase {
            args.push("--rebase");
        }
        self.runner.run(repo, &args).map(drop)
    }

    /// Short-form working tree status; non-empty output means dirty.
    pub fn status_short(&self, repo: &Path) -> Result<String, GitError> {
        let output = self.runner.run(repo, &["status", "--porcelain"])?;
        Ok(output.stdout)
    }

    pub fn local_branches(&self, repo: &Path) -> Result<Vec<String>, GitError> {
        let output = self.runner.run(
            repo,
            &["for-each-ref", "--format=%(refname:short)", "refs/heads"],
        )?;
        Ok(output
            .stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_owned)
            .collect())
    }

    /// Commits on `branch` not yet on its upstream. A branch with no
    /// upstream configured makes git exit 128 — that reads as zero unpushed
    /// commits, not as a failure.
    pub fn unpushed_count(&self, repo: &Path, branch: &str) -> Result<u64, GitError> {
        let range = format!("{branch}@{{upstream}}..{branch}");
        match self.runner.run(repo, &["rev-list", "--count", &range]) {
            Ok(output) => Ok(output.stdout.trim().parse().unwrap_or(0)),
            Err(GitError::Exit { code: 128, .. }) => Ok(0),
            Err(err) => Err(err),
        }
    }

    pub fn checkout_new_branch(&self, repo: &Path, name: &str) -> Result<(), GitError> {
        self.runner.run(repo, &["checkout", "-b", name]).map(drop)
    }

    pub fn add_all(&self, repo: &Path) -> Result<(), GitError> {
        self.runner.run(repo, &["add", "-A"]).map(drop)
    }

    pub fn commit(&self, repo: &Path, message: &str) -> Result<(), GitError> {
        self.runner
            .run(repo, &["commit", "-m", message])
            .map(drop)
    }
}
