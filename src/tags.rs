//! Filesystem tag synchronization.
//!
//! Mirrored directories carry the repository's forge topics plus its primary
//! language as filesystem tags, applied through an external tagging utility.
//! Tagging is strictly best-effort: every failure is logged and none is ever
//! fatal to the run.

use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result, bail};
use tracing::warn;

/// Applies, reads, and removes filesystem tags on a directory.
///
/// A trait so the engines can be tested with an in-memory store instead of
/// the external utility.
pub trait TagTool {
    fn read(&self, path: &Path) -> Result<Vec<String>>;
    fn apply(&self, path: &Path, tags: &[String]) -> Result<()>;
    fn remove(&self, path: &Path, tags: &[String]) -> Result<()>;
}

/// The real tool: shells out to the `tag` utility with comma-separated
/// tag lists.
#[derive(Clone, Debug)]
pub struct TagCommand {
    program: String,
}

impl Default for TagCommand {
    fn default() -> Self {
        Self {
            program: "tag".to_owned(),
        }
    }
}

impl TagCommand {
    fn run(&self, args: &[&str]) -> Result<String> {
        let output = Command::new(&self.program)
            .args(args)
            .output()
            .with_context(|| format!("Failed to run '{}'", self.program))?;
        if !output.status.success() {
            bail!(
                "{} {} failed: {}",
                self.program,
                args.join(" "),
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl TagTool for TagCommand {
    fn read(&self, path: &Path) -> Result<Vec<String>> {
        let path = path.to_string_lossy();
        let stdout = self.run(&["--list", "--no-name", &path])?;
        Ok(stdout
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(str::to_owned)
            .collect())
    }

    fn apply(&self, path: &Path, tags: &[String]) -> Result<()> {
        let path = path.to_string_lossy();
        self.run(&["--add", &tags.join(","), &path]).map(drop)
    }

    fn remove(&self, path: &Path, tags: &[String]) -> Result<()> {
        let path = path.to_string_lossy();
        self.run(&["--remove", &tags.join(","), &path]).map(drop)
    }
}

/// Derive the tag set for a repository: topics plus the lower-cased primary
/// language, deduplicated, order preserved.
pub fn tag_set(topics: &[String], language: Option<&str>) -> Vec<String> {
    let mut tags: Vec<String> = Vec::with_capacity(topics.len() + 1);
    for topic in topics {
        let topic = topic.trim();
        if !topic.is_empty() && !tags.iter().any(|t| t == topic) {
            tags.push(topic.to_owned());
        }
    }
    if let Some(language) = language {
        let language = language.trim().to_lowercase();
        if !language.is_empty() && !tags.iter().any(|t| *t == language) {
            tags.push(language);
        }
    }
    tags
}

/// Apply `tags` to `path`. With `clear_first`, the directory's current tags
/// are removed before the new set is applied, so a topic dropped upstream
/// disappears locally — the operation is idempotent, never additive.
///
/// An empty tag set is a complete no-op, even with `clear_first`: nothing to
/// apply means nothing gets touched.
pub fn sync_tags(tool: &dyn TagTool, path: &Path, tags: &[String], clear_first: bool) {
    if tags.is_empty() {
        return;
    }

    if clear_first {
        match tool.read(path) {
            Ok(current) if !current.is_empty() => {
                if let Err(err) = tool.remove(path, &current) {
                    warn!(path = %path.display(), "failed to clear tags: {err:#}");
                }
            }
            Ok(_) => {}
            Err(err) => {
                warn!(path = %path.display(), "failed to read current tags: {err:#}");
            }
        }
    }

    if let Err(err) = tool.apply(path, tags) {
        warn!(path = %path.display(), "failed to apply tags: {err:#}");
    }
}
