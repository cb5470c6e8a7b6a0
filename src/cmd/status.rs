//! `forgesync status` — report working-tree dirtiness and unpushed commits
//! across the mirror, optionally preserving dirty trees on a WIP branch.

use std::collections::BTreeMap;

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use crate::config::RunConfig;
use crate::format::OutputFormat;
use crate::git::{Git, GitRunner, SystemGit};
use crate::layout::Category;
use crate::status::{self, RepoState, RepoSummary, StatusOptions};

use super::{SelectionArgs, run_config};

/// Show dirty and unpushed state across the local mirror
///
/// Works entirely offline: walks the mirror tree for git repositories and
/// checks each working tree and branch. A branch with no upstream counts
/// as zero unpushed commits. With `--wip`, dirty repositories get their
/// changes committed to a snapshot branch and pushed before reporting, and
/// show up as "preserved" instead of "dirty".
#[derive(Args, Debug)]
pub struct StatusArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Commit and push dirty working trees to a snapshot branch before
    /// reporting
    #[arg(long)]
    pub wip: bool,

    /// Output format (auto-detects by TTY when omitted)
    #[arg(long, value_enum, env = "FORGESYNC_FORMAT")]
    pub format: Option<OutputFormat>,
}

#[derive(Serialize)]
struct StatusEnvelope {
    repos: Vec<RepoSummary>,
    clean: usize,
    dirty: usize,
    preserved: usize,
}

pub fn run(args: &StatusArgs) -> Result<()> {
    let cfg = run_config(&args.selection, None)?;
    run_with(&SystemGit, &cfg, args.wip, args.format)
}

pub fn run_with(
    runner: &dyn GitRunner,
    cfg: &RunConfig,
    wip: bool,
    format: Option<OutputFormat>,
) -> Result<()> {
    let git = Git::new(runner);

    // No API involved: scan whatever identities exist under the base dir,
    // or just the named organization's subtree.
    let root = match &cfg.organization {
        Some(org) => cfg.base_dir.join("organization").join(org),
        None => cfg.base_dir.clone(),
    };

    let opts = StatusOptions {
        wip,
        wip_branch: cfg.wip_branch.clone(),
    };
    let summaries: Vec<RepoSummary> = status::scan(&git, &root, &opts)
        .into_iter()
        .filter(|summary| category_enabled(cfg, &summary.category))
        .collect();

    let clean = count(&summaries, RepoState::Clean);
    let dirty = count(&summaries, RepoState::Dirty);
    let preserved = count(&summaries, RepoState::ChangesPreserved);

    let format = OutputFormat::resolve(format);
    match format {
        OutputFormat::Json => {
            let envelope = StatusEnvelope {
                repos: summaries,
                clean,
                dirty,
                preserved,
            };
            println!("{}", format.serialize(&envelope)?);
        }
        OutputFormat::Text => print_text(&summaries, clean, dirty, preserved),
        OutputFormat::Pretty => {
            print_pretty(&summaries, clean, dirty, preserved, format.should_use_color());
        }
    }
    Ok(())
}

/// The category flags also scope status output; a summary whose path hint
/// maps to a disabled category is dropped.
fn category_enabled(cfg: &RunConfig, hint: &str) -> bool {
    for category in Category::ALL {
        if category.label() == hint {
            return cfg.categories.enabled(category);
        }
    }
    true
}

fn count(summaries: &[RepoSummary], state: RepoState) -> usize {
    summaries.iter().filter(|s| s.state == state).count()
}

fn by_category(summaries: &[RepoSummary]) -> BTreeMap<&str, Vec<&RepoSummary>> {
    let mut groups: BTreeMap<&str, Vec<&RepoSummary>> = BTreeMap::new();
    for summary in summaries {
        groups.entry(summary.category.as_str()).or_default().push(summary);
    }
    groups
}

fn state_word(state: RepoState) -> &'static str {
    match state {
        RepoState::Clean => "clean",
        RepoState::Dirty => "dirty",
        RepoState::ChangesPreserved => "preserved",
    }
}

fn unpushed_note(summary: &RepoSummary) -> String {
    let parts: Vec<String> = summary
        .branches
        .iter()
        .filter(|branch| branch.unpushed > 0)
        .map(|branch| format!("{}: {} unpushed", branch.name, branch.unpushed))
        .collect();
    if parts.is_empty() {
        String::new()
    } else {
        format!("  ({})", parts.join(", "))
    }
}

/// Compact text format, stable for pipes.
fn print_text(summaries: &[RepoSummary], clean: usize, dirty: usize, preserved: usize) {
    for (category, group) in by_category(summaries) {
        println!("{category}:");
        for summary in group {
            println!(
                "  {}  {}{}",
                summary.name,
                state_word(summary.state),
                unpushed_note(summary)
            );
        }
    }
    println!();
    println!(
        "{} repositories: {} clean, {} dirty, {} preserved",
        summaries.len(),
        clean,
        dirty,
        preserved
    );
}

/// Colored, human-friendly format.
fn print_pretty(
    summaries: &[RepoSummary],
    clean: usize,
    dirty: usize,
    preserved: usize,
    use_color: bool,
) {
    let (bold, green, yellow, blue, gray, reset) = if use_color {
        (
            "\x1b[1m", "\x1b[32m", "\x1b[33m", "\x1b[34m", "\x1b[90m", "\x1b[0m",
        )
    } else {
        ("", "", "", "", "", "")
    };

    println!("{bold}Mirror Status{reset}");
    println!();

    for (category, group) in by_category(summaries) {
        println!("{bold}{category}{reset}");
        for summary in group {
            let (mark, color) = match summary.state {
                RepoState::Clean => ("\u{25cc}", gray),
                RepoState::Dirty => ("\u{25b2}", yellow),
                RepoState::ChangesPreserved => ("\u{25cf}", blue),
            };
            println!(
                "  {color}{mark} {}{reset}  {}{}",
                summary.name,
                state_word(summary.state),
                unpushed_note(summary)
            );
        }
        println!();
    }

    println!(
        "{green}{clean} clean{reset}, {yellow}{dirty} dirty{reset}, {blue}{preserved} preserved{reset} of {} repositories",
        summaries.len()
    );
}
