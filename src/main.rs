use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};

use forgesync::cmd;
use forgesync::format::OutputFormat;
use forgesync::telemetry;

/// Mirror a forge account to local disk and keep it in sync
///
/// forgesync clones a GitHub user's or organization's repositories, gists,
/// and wikis into a category tree on disk, then keeps the mirror current:
/// fetching and fast-forwarding, pulling fork branches from both your fork
/// and its upstream, pruning clones whose remote is gone, and maintaining
/// filesystem tags from topics and language metadata.
///
/// LAYOUT:
///
///   {base}/user/{login}/repos/{public,private,forked,starred}/...
///   {base}/user/{login}/gists/{public,private,forked,starred}/...
///
/// Forks nest one level deeper under the parent owner's login and carry two
/// remotes: 'fork' (your fork — pushes go there) and 'upstream' (the parent
/// — pulls come from there).
///
/// QUICK START:
///
///   export GITHUB_TOKEN=...
///   forgesync clone                # initial mirror
///   forgesync sync --prune         # keep it current
///   forgesync status --wip         # preserve uncommitted work
#[derive(Parser)]
#[command(name = "forgesync")]
#[command(version, about)]
#[command(propagate_version = true)]
#[command(after_help = "See 'forgesync <command> --help' for more information on a specific command.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mirror the account's repositories, gists, and wikis to disk
    Clone(cmd::clone::CloneArgs),

    /// Update the local mirror from the remote listing
    Sync(cmd::sync::SyncArgs),

    /// Show dirty and unpushed state across the local mirror
    Status(cmd::status::StatusArgs),

    /// Check system requirements and configuration
    ///
    /// Verifies that git is installed, whether the optional tagging utility
    /// is available, and that a token and base directory are configured.
    Doctor {
        /// Output format (auto-detects by TTY when omitted)
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

fn main() -> Result<()> {
    telemetry::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Clone(ref args) => cmd::clone::run(args),
        Commands::Sync(ref args) => cmd::sync::run(args),
        Commands::Status(ref args) => cmd::status::run(args),
        Commands::Doctor { format } => cmd::doctor::run(format),
        Commands::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "forgesync",
                &mut std::io::stdout(),
            );
            Ok(())
        }
    }
}
