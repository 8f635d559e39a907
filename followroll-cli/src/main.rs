// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! FollowRoll CLI - builds the follower roster for the channel site.
//!
//! # Examples
//!
//! ```bash
//! # Build docs/data/followers.json
//! followroll
//!
//! # Print the snapshot instead of writing it
//! followroll build --dry-run
//!
//! # Check the published sheet
//! followroll feed
//!
//! # Sheet rows as JSON
//! followroll feed --format json
//! ```

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use followroll_sources::sheet::DEFAULT_SHEET_URL;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use commands::{build, feed};

// ============================================================================
// CLI Definition
// ============================================================================

/// FollowRoll CLI - follower roster builder.
#[derive(Parser)]
#[command(name = "followroll")]
#[command(about = "Builds the follower roster from Twitch and the published sheet")]
#[command(long_about = r#"
FollowRoll merges the hand-maintained follower sheet with Twitch
subscription, bits and avatar data into a ranked JSON roster.

Environment:
  CLIENT_ID           Twitch application client id
  ACCESS_TOKEN        Initial bearer token
  BROADCASTER_LOGIN   Channel whose subscriptions are read
  CLIENT_SECRET       Application secret
  REFRESH_TOKEN       User refresh token
  SHEET_URL           Published CSV feed

Examples:
  followroll                     # Build docs/data/followers.json
  followroll build --dry-run     # Print instead of writing
  followroll feed                # Sheet diagnostics
"#)]
#[command(version)]
#[command(author = "FollowRoll Contributors")]
pub struct Cli {
    /// Subcommand to run. If none, runs 'build' by default.
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Published CSV feed.
    #[arg(long, env = "SHEET_URL", default_value = DEFAULT_SHEET_URL, global = true)]
    pub sheet_url: String,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (minimal output).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Build and export the roster (default if no command specified).
    #[command(visible_alias = "b")]
    Build(build::BuildArgs),

    /// Download and check the sheet only.
    #[command(visible_alias = "f")]
    Feed(feed::FeedArgs),
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text with colors.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[repr(i32)]
pub enum ExitCode {
    /// Any fatal error.
    Error = 1,
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool) {
    if quiet {
        return;
    }

    let filter = if verbose {
        EnvFilter::new("followroll=debug,info")
    } else {
        EnvFilter::new("followroll=warn")
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let result = match &cli.command {
        Some(Commands::Build(args)) => build::run(args, &cli).await,
        Some(Commands::Feed(args)) => feed::run(args, &cli).await,
        None => build::run(&build::BuildArgs::default(), &cli).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(ExitCode::Error as i32);
    }

    Ok(())
}
