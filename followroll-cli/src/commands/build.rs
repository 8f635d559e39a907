//! Build command - fetch every source, reconcile and export.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;
use followroll_core::{Reconciler, SubscriptionLedger};
use followroll_fetch::{AuthManager, AuthState, HelixConfig, HttpClient, PagedClient, Transport};
use followroll_sources::{FeedParser, RosterFetcher, SheetClient};
use followroll_store::{DEFAULT_OUTPUT_PATH, export_snapshot};
use tracing::{info, warn};

use crate::Cli;

/// Arguments for the build command.
#[derive(Args)]
pub struct BuildArgs {
    /// Snapshot destination.
    #[arg(long, short, default_value = DEFAULT_OUTPUT_PATH)]
    pub output: PathBuf,

    /// Print the snapshot to stdout instead of writing it.
    #[arg(long)]
    pub dry_run: bool,
}

impl Default for BuildArgs {
    fn default() -> Self {
        Self {
            output: PathBuf::from(DEFAULT_OUTPUT_PATH),
            dry_run: false,
        }
    }
}

/// Runs the build command.
pub async fn run(args: &BuildArgs, cli: &Cli) -> Result<()> {
    let config = HelixConfig::from_env();
    if !config.has_client_id() {
        warn!("CLIENT_ID is not set; authenticated calls will fail");
    }
    let now = Utc::now();

    let transport: Arc<dyn Transport> = Arc::new(HttpClient::new()?);
    let state = Arc::new(AuthState::from_config(&config));
    let auth = Arc::new(AuthManager::new(transport.clone(), &config, state));
    let fetcher = RosterFetcher::new(Arc::new(PagedClient::new(transport.clone(), auth)));

    info!(broadcaster = %config.broadcaster_login, "Loading subscription data");
    let broadcaster_id = fetcher
        .resolve_identity(&config.broadcaster_login)
        .await
        .context("Failed to look up broadcaster")?;
    let ledger = match broadcaster_id {
        Some(id) => fetcher
            .load_subscription_facts(&id)
            .await
            .context("Failed to load subscriptions")?,
        None => SubscriptionLedger::new(),
    };

    info!("Downloading sheet");
    let text = SheetClient::new(transport, &cli.sheet_url).download().await?;
    let sheet = FeedParser::new(now).parse(&text);
    info!(rows = sheet.len(), "Sheet parsed");

    let avatars = fetcher.load_avatars(&sheet.logins()).await;

    let snapshot = Reconciler::new(now).snapshot(&sheet, &ledger, &avatars);

    if args.dry_run {
        snapshot.validate()?;
        println!("{}", snapshot.to_json_pretty()?);
        if !cli.quiet {
            eprintln!("Generated {} records", snapshot.len());
        }
    } else {
        export_snapshot(&args.output, &snapshot)
            .await
            .with_context(|| format!("Failed to write {}", args.output.display()))?;
        if !cli.quiet {
            println!("Generated {} records", snapshot.len());
        }
    }

    Ok(())
}
