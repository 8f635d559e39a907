//! Feed command - download and check the sheet without calling Twitch.

use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use clap::Args;
use followroll_fetch::HttpClient;
use followroll_sources::{FeedParser, SheetClient};
use tracing::info;

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the feed command.
#[derive(Args, Default)]
pub struct FeedArgs {
    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text")]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long)]
    pub pretty: bool,
}

/// Runs the feed command.
pub async fn run(args: &FeedArgs, cli: &Cli) -> Result<()> {
    let client = SheetClient::new(Arc::new(HttpClient::new()?), &cli.sheet_url);
    let text = client.download().await?;

    let report = FeedParser::new(Utc::now()).parse_report(&text);
    info!(rows = report.sheet.len(), skipped = report.skipped.len(), "Sheet checked");

    let rendered = match args.format {
        OutputFormat::Text => TextFormatter::new(!cli.no_color).format_report(&report),
        OutputFormat::Json => JsonFormatter::new(args.pretty).format_report(&report)?,
    };
    println!("{rendered}");

    Ok(())
}
