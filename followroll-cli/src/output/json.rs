//! JSON output formatting.

use anyhow::Result;
use followroll_core::{Reconciler, RoleFlags};
use followroll_sources::FeedReport;
use followroll_sources::sheet::SkipReason;
use serde::Serialize;

// ============================================================================
// Output Types
// ============================================================================

/// JSON output for a sheet check.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedOutput {
    pub delimiter: String,
    pub data_lines: usize,
    pub superseded: usize,
    pub missing_columns: Vec<String>,
    pub rows: Vec<FeedRowOutput>,
    pub skipped: Vec<SkippedOutput>,
}

/// A parsed row.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedRowOutput {
    pub rank: usize,
    pub login: String,
    pub display: String,
    pub days: i64,
    pub roles: RoleFlags,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tips: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gift_override: Option<u32>,
    pub avatar_override: bool,
}

/// A skipped line.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedOutput {
    pub line: usize,
    pub reason: &'static str,
}

// ============================================================================
// JSON Formatter
// ============================================================================

/// JSON formatter.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Formats any serializable value.
    pub fn format<T: Serialize>(&self, data: &T) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(data)?
        } else {
            serde_json::to_string(data)?
        };
        Ok(json)
    }

    /// Formats a sheet check.
    pub fn format_report(&self, report: &FeedReport) -> Result<String> {
        self.format(&Self::report_to_output(report))
    }

    /// Converts a parse report to output.
    pub fn report_to_output(report: &FeedReport) -> FeedOutput {
        let sheet = &report.sheet;
        let rows = Reconciler::rank_order(sheet)
            .into_iter()
            .enumerate()
            .map(|(i, row)| {
                let login = row.login();
                let tip = sheet.tip(login);
                FeedRowOutput {
                    rank: i + 1,
                    login: login.to_string(),
                    display: row.identity.display.clone(),
                    days: row.tenure_days,
                    roles: row.roles,
                    tips: (tip > 0.0).then_some(tip),
                    gift_override: sheet.gift_override(login),
                    avatar_override: sheet.has_avatar_override(login),
                }
            })
            .collect();

        let skipped = report
            .skipped
            .iter()
            .map(|s| SkippedOutput {
                line: s.line,
                reason: match s.reason {
                    SkipReason::MissingName => "missingName",
                    SkipReason::NoTenure => "noTenure",
                },
            })
            .collect();

        FeedOutput {
            delimiter: report.delimiter.to_string(),
            data_lines: report.data_lines,
            superseded: report.superseded,
            missing_columns: report.missing_columns.iter().map(|c| (*c).to_string()).collect(),
            rows,
            skipped,
        }
    }
}
