//! Text output formatting with colors.

use followroll_core::{FeedRow, Reconciler, RoleFlags};
use followroll_sources::FeedReport;
use followroll_sources::sheet::SkipReason;

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    fn paint(&self, color: &str, text: &str) -> String {
        if self.use_colors {
            format!("{color}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    /// Formats a sheet check: summary, rows in rank order, then problems.
    pub fn format_report(&self, report: &FeedReport) -> String {
        let mut lines = Vec::new();
        let sheet = &report.sheet;

        lines.push(self.paint(
            BOLD,
            &format!(
                "Sheet: {} rows from {} lines (delimiter '{}')",
                sheet.len(),
                report.data_lines,
                report.delimiter
            ),
        ));
        if !report.missing_columns.is_empty() {
            lines.push(self.paint(
                YELLOW,
                &format!("Missing columns: {}", report.missing_columns.join(", ")),
            ));
        }
        if report.superseded > 0 {
            lines.push(self.paint(
                DIM,
                &format!("{} duplicate rows superseded", report.superseded),
            ));
        }

        if !sheet.is_empty() {
            lines.push(String::new());
        }
        for (rank, row) in Reconciler::rank_order(sheet).into_iter().enumerate() {
            lines.push(self.format_row(rank + 1, row, report));
        }

        if !report.skipped.is_empty() {
            lines.push(String::new());
            for skipped in &report.skipped {
                let reason = match skipped.reason {
                    SkipReason::MissingName => "no viewer_name",
                    SkipReason::NoTenure => "no usable days or first_follow",
                };
                lines.push(self.paint(DIM, &format!("Skipped line {}: {reason}", skipped.line)));
            }
        }

        lines.join("\n")
    }

    /// One row: rank, name, tenure, roles and overrides.
    pub fn format_row(&self, rank: usize, row: &FeedRow, report: &FeedReport) -> String {
        let sheet = &report.sheet;
        let login = row.login();

        let mut extras = role_badges(row.roles);
        let tip = sheet.tip(login);
        if tip > 0.0 {
            extras.push(format!("tips ${tip:.2}"));
        }
        if let Some(gifts) = sheet.gift_override(login) {
            extras.push(format!("gifts {gifts}"));
        }
        if sheet.has_avatar_override(login) {
            extras.push("avatar override".to_string());
        }

        let line = format!("{rank:>4}. {:<24} {:>6}d", row.identity.display, row.tenure_days);
        if extras.is_empty() {
            line
        } else {
            format!("{line}  {}", self.paint(CYAN, &extras.join(" · ")))
        }
    }
}

/// Short labels for set role flags.
pub fn role_badges(roles: RoleFlags) -> Vec<String> {
    [
        (roles.vip, "vip"),
        (roles.moderator, "mod"),
        (roles.tier2, "t2"),
        (roles.tier3, "t3"),
        (roles.artist, "art"),
    ]
    .into_iter()
    .filter(|(set, _)| *set)
    .map(|(_, label)| label.to_string())
    .collect()
}
