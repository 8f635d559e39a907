//! Feed parsing.
//!
//! The feed is delimiter-separated text with a header row. Column names are
//! matched case-insensitively; any column may be missing. Quoted fields are
//! not interpreted, so a delimiter inside quotes splits the field.
//!
//! Cell rules:
//!
//! | Column | Rule |
//! |--------|------|
//! | `viewer_name` | trimmed display name; rows without one are skipped |
//! | `days` | leading integer |
//! | `first_follow` | date, used only when `days` yields nothing |
//! | `tips` | `$` and `,` removed, leading decimal, positive only |
//! | `giftsub` | non-digits removed, positive only |
//! | `override`, role columns | [`truthy`] |

use std::collections::HashMap;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use followroll_core::{FeedRow, FeedSheet, Identity, RoleFlags};
use regex::Regex;
use tracing::debug;

// ============================================================================
// Regex Patterns
// ============================================================================

/// Leading integer, as in "40 days".
static LEADING_INT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?[0-9]+").expect("Invalid regex"));

/// Leading decimal, as in "12.50 USD".
static LEADING_FLOAT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][+-]?[0-9]+)?").expect("Invalid regex")
});

/// Characters removed from tip cells.
static CURRENCY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[$,]").expect("Invalid regex"));

/// Naive timestamp layouts accepted for `first_follow`, read as UTC.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Date-only layouts accepted for `first_follow`.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

const MS_PER_DAY: i64 = 86_400_000;

// ============================================================================
// Cell Rules
// ============================================================================

/// Checkbox rule: `true`, `1`, `x` or `yes`, any case, surrounding
/// whitespace ignored.
pub fn truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "x" | "yes"
    )
}

/// Parses the leading integer of a cell.
pub fn leading_int(value: &str) -> Option<i64> {
    LEADING_INT_RE
        .find(value.trim())
        .and_then(|m| m.as_str().parse().ok())
}

/// Parses a tip amount, ignoring `$` and `,`. Non-positive values are `None`.
pub fn parse_tip(value: &str) -> Option<f64> {
    let cleaned = CURRENCY_RE.replace_all(value.trim(), "");
    LEADING_FLOAT_RE
        .find(&cleaned)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|n| n.is_finite() && *n > 0.0)
}

/// Parses a gift override from the digits of a cell. Zero is `None`;
/// counts past `u32::MAX` saturate.
pub fn parse_gift_override(value: &str) -> Option<u32> {
    let digits: String = value.chars().filter(char::is_ascii_digit).collect();
    let significant = digits.trim_start_matches('0');
    if significant.is_empty() {
        return None;
    }
    Some(significant.parse::<u32>().unwrap_or(u32::MAX))
}

/// Parses a `first_follow` date.
pub fn parse_follow_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
        }
    }
    None
}

// ============================================================================
// Parse Report
// ============================================================================

/// Why a data line produced no row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// `viewer_name` was empty or missing.
    MissingName,
    /// Neither `days` nor `first_follow` gave a tenure.
    NoTenure,
}

/// A data line that produced no row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    /// 1-based line number in the feed, header included.
    pub line: usize,
    /// Why it was skipped.
    pub reason: SkipReason,
}

/// Parse output with diagnostics for feed authors.
#[derive(Debug, Clone, Default)]
pub struct FeedReport {
    /// The parsed sheet.
    pub sheet: FeedSheet,
    /// Detected delimiter.
    pub delimiter: char,
    /// Non-blank data lines read.
    pub data_lines: usize,
    /// Lines that produced no row.
    pub skipped: Vec<SkippedLine>,
    /// Accepted rows that lost to a longer-tenured duplicate.
    pub superseded: usize,
    /// Known header names that were not found.
    pub missing_columns: Vec<&'static str>,
}

// ============================================================================
// Columns
// ============================================================================

const VIEWER_NAME: &str = "viewer_name";
const DAYS: &str = "days";
const FIRST_FOLLOW: &str = "first_follow";
const TIPS: &str = "tips";
const GIFTSUB: &str = "giftsub";
const OVERRIDE: &str = "override";
const VIP: &str = "vip";
const MOD: &str = "mod";
const TIER2: &str = "tier2";
const TIER3: &str = "tier3";
const ARTIST: &str = "artist";

const KNOWN_COLUMNS: &[&str] = &[
    VIEWER_NAME, DAYS, VIP, MOD, TIER2, TIER3, ARTIST, FIRST_FOLLOW, TIPS, GIFTSUB, OVERRIDE,
];

/// Header name to column index.
struct Columns(HashMap<String, usize>);

impl Columns {
    fn from_header(header: &str, delimiter: char) -> Self {
        let mut index = HashMap::new();
        for (i, name) in header.split(delimiter).enumerate() {
            index.entry(name.trim().to_lowercase()).or_insert(i);
        }
        Self(index)
    }

    fn has(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Trimmed cell, if the column exists. Short lines read as empty.
    fn cell<'a>(&self, parts: &[&'a str], name: &str) -> Option<&'a str> {
        self.0
            .get(name)
            .map(|&i| parts.get(i).copied().map_or("", str::trim))
    }

    fn flag(&self, parts: &[&str], name: &str) -> bool {
        self.cell(parts, name).is_some_and(truthy)
    }
}

// ============================================================================
// Parser
// ============================================================================

/// Turns raw feed text into a [`FeedSheet`].
#[derive(Debug, Clone, Copy)]
pub struct FeedParser {
    now: DateTime<Utc>,
}

impl FeedParser {
    /// Creates a parser; `now` anchors tenure derived from `first_follow`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    /// Parses the feed.
    pub fn parse(&self, text: &str) -> FeedSheet {
        self.parse_report(text).sheet
    }

    /// Parses the feed and reports what was skipped.
    pub fn parse_report(&self, text: &str) -> FeedReport {
        let mut lines = text
            .lines()
            .enumerate()
            .skip_while(|(_, line)| line.trim().is_empty());
        let Some((_, header)) = lines.next() else {
            return FeedReport::default();
        };
        let header = header.trim();

        let delimiter = if header.contains(',') { ',' } else { ';' };
        let columns = Columns::from_header(header, delimiter);
        let mut report = FeedReport {
            delimiter,
            missing_columns: KNOWN_COLUMNS
                .iter()
                .copied()
                .filter(|c| !columns.has(c))
                .collect(),
            ..FeedReport::default()
        };

        for (i, line) in lines {
            if line.trim().is_empty() {
                continue;
            }
            report.data_lines += 1;

            let parts: Vec<&str> = line.split(delimiter).collect();
            match self.parse_line(&columns, &parts, &mut report.sheet) {
                Ok(true) => {}
                Ok(false) => report.superseded += 1,
                Err(reason) => report.skipped.push(SkippedLine { line: i + 1, reason }),
            }
        }

        debug!(
            rows = report.sheet.len(),
            skipped = report.skipped.len(),
            superseded = report.superseded,
            "Feed parsed"
        );
        report
    }

    /// Applies one data line. Returns whether its row was stored.
    fn parse_line(&self, columns: &Columns, parts: &[&str], sheet: &mut FeedSheet) -> Result<bool, SkipReason> {
        let display = columns.cell(parts, VIEWER_NAME).unwrap_or_default();
        let identity = Identity::from_display(display);
        if identity.is_empty() {
            return Err(SkipReason::MissingName);
        }

        let tenure_days = columns
            .cell(parts, DAYS)
            .and_then(leading_int)
            .or_else(|| {
                columns
                    .cell(parts, FIRST_FOLLOW)
                    .and_then(parse_follow_date)
                    .map(|date| self.days_since(date))
            })
            .ok_or(SkipReason::NoTenure)?;

        let login = identity.login.clone();
        if let Some(amount) = columns.cell(parts, TIPS).and_then(parse_tip) {
            sheet.record_tip(&login, amount);
        }
        if let Some(count) = columns.cell(parts, GIFTSUB).and_then(parse_gift_override) {
            sheet.record_gift_override(&login, count);
        }
        if columns.flag(parts, OVERRIDE) {
            sheet.flag_avatar_override(&login);
        }

        let roles = RoleFlags {
            vip: columns.flag(parts, VIP),
            moderator: columns.flag(parts, MOD),
            tier2: columns.flag(parts, TIER2),
            tier3: columns.flag(parts, TIER3),
            artist: columns.flag(parts, ARTIST),
        };
        Ok(sheet.upsert(FeedRow::new(identity, tenure_days).with_roles(roles)))
    }

    /// Whole days elapsed since `date`, rounded toward negative infinity.
    fn days_since(&self, date: DateTime<Utc>) -> i64 {
        (self.now - date).num_milliseconds().div_euclid(MS_PER_DAY)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn parse(text: &str) -> FeedSheet {
        FeedParser::new(now()).parse(text)
    }

    #[test]
    fn test_truthy() {
        for value in ["TRUE", "1", "x", "Yes", " true "] {
            assert!(truthy(value), "{value:?} should be truthy");
        }
        for value in ["", "0", "no", "maybe", "false", "y"] {
            assert!(!truthy(value), "{value:?} should be falsy");
        }
    }

    #[test]
    fn test_tip_parsing() {
        assert_eq!(parse_tip("$1,234.50"), Some(1234.5));
        assert_eq!(parse_tip("5"), Some(5.0));
        assert_eq!(parse_tip("12.5 USD"), Some(12.5));
        assert_eq!(parse_tip("abc"), None);
        assert_eq!(parse_tip("0"), None);
        assert_eq!(parse_tip("-3"), None);
        assert_eq!(parse_tip(""), None);
    }

    #[test]
    fn test_gift_override_parsing() {
        assert_eq!(parse_gift_override("3"), Some(3));
        assert_eq!(parse_gift_override(" 12 subs"), Some(12));
        assert_eq!(parse_gift_override("0"), None);
        assert_eq!(parse_gift_override("none"), None);
        assert_eq!(parse_gift_override("007"), Some(7));
        assert_eq!(parse_gift_override("000"), None);
        assert_eq!(parse_gift_override("5000000000"), Some(u32::MAX));
        assert_eq!(parse_gift_override("4294967295"), Some(u32::MAX));
    }

    #[test]
    fn test_leading_int() {
        assert_eq!(leading_int("40"), Some(40));
        assert_eq!(leading_int(" 7 days"), Some(7));
        assert_eq!(leading_int("3.9"), Some(3));
        assert_eq!(leading_int("-2"), Some(-2));
        assert_eq!(leading_int("n/a"), None);
    }

    #[test]
    fn test_non_ascii_digits_are_not_numbers() {
        assert_eq!(leading_int("5\u{0663}"), Some(5));
        assert_eq!(leading_int("\u{0663}"), None);
        assert_eq!(parse_tip("2\u{0661}.5"), Some(2.0));
        assert_eq!(parse_tip("\u{0661}\u{0662}"), None);
    }

    #[test]
    fn test_follow_date_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        assert_eq!(parse_follow_date("2024-05-01"), Some(expected));
        assert_eq!(parse_follow_date("05/01/2024"), Some(expected));
        assert_eq!(parse_follow_date("2024-05-01T00:00:00Z"), Some(expected));
        assert_eq!(parse_follow_date("2024-05-01 00:00"), Some(expected));
        assert_eq!(parse_follow_date("2024-05-01T02:00:00+02:00"), Some(expected));
        assert_eq!(parse_follow_date("last spring"), None);
    }

    #[test]
    fn test_basic_rows() {
        let sheet = parse("Viewer_Name,Days,VIP,Mod\nAlice,5,x,\nBob,50,,yes\n");
        assert_eq!(sheet.len(), 2);

        let alice = sheet.get("alice").unwrap();
        assert_eq!(alice.identity.display, "Alice");
        assert_eq!(alice.tenure_days, 5);
        assert!(alice.roles.vip);
        assert!(!alice.roles.moderator);

        let bob = sheet.get("bob").unwrap();
        assert!(bob.roles.moderator);
        assert!(!bob.roles.tier2);
    }

    #[test]
    fn test_semicolon_delimiter() {
        let sheet = parse("viewer_name;days;tips\r\nAlice;12;$3\r\n");
        assert_eq!(sheet.get("alice").unwrap().tenure_days, 12);
        assert_eq!(sheet.tip("alice"), 3.0);
    }

    #[test]
    fn test_duplicate_larger_tenure_wins() {
        let sheet = parse("viewer_name,days,vip\nalice,10,false\nbob,20,\nALICE,40,true\n");
        assert_eq!(sheet.len(), 2);

        let alice = sheet.get("alice").unwrap();
        assert_eq!(alice.tenure_days, 40);
        assert!(alice.roles.vip);
        assert_eq!(alice.identity.display, "ALICE");
        assert_eq!(sheet.rows()[0].login(), "alice");
    }

    #[test]
    fn test_duplicate_tie_keeps_first() {
        let sheet = parse("viewer_name,days,vip\nAlice,10,x\nalice,10,\n");
        let alice = sheet.get("alice").unwrap();
        assert_eq!(alice.identity.display, "Alice");
        assert!(alice.roles.vip);
    }

    #[test]
    fn test_side_maps_updated_by_losing_rows() {
        let sheet = parse("viewer_name,days,tips,giftsub,override\nalice,40,,,\nalice,10,$7,2,x\n");
        assert_eq!(sheet.get("alice").unwrap().tenure_days, 40);
        assert_eq!(sheet.tip("alice"), 7.0);
        assert_eq!(sheet.gift_override("alice"), Some(2));
        assert!(sheet.has_avatar_override("alice"));
    }

    #[test]
    fn test_first_follow_fallback() {
        let sheet = parse("viewer_name,days,first_follow\nalice,,2024-05-01\nbob,n/a,2024-06-01T13:00:00Z\n");
        assert_eq!(sheet.get("alice").unwrap().tenure_days, 31);
        assert_eq!(sheet.get("bob").unwrap().tenure_days, -1);
    }

    #[test]
    fn test_days_preferred_over_first_follow() {
        let sheet = parse("viewer_name,days,first_follow\nalice,3,2020-01-01\n");
        assert_eq!(sheet.get("alice").unwrap().tenure_days, 3);
    }

    #[test]
    fn test_skipped_lines_reported() {
        let report = FeedParser::new(now())
            .parse_report("viewer_name,days,first_follow\n,5,\n\n  ,6,\ncarol,,soon\ndave,2,\n");

        assert_eq!(report.sheet.len(), 1);
        assert_eq!(report.data_lines, 4);
        assert_eq!(
            report.skipped,
            vec![
                SkippedLine { line: 2, reason: SkipReason::MissingName },
                SkippedLine { line: 4, reason: SkipReason::MissingName },
                SkippedLine { line: 5, reason: SkipReason::NoTenure },
            ]
        );
    }

    #[test]
    fn test_leading_blank_lines_keep_physical_numbering() {
        let report = FeedParser::new(now()).parse_report("\n\n  viewer_name,days\n,5\nbob,1\n");

        assert_eq!(report.sheet.len(), 1);
        assert_eq!(report.delimiter, ',');
        assert_eq!(
            report.skipped,
            vec![SkippedLine { line: 4, reason: SkipReason::MissingName }]
        );
    }

    #[test]
    fn test_missing_columns_default_false() {
        let report = FeedParser::new(now()).parse_report("viewer_name,days\nalice,5\n");
        let alice = report.sheet.get("alice").unwrap();
        assert_eq!(alice.roles, RoleFlags::default());
        assert_eq!(report.sheet.tip("alice"), 0.0);
        assert!(report.missing_columns.contains(&"override"));
        assert!(!report.missing_columns.contains(&"days"));
    }

    #[test]
    fn test_short_lines_read_as_empty() {
        let sheet = parse("viewer_name,days,vip\nalice,5\n");
        assert!(!sheet.get("alice").unwrap().roles.vip);
    }

    #[test]
    fn test_empty_and_header_only() {
        assert!(parse("").is_empty());
        assert!(parse("   \n").is_empty());
        assert!(parse("viewer_name,days\n").is_empty());
    }
}
