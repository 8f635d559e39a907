//! Published sheet source.
//!
//! The sheet is maintained by hand and published as CSV. It supplies the
//! roster itself (who, tenure, role checkboxes) and per-person overrides for
//! tips, gift counts and avatars.

mod error;
mod fetcher;
mod parser;

pub use error::SheetError;
pub use fetcher::{DEFAULT_SHEET_URL, SheetClient};
pub use parser::{
    FeedParser, FeedReport, SkipReason, SkippedLine, leading_int, parse_follow_date,
    parse_gift_override, parse_tip, truthy,
};
