// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # FollowRoll Sources
//!
//! The two inputs of a roster build.
//!
//! | Source | Supplies | Failure handling |
//! |--------|----------|------------------|
//! | [`twitch`] | broadcaster id, subscribers, gifter tallies, bits, avatars | fatal, except avatar batches |
//! | [`sheet`] | rows, tenure, roles, tip/gift/avatar overrides | download fatal, bad rows skipped |
//!
//! ## Usage
//!
//! ```ignore
//! use followroll_sources::sheet::{FeedParser, SheetClient, DEFAULT_SHEET_URL};
//! use followroll_sources::twitch::RosterFetcher;
//!
//! let text = SheetClient::new(transport.clone(), DEFAULT_SHEET_URL).download().await?;
//! let sheet = FeedParser::new(Utc::now()).parse(&text);
//! let avatars = RosterFetcher::new(helix).load_avatars(&sheet.logins()).await;
//! ```

pub mod sheet;
pub mod twitch;

pub use sheet::{FeedParser, FeedReport, SheetClient, SheetError};
pub use twitch::{RosterFetcher, TwitchError};
