//! Domain models for `FollowRoll`.
//!
//! ## Submodules
//!
//! - [`identity`] - The cross-source join key
//! - [`feed`] - Sheet rows and the parsed sheet
//! - [`facts`] - Subscription facts and their ledger
//! - [`record`] - Final records and the exported snapshot

mod facts;
mod feed;
mod identity;
mod record;

pub use facts::{SubscriptionFacts, SubscriptionLedger};
pub use feed::{FeedRow, FeedSheet, RoleFlags};
pub use identity::Identity;
pub use record::{FinalRecord, RosterSnapshot};
