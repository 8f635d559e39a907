// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `FollowRoll` Core
//!
//! Core types and the reconciliation engine for the `FollowRoll` roster
//! builder.
//!
//! ## Key Types
//!
//! ### Inputs
//! - [`Identity`] - Lower-cased join key plus display name
//! - [`FeedRow`] / [`FeedSheet`] - Parsed sheet rows and override side maps
//! - [`SubscriptionFacts`] / [`SubscriptionLedger`] - Subscriber, gifter and bits data
//!
//! ### Outputs
//! - [`FinalRecord`] - One ranked person
//! - [`RosterSnapshot`] - The exported artifact
//!
//! ### Engine
//! - [`Reconciler`] - Ranks sheet rows and applies field precedence

pub mod error;
pub mod models;
pub mod reconcile;

pub use error::CoreError;

pub use models::{
    FeedRow, FeedSheet, FinalRecord, Identity, RoleFlags, RosterSnapshot, SubscriptionFacts,
    SubscriptionLedger,
};

pub use reconcile::Reconciler;
