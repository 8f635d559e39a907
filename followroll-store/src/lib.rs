// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # FollowRoll Store
//!
//! Writes the roster snapshot consumed by the static site.
//!
//! ## Usage
//!
//! ```ignore
//! use followroll_store::{export_snapshot, default_output_path};
//!
//! export_snapshot(&default_output_path(), &snapshot).await?;
//! ```

pub mod error;
pub mod persistence;

pub use error::StoreError;
pub use persistence::{
    DEFAULT_OUTPUT_PATH, default_output_path, export_snapshot, load_json, save_json,
};
#[cfg(test)]
mod persistence_tests;
