//! Host APIs for FollowRoll.
//!
//! - [`http`] - Transport seam and HTTP client

pub mod http;

pub use http::{HttpClient, Transport};
