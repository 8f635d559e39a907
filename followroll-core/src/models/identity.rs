//! Identity types.

use serde::{Deserialize, Serialize};

/// A person as seen across every source.
///
/// `login` is the lower-cased join key shared by the sheet and the Helix
/// API; `display` keeps the casing the sheet author typed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    /// Lower-cased handle.
    pub login: String,
    /// Display name in its original casing.
    pub display: String,
}

impl Identity {
    /// Builds an identity from a display name, trimming surrounding whitespace.
    pub fn from_display(display: &str) -> Self {
        let display = display.trim();
        Self {
            login: display.to_lowercase(),
            display: display.to_string(),
        }
    }

    /// Returns true if the handle is empty.
    pub fn is_empty(&self) -> bool {
        self.login.is_empty()
    }
}
