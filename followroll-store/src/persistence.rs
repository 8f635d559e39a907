//! File persistence helpers.
//!
//! Writes are atomic: content goes to a sibling `*.json.tmp` file which is
//! then renamed over the target, so readers never see a partial file.

use std::path::{Path, PathBuf};

use followroll_core::RosterSnapshot;
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, info};

use crate::error::StoreError;

// ============================================================================
// Default Paths
// ============================================================================

/// Snapshot location relative to the working directory.
pub const DEFAULT_OUTPUT_PATH: &str = "docs/data/followers.json";

/// Returns the default snapshot path.
pub fn default_output_path() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_PATH)
}

// ============================================================================
// File Operations
// ============================================================================

/// Temp file used while writing `path`.
fn temp_path(path: &Path) -> PathBuf {
    path.with_extension("json.tmp")
}

/// Saves data as pretty-printed JSON.
///
/// Creates parent directories if they don't exist and writes atomically
/// (via temp file + rename).
///
/// # Errors
///
/// Returns an error if serialization or any file operation fails. The
/// target is left untouched in that case.
pub async fn save_json<T: Serialize>(path: &Path, data: &T) -> Result<(), StoreError> {
    debug!(path = %path.display(), "Saving JSON file");

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let json = serde_json::to_string_pretty(data)?;

    let temp = temp_path(path);
    tokio::fs::write(&temp, &json).await?;
    if let Err(e) = tokio::fs::rename(&temp, path).await {
        let _ = tokio::fs::remove_file(&temp).await;
        return Err(e.into());
    }

    debug!(path = %path.display(), bytes = json.len(), "JSON file saved");
    Ok(())
}

/// Loads data from a JSON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or does not parse as `T`.
pub async fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    debug!(path = %path.display(), "Loading JSON file");

    let content = tokio::fs::read_to_string(path).await?;
    let data = serde_json::from_str(&content)?;

    debug!(path = %path.display(), "JSON file loaded");
    Ok(data)
}

/// Validates and writes a roster snapshot.
///
/// # Errors
///
/// - `StoreError::Invalid` if ranks or ordering are inconsistent; nothing is
///   written
/// - IO and serialization errors from [`save_json`]
pub async fn export_snapshot(path: &Path, snapshot: &RosterSnapshot) -> Result<(), StoreError> {
    snapshot.validate()?;
    save_json(path, snapshot).await?;
    info!(path = %path.display(), records = snapshot.len(), "Snapshot exported");
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
