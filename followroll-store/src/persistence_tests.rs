//! Snapshot persistence tests.

use chrono::{TimeZone, Utc};
use followroll_core::{FinalRecord, RosterSnapshot};
use tempfile::TempDir;

use crate::error::StoreError;
use crate::persistence::{export_snapshot, load_json, save_json};

fn record(login: &str, days: i64, rank: u32) -> FinalRecord {
    FinalRecord {
        login: login.to_string(),
        display: login.to_uppercase(),
        days,
        date: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        vip: false,
        moderator: false,
        tier2: false,
        tier3: false,
        artist: false,
        rank,
        subscriber: rank == 1,
        gifts: 0,
        bits: 0,
        tips: 0.0,
        avatar_override: false,
        avatar_url: String::new(),
    }
}

fn snapshot(records: Vec<FinalRecord>) -> RosterSnapshot {
    RosterSnapshot::new(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(), records)
}

// ============================================================================
// JSON Persistence Tests
// ============================================================================

#[tokio::test]
async fn test_snapshot_save_and_load() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("followers.json");
    let original = snapshot(vec![record("bob", 50, 1), record("alice", 5, 2)]);

    save_json(&path, &original).await.unwrap();
    let loaded: RosterSnapshot = load_json(&path).await.unwrap();

    assert_eq!(loaded, original);
}

#[tokio::test]
async fn test_output_is_two_space_pretty_json() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("followers.json");

    save_json(&path, &snapshot(vec![record("bob", 50, 1)])).await.unwrap();
    let text = tokio::fs::read_to_string(&path).await.unwrap();

    assert!(text.starts_with("{\n  \"generated\": \"2024-06-01T12:00:00.000Z\",\n  \"records\": ["));
    assert!(text.contains("\n      \"fNum\": 1,"));
}

#[tokio::test]
async fn test_save_creates_parent_directories() {
    let temp_dir = TempDir::new().unwrap();
    let nested = temp_dir.path().join("docs").join("data").join("followers.json");

    save_json(&nested, &serde_json::json!({"records": []})).await.unwrap();
    assert!(nested.exists());
}

#[tokio::test]
async fn test_save_replaces_and_leaves_no_temp_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("followers.json");

    tokio::fs::write(&path, "stale").await.unwrap();
    save_json(&path, &serde_json::json!({"fresh": true})).await.unwrap();

    let text = tokio::fs::read_to_string(&path).await.unwrap();
    assert!(text.contains("fresh"));
    assert!(!temp_dir.path().join("followers.json.tmp").exists());
}

#[tokio::test]
async fn test_load_nonexistent_file() {
    let temp_dir = TempDir::new().unwrap();
    let result: Result<RosterSnapshot, _> = load_json(&temp_dir.path().join("missing.json")).await;
    assert!(result.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_load_malformed_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("followers.json");
    tokio::fs::write(&path, "{ not json").await.unwrap();

    let result: Result<RosterSnapshot, _> = load_json(&path).await;
    assert!(matches!(result, Err(StoreError::Serialization(_))));
}

// ============================================================================
// Export Tests
// ============================================================================

#[tokio::test]
async fn test_export_valid_snapshot() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("followers.json");

    export_snapshot(&path, &snapshot(vec![record("bob", 50, 1), record("alice", 5, 2)]))
        .await
        .unwrap();
    assert!(path.exists());
}

#[tokio::test]
async fn test_export_rejects_broken_ranks_without_writing() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("followers.json");

    let broken = snapshot(vec![record("bob", 50, 1), record("alice", 5, 3)]);
    let result = export_snapshot(&path, &broken).await;

    assert!(matches!(result, Err(StoreError::Invalid(_))));
    assert!(!path.exists());
}
