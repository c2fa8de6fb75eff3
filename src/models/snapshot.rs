//! Snapshot, backup, and store-metadata models.

use serde::{Deserialize, Serialize};

use super::{ActivityLog, Booking, Staff};

/// Format version written into exported bundles.
pub const SNAPSHOT_SCHEMA_VERSION: i32 = 1;

fn default_schema_version() -> i32 {
    SNAPSHOT_SCHEMA_VERSION
}

/// The portable bundle produced by export and consumed by import.
///
/// Each collection is optional on the way in: a bundle missing a collection
/// leaves the corresponding stored collection untouched. Export always fills
/// all three.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotBundle {
    #[serde(default = "default_schema_version")]
    pub schema_version: i32,
    #[serde(default)]
    pub generated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bookings: Option<Vec<Booking>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staff: Option<Vec<Staff>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logs: Option<Vec<ActivityLog>>,
}

/// The rolling backup blob, overwritten on every collection write.
///
/// This mirrors the latest committed state, so it guards against loss of the
/// storage medium only, never against a bad write that already committed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupSnapshot {
    pub bookings: Vec<Booking>,
    pub staff: Vec<Staff>,
    pub logs: Vec<ActivityLog>,
    pub timestamp: String,
}

/// Revision information for change detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevisionInfo {
    pub revision_id: i64,
    pub generated_at: String,
}

/// Outcome of a restore-from-backup request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreOutcome {
    pub restored: bool,
}

/// New version of a collection after a whole-collection replacement.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionVersion {
    pub version: i64,
}

/// A schema migration applied to the backing store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationRecord {
    pub name: String,
    /// ISO-8601 timestamp.
    pub applied_at: String,
}
