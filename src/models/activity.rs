//! Activity log model matching the frontend ActivityLog interface.

use serde::{Deserialize, Serialize};

/// A single entry in the append-only activity history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLog {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    /// Free-text category, e.g. "Added Booking".
    pub action: String,
    pub details: String,
    /// ISO-8601 timestamp.
    pub timestamp: String,
}

/// Request body for appending an activity log entry.
///
/// When `user_id`/`user_name` are omitted the entry is attributed to the
/// current-session user.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendLogRequest {
    pub action: String,
    #[serde(default)]
    pub details: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
}
