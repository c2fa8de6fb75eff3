//! Staff model matching the frontend Staff interface.

use serde::{Deserialize, Serialize};

/// A staff member who can be assigned to bookings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Staff {
    pub id: String,
    pub name: String,
    pub contact: String,
    pub base_designation: String,
    #[serde(default)]
    pub is_admin: bool,
}

/// Request body for creating a new staff member.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStaffRequest {
    pub name: String,
    #[serde(default)]
    pub contact: Option<String>,
    #[serde(default)]
    pub base_designation: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
}

/// Request body for updating an existing staff member.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStaffRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub contact: Option<String>,
    #[serde(default)]
    pub base_designation: Option<String>,
    #[serde(default)]
    pub is_admin: Option<bool>,
}

/// Request body for replacing the whole staff collection.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceStaffRequest {
    pub staff: Vec<Staff>,
    /// Expected collection version for optimistic concurrency control
    #[serde(default)]
    pub expected_version: Option<i64>,
}

/// Request body for the one-time initialization flow.
///
/// Only valid while the staff collection is empty; the created record is
/// always admin-flagged.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitStaffRequest {
    pub name: String,
    #[serde(default)]
    pub contact: Option<String>,
    #[serde(default)]
    pub base_designation: Option<String>,
}

/// Request body for selecting the current-session user.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetSessionRequest {
    pub staff_id: String,
}
