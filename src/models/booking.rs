//! Booking model matching the frontend StudioEvent interface.

use serde::{Deserialize, Serialize};

/// The association of one staff member to one booking.
///
/// `staff_id` is a soft reference: the staff record it points to may be
/// deleted independently, and consumers must tolerate a dangling id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub staff_id: String,
    pub fee: f64,
    #[serde(default)]
    pub is_paid: bool,
}

/// A scheduled studio session with a date, time range, revenue figure, and
/// assigned staff.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: String,
    pub title: String,
    /// Calendar date, `YYYY-MM-DD`.
    pub date: String,
    /// `HH:MM`, 24-hour.
    pub start_time: String,
    pub end_time: String,
    pub revenue: f64,
    #[serde(default)]
    pub assignments: Vec<Assignment>,
}

/// Request body for creating a new booking.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub title: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub revenue: f64,
    #[serde(default)]
    pub assignments: Vec<Assignment>,
}

/// Request body for updating an existing booking.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookingRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub revenue: Option<f64>,
    #[serde(default)]
    pub assignments: Option<Vec<Assignment>>,
}

/// Request body for replacing the whole bookings collection.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceBookingsRequest {
    pub bookings: Vec<Booking>,
    /// Expected collection version for optimistic concurrency control
    #[serde(default)]
    pub expected_version: Option<i64>,
}
