//! REST API module.
//!
//! Contains all API routes and handlers following the frontend contract.

mod bookings;
mod logs;
mod migrations;
mod reports;
mod session;
mod snapshot;
mod staff;

pub use bookings::*;
pub use logs::*;
pub use migrations::*;
pub use reports::*;
pub use session::*;
pub use snapshot::*;
pub use staff::*;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Serialize;

use crate::models::ActivityLog;
use crate::AppState;

/// Success response envelope.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
    pub revision_id: i64,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T, revision_id: i64) -> Self {
        Self {
            success: true,
            data,
            revision_id,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Response type that can be either success or error.
pub type ApiResult<T> = Result<ApiResponse<T>, crate::errors::AppErrorWithRevision>;

/// Create a successful API response.
pub fn success<T: Serialize>(data: T, revision_id: i64) -> ApiResult<T> {
    Ok(ApiResponse::new(data, revision_id))
}

/// Create an error API response.
pub fn error<T: Serialize>(err: crate::errors::AppError, revision_id: i64) -> ApiResult<T> {
    Err(crate::errors::AppErrorWithRevision {
        error: err,
        revision_id,
    })
}

/// Append an activity log entry attributed to the current-session user.
///
/// Skipped silently when nobody is signed in; a failed append never fails
/// the mutation it describes.
async fn log_activity(state: &AppState, action: &str, details: String) {
    let user = match state.repo.current_session().await {
        Ok(Some(user)) => user,
        Ok(None) => return,
        Err(err) => {
            tracing::warn!(error = %err, "Could not resolve session user for activity log");
            return;
        }
    };

    let entry = ActivityLog {
        id: uuid::Uuid::new_v4().to_string(),
        user_id: user.id,
        user_name: user.name,
        action: action.to_string(),
        details,
        timestamp: Utc::now().to_rfc3339(),
    };

    if let Err(err) = state.repo.append_log(entry).await {
        tracing::warn!(error = %err, "Failed to append activity log entry");
    }
}
