//! Activity log API endpoints.

use axum::{extract::State, Json};
use chrono::Utc;

use super::{error, success, ApiResult};
use crate::errors::AppError;
use crate::models::{ActivityLog, AppendLogRequest};
use crate::AppState;

/// GET /api/logs - List activity log entries, most recent first.
pub async fn list_logs(State(state): State<AppState>) -> ApiResult<Vec<ActivityLog>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.list_logs().await {
        Ok(logs) => success(logs, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/logs - Append an activity log entry.
///
/// Attribution comes from explicit `userId`/`userName` fields when both are
/// supplied, otherwise from the current-session user.
pub async fn append_log(
    State(state): State<AppState>,
    Json(request): Json<AppendLogRequest>,
) -> ApiResult<ActivityLog> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    if request.action.trim().is_empty() {
        return error(
            AppError::Validation("Action is required".to_string()),
            revision_id,
        );
    }

    let (user_id, user_name) = match (request.user_id, request.user_name) {
        (Some(id), Some(name)) => (id, name),
        _ => match state.repo.current_session().await {
            Ok(Some(user)) => (user.id, user.name),
            Ok(None) => {
                return error(
                    AppError::Validation(
                        "No acting user: supply userId/userName or sign in first".to_string(),
                    ),
                    revision_id,
                )
            }
            Err(e) => return error(e, revision_id),
        },
    };

    let entry = ActivityLog {
        id: uuid::Uuid::new_v4().to_string(),
        user_id,
        user_name,
        action: request.action,
        details: request.details,
        timestamp: Utc::now().to_rfc3339(),
    };

    match state.repo.append_log(entry).await {
        Ok(entry) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(entry, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}
