//! Current-session API endpoints.

use axum::{extract::State, Json};

use super::{error, log_activity, success, ApiResult};
use crate::errors::AppError;
use crate::models::{SetSessionRequest, Staff};
use crate::AppState;

/// GET /api/session - The current-session user, or null.
pub async fn get_session(State(state): State<AppState>) -> ApiResult<Option<Staff>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.current_session().await {
        Ok(user) => success(user, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// PUT /api/session - Select the current-session user by staff id.
pub async fn set_session(
    State(state): State<AppState>,
    Json(request): Json<SetSessionRequest>,
) -> ApiResult<Staff> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    let user = match state.repo.get_staff(&request.staff_id).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return error(
                AppError::NotFound(format!("Staff {} not found", request.staff_id)),
                revision_id,
            )
        }
        Err(e) => return error(e, revision_id),
    };

    if let Err(e) = state.repo.set_session(&user).await {
        return error(e, revision_id);
    }

    log_activity(&state, "Login", format!("User {} signed in", user.name)).await;

    let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
    success(user, new_revision)
}

/// DELETE /api/session - Sign the current user out.
pub async fn clear_session(State(state): State<AppState>) -> ApiResult<()> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    // Log while the session record is still in place so the entry carries
    // the departing user's attribution.
    if let Ok(Some(user)) = state.repo.current_session().await {
        log_activity(&state, "Logout", format!("{} signed out", user.name)).await;
    }

    match state.repo.clear_session().await {
        Ok(()) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success((), new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}
