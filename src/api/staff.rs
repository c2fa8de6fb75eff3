//! Staff API endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{error, log_activity, success, ApiResult};
use crate::errors::AppError;
use crate::models::{
    CollectionVersion, CreateStaffRequest, InitStaffRequest, ReplaceStaffRequest, Staff,
    UpdateStaffRequest,
};
use crate::AppState;

/// GET /api/staff - List all staff.
pub async fn list_staff(State(state): State<AppState>) -> ApiResult<Vec<Staff>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.list_staff().await {
        Ok(staff) => success(staff, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/staff/:id - Get a single staff member.
pub async fn get_staff(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Staff> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.get_staff(&id).await {
        Ok(Some(member)) => success(member, revision_id),
        Ok(None) => error(
            AppError::NotFound(format!("Staff {} not found", id)),
            revision_id,
        ),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/staff/init - Create the first (admin) staff record.
///
/// Valid only while the staff collection is empty.
pub async fn init_staff(
    State(state): State<AppState>,
    Json(request): Json<InitStaffRequest>,
) -> ApiResult<Staff> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    if request.name.trim().is_empty() {
        return error(
            AppError::Validation("Name is required".to_string()),
            revision_id,
        );
    }

    match state.repo.init_staff(&request).await {
        Ok(admin) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(admin, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/staff - Create a new staff member.
pub async fn create_staff(
    State(state): State<AppState>,
    Json(request): Json<CreateStaffRequest>,
) -> ApiResult<Staff> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    if request.name.trim().is_empty() {
        return error(
            AppError::Validation("Name is required".to_string()),
            revision_id,
        );
    }

    match state.repo.create_staff(&request).await {
        Ok(member) => {
            log_activity(
                &state,
                "Added Team Member",
                format!("Added: {}", member.name),
            )
            .await;

            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(member, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// PUT /api/staff/:id - Update a staff member.
pub async fn update_staff(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateStaffRequest>,
) -> ApiResult<Staff> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    if let Some(name) = &request.name {
        if name.trim().is_empty() {
            return error(
                AppError::Validation("Name is required".to_string()),
                revision_id,
            );
        }
    }

    match state.repo.update_staff(&id, &request).await {
        Ok(member) => {
            log_activity(
                &state,
                "Updated Team Member",
                format!("Modified: {}", member.name),
            )
            .await;

            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(member, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// DELETE /api/staff/:id - Delete a staff member.
///
/// Bookings keep any assignments referencing the deleted id; they simply
/// stop contributing to the per-staff ledger.
pub async fn delete_staff(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.delete_staff(&id).await {
        Ok(removed) => {
            log_activity(
                &state,
                "Deleted Team Member",
                format!("Removed: {}", removed.name),
            )
            .await;

            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success((), new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// PUT /api/staff - Replace the whole staff collection.
pub async fn replace_staff(
    State(state): State<AppState>,
    Json(request): Json<ReplaceStaffRequest>,
) -> ApiResult<CollectionVersion> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    if request.staff.iter().any(|s| s.name.trim().is_empty()) {
        return error(
            AppError::Validation("Every staff member needs a name".to_string()),
            revision_id,
        );
    }

    match state
        .repo
        .save_staff(&request.staff, request.expected_version)
        .await
    {
        Ok(version) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(CollectionVersion { version }, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}
