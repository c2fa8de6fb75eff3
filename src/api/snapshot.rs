//! Snapshot API endpoints: export, import, restore, revision.

use axum::extract::State;

use super::{error, success, ApiResult};
use crate::models::{RestoreOutcome, RevisionInfo, SnapshotBundle};
use crate::AppState;

/// GET /api/snapshot/export - Serialize all collections into a bundle.
pub async fn export_snapshot(State(state): State<AppState>) -> ApiResult<SnapshotBundle> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.export_snapshot().await {
        Ok(bundle) => success(bundle, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/snapshot/import - Overwrite collections from an uploaded bundle.
///
/// The body is the raw serialized bundle, exactly as produced by export.
/// Collections missing from the bundle keep their stored contents.
pub async fn import_snapshot(
    State(state): State<AppState>,
    body: String,
) -> ApiResult<SnapshotBundle> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.import_snapshot(&body).await {
        Ok(bundle) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(bundle, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/snapshot/restore - Overwrite collections from the rolling backup.
///
/// `restored: false` means no backup has ever been written; the caller owns
/// any user messaging.
pub async fn restore_backup(State(state): State<AppState>) -> ApiResult<RestoreOutcome> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.restore_from_backup().await {
        Ok(restored) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(RestoreOutcome { restored }, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/snapshot/revision - Get the current revision info.
pub async fn get_revision(State(state): State<AppState>) -> ApiResult<RevisionInfo> {
    match state.repo.get_revision_info().await {
        Ok(info) => {
            let revision_id = info.revision_id;
            success(info, revision_id)
        }
        Err(e) => error(e, 0),
    }
}
