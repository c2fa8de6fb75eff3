//! Migration log API endpoint.

use axum::extract::State;

use super::{error, success, ApiResult};
use crate::models::MigrationRecord;
use crate::AppState;

/// GET /api/migrations - Schema migrations applied to this store.
pub async fn list_migrations(State(state): State<AppState>) -> ApiResult<Vec<MigrationRecord>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.list_migrations().await {
        Ok(records) => success(records, revision_id),
        Err(e) => error(e, revision_id),
    }
}
