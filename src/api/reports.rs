//! Reporting API endpoints over the aggregation layer.

use axum::extract::{Query, State};
use chrono::{Datelike, Utc};
use serde::Deserialize;

use super::{error, success, ApiResult};
use crate::reports::{self, FinancialSummary, MonthlyPoint};
use crate::AppState;

/// Query parameters for the monthly series.
#[derive(Debug, Deserialize)]
pub struct MonthlyQuery {
    /// Calendar year; defaults to the current UTC year.
    pub year: Option<i32>,
}

/// GET /api/reports/summary - Studio-wide financial summary.
pub async fn get_summary(State(state): State<AppState>) -> ApiResult<FinancialSummary> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    let bookings = match state.repo.list_bookings().await {
        Ok(bookings) => bookings,
        Err(e) => return error(e, revision_id),
    };
    let staff = match state.repo.list_staff().await {
        Ok(staff) => staff,
        Err(e) => return error(e, revision_id),
    };

    success(reports::financial_summary(&bookings, &staff), revision_id)
}

/// GET /api/reports/monthly - Twelve-month revenue/profit series.
pub async fn get_monthly(
    State(state): State<AppState>,
    Query(query): Query<MonthlyQuery>,
) -> ApiResult<Vec<MonthlyPoint>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);
    let year = query.year.unwrap_or_else(|| Utc::now().year());

    match state.repo.list_bookings().await {
        Ok(bookings) => success(reports::monthly_series(&bookings, year), revision_id),
        Err(e) => error(e, revision_id),
    }
}
