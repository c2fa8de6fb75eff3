//! Booking API endpoints.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{NaiveDate, NaiveTime};

use super::{error, log_activity, success, ApiResult};
use crate::errors::AppError;
use crate::models::{
    Assignment, Booking, CollectionVersion, CreateBookingRequest, ReplaceBookingsRequest,
    UpdateBookingRequest,
};
use crate::AppState;

fn validate_date(date: &str) -> Result<(), AppError> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| AppError::Validation(format!("'{}' is not a valid YYYY-MM-DD date", date)))
}

fn validate_time(time: &str) -> Result<(), AppError> {
    NaiveTime::parse_from_str(time, "%H:%M")
        .map(|_| ())
        .map_err(|_| AppError::Validation(format!("'{}' is not a valid HH:MM time", time)))
}

fn validate_assignments(assignments: &[Assignment]) -> Result<(), AppError> {
    if assignments.iter().any(|a| a.fee < 0.0) {
        return Err(AppError::Validation(
            "Assignment fees must be non-negative".to_string(),
        ));
    }
    Ok(())
}

/// Field checks shared by create and whole-collection replacement.
fn validate_booking_fields(
    title: &str,
    date: &str,
    start_time: &str,
    end_time: &str,
    revenue: f64,
    assignments: &[Assignment],
) -> Result<(), AppError> {
    if title.trim().is_empty() {
        return Err(AppError::Validation("Title is required".to_string()));
    }
    validate_date(date)?;
    validate_time(start_time)?;
    validate_time(end_time)?;
    if revenue < 0.0 {
        return Err(AppError::Validation(
            "Revenue must be non-negative".to_string(),
        ));
    }
    validate_assignments(assignments)
}

fn validate_booking_update(request: &UpdateBookingRequest) -> Result<(), AppError> {
    if let Some(title) = &request.title {
        if title.trim().is_empty() {
            return Err(AppError::Validation("Title is required".to_string()));
        }
    }
    if let Some(date) = &request.date {
        validate_date(date)?;
    }
    if let Some(start_time) = &request.start_time {
        validate_time(start_time)?;
    }
    if let Some(end_time) = &request.end_time {
        validate_time(end_time)?;
    }
    if let Some(revenue) = request.revenue {
        if revenue < 0.0 {
            return Err(AppError::Validation(
                "Revenue must be non-negative".to_string(),
            ));
        }
    }
    if let Some(assignments) = &request.assignments {
        validate_assignments(assignments)?;
    }
    Ok(())
}

/// GET /api/bookings - List all bookings.
pub async fn list_bookings(State(state): State<AppState>) -> ApiResult<Vec<Booking>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.list_bookings().await {
        Ok(bookings) => success(bookings, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/bookings/:id - Get a single booking.
pub async fn get_booking(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Booking> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.get_booking(&id).await {
        Ok(Some(booking)) => success(booking, revision_id),
        Ok(None) => error(
            AppError::NotFound(format!("Booking {} not found", id)),
            revision_id,
        ),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/bookings - Create a new booking.
pub async fn create_booking(
    State(state): State<AppState>,
    Json(request): Json<CreateBookingRequest>,
) -> ApiResult<Booking> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    if let Err(e) = validate_booking_fields(
        &request.title,
        &request.date,
        &request.start_time,
        &request.end_time,
        request.revenue,
        &request.assignments,
    ) {
        return error(e, revision_id);
    }

    match state.repo.create_booking(&request).await {
        Ok(booking) => {
            log_activity(
                &state,
                "Added Booking",
                format!("Created: {}", booking.title),
            )
            .await;

            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(booking, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// PUT /api/bookings/:id - Update a booking.
pub async fn update_booking(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateBookingRequest>,
) -> ApiResult<Booking> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    if let Err(e) = validate_booking_update(&request) {
        return error(e, revision_id);
    }

    match state.repo.update_booking(&id, &request).await {
        Ok(booking) => {
            log_activity(
                &state,
                "Updated Booking",
                format!("Modified: {}", booking.title),
            )
            .await;

            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(booking, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// DELETE /api/bookings/:id - Delete a booking.
pub async fn delete_booking(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.delete_booking(&id).await {
        Ok(removed) => {
            log_activity(
                &state,
                "Deleted Booking",
                format!("Removed: {}", removed.title),
            )
            .await;

            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success((), new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// PUT /api/bookings - Replace the whole bookings collection.
pub async fn replace_bookings(
    State(state): State<AppState>,
    Json(request): Json<ReplaceBookingsRequest>,
) -> ApiResult<CollectionVersion> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    for booking in &request.bookings {
        if let Err(e) = validate_booking_fields(
            &booking.title,
            &booking.date,
            &booking.start_time,
            &booking.end_time,
            booking.revenue,
            &booking.assignments,
        ) {
            return error(e, revision_id);
        }
    }

    match state
        .repo
        .save_bookings(&request.bookings, request.expected_version)
        .await
    {
        Ok(version) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(CollectionVersion { version }, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}
