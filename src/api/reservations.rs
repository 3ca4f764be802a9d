//! Reservation API endpoints.
//!
//! Each mutation loads the restaurant, applies one booking operation, and
//! saves the aggregate back. Sending `expectedVersion` turns the save into a
//! conditional write; without it concurrent writers can overwrite each other.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};

use super::{created, found, no_content, success, ApiResult};
use crate::booking;
use crate::errors::AppError;
use crate::models::{
    AddCommentRequest, Reservation, ReserveRequest, UpdateReservationRequest, VersionQuery,
};
use crate::AppState;

/// POST /api/restaurants/reserve - Book a table.
pub async fn reserve(
    State(state): State<AppState>,
    payload: Result<Json<ReserveRequest>, JsonRejection>,
) -> ApiResult<Reservation> {
    let Json(request) = payload?;

    let result = state
        .repo
        .modify_restaurant(&request.restaurant_id, request.expected_version, |restaurant| {
            Ok(booking::book(
                restaurant,
                request.date,
                request.time,
                request.customer(),
            )?)
        })
        .await;

    match result {
        Ok((reservation, _)) => {
            tracing::info!(
                restaurant_id = %request.restaurant_id,
                reservation_id = reservation.id,
                date = %reservation.date,
                time = %reservation.time,
                "Booked table"
            );
            created(reservation)
        }
        Err(e) => {
            tracing::warn!(
                restaurant_id = %request.restaurant_id,
                date = %request.date,
                time = %request.time,
                "Booking rejected: {}",
                e
            );
            Err(e)
        }
    }
}

/// GET /api/restaurants/:id/reservations - List a restaurant's reservations.
pub async fn list_reservations(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Vec<Reservation>> {
    let restaurant = found(state.repo.get_restaurant(&id).await?, "Restaurant", &id)?;
    success(restaurant.reservations)
}

/// PUT /api/restaurants/:id/reservations - Overwrite a reservation, located by id.
pub async fn update_reservation(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateReservationRequest>, JsonRejection>,
) -> ApiResult<Reservation> {
    let Json(request) = payload?;
    let expected_version = request.expected_version;
    let updated = request.into_reservation(&id);

    let (reservation, _) = state
        .repo
        .modify_restaurant(&id, expected_version, |restaurant| {
            Ok(booking::update_reservation(restaurant, updated)?)
        })
        .await?;
    success(reservation)
}

/// PUT /api/restaurants/:id/reservations/:reservation_id/comment - Attach a comment.
pub async fn add_comment(
    State(state): State<AppState>,
    Path((id, reservation_id)): Path<(String, i64)>,
    payload: Result<Json<AddCommentRequest>, JsonRejection>,
) -> ApiResult<Reservation> {
    let Json(request) = payload?;

    let (reservation, _) = state
        .repo
        .modify_restaurant(&id, request.expected_version, |restaurant| {
            Ok(booking::add_comment(
                restaurant,
                reservation_id,
                &request.comment_text,
            )?)
        })
        .await?;
    success(reservation)
}

/// DELETE /api/restaurants/:id/reservations/:reservation_id - Cancel a reservation.
pub async fn delete_reservation(
    State(state): State<AppState>,
    Path((id, reservation_id)): Path<(String, i64)>,
    Query(query): Query<VersionQuery>,
) -> Result<StatusCode, AppError> {
    state
        .repo
        .modify_restaurant(&id, query.expected_version, |restaurant| {
            Ok(booking::remove_reservation(restaurant, reservation_id)?)
        })
        .await?;
    tracing::info!(restaurant_id = %id, reservation_id, "Cancelled reservation");
    no_content()
}
