//! Booking handlers.

use std::sync::Arc;

use axum::response::{IntoResponse, Response};
use axum::Json;
use metrics::counter;
use tracing::info;

use super::{require_item, require_user};
use crate::dto::booking::{to_booking_dto, BookingCreateDto, BookingDto};
use crate::errors::ShareItResult;
use crate::metrics::{BOOKINGS_CREATED_TOTAL, BOOKING_DECISIONS_TOTAL};
use crate::model::booking::{ensure_viewer, BookingRecord, BookingScope, BookingState};
use crate::model::{booking_not_found, now};
use crate::AppState;

async fn booking_view(state: &AppState, booking: BookingRecord) -> ShareItResult<BookingDto> {
    let item = require_item(state, booking.item_id).await?;
    let booker = require_user(state, booking.booker_id).await?;
    Ok(to_booking_dto(booking, &item, &booker))
}

/// `POST /bookings` -- request a booking; it starts out WAITING.
#[utoipa::path(
    post,
    path = "/bookings",
    tag = "Bookings",
    operation_id = "CreateBooking",
    params(("X-Sharer-User-Id" = i64, Header, description = "Booker")),
    responses(
        (status = 200, description = "Booking created"),
        (status = 400, description = "Invalid window or item not available"),
        (status = 404, description = "Unknown user or item")
    )
)]
pub async fn create_booking(
    state: Arc<AppState>,
    user_id: i64,
    body: BookingCreateDto,
) -> ShareItResult<Response> {
    let booking = state
        .store
        .create_booking(body.into_new_booking(user_id))
        .await?;
    counter!(BOOKINGS_CREATED_TOTAL).increment(1);
    info!(
        booking_id = booking.id,
        item_id = booking.item_id,
        booker_id = user_id,
        "Booking created"
    );
    let view = booking_view(&state, booking).await?;
    Ok(Json(view).into_response())
}

/// `PATCH /bookings/{bookingId}?approved=` -- owner approves or rejects.
#[utoipa::path(
    patch,
    path = "/bookings/{bookingId}",
    tag = "Bookings",
    operation_id = "DecideBooking",
    params(
        ("bookingId" = i64, Path, description = "Booking id"),
        ("approved" = bool, Query, description = "Approve (true) or reject (false)"),
        ("X-Sharer-User-Id" = i64, Header, description = "Item owner")
    ),
    responses(
        (status = 200, description = "Booking decided"),
        (status = 400, description = "Caller is not the owner or booking already decided"),
        (status = 404, description = "No such booking")
    )
)]
pub async fn decide_booking(
    state: Arc<AppState>,
    user_id: i64,
    booking_id: i64,
    approved: bool,
) -> ShareItResult<Response> {
    let booking = state
        .store
        .decide_booking(user_id, booking_id, approved)
        .await?;
    let outcome = booking.status.as_str().to_ascii_lowercase();
    counter!(BOOKING_DECISIONS_TOTAL, "outcome" => outcome).increment(1);
    info!(booking_id, status = %booking.status, "Booking decided");
    let view = booking_view(&state, booking).await?;
    Ok(Json(view).into_response())
}

/// `GET /bookings/{bookingId}` -- visible to the booker and the item owner.
#[utoipa::path(
    get,
    path = "/bookings/{bookingId}",
    tag = "Bookings",
    operation_id = "GetBooking",
    params(
        ("bookingId" = i64, Path, description = "Booking id"),
        ("X-Sharer-User-Id" = i64, Header, description = "Booker or item owner")
    ),
    responses(
        (status = 200, description = "Booking found"),
        (status = 400, description = "Caller is neither booker nor owner"),
        (status = 404, description = "No such booking")
    )
)]
pub async fn get_booking(
    state: Arc<AppState>,
    user_id: i64,
    booking_id: i64,
) -> ShareItResult<Response> {
    let booking = state
        .store
        .get_booking(booking_id)
        .await?
        .ok_or_else(|| booking_not_found(booking_id))?;
    let item = require_item(&state, booking.item_id).await?;
    ensure_viewer(&booking, item.owner_id, user_id)?;
    let booker = require_user(&state, booking.booker_id).await?;
    Ok(Json(to_booking_dto(booking, &item, &booker)).into_response())
}

async fn list(
    state: &AppState,
    scope: BookingScope,
    user_id: i64,
    raw_state: Option<&str>,
) -> ShareItResult<Response> {
    let booking_state = BookingState::parse_param(raw_state)?;
    require_user(state, user_id).await?;
    let bookings = state
        .store
        .list_bookings(scope, booking_state, now())
        .await?;
    let mut views = Vec::with_capacity(bookings.len());
    for booking in bookings {
        views.push(booking_view(state, booking).await?);
    }
    Ok(Json(views).into_response())
}

/// `GET /bookings?state=` -- bookings made by the caller, newest start first.
#[utoipa::path(
    get,
    path = "/bookings",
    tag = "Bookings",
    operation_id = "ListBookerBookings",
    params(
        ("state" = Option<String>, Query, description = "ALL, CURRENT, PAST, FUTURE, WAITING or REJECTED"),
        ("X-Sharer-User-Id" = i64, Header, description = "Booker")
    ),
    responses(
        (status = 200, description = "Bookings"),
        (status = 400, description = "Unknown state"),
        (status = 404, description = "No such user")
    )
)]
pub async fn list_booker_bookings(
    state: Arc<AppState>,
    user_id: i64,
    raw_state: Option<String>,
) -> ShareItResult<Response> {
    list(
        &state,
        BookingScope::Booker(user_id),
        user_id,
        raw_state.as_deref(),
    )
    .await
}

/// `GET /bookings/owner?state=` -- bookings of the caller's items.
#[utoipa::path(
    get,
    path = "/bookings/owner",
    tag = "Bookings",
    operation_id = "ListOwnerBookings",
    params(
        ("state" = Option<String>, Query, description = "ALL, CURRENT, PAST, FUTURE, WAITING or REJECTED"),
        ("X-Sharer-User-Id" = i64, Header, description = "Item owner")
    ),
    responses(
        (status = 200, description = "Bookings"),
        (status = 400, description = "Unknown state"),
        (status = 404, description = "No such user")
    )
)]
pub async fn list_owner_bookings(
    state: Arc<AppState>,
    user_id: i64,
    raw_state: Option<String>,
) -> ShareItResult<Response> {
    list(
        &state,
        BookingScope::Owner(user_id),
        user_id,
        raw_state.as_deref(),
    )
    .await
}
