//! Gateway handlers.
//!
//! Each handler runs the same extractors and body checks as the server and
//! forwards only requests that pass them.

use std::sync::Arc;

use axum::extract::State;
use axum::response::Response;

use super::client::ForwardRequest;
use super::GatewayState;
use crate::dto::booking::{ApprovalQuery, BookingCreateDto, StateQuery};
use crate::dto::item::{CommentCreateDto, ItemCreateDto, ItemUpdateDto, SearchQuery};
use crate::dto::request::ItemRequestCreateDto;
use crate::dto::user::{UserCreateDto, UserUpdateDto};
use crate::errors::ShareItResult;
use crate::extract::{MaybeSharerUserId, PositiveId, QueryParams, SharerUserId, ValidatedJson};
use crate::model::booking::BookingState;

type Gateway = State<Arc<GatewayState>>;

// -- Users --------------------------------------------------------------------

pub(super) async fn create_user(
    State(gw): Gateway,
    ValidatedJson(body): ValidatedJson<UserCreateDto>,
) -> ShareItResult<Response> {
    gw.client
        .forward(ForwardRequest::post("/users").json(&body)?)
        .await
}

pub(super) async fn update_user(
    State(gw): Gateway,
    PositiveId(user_id): PositiveId,
    ValidatedJson(body): ValidatedJson<UserUpdateDto>,
) -> ShareItResult<Response> {
    gw.client
        .forward(ForwardRequest::patch(format!("/users/{user_id}")).json(&body)?)
        .await
}

pub(super) async fn get_user(
    State(gw): Gateway,
    PositiveId(user_id): PositiveId,
) -> ShareItResult<Response> {
    gw.client
        .forward(ForwardRequest::get(format!("/users/{user_id}")))
        .await
}

pub(super) async fn delete_user(
    State(gw): Gateway,
    PositiveId(user_id): PositiveId,
) -> ShareItResult<Response> {
    gw.client
        .forward(ForwardRequest::delete(format!("/users/{user_id}")))
        .await
}

// -- Items --------------------------------------------------------------------

pub(super) async fn create_item(
    State(gw): Gateway,
    SharerUserId(user_id): SharerUserId,
    ValidatedJson(body): ValidatedJson<ItemCreateDto>,
) -> ShareItResult<Response> {
    gw.client
        .forward(ForwardRequest::post("/items").user(user_id).json(&body)?)
        .await
}

pub(super) async fn update_item(
    State(gw): Gateway,
    SharerUserId(user_id): SharerUserId,
    PositiveId(item_id): PositiveId,
    ValidatedJson(body): ValidatedJson<ItemUpdateDto>,
) -> ShareItResult<Response> {
    gw.client
        .forward(
            ForwardRequest::patch(format!("/items/{item_id}"))
                .user(user_id)
                .json(&body)?,
        )
        .await
}

pub(super) async fn get_item(
    State(gw): Gateway,
    MaybeSharerUserId(viewer_id): MaybeSharerUserId,
    PositiveId(item_id): PositiveId,
) -> ShareItResult<Response> {
    gw.client
        .forward(ForwardRequest::get(format!("/items/{item_id}")).maybe_user(viewer_id))
        .await
}

pub(super) async fn list_items(
    State(gw): Gateway,
    SharerUserId(user_id): SharerUserId,
) -> ShareItResult<Response> {
    gw.client
        .forward(ForwardRequest::get("/items").user(user_id))
        .await
}

pub(super) async fn search_items(
    State(gw): Gateway,
    QueryParams(query): QueryParams<SearchQuery>,
) -> ShareItResult<Response> {
    let mut req = ForwardRequest::get("/items/search");
    if let Some(text) = query.text {
        req = req.query("text", text);
    }
    gw.client.forward(req).await
}

pub(super) async fn create_comment(
    State(gw): Gateway,
    SharerUserId(user_id): SharerUserId,
    PositiveId(item_id): PositiveId,
    ValidatedJson(body): ValidatedJson<CommentCreateDto>,
) -> ShareItResult<Response> {
    gw.client
        .forward(
            ForwardRequest::post(format!("/items/{item_id}/comment"))
                .user(user_id)
                .json(&body)?,
        )
        .await
}

// -- Bookings -----------------------------------------------------------------

pub(super) async fn create_booking(
    State(gw): Gateway,
    SharerUserId(user_id): SharerUserId,
    ValidatedJson(body): ValidatedJson<BookingCreateDto>,
) -> ShareItResult<Response> {
    gw.client
        .forward(ForwardRequest::post("/bookings").user(user_id).json(&body)?)
        .await
}

pub(super) async fn decide_booking(
    State(gw): Gateway,
    SharerUserId(user_id): SharerUserId,
    PositiveId(booking_id): PositiveId,
    QueryParams(query): QueryParams<ApprovalQuery>,
) -> ShareItResult<Response> {
    gw.client
        .forward(
            ForwardRequest::patch(format!("/bookings/{booking_id}"))
                .user(user_id)
                .query("approved", query.approved.to_string()),
        )
        .await
}

pub(super) async fn get_booking(
    State(gw): Gateway,
    SharerUserId(user_id): SharerUserId,
    PositiveId(booking_id): PositiveId,
) -> ShareItResult<Response> {
    gw.client
        .forward(ForwardRequest::get(format!("/bookings/{booking_id}")).user(user_id))
        .await
}

/// Validate the state name here so unknown states never reach the server.
fn state_listing(path: &str, user_id: i64, query: StateQuery) -> ShareItResult<ForwardRequest> {
    let state = BookingState::parse_param(query.state.as_deref())?;
    Ok(ForwardRequest::get(path)
        .user(user_id)
        .query("state", state.as_str()))
}

pub(super) async fn list_booker_bookings(
    State(gw): Gateway,
    SharerUserId(user_id): SharerUserId,
    QueryParams(query): QueryParams<StateQuery>,
) -> ShareItResult<Response> {
    gw.client
        .forward(state_listing("/bookings", user_id, query)?)
        .await
}

pub(super) async fn list_owner_bookings(
    State(gw): Gateway,
    SharerUserId(user_id): SharerUserId,
    QueryParams(query): QueryParams<StateQuery>,
) -> ShareItResult<Response> {
    gw.client
        .forward(state_listing("/bookings/owner", user_id, query)?)
        .await
}

// -- Item requests ------------------------------------------------------------

pub(super) async fn create_request(
    State(gw): Gateway,
    SharerUserId(user_id): SharerUserId,
    ValidatedJson(body): ValidatedJson<ItemRequestCreateDto>,
) -> ShareItResult<Response> {
    gw.client
        .forward(ForwardRequest::post("/requests").user(user_id).json(&body)?)
        .await
}

pub(super) async fn list_own_requests(
    State(gw): Gateway,
    SharerUserId(user_id): SharerUserId,
) -> ShareItResult<Response> {
    gw.client
        .forward(ForwardRequest::get("/requests").user(user_id))
        .await
}

pub(super) async fn list_other_requests(
    State(gw): Gateway,
    SharerUserId(user_id): SharerUserId,
) -> ShareItResult<Response> {
    gw.client
        .forward(ForwardRequest::get("/requests/all").user(user_id))
        .await
}

pub(super) async fn get_request(
    State(gw): Gateway,
    SharerUserId(user_id): SharerUserId,
    PositiveId(request_id): PositiveId,
) -> ShareItResult<Response> {
    gw.client
        .forward(ForwardRequest::get(format!("/requests/{request_id}")).user(user_id))
        .await
}
