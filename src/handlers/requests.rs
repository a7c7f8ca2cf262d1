//! Item request handlers.

use std::sync::Arc;

use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::info;

use super::require_user;
use crate::dto::request::{to_request_dto, ItemRequestCreateDto, ItemRequestDto};
use crate::errors::ShareItResult;
use crate::model::request::ItemRequestRecord;
use crate::model::user::UserRecord;
use crate::model::{now, request_not_found};
use crate::AppState;

async fn request_view(
    state: &AppState,
    request: ItemRequestRecord,
    requestor: UserRecord,
) -> ShareItResult<ItemRequestDto> {
    let items = state.store.list_items_for_request(request.id).await?;
    Ok(to_request_dto(request, requestor, items))
}

/// `POST /requests` -- ask for an item nobody lists yet.
#[utoipa::path(
    post,
    path = "/requests",
    tag = "Requests",
    operation_id = "CreateRequest",
    params(("X-Sharer-User-Id" = i64, Header, description = "Requestor")),
    responses(
        (status = 200, description = "Request created"),
        (status = 400, description = "Blank description"),
        (status = 404, description = "No such user")
    )
)]
pub async fn create_request(
    state: Arc<AppState>,
    user_id: i64,
    body: ItemRequestCreateDto,
) -> ShareItResult<Response> {
    let request = state
        .store
        .create_request(body.into_new_request(user_id, now()))
        .await?;
    info!(request_id = request.id, requestor_id = user_id, "Item request created");
    let requestor = require_user(&state, user_id).await?;
    let view = to_request_dto(request, requestor, Vec::new());
    Ok(Json(view).into_response())
}

/// `GET /requests` -- the caller's own requests, newest first.
#[utoipa::path(
    get,
    path = "/requests",
    tag = "Requests",
    operation_id = "ListOwnRequests",
    params(("X-Sharer-User-Id" = i64, Header, description = "Requestor")),
    responses(
        (status = 200, description = "Own requests with answering items"),
        (status = 404, description = "No such user")
    )
)]
pub async fn list_own_requests(state: Arc<AppState>, user_id: i64) -> ShareItResult<Response> {
    let user = require_user(&state, user_id).await?;
    let requests = state.store.list_requests_by_requestor(user_id).await?;
    let mut views = Vec::with_capacity(requests.len());
    for request in requests {
        views.push(request_view(&state, request, user.clone()).await?);
    }
    Ok(Json(views).into_response())
}

/// `GET /requests/all` -- everyone else's requests, newest first.
#[utoipa::path(
    get,
    path = "/requests/all",
    tag = "Requests",
    operation_id = "ListOtherRequests",
    params(("X-Sharer-User-Id" = i64, Header, description = "Acting user")),
    responses(
        (status = 200, description = "Requests made by other users"),
        (status = 404, description = "No such user")
    )
)]
pub async fn list_other_requests(state: Arc<AppState>, user_id: i64) -> ShareItResult<Response> {
    require_user(&state, user_id).await?;
    let requests = state.store.list_requests_by_others(user_id).await?;
    let mut views = Vec::with_capacity(requests.len());
    for request in requests {
        let requestor = require_user(&state, request.requestor_id).await?;
        views.push(request_view(&state, request, requestor).await?);
    }
    Ok(Json(views).into_response())
}

/// `GET /requests/{requestId}` -- one request with its answering items.
#[utoipa::path(
    get,
    path = "/requests/{requestId}",
    tag = "Requests",
    operation_id = "GetRequest",
    params(
        ("requestId" = i64, Path, description = "Request id"),
        ("X-Sharer-User-Id" = i64, Header, description = "Acting user")
    ),
    responses(
        (status = 200, description = "Request found"),
        (status = 404, description = "Unknown user or request")
    )
)]
pub async fn get_request(
    state: Arc<AppState>,
    user_id: i64,
    request_id: i64,
) -> ShareItResult<Response> {
    require_user(&state, user_id).await?;
    let request = state
        .store
        .get_request(request_id)
        .await?
        .ok_or_else(|| request_not_found(request_id))?;
    let requestor = require_user(&state, request.requestor_id).await?;
    let view = request_view(&state, request, requestor).await?;
    Ok(Json(view).into_response())
}
