//! Item and comment handlers.
//!
//! Item views always carry comments.  Last/next bookings are only shown to
//! the owner of the item.

use std::sync::Arc;

use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{debug, info};

use super::{require_item, require_user};
use crate::dto::item::{
    to_item_dto, CommentCreateDto, CommentDto, ItemCreateDto, ItemDto, ItemUpdateDto,
};
use crate::errors::ShareItResult;
use crate::model::item::ItemRecord;
use crate::model::now;
use crate::AppState;

/// Build the JSON view of an item, optionally with last/next bookings.
async fn item_view(
    state: &AppState,
    item: ItemRecord,
    with_bookings: bool,
) -> ShareItResult<ItemDto> {
    let (last, next) = if with_bookings {
        let now = now();
        (
            state.store.last_booking(item.id, now).await?,
            state.store.next_booking(item.id, now).await?,
        )
    } else {
        (None, None)
    };
    let comments = state.store.list_comments(item.id).await?;
    Ok(to_item_dto(item, last, next, comments))
}

/// `POST /items` -- list a new item owned by the caller.
#[utoipa::path(
    post,
    path = "/items",
    tag = "Items",
    operation_id = "CreateItem",
    params(("X-Sharer-User-Id" = i64, Header, description = "Acting user")),
    responses(
        (status = 200, description = "Item created"),
        (status = 400, description = "Invalid body or header"),
        (status = 404, description = "Unknown owner or request")
    )
)]
pub async fn create_item(
    state: Arc<AppState>,
    user_id: i64,
    body: ItemCreateDto,
) -> ShareItResult<Response> {
    let item = state.store.create_item(body.into_new_item(user_id)).await?;
    info!(item_id = item.id, owner_id = user_id, "Item created");
    Ok(Json(to_item_dto(item, None, None, Vec::new())).into_response())
}

/// `PATCH /items/{itemId}` -- partial update by the owner.
#[utoipa::path(
    patch,
    path = "/items/{itemId}",
    tag = "Items",
    operation_id = "UpdateItem",
    params(
        ("itemId" = i64, Path, description = "Item id"),
        ("X-Sharer-User-Id" = i64, Header, description = "Acting user")
    ),
    responses(
        (status = 200, description = "Item updated"),
        (status = 400, description = "Caller does not own the item"),
        (status = 404, description = "Unknown user or item")
    )
)]
pub async fn update_item(
    state: Arc<AppState>,
    user_id: i64,
    item_id: i64,
    body: ItemUpdateDto,
) -> ShareItResult<Response> {
    let item = state
        .store
        .update_item(user_id, item_id, body.into())
        .await?;
    let view = item_view(&state, item, true).await?;
    Ok(Json(view).into_response())
}

/// `GET /items/{itemId}` -- the header is optional here.
#[utoipa::path(
    get,
    path = "/items/{itemId}",
    tag = "Items",
    operation_id = "GetItem",
    params(
        ("itemId" = i64, Path, description = "Item id"),
        ("X-Sharer-User-Id" = Option<i64>, Header, description = "Viewing user")
    ),
    responses(
        (status = 200, description = "Item found"),
        (status = 404, description = "No such item")
    )
)]
pub async fn get_item(
    state: Arc<AppState>,
    viewer_id: Option<i64>,
    item_id: i64,
) -> ShareItResult<Response> {
    let item = require_item(&state, item_id).await?;
    let is_owner = viewer_id == Some(item.owner_id);
    let view = item_view(&state, item, is_owner).await?;
    Ok(Json(view).into_response())
}

/// `GET /items` -- the caller's own items.
#[utoipa::path(
    get,
    path = "/items",
    tag = "Items",
    operation_id = "ListOwnItems",
    params(("X-Sharer-User-Id" = i64, Header, description = "Acting user")),
    responses(
        (status = 200, description = "Items owned by the caller"),
        (status = 404, description = "No such user")
    )
)]
pub async fn list_owner_items(state: Arc<AppState>, user_id: i64) -> ShareItResult<Response> {
    require_user(&state, user_id).await?;
    let items = state.store.list_items_by_owner(user_id).await?;
    let mut views = Vec::with_capacity(items.len());
    for item in items {
        views.push(item_view(&state, item, true).await?);
    }
    Ok(Json(views).into_response())
}

/// `GET /items/search?text=` -- case-insensitive search over available
/// items.  Blank text yields an empty list.
#[utoipa::path(
    get,
    path = "/items/search",
    tag = "Items",
    operation_id = "SearchItems",
    params(("text" = Option<String>, Query, description = "Substring to look for")),
    responses((status = 200, description = "Matching available items"))
)]
pub async fn search_items(state: Arc<AppState>, text: Option<String>) -> ShareItResult<Response> {
    let needle = text.unwrap_or_default().to_lowercase();
    if needle.trim().is_empty() {
        return Ok(Json(Vec::<ItemDto>::new()).into_response());
    }

    let items = state.store.list_available_items().await?;
    let mut views = Vec::new();
    for item in items.into_iter().filter(|i| i.matches_search(&needle)) {
        views.push(item_view(&state, item, false).await?);
    }
    debug!(needle = %needle, hits = views.len(), "Item search");
    Ok(Json(views).into_response())
}

/// `POST /items/{itemId}/comment` -- only after a completed booking.
#[utoipa::path(
    post,
    path = "/items/{itemId}/comment",
    tag = "Items",
    operation_id = "CreateComment",
    params(
        ("itemId" = i64, Path, description = "Item id"),
        ("X-Sharer-User-Id" = i64, Header, description = "Comment author")
    ),
    responses(
        (status = 200, description = "Comment created"),
        (status = 400, description = "Author has no completed booking of the item"),
        (status = 404, description = "Unknown user or item")
    )
)]
pub async fn create_comment(
    state: Arc<AppState>,
    user_id: i64,
    item_id: i64,
    body: CommentCreateDto,
) -> ShareItResult<Response> {
    let comment = state
        .store
        .create_comment(body.into_new_comment(user_id, item_id), now())
        .await?;
    info!(comment_id = comment.id, item_id, author_id = user_id, "Comment created");
    Ok(Json(CommentDto::from(comment)).into_response())
}
