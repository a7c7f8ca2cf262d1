//! User handlers.

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::info;

use super::require_user;
use crate::dto::user::{UserCreateDto, UserDto, UserUpdateDto};
use crate::errors::ShareItResult;
use crate::model::user_not_found;
use crate::AppState;

/// `POST /users` -- register a user.
#[utoipa::path(
    post,
    path = "/users",
    tag = "Users",
    operation_id = "CreateUser",
    responses(
        (status = 200, description = "User created"),
        (status = 400, description = "Invalid body"),
        (status = 409, description = "Email already in use")
    )
)]
pub async fn create_user(state: Arc<AppState>, body: UserCreateDto) -> ShareItResult<Response> {
    let user = state.store.create_user(body.into_new_user()).await?;
    info!(user_id = user.id, "User created");
    Ok(Json(UserDto::from(user)).into_response())
}

/// `PATCH /users/{id}` -- partial update.
#[utoipa::path(
    patch,
    path = "/users/{id}",
    tag = "Users",
    operation_id = "UpdateUser",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "User updated"),
        (status = 404, description = "No such user"),
        (status = 409, description = "Email already in use")
    )
)]
pub async fn update_user(
    state: Arc<AppState>,
    user_id: i64,
    body: UserUpdateDto,
) -> ShareItResult<Response> {
    let user = state.store.update_user(user_id, body.into()).await?;
    Ok(Json(UserDto::from(user)).into_response())
}

/// `GET /users/{id}`
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "Users",
    operation_id = "GetUser",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "User found"),
        (status = 404, description = "No such user")
    )
)]
pub async fn get_user(state: Arc<AppState>, user_id: i64) -> ShareItResult<Response> {
    let user = require_user(&state, user_id).await?;
    Ok(Json(UserDto::from(user)).into_response())
}

/// `DELETE /users/{id}` -- removes the user together with their items,
/// bookings, requests and comments.
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "Users",
    operation_id = "DeleteUser",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "User deleted"),
        (status = 404, description = "No such user")
    )
)]
pub async fn delete_user(state: Arc<AppState>, user_id: i64) -> ShareItResult<Response> {
    if !state.store.delete_user(user_id).await? {
        return Err(user_not_found(user_id));
    }
    info!(user_id, "User deleted");
    Ok(StatusCode::OK.into_response())
}
