//! Server-side request handlers, one module per resource.
//!
//! Handlers take already-extracted, already-validated inputs and return
//! `Result<Response, ShareItError>`; routing and extraction live in
//! [`crate::server`].

pub mod bookings;
pub mod items;
pub mod requests;
pub mod users;

use crate::errors::ShareItResult;
use crate::model::item::ItemRecord;
use crate::model::user::UserRecord;
use crate::model::{item_not_found, user_not_found};
use crate::AppState;

/// Fetch a user or fail with `NotFound`.
pub(crate) async fn require_user(state: &AppState, id: i64) -> ShareItResult<UserRecord> {
    state
        .store
        .get_user(id)
        .await?
        .ok_or_else(|| user_not_found(id))
}

/// Fetch an item or fail with `NotFound`.
pub(crate) async fn require_item(state: &AppState, id: i64) -> ShareItResult<ItemRecord> {
    state
        .store
        .get_item(id)
        .await?
        .ok_or_else(|| item_not_found(id))
}
