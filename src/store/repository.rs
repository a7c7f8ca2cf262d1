//! Abstract ShareIt store trait.
//!
//! Any persistence backend must implement [`ShareItStore`].  The trait
//! uses manually desugared async methods (pinned boxed futures) so it can
//! be held as `Arc<dyn ShareItStore>` in the application state.
//!
//! Operations that read then write (booking creation, booking decisions,
//! user/item updates, comment creation) are atomic: implementations run the
//! check and the write in one transaction and report rule violations as
//! [`crate::errors::ShareItError`] domain variants.

use std::future::Future;
use std::pin::Pin;

use chrono::NaiveDateTime;

use crate::errors::ShareItResult;
use crate::model::booking::{BookingRecord, BookingScope, BookingState, NewBooking};
use crate::model::comment::{CommentRecord, NewComment};
use crate::model::item::{ItemPatch, ItemRecord, NewItem};
use crate::model::request::{ItemRequestRecord, NewItemRequest};
use crate::model::user::{NewUser, UserPatch, UserRecord};

/// Boxed future returned by every store method.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = ShareItResult<T>> + Send + 'a>>;

/// Async store contract.
pub trait ShareItStore: Send + Sync + 'static {
    // ── Users ───────────────────────────────────────────────────────

    /// Insert a user. Fails with `AlreadyExists` on a duplicate email.
    fn create_user(&self, user: NewUser) -> StoreFuture<'_, UserRecord>;

    /// Apply a partial update. Fails with `NotFound` for an unknown id and
    /// `AlreadyExists` when the new email belongs to another user.
    fn update_user(&self, id: i64, patch: UserPatch) -> StoreFuture<'_, UserRecord>;

    fn get_user(&self, id: i64) -> StoreFuture<'_, Option<UserRecord>>;

    /// Delete a user and everything that references them.
    /// Returns `false` when no such user exists.
    fn delete_user(&self, id: i64) -> StoreFuture<'_, bool>;

    // ── Items ───────────────────────────────────────────────────────

    /// Insert an item. The owner and the referenced request must exist.
    fn create_item(&self, item: NewItem) -> StoreFuture<'_, ItemRecord>;

    /// Apply a partial update on behalf of `user_id`, who must own the item.
    fn update_item(
        &self,
        user_id: i64,
        item_id: i64,
        patch: ItemPatch,
    ) -> StoreFuture<'_, ItemRecord>;

    fn get_item(&self, id: i64) -> StoreFuture<'_, Option<ItemRecord>>;

    /// Items owned by `owner_id`, ordered by id.
    fn list_items_by_owner(&self, owner_id: i64) -> StoreFuture<'_, Vec<ItemRecord>>;

    /// Every item currently marked available, ordered by id.
    fn list_available_items(&self) -> StoreFuture<'_, Vec<ItemRecord>>;

    /// Items listed in answer to `request_id`, ordered by id.
    fn list_items_for_request(&self, request_id: i64) -> StoreFuture<'_, Vec<ItemRecord>>;

    // ── Bookings ────────────────────────────────────────────────────

    /// Insert a WAITING booking. Fails with `NotFound` for an unknown
    /// booker or item and `NotAvailable` when the item is not available.
    fn create_booking(&self, booking: NewBooking) -> StoreFuture<'_, BookingRecord>;

    /// Approve or reject a booking on behalf of `user_id`, who must own
    /// the booked item. The booking must still be WAITING.
    fn decide_booking(
        &self,
        user_id: i64,
        booking_id: i64,
        approved: bool,
    ) -> StoreFuture<'_, BookingRecord>;

    fn get_booking(&self, id: i64) -> StoreFuture<'_, Option<BookingRecord>>;

    /// Bookings in `scope` matching `state` at `now`, newest start first.
    fn list_bookings(
        &self,
        scope: BookingScope,
        state: BookingState,
        now: NaiveDateTime,
    ) -> StoreFuture<'_, Vec<BookingRecord>>;

    /// The booking of `item_id` that ended most recently before `now`.
    fn last_booking(
        &self,
        item_id: i64,
        now: NaiveDateTime,
    ) -> StoreFuture<'_, Option<BookingRecord>>;

    /// The booking of `item_id` starting soonest after `now`.
    fn next_booking(
        &self,
        item_id: i64,
        now: NaiveDateTime,
    ) -> StoreFuture<'_, Option<BookingRecord>>;

    /// Whether `booker_id` has a booking of `item_id` that ended before `now`.
    fn has_completed_booking(
        &self,
        booker_id: i64,
        item_id: i64,
        now: NaiveDateTime,
    ) -> StoreFuture<'_, bool>;

    // ── Item requests ───────────────────────────────────────────────

    /// Insert a request. The requestor must exist.
    fn create_request(&self, request: NewItemRequest) -> StoreFuture<'_, ItemRequestRecord>;

    fn get_request(&self, id: i64) -> StoreFuture<'_, Option<ItemRequestRecord>>;

    /// Requests made by `requestor_id`, newest first.
    fn list_requests_by_requestor(
        &self,
        requestor_id: i64,
    ) -> StoreFuture<'_, Vec<ItemRequestRecord>>;

    /// Requests made by anyone except `user_id`, newest first.
    fn list_requests_by_others(&self, user_id: i64) -> StoreFuture<'_, Vec<ItemRequestRecord>>;

    // ── Comments ────────────────────────────────────────────────────

    /// Insert a comment stamped with `now`. The author must have a booking
    /// of the item that ended before `now`, otherwise `Wrong`.
    fn create_comment(
        &self,
        comment: NewComment,
        now: NaiveDateTime,
    ) -> StoreFuture<'_, CommentRecord>;

    /// Comments on `item_id`, oldest first.
    fn list_comments(&self, item_id: i64) -> StoreFuture<'_, Vec<CommentRecord>>;
}
