//! Domain records and the rules that govern them.
//!
//! Records reference each other by id; related records are resolved
//! through [`crate::store::repository::ShareItStore`] lookups.

pub mod booking;
pub mod comment;
pub mod item;
pub mod request;
pub mod user;

use chrono::NaiveDateTime;

use crate::errors::ShareItError;

/// Wall-clock "now" used for booking windows and timestamps.
pub fn now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

pub fn user_not_found(id: i64) -> ShareItError {
    ShareItError::NotFound(format!("User with id {id} not found"))
}

pub fn item_not_found(id: i64) -> ShareItError {
    ShareItError::NotFound(format!("Item with id {id} not found"))
}

pub fn booking_not_found(id: i64) -> ShareItError {
    ShareItError::NotFound(format!("Booking with id {id} not found"))
}

pub fn request_not_found(id: i64) -> ShareItError {
    ShareItError::NotFound(format!("Request with id {id} not found"))
}
