//! Booking bodies, queries and views.
//!
//! The booking window rules: start is present or future, end is strictly
//! future, and start comes before end.

use chrono::NaiveDateTime;
use garde::Validate;
use serde::{Deserialize, Serialize};

use crate::model::booking::{BookingRecord, BookingStatus, NewBooking};
use crate::model::item::ItemRecord;
use crate::model::now;
use crate::model::user::UserRecord;

/// `POST /bookings` body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BookingCreateDto {
    #[garde(required, range(min = 1))]
    pub item_id: Option<i64>,
    #[garde(required, custom(starts_now_or_later))]
    pub start: Option<NaiveDateTime>,
    #[garde(required, custom(ends_after(&self.start)))]
    pub end: Option<NaiveDateTime>,
}

fn starts_now_or_later(value: &Option<NaiveDateTime>, _ctx: &()) -> garde::Result {
    match value {
        Some(start) if *start < now() => Err(garde::Error::new(
            "must be a date in the present or in the future",
        )),
        _ => Ok(()),
    }
}

fn ends_after(
    start: &Option<NaiveDateTime>,
) -> impl FnOnce(&Option<NaiveDateTime>, &()) -> garde::Result + '_ {
    move |end, _| {
        let Some(end) = end else {
            return Ok(());
        };
        if *end <= now() {
            return Err(garde::Error::new("must be a future date"));
        }
        match start {
            Some(start) if start >= end => Err(garde::Error::new("must be after start")),
            _ => Ok(()),
        }
    }
}

impl BookingCreateDto {
    /// Call only after a successful `validate()`.
    pub fn into_new_booking(self, booker_id: i64) -> NewBooking {
        NewBooking {
            item_id: self.item_id.unwrap_or_default(),
            booker_id,
            start: self.start.unwrap_or_default(),
            end: self.end.unwrap_or_default(),
        }
    }
}

/// `GET /bookings` and `GET /bookings/owner` query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StateQuery {
    #[serde(default)]
    pub state: Option<String>,
}

/// `PATCH /bookings/{bookingId}` query.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ApprovalQuery {
    pub approved: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookedItemDto {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookerDto {
    pub id: i64,
    pub name: String,
}

/// Full booking view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingDto {
    pub id: i64,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub status: BookingStatus,
    pub item: BookedItemDto,
    pub booker: BookerDto,
}

pub fn to_booking_dto(booking: BookingRecord, item: &ItemRecord, booker: &UserRecord) -> BookingDto {
    BookingDto {
        id: booking.id,
        start: booking.start,
        end: booking.end,
        status: booking.status,
        item: BookedItemDto {
            id: item.id,
            name: item.name.clone(),
        },
        booker: BookerDto {
            id: booker.id,
            name: booker.name.clone(),
        },
    }
}

/// Last/next booking shown on item views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingShortDto {
    pub id: i64,
    pub booker_id: i64,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub status: BookingStatus,
}

impl From<BookingRecord> for BookingShortDto {
    fn from(booking: BookingRecord) -> Self {
        BookingShortDto {
            id: booking.id,
            booker_id: booking.booker_id,
            start: booking.start,
            end: booking.end,
            status: booking.status,
        }
    }
}
