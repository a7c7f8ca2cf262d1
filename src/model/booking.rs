//! Bookings, their status lifecycle and the access rules around them.
//!
//! A booking is visible to its booker and to the owner of the booked item.
//! Only the owner decides (approves or rejects) a booking, and only while
//! it is still WAITING.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::errors::{ShareItError, ShareItResult};

/// Lifecycle status of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Waiting,
    Approved,
    Rejected,
    Canceled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Waiting => "WAITING",
            BookingStatus::Approved => "APPROVED",
            BookingStatus::Rejected => "REJECTED",
            BookingStatus::Canceled => "CANCELED",
        }
    }

    /// Status resulting from an owner's decision.
    pub fn decided(approved: bool) -> Self {
        if approved {
            BookingStatus::Approved
        } else {
            BookingStatus::Rejected
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "WAITING" => Ok(BookingStatus::Waiting),
            "APPROVED" => Ok(BookingStatus::Approved),
            "REJECTED" => Ok(BookingStatus::Rejected),
            "CANCELED" => Ok(BookingStatus::Canceled),
            other => Err(anyhow::anyhow!("unknown booking status {other:?}")),
        }
    }
}

/// Filter applied when listing bookings.
///
/// - `Current`: `start <= now <= end`
/// - `Past`: `end < now`
/// - `Future`: `start > now`
/// - `Waiting` / `Rejected`: by status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BookingState {
    #[default]
    All,
    Current,
    Past,
    Future,
    Waiting,
    Rejected,
}

impl BookingState {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingState::All => "ALL",
            BookingState::Current => "CURRENT",
            BookingState::Past => "PAST",
            BookingState::Future => "FUTURE",
            BookingState::Waiting => "WAITING",
            BookingState::Rejected => "REJECTED",
        }
    }

    /// Parse an optional query value. Missing or blank means `ALL`.
    pub fn parse_param(raw: Option<&str>) -> ShareItResult<Self> {
        match raw.map(str::trim) {
            None | Some("") => Ok(BookingState::All),
            Some(s) => s.parse(),
        }
    }
}

impl FromStr for BookingState {
    type Err = ShareItError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ALL" => Ok(BookingState::All),
            "CURRENT" => Ok(BookingState::Current),
            "PAST" => Ok(BookingState::Past),
            "FUTURE" => Ok(BookingState::Future),
            "WAITING" => Ok(BookingState::Waiting),
            "REJECTED" => Ok(BookingState::Rejected),
            _ => Err(ShareItError::invalid("state", format!("Unknown state: {s}"))),
        }
    }
}

/// Whose bookings a listing covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingScope {
    /// Bookings made by this user.
    Booker(i64),
    /// Bookings of items owned by this user.
    Owner(i64),
}

/// A stored booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRecord {
    pub id: i64,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub item_id: i64,
    pub booker_id: i64,
    pub status: BookingStatus,
}

/// Fields for a new booking. Status always starts as WAITING.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub item_id: i64,
    pub booker_id: i64,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl BookingRecord {
    pub fn is_participant(&self, user_id: i64, owner_id: i64) -> bool {
        self.booker_id == user_id || owner_id == user_id
    }
}

/// Fails unless `user_id` is the booker or the item owner.
pub fn ensure_viewer(booking: &BookingRecord, owner_id: i64, user_id: i64) -> ShareItResult<()> {
    if booking.is_participant(user_id, owner_id) {
        Ok(())
    } else {
        Err(ShareItError::Wrong(format!(
            "User with id {user_id} has no access to booking {}",
            booking.id
        )))
    }
}

/// Fails unless `user_id` owns the booked item and the booking is WAITING.
pub fn ensure_can_decide(
    booking: &BookingRecord,
    owner_id: i64,
    user_id: i64,
) -> ShareItResult<()> {
    ensure_viewer(booking, owner_id, user_id)?;
    if owner_id != user_id {
        return Err(ShareItError::Wrong(format!(
            "User with id {user_id} cannot approve or reject booking {}: item is owned by user {owner_id}",
            booking.id
        )));
    }
    if booking.status != BookingStatus::Waiting {
        return Err(ShareItError::Wrong(format!(
            "Booking {} is already {}",
            booking.id, booking.status
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn booking(status: BookingStatus) -> BookingRecord {
        let now = crate::model::now();
        BookingRecord {
            id: 7,
            start: now + Duration::days(1),
            end: now + Duration::days(2),
            item_id: 3,
            booker_id: 10,
            status,
        }
    }

    #[test]
    fn test_state_parse_case_insensitive() {
        assert_eq!("current".parse::<BookingState>().unwrap(), BookingState::Current);
        assert_eq!("PAST".parse::<BookingState>().unwrap(), BookingState::Past);
        assert_eq!(BookingState::parse_param(None).unwrap(), BookingState::All);
    }

    #[test]
    fn test_blank_state_param_means_all() {
        assert_eq!(BookingState::parse_param(Some("")).unwrap(), BookingState::All);
        assert_eq!(BookingState::parse_param(Some("  ")).unwrap(), BookingState::All);
        assert_eq!(
            BookingState::parse_param(Some(" waiting ")).unwrap(),
            BookingState::Waiting
        );
        assert!(BookingState::parse_param(Some("later")).is_err());
    }

    #[test]
    fn test_state_parse_unknown() {
        let err = "SOMETIMES".parse::<BookingState>().unwrap_err();
        match err {
            ShareItError::Validation(fields) => {
                assert_eq!(fields["state"], "Unknown state: SOMETIMES");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_status_round_trip_through_str() {
        for status in [
            BookingStatus::Waiting,
            BookingStatus::Approved,
            BookingStatus::Rejected,
            BookingStatus::Canceled,
        ] {
            assert_eq!(status.as_str().parse::<BookingStatus>().unwrap(), status);
        }
        assert!("waiting".parse::<BookingStatus>().is_err());
    }

    #[test]
    fn test_decided() {
        assert_eq!(BookingStatus::decided(true), BookingStatus::Approved);
        assert_eq!(BookingStatus::decided(false), BookingStatus::Rejected);
    }

    #[test]
    fn test_viewer_is_booker_or_owner() {
        let b = booking(BookingStatus::Waiting);
        assert!(ensure_viewer(&b, 20, 10).is_ok());
        assert!(ensure_viewer(&b, 20, 20).is_ok());
        assert!(matches!(
            ensure_viewer(&b, 20, 30),
            Err(ShareItError::Wrong(_))
        ));
    }

    #[test]
    fn test_only_owner_decides() {
        let b = booking(BookingStatus::Waiting);
        assert!(ensure_can_decide(&b, 20, 20).is_ok());
        assert!(matches!(
            ensure_can_decide(&b, 20, 10),
            Err(ShareItError::Wrong(_))
        ));
        assert!(matches!(
            ensure_can_decide(&b, 20, 30),
            Err(ShareItError::Wrong(_))
        ));
    }

    #[test]
    fn test_decided_booking_is_final() {
        let b = booking(BookingStatus::Approved);
        assert!(matches!(
            ensure_can_decide(&b, 20, 20),
            Err(ShareItError::Wrong(_))
        ));
    }
}
