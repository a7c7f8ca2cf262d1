use chrono::NaiveDateTime;
use garde::Validate;
use serde::{Deserialize, Serialize};

use super::booking::BookingShortDto;
use super::{not_blank, not_blank_if_present};
use crate::model::booking::BookingRecord;
use crate::model::comment::{CommentRecord, NewComment};
use crate::model::item::{ItemPatch, ItemRecord, NewItem};

/// `POST /items` body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ItemCreateDto {
    #[garde(custom(not_blank))]
    pub name: Option<String>,
    #[garde(custom(not_blank))]
    pub description: Option<String>,
    #[garde(required)]
    pub available: Option<bool>,
    #[garde(range(min = 1))]
    pub request_id: Option<i64>,
}

impl ItemCreateDto {
    /// Call only after a successful `validate()`.
    pub fn into_new_item(self, owner_id: i64) -> NewItem {
        NewItem {
            name: self.name.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            available: self.available.unwrap_or_default(),
            owner_id,
            request_id: self.request_id,
        }
    }
}

/// `PATCH /items/{itemId}` body.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ItemUpdateDto {
    #[garde(custom(not_blank_if_present))]
    pub name: Option<String>,
    #[garde(custom(not_blank_if_present))]
    pub description: Option<String>,
    #[garde(skip)]
    pub available: Option<bool>,
}

impl From<ItemUpdateDto> for ItemPatch {
    fn from(dto: ItemUpdateDto) -> Self {
        ItemPatch {
            name: dto.name,
            description: dto.description,
            available: dto.available,
        }
    }
}

/// `POST /items/{itemId}/comment` body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CommentCreateDto {
    #[garde(custom(not_blank))]
    pub text: Option<String>,
}

impl CommentCreateDto {
    pub fn into_new_comment(self, author_id: i64, item_id: i64) -> NewComment {
        NewComment {
            item_id,
            author_id,
            text: self.text.unwrap_or_default(),
        }
    }
}

/// `GET /items/search` query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentDto {
    pub id: i64,
    pub text: String,
    pub item_id: i64,
    pub author_name: String,
    pub created: NaiveDateTime,
}

impl From<CommentRecord> for CommentDto {
    fn from(comment: CommentRecord) -> Self {
        CommentDto {
            id: comment.id,
            text: comment.text,
            item_id: comment.item_id,
            author_name: comment.author_name,
            created: comment.created_at,
        }
    }
}

/// Item view. Bookings are only filled in for the owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDto {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub available: bool,
    pub owner_id: i64,
    pub request_id: Option<i64>,
    pub last_booking: Option<BookingShortDto>,
    pub next_booking: Option<BookingShortDto>,
    pub comments: Vec<CommentDto>,
}

pub fn to_item_dto(
    item: ItemRecord,
    last_booking: Option<BookingRecord>,
    next_booking: Option<BookingRecord>,
    comments: Vec<CommentRecord>,
) -> ItemDto {
    ItemDto {
        id: item.id,
        name: item.name,
        description: item.description,
        available: item.available,
        owner_id: item.owner_id,
        request_id: item.request_id,
        last_booking: last_booking.map(BookingShortDto::from),
        next_booking: next_booking.map(BookingShortDto::from),
        comments: comments.into_iter().map(CommentDto::from).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_rules() {
        let dto: ItemCreateDto = serde_json::from_str(
            r#"{"name": "Drill", "description": "Cordless", "available": true}"#,
        )
        .unwrap();
        assert!(dto.validate().is_ok());

        let dto: ItemCreateDto =
            serde_json::from_str(r#"{"name": "Drill", "description": "Cordless"}"#).unwrap();
        assert!(dto.validate().is_err());

        let dto: ItemCreateDto = serde_json::from_str(
            r#"{"name": "", "description": "Cordless", "available": true, "requestId": 0}"#,
        )
        .unwrap();
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_create_reads_camel_case_request_id() {
        let dto: ItemCreateDto = serde_json::from_str(
            r#"{"name": "Drill", "description": "Cordless", "available": false, "requestId": 4}"#,
        )
        .unwrap();
        let item = dto.into_new_item(9);
        assert_eq!(item.request_id, Some(4));
        assert_eq!(item.owner_id, 9);
        assert!(!item.available);
    }

    #[test]
    fn test_blank_comment_rejected() {
        let dto: CommentCreateDto = serde_json::from_str(r#"{"text": "  "}"#).unwrap();
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_item_dto_serializes_camel_case() {
        let dto = to_item_dto(
            ItemRecord {
                id: 1,
                name: "Drill".into(),
                description: "Cordless".into(),
                available: true,
                owner_id: 2,
                request_id: None,
            },
            None,
            None,
            Vec::new(),
        );
        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(json["ownerId"], 2);
        assert!(json["lastBooking"].is_null());
        assert_eq!(json["comments"], serde_json::json!([]));
    }
}
