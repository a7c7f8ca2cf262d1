use chrono::NaiveDateTime;
use garde::Validate;
use serde::{Deserialize, Serialize};

use super::not_blank;
use super::user::UserDto;
use crate::model::item::ItemRecord;
use crate::model::request::{ItemRequestRecord, NewItemRequest};
use crate::model::user::UserRecord;

/// `POST /requests` body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ItemRequestCreateDto {
    #[garde(custom(not_blank))]
    pub description: Option<String>,
}

impl ItemRequestCreateDto {
    pub fn into_new_request(self, requestor_id: i64, created: NaiveDateTime) -> NewItemRequest {
        NewItemRequest {
            description: self.description.unwrap_or_default(),
            requestor_id,
            created,
        }
    }
}

/// An item listed in answer to a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestItemDto {
    pub id: i64,
    pub name: String,
    pub owner_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRequestDto {
    pub id: i64,
    pub description: String,
    pub requestor: UserDto,
    pub created: NaiveDateTime,
    pub items: Vec<RequestItemDto>,
}

pub fn to_request_dto(
    request: ItemRequestRecord,
    requestor: UserRecord,
    items: Vec<ItemRecord>,
) -> ItemRequestDto {
    ItemRequestDto {
        id: request.id,
        description: request.description,
        requestor: requestor.into(),
        created: request.created,
        items: items
            .into_iter()
            .map(|item| RequestItemDto {
                id: item.id,
                name: item.name,
                owner_id: item.owner_id,
            })
            .collect(),
    }
}
