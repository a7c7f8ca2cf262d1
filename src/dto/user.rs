use garde::Validate;
use serde::{Deserialize, Serialize};

use super::{not_blank, not_blank_if_present};
use crate::model::user::{NewUser, UserPatch, UserRecord};

/// `POST /users` body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserCreateDto {
    #[garde(custom(not_blank))]
    pub name: Option<String>,
    #[garde(custom(not_blank), email)]
    pub email: Option<String>,
}

impl UserCreateDto {
    /// Call only after a successful `validate()`.
    pub fn into_new_user(self) -> NewUser {
        NewUser {
            name: self.name.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
        }
    }
}

/// `PATCH /users/{id}` body.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdateDto {
    #[garde(custom(not_blank_if_present))]
    pub name: Option<String>,
    #[garde(email)]
    pub email: Option<String>,
}

impl From<UserUpdateDto> for UserPatch {
    fn from(dto: UserUpdateDto) -> Self {
        UserPatch {
            name: dto.name,
            email: dto.email,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: i64,
    pub name: String,
    pub email: String,
}

impl From<UserRecord> for UserDto {
    fn from(user: UserRecord) -> Self {
        UserDto {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}
