/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: i64,
    pub name: String,
    /// Unique across all users.
    pub email: String,
}

/// Fields for a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
}

/// Partial update; `None` leaves the field unchanged.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl UserPatch {
    pub fn apply(self, user: &mut UserRecord) {
        if let Some(name) = self.name {
            user.name = name;
        }
        if let Some(email) = self.email {
            user.email = email;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_keeps_missing_fields() {
        let mut user = UserRecord {
            id: 1,
            name: "Ann".into(),
            email: "ann@example.com".into(),
        };
        UserPatch {
            name: Some("Anna".into()),
            email: None,
        }
        .apply(&mut user);
        assert_eq!(user.name, "Anna");
        assert_eq!(user.email, "ann@example.com");
    }
}
