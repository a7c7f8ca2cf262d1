use chrono::NaiveDateTime;

/// A user's request for an item nobody has listed yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRequestRecord {
    pub id: i64,
    pub description: String,
    pub requestor_id: i64,
    pub created: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct NewItemRequest {
    pub description: String,
    pub requestor_id: i64,
    pub created: NaiveDateTime,
}
