use chrono::NaiveDateTime;

/// A comment left on an item after a completed booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentRecord {
    pub id: i64,
    pub text: String,
    pub item_id: i64,
    pub author_id: i64,
    /// Resolved from the author's user row.
    pub author_name: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub item_id: i64,
    pub author_id: i64,
    pub text: String,
}
