//! Items offered for sharing.

/// An item owned by a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRecord {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub available: bool,
    pub owner_id: i64,
    /// Request this item was listed in answer to, if any.
    pub request_id: Option<i64>,
}

/// Fields for a new item.
#[derive(Debug, Clone)]
pub struct NewItem {
    pub name: String,
    pub description: String,
    pub available: bool,
    pub owner_id: i64,
    pub request_id: Option<i64>,
}

/// Partial update; `None` leaves the field unchanged.
#[derive(Debug, Clone, Default)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub available: Option<bool>,
}

impl ItemPatch {
    pub fn apply(self, item: &mut ItemRecord) {
        if let Some(name) = self.name {
            item.name = name;
        }
        if let Some(description) = self.description {
            item.description = description;
        }
        if let Some(available) = self.available {
            item.available = available;
        }
    }
}

impl ItemRecord {
    /// Case-insensitive substring match on name or description.
    ///
    /// `needle` must already be lowercased.  Unavailable items never match.
    pub fn matches_search(&self, needle: &str) -> bool {
        self.available
            && (self.name.to_lowercase().contains(needle)
                || self.description.to_lowercase().contains(needle))
    }
}
