//! Wire types: validated request bodies, query parameters and JSON views.
//!
//! Request bodies derive [`garde::Validate`]; the same types are checked by
//! the gateway before forwarding and by the server before touching the
//! store.  Views are built from store records by plain conversion functions.

pub mod booking;
pub mod item;
pub mod request;
pub mod user;

/// Rejects missing, empty and whitespace-only strings.
pub(crate) fn not_blank(value: &Option<String>, _ctx: &()) -> garde::Result {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(()),
        _ => Err(garde::Error::new("must not be blank")),
    }
}

/// Like [`not_blank`], but an absent value is fine (partial updates).
pub(crate) fn not_blank_if_present(value: &Option<String>, _ctx: &()) -> garde::Result {
    match value {
        Some(v) if v.trim().is_empty() => Err(garde::Error::new("must not be blank")),
        _ => Ok(()),
    }
}
