//! ShareIt error types.
//!
//! Every variant maps to an HTTP status.  The enum implements
//! [`axum::response::IntoResponse`] so handlers can simply return
//! `Err(ShareItError::NotFound(..))`.  The rendered body carries a
//! timestamp, the status code and reason phrase, a message map and the
//! request path; the path is filled in by [`error_path_middleware`].

use std::collections::BTreeMap;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result alias used across handlers and the store.
pub type ShareItResult<T> = Result<T, ShareItError>;

/// Generate a 16-character hex request ID.
pub fn generate_request_id() -> String {
    let bytes: [u8; 8] = rand::random();
    hex::encode(bytes)
}

/// Domain and transport errors.
#[derive(Debug, Error)]
pub enum ShareItError {
    /// A user, item, booking or request does not exist.
    #[error("{0}")]
    NotFound(String),

    /// A unique value (email) is already taken.
    #[error("{0}")]
    AlreadyExists(String),

    /// The item cannot be booked right now.
    #[error("{0}")]
    NotAvailable(String),

    /// The caller is not allowed to perform the operation.
    #[error("{0}")]
    Wrong(String),

    /// Malformed input, keyed by field name.
    #[error("Validation failed: {0:?}")]
    Validation(BTreeMap<String, String>),

    /// A required header is absent.
    #[error("Required request header '{0}' is not present")]
    MissingHeader(&'static str),

    /// The gateway could not reach the server.
    #[error("Upstream server unavailable: {0}")]
    Upstream(#[from] reqwest::Error),

    /// Catch-all for unexpected internal errors.
    #[error("An unexpected error occurred")]
    Internal(#[from] anyhow::Error),
}

impl ShareItError {
    /// Validation error for a single field.
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(field.into(), message.into());
        ShareItError::Validation(fields)
    }

    /// Return the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ShareItError::NotFound(_) => StatusCode::NOT_FOUND,
            ShareItError::AlreadyExists(_) => StatusCode::CONFLICT,
            ShareItError::NotAvailable(_)
            | ShareItError::Wrong(_)
            | ShareItError::Validation(_)
            | ShareItError::MissingHeader(_) => StatusCode::BAD_REQUEST,
            ShareItError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ShareItError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message map rendered in the error body.
    fn message(&self) -> BTreeMap<String, String> {
        match self {
            ShareItError::Validation(fields) => fields.clone(),
            other => {
                let mut map = BTreeMap::new();
                map.insert("error".to_string(), other.to_string());
                map
            }
        }
    }
}

impl From<rusqlite::Error> for ShareItError {
    fn from(err: rusqlite::Error) -> Self {
        ShareItError::Internal(err.into())
    }
}

impl From<garde::Report> for ShareItError {
    fn from(report: garde::Report) -> Self {
        let fields = report
            .iter()
            .map(|(path, error)| {
                let field = path.to_string();
                let field = if field.is_empty() {
                    "body".to_string()
                } else {
                    field
                };
                (field, error.message().to_string())
            })
            .collect();
        ShareItError::Validation(fields)
    }
}

/// JSON error body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub timestamp: NaiveDateTime,
    pub status: u16,
    pub error: String,
    pub message: BTreeMap<String, String>,
    pub path: String,
}

impl IntoResponse for ShareItError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match &self {
            ShareItError::Internal(e) => {
                tracing::error!(
                    error.cause_chain = ?e,
                    error.message = %e,
                    "Unexpected error happened"
                );
            }
            ShareItError::Upstream(e) => tracing::error!("Upstream request failed: {e}"),
            other => tracing::warn!(status = status.as_u16(), "{other}"),
        }

        let body = ErrorBody {
            timestamp: chrono::Local::now().naive_local(),
            status: status.as_u16(),
            error: status.canonical_reason().unwrap_or_default().to_string(),
            message: self.message(),
            path: String::new(),
        };

        let mut response = (status, Json(body.clone())).into_response();
        response.extensions_mut().insert(body);
        response
    }
}

/// Middleware that stamps the request path into error bodies produced by
/// [`ShareItError`].  Responses without an [`ErrorBody`] extension pass
/// through untouched.
pub async fn error_path_middleware(req: Request<Body>, next: Next) -> Response {
    let path = req.uri().path().to_string();
    let response = next.run(req).await;

    let Some(body) = response.extensions().get::<ErrorBody>().cloned() else {
        return response;
    };

    let (mut parts, _) = response.into_parts();
    parts.extensions.remove::<ErrorBody>();
    parts.headers.remove(axum::http::header::CONTENT_LENGTH);
    let body = ErrorBody { path, ..body };
    match serde_json::to_vec(&body) {
        Ok(bytes) => Response::from_parts(parts, Body::from(bytes)),
        Err(_) => Response::from_parts(parts, Body::empty()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ShareItError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ShareItError::AlreadyExists("x".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ShareItError::NotAvailable("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ShareItError::Wrong("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ShareItError::MissingHeader("X-Sharer-User-Id").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ShareItError::Internal(anyhow::anyhow!("boom")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_domain_message_uses_error_key() {
        let err = ShareItError::Wrong("not yours".into());
        let message = err.message();
        assert_eq!(message.get("error").map(String::as_str), Some("not yours"));
    }

    #[test]
    fn test_internal_message_is_generic() {
        let err = ShareItError::Internal(anyhow::anyhow!("disk on fire"));
        let message = err.message();
        assert_eq!(
            message.get("error").map(String::as_str),
            Some("An unexpected error occurred")
        );
    }

    #[test]
    fn test_validation_message_is_field_map() {
        let err = ShareItError::invalid("email", "must be a valid email");
        let message = err.message();
        assert_eq!(message.len(), 1);
        assert_eq!(
            message.get("email").map(String::as_str),
            Some("must be a valid email")
        );
    }

    #[test]
    fn test_request_id_format() {
        let id = generate_request_id();
        assert_eq!(id.len(), 16);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
