//! Request extractors shared by the server and the gateway.
//!
//! Every rejection is a [`ShareItError`], so malformed ids, headers, query
//! strings and bodies render the same JSON error body as domain failures.

use axum::extract::{FromRequest, FromRequestParts, Path, Query, Request};
use axum::http::request::Parts;
use axum::{async_trait, Json};
use garde::Validate;
use serde::de::DeserializeOwned;

use crate::errors::ShareItError;

/// Header carrying the acting user's id.
pub const USER_ID_HEADER: &str = "X-Sharer-User-Id";

/// Parse a header or path value as a positive id.
fn parse_id(field: &str, raw: &str) -> Result<i64, ShareItError> {
    match raw.trim().parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        Ok(_) => Err(ShareItError::invalid(field, "must be greater than 0")),
        Err(_) => Err(ShareItError::invalid(
            field,
            format!("failed to convert value '{raw}' to a number"),
        )),
    }
}

fn header_id(parts: &Parts) -> Result<Option<i64>, ShareItError> {
    let Some(value) = parts.headers.get(USER_ID_HEADER) else {
        return Ok(None);
    };
    let raw = value
        .to_str()
        .map_err(|_| ShareItError::invalid(USER_ID_HEADER, "must be a valid header value"))?;
    parse_id(USER_ID_HEADER, raw).map(Some)
}

/// The acting user, taken from the required `X-Sharer-User-Id` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SharerUserId(pub i64);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for SharerUserId {
    type Rejection = ShareItError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        header_id(parts)?
            .map(SharerUserId)
            .ok_or(ShareItError::MissingHeader(USER_ID_HEADER))
    }
}

/// The acting user when the header is optional. A malformed header is
/// still rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaybeSharerUserId(pub Option<i64>);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for MaybeSharerUserId {
    type Rejection = ShareItError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        header_id(parts).map(MaybeSharerUserId)
    }
}

/// A single positive id path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositiveId(pub i64);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for PositiveId {
    type Rejection = ShareItError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rej| ShareItError::invalid("id", rej.body_text()))?;
        parse_id("id", &raw).map(PositiveId)
    }
}

/// Query string deserialized into `T`; failures become validation errors.
#[derive(Debug, Clone)]
pub struct QueryParams<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ShareItError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rej| ShareItError::invalid("query", rej.body_text()))?;
        Ok(QueryParams(value))
    }
}

/// JSON body deserialized into `T` and checked with `garde`.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + Send,
    T::Context: Default,
    S: Send + Sync,
{
    type Rejection = ShareItError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rej| ShareItError::invalid("body", rej.body_text()))?;
        value.validate()?;
        Ok(ValidatedJson(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request as HttpRequest;

    async fn user_id_from(header: Option<&str>) -> Result<SharerUserId, ShareItError> {
        let mut builder = HttpRequest::builder().uri("/items");
        if let Some(value) = header {
            builder = builder.header(USER_ID_HEADER, value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        SharerUserId::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_header_present() {
        assert_eq!(user_id_from(Some("7")).await.unwrap(), SharerUserId(7));
    }

    #[tokio::test]
    async fn test_header_missing() {
        assert!(matches!(
            user_id_from(None).await,
            Err(ShareItError::MissingHeader(_))
        ));
    }

    #[tokio::test]
    async fn test_header_malformed() {
        assert!(matches!(
            user_id_from(Some("abc")).await,
            Err(ShareItError::Validation(_))
        ));
        assert!(matches!(
            user_id_from(Some("0")).await,
            Err(ShareItError::Validation(_))
        ));
        assert!(matches!(
            user_id_from(Some("-3")).await,
            Err(ShareItError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_optional_header() {
        let (mut parts, _) = HttpRequest::builder()
            .uri("/items/1")
            .body(())
            .unwrap()
            .into_parts();
        let maybe = MaybeSharerUserId::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(maybe, MaybeSharerUserId(None));
    }
}
