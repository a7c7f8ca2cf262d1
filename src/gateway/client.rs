//! HTTP client that relays validated requests to the ShareIt server.
//!
//! The server's status code, content type and body are passed back to the
//! caller unchanged, so server-side errors reach the client verbatim.

use std::time::Duration;

use axum::http::header::CONTENT_TYPE;
use axum::http::Method;
use axum::response::{IntoResponse, Response};
use metrics::counter;
use serde::Serialize;
use tracing::{debug, info};

use crate::errors::ShareItResult;
use crate::extract::USER_ID_HEADER;
use crate::metrics::GATEWAY_FORWARDED_TOTAL;

/// One request to relay.
#[derive(Debug, Clone)]
pub struct ForwardRequest {
    pub method: Method,
    /// Path on the server, starting with `/`.
    pub path: String,
    pub user_id: Option<i64>,
    pub query: Vec<(&'static str, String)>,
    pub body: Option<serde_json::Value>,
}

impl ForwardRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            user_id: None,
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Carry the acting user in `X-Sharer-User-Id`.
    pub fn user(self, user_id: i64) -> Self {
        self.maybe_user(Some(user_id))
    }

    pub fn maybe_user(mut self, user_id: Option<i64>) -> Self {
        self.user_id = user_id;
        self
    }

    pub fn query(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.query.push((key, value.into()));
        self
    }

    pub fn json<T: Serialize>(mut self, body: &T) -> ShareItResult<Self> {
        self.body = Some(serde_json::to_value(body).map_err(anyhow::Error::from)?);
        Ok(self)
    }
}

/// Thin wrapper around a shared [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct ServerClient {
    client: reqwest::Client,
    base_url: String,
}

impl ServerClient {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {e}"))?;

        info!("Gateway forwarding to {}", base_url);

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send `req` to the server and relay its response.
    ///
    /// Transport failures surface as `ShareItError::Upstream` (502).
    pub async fn forward(&self, req: ForwardRequest) -> ShareItResult<Response> {
        let url = format!("{}{}", self.base_url, req.path);
        let mut builder = self.client.request(req.method.clone(), &url);
        if let Some(user_id) = req.user_id {
            builder = builder.header(USER_ID_HEADER, user_id.to_string());
        }
        if !req.query.is_empty() {
            builder = builder.query(&req.query);
        }
        if let Some(body) = &req.body {
            builder = builder.json(body);
        }

        let upstream = builder.send().await?;
        let status = upstream.status();
        let content_type = upstream.headers().get(CONTENT_TYPE).cloned();
        let bytes = upstream.bytes().await?;

        counter!(
            GATEWAY_FORWARDED_TOTAL,
            "method" => req.method.to_string(),
            "status" => status.as_u16().to_string()
        )
        .increment(1);
        debug!(method = %req.method, path = %req.path, status = status.as_u16(), "Relayed");

        let mut response = (status, bytes).into_response();
        match content_type {
            Some(value) => {
                response.headers_mut().insert(CONTENT_TYPE, value);
            }
            None => {
                response.headers_mut().remove(CONTENT_TYPE);
            }
        }
        Ok(response)
    }
}
