//! Validating gateway in front of the ShareIt server.
//!
//! Exposes the same routes as [`crate::server`].  Requests that fail header,
//! id, query or body validation are answered with 400 locally; everything
//! else is relayed to the server through [`client::ServerClient`].

pub mod client;
mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::errors::error_path_middleware;
use crate::metrics::{metrics_handler, metrics_middleware};
use crate::server::{handle_unknown_route, health_check, request_id_middleware};
use client::ServerClient;

/// Shared gateway state.
pub struct GatewayState {
    pub config: Config,
    pub client: ServerClient,
}

impl GatewayState {
    /// Build the state, creating an HTTP client for `server_url`.
    pub fn new(config: Config, server_url: &str) -> anyhow::Result<Self> {
        let timeout = Duration::from_secs(config.gateway.timeout_secs);
        let client = ServerClient::new(server_url, timeout)?;
        Ok(Self { config, client })
    }
}

/// Build the gateway [`Router`].
pub fn app(state: Arc<GatewayState>) -> Router {
    let observability = state.config.observability.clone();
    let max_body_size = state.config.gateway.max_body_size;

    let mut router = Router::new()
        .route("/users", post(routes::create_user))
        .route(
            "/users/:id",
            get(routes::get_user)
                .patch(routes::update_user)
                .delete(routes::delete_user),
        )
        .route("/items", post(routes::create_item).get(routes::list_items))
        .route("/items/search", get(routes::search_items))
        .route("/items/:id", get(routes::get_item).patch(routes::update_item))
        .route("/items/:id/comment", post(routes::create_comment))
        .route(
            "/bookings",
            post(routes::create_booking).get(routes::list_booker_bookings),
        )
        .route("/bookings/owner", get(routes::list_owner_bookings))
        .route(
            "/bookings/:id",
            get(routes::get_booking).patch(routes::decide_booking),
        )
        .route(
            "/requests",
            post(routes::create_request).get(routes::list_own_requests),
        )
        .route("/requests/all", get(routes::list_other_requests))
        .route("/requests/:id", get(routes::get_request));

    if observability.health_check {
        router = router.route("/health", get(health_check));
    }
    if observability.metrics {
        router = router.route("/metrics", get(metrics_handler));
    }

    let router = router
        .fallback(handle_unknown_route)
        .with_state(state)
        .layer(middleware::from_fn(error_path_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(max_body_size));

    if observability.metrics {
        router.layer(middleware::from_fn(metrics_middleware))
    } else {
        router
    }
}
