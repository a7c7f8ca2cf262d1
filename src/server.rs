//! Axum router construction for the ShareIt server.
//!
//! The [`app`] function wires every endpoint to its handler and returns a
//! ready-to-serve [`axum::Router`].  The `handle_*` functions here only
//! run extractors (identity header, path ids, query strings, validated
//! bodies) and delegate to [`crate::handlers`].

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{DefaultBodyLimit, State},
    http::{HeaderValue, Request},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::dto::booking::{ApprovalQuery, BookingCreateDto, StateQuery};
use crate::dto::item::{CommentCreateDto, ItemCreateDto, ItemUpdateDto, SearchQuery};
use crate::dto::request::ItemRequestCreateDto;
use crate::dto::user::{UserCreateDto, UserUpdateDto};
use crate::errors::{error_path_middleware, generate_request_id, ShareItError, ShareItResult};
use crate::extract::{MaybeSharerUserId, PositiveId, QueryParams, SharerUserId, ValidatedJson};
use crate::metrics::{metrics_handler, metrics_middleware};
use crate::AppState;

/// Correlation header set on every response and forwarded by the gateway.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

// -- OpenAPI document ---------------------------------------------------------

/// OpenAPI documentation for the ShareIt server API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "ShareIt API",
        version = "0.1.0",
        description = "Item sharing: users, items, bookings, requests and comments"
    ),
    paths(
        health_check,
        crate::handlers::users::create_user,
        crate::handlers::users::update_user,
        crate::handlers::users::get_user,
        crate::handlers::users::delete_user,
        crate::handlers::items::create_item,
        crate::handlers::items::update_item,
        crate::handlers::items::get_item,
        crate::handlers::items::list_owner_items,
        crate::handlers::items::search_items,
        crate::handlers::items::create_comment,
        crate::handlers::bookings::create_booking,
        crate::handlers::bookings::decide_booking,
        crate::handlers::bookings::get_booking,
        crate::handlers::bookings::list_booker_bookings,
        crate::handlers::bookings::list_owner_bookings,
        crate::handlers::requests::create_request,
        crate::handlers::requests::list_own_requests,
        crate::handlers::requests::list_other_requests,
        crate::handlers::requests::get_request,
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Users", description = "User accounts"),
        (name = "Items", description = "Items, search and comments"),
        (name = "Bookings", description = "Bookings and owner decisions"),
        (name = "Requests", description = "Requests for items nobody lists yet"),
    )
)]
pub struct ApiDoc;

/// Build the axum [`Router`] with all ShareIt routes.
///
/// The returned router is ready to be passed to `axum::serve`.
pub fn app(state: Arc<AppState>) -> Router {
    let observability = state.config.observability.clone();
    let max_body_size = state.config.server.max_body_size;

    let mut router = Router::new()
        // Users
        .route("/users", post(handle_create_user))
        .route(
            "/users/:id",
            get(handle_get_user)
                .patch(handle_update_user)
                .delete(handle_delete_user),
        )
        // Items (static segments win over `:id`)
        .route("/items", post(handle_create_item).get(handle_list_items))
        .route("/items/search", get(handle_search_items))
        .route("/items/:id", get(handle_get_item).patch(handle_update_item))
        .route("/items/:id/comment", post(handle_create_comment))
        // Bookings
        .route(
            "/bookings",
            post(handle_create_booking).get(handle_list_booker_bookings),
        )
        .route("/bookings/owner", get(handle_list_owner_bookings))
        .route(
            "/bookings/:id",
            get(handle_get_booking).patch(handle_decide_booking),
        )
        // Item requests
        .route(
            "/requests",
            post(handle_create_request).get(handle_list_own_requests),
        )
        .route("/requests/all", get(handle_list_other_requests))
        .route("/requests/:id", get(handle_get_request))
        // OpenAPI document
        .route("/openapi.json", get(openapi_json));

    if observability.health_check {
        router = router.route("/health", get(health_check));
    }
    if observability.metrics {
        router = router.route("/metrics", get(metrics_handler));
    }

    let router = router
        .fallback(handle_unknown_route)
        .with_state(state)
        // Layer ordering: inner layers run first, outer layers wrap them.
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

// -- Request id middleware ----------------------------------------------------

/// Echo the caller's `x-request-id`, or mint one, on every response.
pub async fn request_id_middleware(req: Request<Body>, next: Next) -> Response {
    let request_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
        .unwrap_or_else(generate_request_id);

    let mut response = next.run(req).await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

// -- Health check / docs ------------------------------------------------------

/// `GET /health` -- Returns `{"status": "ok"}` with 200 OK.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    operation_id = "HealthCheck",
    responses(
        (status = 200, description = "Health check OK")
    )
)]
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

/// JSON 404 for any route neither service knows.
pub async fn handle_unknown_route(req: Request<Body>) -> ShareItError {
    ShareItError::NotFound(format!(
        "No handler for {} {}",
        req.method(),
        req.uri().path()
    ))
}

// -- Users --------------------------------------------------------------------

async fn handle_create_user(
    State(state): State<Arc<AppState>>,
    ValidatedJson(body): ValidatedJson<UserCreateDto>,
) -> ShareItResult<Response> {
    crate::handlers::users::create_user(state, body).await
}

async fn handle_update_user(
    State(state): State<Arc<AppState>>,
    PositiveId(user_id): PositiveId,
    ValidatedJson(body): ValidatedJson<UserUpdateDto>,
) -> ShareItResult<Response> {
    crate::handlers::users::update_user(state, user_id, body).await
}

async fn handle_get_user(
    State(state): State<Arc<AppState>>,
    PositiveId(user_id): PositiveId,
) -> ShareItResult<Response> {
    crate::handlers::users::get_user(state, user_id).await
}

async fn handle_delete_user(
    State(state): State<Arc<AppState>>,
    PositiveId(user_id): PositiveId,
) -> ShareItResult<Response> {
    crate::handlers::users::delete_user(state, user_id).await
}

// -- Items --------------------------------------------------------------------

async fn handle_create_item(
    State(state): State<Arc<AppState>>,
    SharerUserId(user_id): SharerUserId,
    ValidatedJson(body): ValidatedJson<ItemCreateDto>,
) -> ShareItResult<Response> {
    crate::handlers::items::create_item(state, user_id, body).await
}

async fn handle_update_item(
    State(state): State<Arc<AppState>>,
    SharerUserId(user_id): SharerUserId,
    PositiveId(item_id): PositiveId,
    ValidatedJson(body): ValidatedJson<ItemUpdateDto>,
) -> ShareItResult<Response> {
    crate::handlers::items::update_item(state, user_id, item_id, body).await
}

async fn handle_get_item(
    State(state): State<Arc<AppState>>,
    MaybeSharerUserId(viewer_id): MaybeSharerUserId,
    PositiveId(item_id): PositiveId,
) -> ShareItResult<Response> {
    crate::handlers::items::get_item(state, viewer_id, item_id).await
}

async fn handle_list_items(
    State(state): State<Arc<AppState>>,
    SharerUserId(user_id): SharerUserId,
) -> ShareItResult<Response> {
    crate::handlers::items::list_owner_items(state, user_id).await
}

async fn handle_search_items(
    State(state): State<Arc<AppState>>,
    QueryParams(query): QueryParams<SearchQuery>,
) -> ShareItResult<Response> {
    crate::handlers::items::search_items(state, query.text).await
}

async fn handle_create_comment(
    State(state): State<Arc<AppState>>,
    SharerUserId(user_id): SharerUserId,
    PositiveId(item_id): PositiveId,
    ValidatedJson(body): ValidatedJson<CommentCreateDto>,
) -> ShareItResult<Response> {
    crate::handlers::items::create_comment(state, user_id, item_id, body).await
}

// -- Bookings -----------------------------------------------------------------

async fn handle_create_booking(
    State(state): State<Arc<AppState>>,
    SharerUserId(user_id): SharerUserId,
    ValidatedJson(body): ValidatedJson<BookingCreateDto>,
) -> ShareItResult<Response> {
    crate::handlers::bookings::create_booking(state, user_id, body).await
}

async fn handle_decide_booking(
    State(state): State<Arc<AppState>>,
    SharerUserId(user_id): SharerUserId,
    PositiveId(booking_id): PositiveId,
    QueryParams(query): QueryParams<ApprovalQuery>,
) -> ShareItResult<Response> {
    crate::handlers::bookings::decide_booking(state, user_id, booking_id, query.approved).await
}

async fn handle_get_booking(
    State(state): State<Arc<AppState>>,
    SharerUserId(user_id): SharerUserId,
    PositiveId(booking_id): PositiveId,
) -> ShareItResult<Response> {
    crate::handlers::bookings::get_booking(state, user_id, booking_id).await
}

async fn handle_list_booker_bookings(
    State(state): State<Arc<AppState>>,
    SharerUserId(user_id): SharerUserId,
    QueryParams(query): QueryParams<StateQuery>,
) -> ShareItResult<Response> {
    crate::handlers::bookings::list_booker_bookings(state, user_id, query.state).await
}

async fn handle_list_owner_bookings(
    State(state): State<Arc<AppState>>,
    SharerUserId(user_id): SharerUserId,
    QueryParams(query): QueryParams<StateQuery>,
) -> ShareItResult<Response> {
    crate::handlers::bookings::list_owner_bookings(state, user_id, query.state).await
}

// -- Item requests ------------------------------------------------------------

async fn handle_create_request(
    State(state): State<Arc<AppState>>,
    SharerUserId(user_id): SharerUserId,
    ValidatedJson(body): ValidatedJson<ItemRequestCreateDto>,
) -> ShareItResult<Response> {
    crate::handlers::requests::create_request(state, user_id, body).await
}

async fn handle_list_own_requests(
    State(state): State<Arc<AppState>>,
    SharerUserId(user_id): SharerUserId,
) -> ShareItResult<Response> {
    crate::handlers::requests::list_own_requests(state, user_id).await
}

async fn handle_list_other_requests(
    State(state): State<Arc<AppState>>,
    SharerUserId(user_id): SharerUserId,
) -> ShareItResult<Response> {
    crate::handlers::requests::list_other_requests(state, user_id).await
}

async fn handle_get_request(
    State(state): State<Arc<AppState>>,
    SharerUserId(user_id): SharerUserId,
    PositiveId(request_id): PositiveId,
) -> ShareItResult<Response> {
    crate::handlers::requests::get_request(state, user_id, request_id).await
}

// -- Tests --------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::extract::USER_ID_HEADER;
    use crate::model::booking::NewBooking;
    use crate::model::now;
    use crate::store::sqlite::SqliteStore;
    use axum::http::{Method, StatusCode};
    use chrono::{Duration, NaiveDateTime};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn test_state() -> Arc<AppState> {
        let store = SqliteStore::new(":memory:").expect("in-memory store");
        Arc::new(AppState {
            config: Config::default(),
            store: Arc::new(store),
        })
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        user: Option<i64>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(id) = user {
            builder = builder.header(USER_ID_HEADER, id.to_string());
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    async fn create_user(app: &Router, name: &str) -> i64 {
        let (status, body) = send(
            app,
            Method::POST,
            "/users",
            None,
            Some(json!({ "name": name, "email": format!("{}@example.com", name.to_lowercase()) })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["id"].as_i64().unwrap()
    }

    async fn create_item(app: &Router, owner: i64, name: &str, available: bool) -> i64 {
        let (status, body) = send(
            app,
            Method::POST,
            "/items",
            Some(owner),
            Some(json!({ "name": name, "description": format!("{name} for rent"), "available": available })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["id"].as_i64().unwrap()
    }

    fn iso(t: NaiveDateTime) -> String {
        t.format("%Y-%m-%dT%H:%M:%S").to_string()
    }

    /// Insert a booking directly, bypassing the window check on the body.
    async fn seed_booking(
        state: &AppState,
        booker_id: i64,
        item_id: i64,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> i64 {
        state
            .store
            .create_booking(NewBooking {
                item_id,
                booker_id,
                start,
                end,
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = app(test_state());
        let (status, body) = send(&app, Method::GET, "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_request_id_header() {
        let app = app(test_state());
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header(REQUEST_ID_HEADER, "abc123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.headers()[REQUEST_ID_HEADER], "abc123");
    }

    #[tokio::test]
    async fn test_openapi_document() {
        let app = app(test_state());
        let (status, body) = send(&app, Method::GET, "/openapi.json", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"]["/bookings/{bookingId}"].is_object());
        assert!(body["paths"]["/users"].is_object());
    }

    #[tokio::test]
    async fn test_duplicate_email_conflict_body() {
        let app = app(test_state());
        create_user(&app, "Ann").await;
        let (status, body) = send(
            &app,
            Method::POST,
            "/users",
            None,
            Some(json!({ "name": "Ann Two", "email": "ann@example.com" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["status"], 409);
        assert_eq!(body["error"], "Conflict");
        assert_eq!(body["path"], "/users");
        assert!(body["message"]["error"].as_str().unwrap().contains("ann@example.com"));
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_user_lifecycle() {
        let app = app(test_state());
        let id = create_user(&app, "Ann").await;

        let (status, body) = send(
            &app,
            Method::PATCH,
            &format!("/users/{id}"),
            None,
            Some(json!({ "name": "Anna" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Anna");
        assert_eq!(body["email"], "ann@example.com");

        let (status, _) = send(&app, Method::DELETE, &format!("/users/{id}"), None, None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, body) = send(&app, Method::GET, &format!("/users/{id}"), None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["path"], format!("/users/{id}"));
    }

    #[tokio::test]
    async fn test_invalid_user_body() {
        let app = app(test_state());
        let (status, body) = send(
            &app,
            Method::POST,
            "/users",
            None,
            Some(json!({ "name": "", "email": "bad" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"]["name"].is_string());
        assert!(body["message"]["email"].is_string());
    }

    #[tokio::test]
    async fn test_bad_path_ids() {
        let app = app(test_state());
        let (status, _) = send(&app, Method::GET, "/users/abc", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = send(&app, Method::GET, "/users/0", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_missing_user_header() {
        let app = app(test_state());
        let (status, body) = send(&app, Method::GET, "/items", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"]["error"]
            .as_str()
            .unwrap()
            .contains(USER_ID_HEADER));
    }

    #[tokio::test]
    async fn test_booking_approval_flow() {
        let app = app(test_state());
        let owner = create_user(&app, "Owner").await;
        let booker = create_user(&app, "Booker").await;
        let stranger = create_user(&app, "Stranger").await;
        let item = create_item(&app, owner, "Drill", true).await;
        let now = now();

        let (status, booking) = send(
            &app,
            Method::POST,
            "/bookings",
            Some(booker),
            Some(json!({
                "itemId": item,
                "start": iso(now + Duration::days(1)),
                "end": iso(now + Duration::days(2)),
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{booking}");
        assert_eq!(booking["status"], "WAITING");
        assert_eq!(booking["item"]["id"], item);
        assert_eq!(booking["booker"]["id"], booker);
        let id = booking["id"].as_i64().unwrap();

        // A third party can neither decide nor view.
        let (status, _) = send(
            &app,
            Method::PATCH,
            &format!("/bookings/{id}?approved=true"),
            Some(stranger),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = send(
            &app,
            Method::GET,
            &format!("/bookings/{id}"),
            Some(stranger),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        // The booker cannot approve their own booking.
        let (status, _) = send(
            &app,
            Method::PATCH,
            &format!("/bookings/{id}?approved=true"),
            Some(booker),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, decided) = send(
            &app,
            Method::PATCH,
            &format!("/bookings/{id}?approved=true"),
            Some(owner),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(decided["status"], "APPROVED");

        let (status, seen) = send(
            &app,
            Method::GET,
            &format!("/bookings/{id}"),
            Some(booker),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(seen["status"], "APPROVED");
    }

    #[tokio::test]
    async fn test_booking_rejections() {
        let app = app(test_state());
        let owner = create_user(&app, "Owner").await;
        let booker = create_user(&app, "Booker").await;
        let saw = create_item(&app, owner, "Saw", false).await;
        let now = now();

        let (status, body) = send(
            &app,
            Method::POST,
            "/bookings",
            Some(booker),
            Some(json!({
                "itemId": saw,
                "start": iso(now + Duration::days(1)),
                "end": iso(now + Duration::days(2)),
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"]["error"].is_string());

        let (status, body) = send(
            &app,
            Method::POST,
            "/bookings",
            Some(booker),
            Some(json!({
                "itemId": saw,
                "start": iso(now + Duration::days(2)),
                "end": iso(now + Duration::days(1)),
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"]["end"], "must be after start");

        let (status, _) = send(
            &app,
            Method::PATCH,
            "/bookings/1",
            Some(owner),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &app,
            Method::GET,
            "/bookings/999",
            Some(owner),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_booking_state_filters() {
        let state = test_state();
        let app = app(state.clone());
        let owner = create_user(&app, "Owner").await;
        let booker = create_user(&app, "Booker").await;
        let item = create_item(&app, owner, "Drill", true).await;
        let now = now();
        let day = Duration::days(1);

        let past = seed_booking(&state, booker, item, now - day * 3, now - day * 2).await;
        let current = seed_booking(&state, booker, item, now - day, now + day).await;
        let future = seed_booking(&state, booker, item, now + day * 2, now + day * 3).await;

        let ids = |body: &Value| -> Vec<i64> {
            body.as_array()
                .unwrap()
                .iter()
                .map(|b| b["id"].as_i64().unwrap())
                .collect()
        };

        let (status, body) =
            send(&app, Method::GET, "/bookings?state=CURRENT", Some(booker), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ids(&body), vec![current]);

        let (_, body) = send(&app, Method::GET, "/bookings", Some(booker), None).await;
        assert_eq!(ids(&body), vec![future, current, past]);

        let (status, body) =
            send(&app, Method::GET, "/bookings?state=", Some(booker), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ids(&body), vec![future, current, past]);

        let (status, body) =
            send(&app, Method::GET, "/bookings/owner?state=", Some(owner), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ids(&body), vec![future, current, past]);

        let (_, body) =
            send(&app, Method::GET, "/bookings/owner?state=past", Some(owner), None).await;
        assert_eq!(ids(&body), vec![past]);

        let (_, body) =
            send(&app, Method::GET, "/bookings/owner?state=FUTURE", Some(owner), None).await;
        assert_eq!(ids(&body), vec![future]);

        let (status, body) =
            send(&app, Method::GET, "/bookings?state=SOMETIMES", Some(booker), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"]["state"], "Unknown state: SOMETIMES");

        let (status, _) = send(&app, Method::GET, "/bookings", Some(999), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_item_view_bookings_only_for_owner() {
        let state = test_state();
        let app = app(state.clone());
        let owner = create_user(&app, "Owner").await;
        let booker = create_user(&app, "Booker").await;
        let item = create_item(&app, owner, "Drill", true).await;
        let now = now();
        let day = Duration::days(1);

        let last = seed_booking(&state, booker, item, now - day * 2, now - day).await;
        let next = seed_booking(&state, booker, item, now + day, now + day * 2).await;

        let (status, view) =
            send(&app, Method::GET, &format!("/items/{item}"), Some(owner), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["lastBooking"]["id"], last);
        assert_eq!(view["nextBooking"]["id"], next);
        assert_eq!(view["lastBooking"]["bookerId"], booker);

        let (_, view) =
            send(&app, Method::GET, &format!("/items/{item}"), Some(booker), None).await;
        assert!(view["lastBooking"].is_null());
        assert!(view["nextBooking"].is_null());

        let (status, view) = send(&app, Method::GET, &format!("/items/{item}"), None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(view["nextBooking"].is_null());

        let (_, listed) = send(&app, Method::GET, "/items", Some(owner), None).await;
        assert_eq!(listed[0]["lastBooking"]["id"], last);
    }

    #[tokio::test]
    async fn test_item_update_owner_only() {
        let app = app(test_state());
        let owner = create_user(&app, "Owner").await;
        let other = create_user(&app, "Other").await;
        let item = create_item(&app, owner, "Drill", true).await;

        let (status, _) = send(
            &app,
            Method::PATCH,
            &format!("/items/{item}"),
            Some(other),
            Some(json!({ "available": false })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(
            &app,
            Method::PATCH,
            &format!("/items/{item}"),
            Some(owner),
            Some(json!({ "available": false })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["available"], false);
        assert_eq!(body["name"], "Drill");
    }

    #[tokio::test]
    async fn test_search() {
        let app = app(test_state());
        let owner = create_user(&app, "Owner").await;
        let drill = create_item(&app, owner, "Cordless DRILL", true).await;
        create_item(&app, owner, "Old drill", false).await;
        create_item(&app, owner, "Ladder", true).await;

        let (status, body) =
            send(&app, Method::GET, "/items/search?text=dRiLl", None, None).await;
        assert_eq!(status, StatusCode::OK);
        let hits = body.as_array().unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0]["id"], drill);

        // The needle keeps its whitespace; only a blank needle short-circuits.
        let (_, body) =
            send(&app, Method::GET, "/items/search?text=cordless%20", None, None).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
        let (_, body) =
            send(&app, Method::GET, "/items/search?text=drill%20%20", None, None).await;
        assert_eq!(body, json!([]));

        let (_, body) = send(&app, Method::GET, "/items/search?text=", None, None).await;
        assert_eq!(body, json!([]));
        let (_, body) = send(&app, Method::GET, "/items/search?text=%20%20", None, None).await;
        assert_eq!(body, json!([]));
        let (_, body) = send(&app, Method::GET, "/items/search", None, None).await;
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn test_comment_gate() {
        let state = test_state();
        let app = app(state.clone());
        let owner = create_user(&app, "Owner").await;
        let booker = create_user(&app, "Booker").await;
        let stranger = create_user(&app, "Stranger").await;
        let item = create_item(&app, owner, "Drill", true).await;
        let now = now();
        seed_booking(&state, booker, item, now - Duration::days(2), now - Duration::days(1)).await;

        let (status, _) = send(
            &app,
            Method::POST,
            &format!("/items/{item}/comment"),
            Some(stranger),
            Some(json!({ "text": "Never used it" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, comment) = send(
            &app,
            Method::POST,
            &format!("/items/{item}/comment"),
            Some(booker),
            Some(json!({ "text": "Works great" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(comment["authorName"], "Booker");
        assert_eq!(comment["itemId"], item);

        let (_, view) = send(&app, Method::GET, &format!("/items/{item}"), None, None).await;
        assert_eq!(view["comments"][0]["text"], "Works great");
    }

    #[tokio::test]
    async fn test_item_requests() {
        let app = app(test_state());
        let ann = create_user(&app, "Ann").await;
        let bob = create_user(&app, "Bob").await;

        let (status, request) = send(
            &app,
            Method::POST,
            "/requests",
            Some(ann),
            Some(json!({ "description": "Need a ladder" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(request["requestor"]["id"], ann);
        let request_id = request["id"].as_i64().unwrap();

        let (status, _) = send(
            &app,
            Method::POST,
            "/items",
            Some(bob),
            Some(json!({
                "name": "Ladder",
                "description": "Three metres",
                "available": true,
                "requestId": request_id,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, own) = send(&app, Method::GET, "/requests", Some(ann), None).await;
        assert_eq!(own[0]["items"][0]["name"], "Ladder");
        assert_eq!(own[0]["items"][0]["ownerId"], bob);

        let (_, others) = send(&app, Method::GET, "/requests/all", Some(ann), None).await;
        assert_eq!(others, json!([]));
        let (_, others) = send(&app, Method::GET, "/requests/all", Some(bob), None).await;
        assert_eq!(others[0]["id"], request_id);

        let (status, one) = send(
            &app,
            Method::GET,
            &format!("/requests/{request_id}"),
            Some(bob),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(one["description"], "Need a ladder");

        let (status, _) = send(&app, Method::GET, "/requests/999", Some(bob), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(
            &app,
            Method::POST,
            "/requests",
            Some(ann),
            Some(json!({ "description": "   " })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_route_is_json_404() {
        let app = app(test_state());
        let (status, body) = send(&app, Method::GET, "/nope", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["path"], "/nope");
    }
}
