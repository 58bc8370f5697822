//! Route definitions for the URL shortener API
//!
//! This module maps every HTTP route to its handler and wraps the router in
//! the request-id, tracing, panic and timeout layers.

use std::time::Duration;

use axum::{
    body::Body,
    http::{HeaderName, Request, StatusCode},
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::database::AppState;
use crate::handler::{delete_url, health, redirect, save_url};
use crate::middleware::{basic_auth, Credentials};

const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Creates the application router with all routes configured
///
/// # Route Definitions
///
/// - `GET /{alias}` - Redirects to the target URL (public)
/// - `GET /health` - Liveness probe (public)
/// - `POST /url` - Saves a new mapping (basic auth)
/// - `DELETE /url/{alias}` - Deletes a mapping (basic auth)
pub fn create_app(state: AppState, credentials: Credentials) -> Router {
    // Routes that require basic auth
    let url_routes = Router::new()
        .route("/", post(save_url))
        .route("/{alias}", delete(delete_url))
        .layer(middleware::from_fn_with_state(credentials, basic_auth));

    Router::new()
        .route("/health", get(health))
        .route("/{alias}", get(redirect))
        .nest("/url", url_routes)
        .with_state(state)
}

/// Wraps the router in the middleware stack used in production
pub fn with_layers(app: Router, timeout: Duration) -> Router {
    // Layers run outermost-last: the request id is assigned before the trace
    // span opens, so the span can record it.
    app.layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout))
        .layer(CatchPanicLayer::new())
        .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            let request_id = request
                .headers()
                .get(&X_REQUEST_ID)
                .and_then(|value| value.to_str().ok())
                .unwrap_or_default();

            tracing::info_span!(
                "request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = %request_id,
            )
        }))
        .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
}
