//! HTTP basic authentication for the management routes

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::model::Response as ApiResponse;

/// `WWW-Authenticate` challenge sent with every `401`
pub const CHALLENGE: &str = "Basic realm=\"url-shortener\"";

/// The single username/password pair accepted by [`basic_auth`]
#[derive(Clone, Debug)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl Credentials {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }

    /// Checks an `Authorization: Basic ...` header against this pair
    fn matches(&self, headers: &HeaderMap) -> bool {
        let Some(encoded) = headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Basic "))
        else {
            return false;
        };

        let Ok(decoded) = STANDARD.decode(encoded.trim()) else {
            return false;
        };
        let Ok(decoded) = String::from_utf8(decoded) else {
            return false;
        };

        match decoded.split_once(':') {
            Some((user, password)) => user == self.user && password == self.password,
            None => false,
        }
    }
}

/// Middleware enforcing HTTP basic authentication
///
/// Requests without matching credentials are answered with `401` and a
/// `WWW-Authenticate` challenge; everything else is passed through.
pub async fn basic_auth(
    State(credentials): State<Credentials>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, Response> {
    if !credentials.matches(&headers) {
        tracing::info!(path = %request.uri().path(), "rejected request without valid credentials");

        return Err((
            StatusCode::UNAUTHORIZED,
            [(header::WWW_AUTHENTICATE, HeaderValue::from_static(CHALLENGE))],
            Json(ApiResponse::error("unauthorized")),
        )
            .into_response());
    }

    Ok(next.run(request).await)
}
