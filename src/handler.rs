//! HTTP request handlers for the URL shortener API
//!
//! This module translates requests into storage calls:
//! - Saving a URL under a custom or random alias
//! - Redirecting an alias to its target URL
//! - Deleting an alias
//!
//! Every outcome is answered with `200 OK` and a [`Response`] body, except
//! a successful redirect.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response as HttpResponse},
    Json,
};
use validator::{Validate, ValidationErrors};

use crate::alias::ALIAS_LENGTH;
use crate::database::AppState;
use crate::error::StorageError;
use crate::model::{Response, SaveRequest};

/// Saves a new alias → URL mapping
///
/// # Request Body
///
/// ```json
/// {
///   "url": "https://example.com/very/long/url",
///   "alias": "my-link"  // Optional
/// }
/// ```
///
/// # Response
///
/// - `{"status":"OK","alias":"my-link"}` on success
/// - `{"status":"Error","error":"..."}` when decoding, validation or storage fails
pub async fn save_url(
    State(state): State<AppState>,
    payload: Result<Json<SaveRequest>, JsonRejection>,
) -> Json<Response> {
    const OP: &str = "handlers.url.save";

    let Json(mut req) = match payload {
        Ok(req) => req,
        Err(rejection) => {
            tracing::error!(op = OP, error = %rejection, "failed to decode request body");
            return Json(Response::error("failed to decode request"));
        }
    };

    tracing::info!(op = OP, ?req, "request body decoded");

    if req.alias.as_deref().is_none_or(str::is_empty) {
        req.alias = Some(state.generator.generate(ALIAS_LENGTH));
    }

    if let Err(errors) = req.validate() {
        tracing::error!(op = OP, error = %errors, "invalid request");
        return Json(Response::error(validation_message(&errors)));
    }

    let alias = req.alias.unwrap_or_default();

    match state.storage.save_url(&req.url, &alias) {
        Ok(id) => {
            tracing::info!(op = OP, id, alias = %alias, "url saved");
            Json(Response::saved(alias))
        }
        Err(StorageError::AliasExists) => {
            tracing::info!(op = OP, url = %req.url, alias = %alias, "url already exists");
            Json(Response::error("url already exists"))
        }
        Err(err @ (StorageError::AliasNotFound | StorageError::Unavailable { .. })) => {
            tracing::error!(op = OP, error = %err, "failed to save url");
            Json(Response::error("failed to save url"))
        }
    }
}

/// Redirects an alias to its target URL
///
/// # Response
///
/// - **302 Found** with `Location` set to the stored URL
/// - `{"status":"Error","error":"not found"}` for unknown aliases
/// - `{"status":"Error","error":"internal error"}` when storage fails
pub async fn redirect(Path(alias): Path<String>, State(state): State<AppState>) -> HttpResponse {
    const OP: &str = "handlers.redirect";

    if alias.is_empty() {
        tracing::info!(op = OP, "alias is empty");
        return Json(Response::error("not found")).into_response();
    }

    let target = match state.storage.get_url(&alias) {
        Ok(target) => target,
        Err(StorageError::AliasNotFound) => {
            tracing::info!(op = OP, alias = %alias, "alias not found");
            return Json(Response::error("not found")).into_response();
        }
        Err(err @ (StorageError::AliasExists | StorageError::Unavailable { .. })) => {
            tracing::error!(op = OP, alias = %alias, error = %err, "failed to get url");
            return Json(Response::error("internal error")).into_response();
        }
    };

    match HeaderValue::try_from(target.as_str()) {
        Ok(location) => {
            tracing::info!(op = OP, alias = %alias, url = %target, "got url");
            (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
        }
        Err(err) => {
            tracing::error!(op = OP, alias = %alias, error = %err, "stored url is not a valid location");
            Json(Response::error("internal error")).into_response()
        }
    }
}

/// Deletes an alias
///
/// # Response
///
/// - `{"status":"OK"}` once the mapping is gone
/// - `{"status":"Error","error":"not found"}` if there was nothing to delete
/// - `{"status":"Error","error":"internal error"}` when storage fails
pub async fn delete_url(Path(alias): Path<String>, State(state): State<AppState>) -> Json<Response> {
    const OP: &str = "handlers.url.delete";

    if alias.is_empty() {
        tracing::info!(op = OP, "alias is empty");
        return Json(Response::error("not found"));
    }

    match state.storage.delete_url(&alias) {
        Ok(()) => {
            tracing::info!(op = OP, alias = %alias, "deleted");
            Json(Response::ok())
        }
        Err(StorageError::AliasNotFound) => {
            tracing::info!(op = OP, alias = %alias, "url not found");
            Json(Response::error("not found"))
        }
        Err(err @ (StorageError::AliasExists | StorageError::Unavailable { .. })) => {
            tracing::error!(op = OP, alias = %alias, error = %err, "failed to delete url");
            Json(Response::error("internal error"))
        }
    }
}

/// Liveness probe
pub async fn health() -> Json<Response> {
    Json(Response::ok())
}

/// Renders validation failures as `field <name> ...` sentences, one per field
fn validation_message(errors: &ValidationErrors) -> String {
    let mut fields: Vec<(String, Vec<String>)> = errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let codes = errs.iter().map(|e| e.code.to_string()).collect();
            (field.to_string(), codes)
        })
        .collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .iter()
        .map(|(field, codes)| {
            if codes.iter().any(|c| c == "required") {
                format!("field {field} is a required field")
            } else if codes.iter().any(|c| c == "url") {
                format!("field {field} is not a valid URL")
            } else {
                format!("field {field} is not valid")
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}
