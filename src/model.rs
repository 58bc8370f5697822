//! Data models for the URL shortener
//!
//! Stored records plus the request and response bodies of the HTTP API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A URL mapping as stored in the database
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UrlRecord {
    /// Server-assigned, monotonically increasing id
    pub id: u64,

    /// Unique short key
    pub alias: String,

    /// Destination the alias redirects to
    pub url: String,

    pub created_at: DateTime<Utc>,
}

/// Request payload for creating a new short URL
///
/// # Example
/// ```json
/// {
///   "url": "https://example.com/very/long/url",
///   "alias": "my-link"  // Optional
/// }
/// ```
#[derive(Deserialize, Validate, Debug, Default)]
pub struct SaveRequest {
    #[validate(length(min = 1, code = "required"), url)]
    #[serde(default)]
    pub url: String,

    /// Filled with a generated alias before validation when absent or empty
    #[validate(length(min = 1, code = "required"))]
    #[serde(default)]
    pub alias: Option<String>,
}

/// Envelope of every JSON response
///
/// Failures are reported through `status`/`error`, not the HTTP status code.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: Status,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Alias of a freshly saved mapping
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    #[serde(rename = "OK")]
    Ok,
    Error,
}

impl Response {
    pub fn ok() -> Self {
        Self {
            status: Status::Ok,
            error: None,
            alias: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            error: Some(msg.into()),
            alias: None,
        }
    }

    pub fn saved(alias: impl Into<String>) -> Self {
        Self {
            alias: Some(alias.into()),
            ..Self::ok()
        }
    }
}
