//! Envelope response format for all API responses.
//!
//! Every response is wrapped in a consistent envelope:
//! ```json
//! {
//!   "data": { ... },
//!   "meta": { "request_id": "...", "timestamp": "...", "response_time_ms": 5 },
//!   "_links": { "self": "..." }
//! }
//! ```
//!
//! Failures use the same shape with `data: null` and an `errors` list; see
//! [`crate::http::error::AppError`].

use std::collections::HashMap;
use std::time::Instant;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Envelope response wrapping all API data.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,

    pub meta: ApiMeta,

    /// HATEOAS-style links for discoverability.
    #[serde(rename = "_links", skip_serializing_if = "HashMap::is_empty")]
    pub links: HashMap<String, String>,

    #[serde(skip)]
    status: StatusCode,
}

/// Metadata included in every response.
#[derive(Debug, Serialize)]
pub struct ApiMeta {
    /// Unique request identifier for tracing.
    pub request_id: String,
    /// RFC 3339 timestamp of the response.
    pub timestamp: String,
    pub response_time_ms: u64,
}

/// Start-of-request bookkeeping shared by every handler.
pub struct RequestTimer {
    start: Instant,
    request_id: String,
}

impl RequestTimer {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
            request_id: uuid::Uuid::now_v7().to_string(),
        }
    }

    /// Wrap `data` in a 200 envelope stamped with this request's timing.
    pub fn success<T: Serialize>(self, data: T) -> ApiResponse<T> {
        ApiResponse::success(data, self.request_id, self.start.elapsed().as_millis() as u64)
    }
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a success response with data.
    pub fn success(data: T, request_id: String, response_time_ms: u64) -> Self {
        Self {
            data,
            meta: ApiMeta {
                request_id,
                timestamp: chrono::Utc::now().to_rfc3339(),
                response_time_ms,
            },
            links: HashMap::new(),
            status: StatusCode::OK,
        }
    }

    /// Add a HATEOAS link.
    pub fn with_link(mut self, rel: &str, href: &str) -> Self {
        self.links.insert(rel.to_string(), href.to_string());
        self
    }

    /// Mark the response as `201 Created`.
    pub fn created(mut self) -> Self {
        self.status = StatusCode::CREATED;
        self
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let body = serde_json::to_string(&self).unwrap_or_else(|_| {
            r#"{"data":null,"errors":[{"code":"SERIALIZATION_ERROR","message":"Failed to serialize response"}]}"#.to_string()
        });

        (
            self.status,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response()
    }
}
