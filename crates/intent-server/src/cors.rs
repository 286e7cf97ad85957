//! CORS Gate
//!
//! Requests carrying an `Origin` outside the configured allow-list are
//! rejected before they reach any handler. An empty list allows everything.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::handlers::ErrorResponse;

/// Origins permitted to call the API
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OriginAllowList {
    origins: Vec<String>,
}

impl OriginAllowList {
    /// Parse a comma-separated list, trimming entries and dropping blanks
    pub fn parse(list: &str) -> Self {
        Self {
            origins: list
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(str::to_owned)
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.origins.is_empty()
    }

    pub fn origins(&self) -> &[String] {
        &self.origins
    }

    /// Same-origin and non-browser requests (no `Origin`) are always permitted
    pub fn permits(&self, origin: Option<&str>) -> bool {
        match origin {
            None => true,
            Some(_) if self.is_empty() => true,
            Some(origin) => self.origins.iter().any(|allowed| allowed == origin),
        }
    }

    /// Response-header layer for permitted cross-origin requests
    pub fn layer(&self) -> CorsLayer {
        let allow_origin = if self.is_empty() {
            AllowOrigin::any()
        } else {
            AllowOrigin::list(
                self.origins
                    .iter()
                    .filter_map(|origin| HeaderValue::from_str(origin).ok()),
            )
        };

        CorsLayer::new()
            .allow_origin(allow_origin)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    }
}

/// Middleware enforcing the allow-list
pub async fn cors_gate(
    State(origins): State<Arc<OriginAllowList>>,
    request: Request,
    next: Next,
) -> Response {
    let origin = request.headers().get(header::ORIGIN).map(|value| value.to_str());

    let permitted = match origin {
        None => true,
        Some(Ok(origin)) => origins.permits(Some(origin)),
        Some(Err(_)) => origins.is_empty(),
    };

    if !permitted {
        tracing::warn!(
            origin = ?request.headers().get(header::ORIGIN),
            path = %request.uri().path(),
            "Rejected request from disallowed origin"
        );
        return (
            StatusCode::FORBIDDEN,
            Json(ErrorResponse {
                error: "Origin not allowed".into(),
            }),
        )
            .into_response();
    }

    next.run(request).await
}
