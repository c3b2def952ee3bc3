//! Delivery HTTP server.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/content` | Query content keys |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! `GET /content` accepts `fetch`, repeated `filter` and `sort` parameters,
//! and `skip`/`take` for paging:
//!
//! ```text
//! GET /content?fetch=children:{key}&filter=contentType:article&sort=name:asc&take=10
//! ```
//!
//! The first tag of `Accept-Language` selects the culture; without it the
//! configured `delivery.default_culture` applies.
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "invalid_filter_option", "message": "..." } }
//! ```
//!
//! Rejected queries answer `400` with the failure status as `code`;
//! malformed paging parameters answer `400 bad_request`; index engine
//! failures answer `500 internal`.

use axum::{
    extract::{Query, State},
    http::{header::ACCEPT_LANGUAGE, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use delivery_query_core::service::ContentQueryError;
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;

use crate::config::Config;
use crate::delivery::{Delivery, DeliveryRequest};

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
struct AppState {
    delivery: Arc<Delivery>,
}

/// Starts the delivery server.
///
/// Loads content, builds the index and binds to `[server].bind`. Runs until
/// the process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let delivery = Arc::new(Delivery::load(config).await?);
    let bind_addr = config.server.bind.clone();

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(
        "Delivery server listening on http://{} ({} documents)",
        listener.local_addr()?,
        delivery.document_count()
    );

    axum::serve(listener, build_router(delivery)).await?;
    Ok(())
}

/// The router serving `/content` and `/health`.
pub fn build_router(delivery: Arc<Delivery>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/content", get(handle_content))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(AppState { delivery })
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    /// Machine-readable error code (e.g. `"invalid_sort_option"`).
    code: String,
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

impl From<ContentQueryError> for AppError {
    fn from(err: ContentQueryError) -> Self {
        match &err {
            ContentQueryError::Failed { status, reason } => AppError {
                status: StatusCode::BAD_REQUEST,
                code: status.code().to_string(),
                message: reason.clone(),
            },
            ContentQueryError::Backend(e) => {
                tracing::error!("Content query failed: {:#}", e);
                AppError {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    code: "internal".to_string(),
                    message: err.to_string(),
                }
            }
        }
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ GET /content ============

/// JSON response body for `GET /content`.
#[derive(Serialize)]
struct ContentResponse {
    total: u64,
    items: Vec<Uuid>,
}

/// First language tag of an `Accept-Language` header, lowercased.
fn request_culture(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(ACCEPT_LANGUAGE)?.to_str().ok()?;
    let tag = value.split(',').next()?.split(';').next()?.trim();
    if tag.is_empty() || tag == "*" {
        None
    } else {
        Some(tag.to_lowercase())
    }
}

/// Collect query parameters into a [`DeliveryRequest`], keeping the order
/// of repeated `filter` and `sort` parameters.
fn parse_request(params: Vec<(String, String)>, culture: Option<String>) -> Result<DeliveryRequest, AppError> {
    let mut request = DeliveryRequest {
        culture,
        ..Default::default()
    };

    for (name, value) in params {
        match name.as_str() {
            "fetch" => request.fetch = Some(value).filter(|v| !v.is_empty()),
            "filter" => request.filters.push(value),
            "sort" => request.sorts.push(value),
            "skip" => {
                request.skip = value
                    .parse()
                    .map_err(|_| bad_request(format!("skip must be a non-negative integer, got '{}'", value)))?;
            }
            "take" => {
                request.take = Some(
                    value
                        .parse()
                        .map_err(|_| bad_request(format!("take must be a non-negative integer, got '{}'", value)))?,
                );
            }
            _ => {}
        }
    }

    Ok(request)
}

async fn handle_content(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<ContentResponse>, AppError> {
    let request = parse_request(params, request_culture(&headers))?;
    let page = state.delivery.execute(&request).await?;

    Ok(Json(ContentResponse {
        total: page.total,
        items: page.items,
    }))
}
