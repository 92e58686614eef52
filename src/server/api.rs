//! REST API handlers
//!
//! The contributor endpoints keep their bare response shapes (`{delay, donors}`,
//! `{success}`, a plain row array) since deployed clients parse them directly.

use axum::{
    extract::{DefaultBodyLimit, FromRequestParts, Query, State},
    http::{header, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{Error, ErrorCategory, RankErrorTrait};
use crate::service::Submission;

use super::app::AppState;

// ============================================================================
// API Response Types
// ============================================================================

/// Generic API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

/// Simple error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: message.into(),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// Acknowledgement for an accepted capture
#[derive(Debug, Serialize)]
pub struct AcceptResponse {
    pub success: bool,
}

/// Number of rows stored by a replace operation
#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub count: usize,
}

#[derive(Debug, Deserialize)]
pub struct DonorsQuery {
    pub count: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct QueriesRequest {
    pub queries: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct SitesRequest {
    pub sites: Vec<String>,
}

/// Error returned by handlers; intake rejections map to 400
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0.category() {
            ErrorCategory::Intake => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(error = %self.0, category = self.0.category().as_str(), "Request failed");
        } else {
            tracing::debug!(error = %self.0, "Request rejected");
        }
        (status, Json(ErrorResponse::new(self.0.to_string()))).into_response()
    }
}

// ============================================================================
// Contributor Address
// ============================================================================

/// Address of the calling contributor
///
/// The socket peer address, unless the server is configured to trust the
/// first `X-Forwarded-For` hop set by a fronting proxy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContributorAddress(pub String);

impl FromRequestParts<AppState> for ContributorAddress {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if state.trust_forwarded_for {
            let forwarded = parts
                .headers
                .get("x-forwarded-for")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.split(',').next())
                .map(str::trim)
                .filter(|v| !v.is_empty());

            if let Some(address) = forwarded {
                return Ok(Self(address.to_string()));
            }
        }

        let peer = parts
            .extensions
            .get::<axum::extract::ConnectInfo<std::net::SocketAddr>>()
            .map(|info| info.0.ip().to_string())
            .unwrap_or_else(|| "unknown".to_string());
        Ok(Self(peer))
    }
}

/// Run repository work off the async runtime
async fn run_blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> crate::error::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| Error::with_source("Blocking task failed", e))?
        .map_err(ApiError::from)
}

// ============================================================================
// API Routes
// ============================================================================

/// Largest accepted request body; captured pages arrive base64-encoded
pub const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/donors", get(get_donors))
        .route("/api/accept", post(accept_capture))
        .route("/api/result", get(get_results))
        .route("/api/queries", post(replace_queries))
        .route("/api/sites", post(replace_sites))
        .route("/metrics", get(metrics))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}

// ============================================================================
// Handlers
// ============================================================================

async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::success(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    }))
}

/// Next batch of search URLs for the caller
async fn get_donors(
    State(state): State<AppState>,
    ContributorAddress(address): ContributorAddress,
    Query(query): Query<DonorsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let service = state.service.clone();
    let assignment = run_blocking(move || {
        service.work(query.count, &address, Utc::now(), &mut rand::thread_rng())
    })
    .await?;
    Ok(Json(assignment))
}

async fn accept_capture(
    State(state): State<AppState>,
    ContributorAddress(address): ContributorAddress,
    Json(submission): Json<Submission>,
) -> Result<impl IntoResponse, ApiError> {
    let service = state.service.clone();
    run_blocking(move || service.accept(submission, &address, Utc::now())).await?;
    Ok(Json(AcceptResponse { success: true }))
}

async fn get_results(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let service = state.service.clone();
    let rows = run_blocking(move || service.results(Utc::now())).await?;
    Ok(Json(rows))
}

async fn replace_queries(
    State(state): State<AppState>,
    Json(request): Json<QueriesRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let service = state.service.clone();
    let count = run_blocking(move || service.replace_phrases(&request.queries)).await?;
    Ok(Json(ApiResponse::success(CountResponse { count })))
}

async fn replace_sites(
    State(state): State<AppState>,
    Json(request): Json<SitesRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let service = state.service.clone();
    let count = run_blocking(move || service.replace_sites(&request.sites)).await?;
    Ok(Json(ApiResponse::success(CountResponse { count })))
}

async fn metrics() -> Response {
    match crate::metrics::encode_metrics() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new(e.to_string())),
        )
            .into_response(),
    }
}
