mod admin;
mod shelters;

use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, patch, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use saferoute_core::{AppConfig, ConfigError};
use serde::Serialize;
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{enforce_rate_limit, request_id, require_admin_session, RateLimitState, RequestId};

/// Settings the login handler needs to mint sessions.
#[derive(Debug, Clone, Copy)]
pub struct AuthSettings {
    pub session_ttl: chrono::Duration,
}

impl AuthSettings {
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnvVar`] if the session TTL does not fit
    /// a duration.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, ConfigError> {
        let ttl_secs = i64::try_from(config.session_ttl_secs).map_err(|e| {
            ConfigError::InvalidEnvVar {
                var: "SAFEROUTE_SESSION_TTL_SECS".to_string(),
                reason: e.to_string(),
            }
        })?;
        let session_ttl = chrono::Duration::try_seconds(ttl_secs).ok_or_else(|| {
            ConfigError::InvalidEnvVar {
                var: "SAFEROUTE_SESSION_TTL_SECS".to_string(),
                reason: "session TTL is out of range".to_string(),
            }
        })?;
        Ok(Self { session_ttl })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub auth: AuthSettings,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
}

impl ResponseMeta {
    pub(crate) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub(crate) fn new(data: T, request_id: String) -> Self {
        Self {
            data,
            meta: ResponseMeta::new(request_id),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "forbidden" => StatusCode::FORBIDDEN,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "conflict" => StatusCode::CONFLICT,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(crate) fn map_db_error(request_id: String, error: &saferoute_db::DbError) -> ApiError {
    match error {
        saferoute_db::DbError::NotFound => ApiError::new(request_id, "not_found", "shelter not found"),
        saferoute_db::DbError::Conflict { constraint } => {
            ApiError::new(request_id, "conflict", conflict_message(constraint))
        }
        saferoute_db::DbError::Sqlx(_) | saferoute_db::DbError::Migration(_) => {
            tracing::error!(error = %error, "database query failed");
            ApiError::new(request_id, "internal_error", "database query failed")
        }
    }
}

fn conflict_message(constraint: &str) -> &'static str {
    match constraint {
        "shelters_name_key" => "a shelter with that name already exists",
        "shelters_location_key" => "a shelter already exists at this location",
        "admins_username_key" => "an administrator with that username already exists",
        _ => "conflicts with an existing record",
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ])
}

fn admin_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/api/admin/shelters/pending",
            get(admin::list_pending_shelters),
        )
        .route(
            "/api/admin/shelters/approve/{id}",
            patch(admin::approve_shelter).post(admin::approve_shelter),
        )
        .route(
            "/api/admin/shelters/reject/{id}",
            axum::routing::delete(admin::reject_shelter).post(admin::reject_shelter),
        )
        .layer(axum::middleware::from_fn_with_state(
            state,
            require_admin_session,
        ))
}

fn rate_limited_router(rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route(
            "/api/shelters",
            get(shelters::list_shelters).post(shelters::submit_shelter),
        )
        .route("/api/shelters/{id}", get(shelters::get_shelter))
        .route("/api/admin/login", post(admin::login))
        .layer(axum::middleware::from_fn_with_state(
            rate_limit,
            enforce_rate_limit,
        ))
}

pub fn build_app(state: AppState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new().route("/api/health", get(health));

    Router::new()
        .merge(public_routes)
        .merge(rate_limited_router(rate_limit))
        .merge(admin_router(state.clone()))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);

    match saferoute_db::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse {
                data: HealthData {
                    status: "ok",
                    database: "ok",
                },
                meta,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse {
                    data: HealthData {
                        status: "degraded",
                        database: "unavailable",
                    },
                    meta,
                }),
            )
        }
    }
}

pub fn default_rate_limit_state() -> RateLimitState {
    RateLimitState::new(120, Duration::from_secs(60))
}

#[cfg(test)]
#[path = "routes_test.rs"]
mod tests;
