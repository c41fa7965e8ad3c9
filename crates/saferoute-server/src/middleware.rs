use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{Request, State},
    http::{
        header::{AUTHORIZATION, RETRY_AFTER},
        HeaderValue,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use saferoute_core::credentials::hash_session_token;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::api::{map_db_error, ApiError, AppState};

const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Authenticated administrator, inserted by [`require_admin_session`].
#[derive(Debug, Clone, Copy)]
pub struct AdminId(pub i64);

#[derive(Debug)]
struct RateLimitWindow {
    opened: Instant,
    served: usize,
}

impl RateLimitWindow {
    /// Counts one request at `now`. Returns the wait until the window reopens
    /// when the request is over the limit.
    fn admit(&mut self, now: Instant, limit: usize, length: Duration) -> Result<(), Duration> {
        let age = now.saturating_duration_since(self.opened);
        if age >= length {
            self.opened = now;
            self.served = 0;
        }
        if self.served >= limit {
            return Err(length.saturating_sub(age));
        }
        self.served += 1;
        Ok(())
    }
}

/// Fixed-window request limiter shared by the public shelter routes.
#[derive(Debug, Clone)]
pub struct RateLimitState {
    limit: usize,
    length: Duration,
    window: Arc<Mutex<RateLimitWindow>>,
}

impl RateLimitState {
    #[must_use]
    pub fn new(limit: usize, length: Duration) -> Self {
        Self {
            limit,
            length,
            window: Arc::new(Mutex::new(RateLimitWindow {
                opened: Instant::now(),
                served: 0,
            })),
        }
    }
}

fn request_id_of(req: &Request) -> String {
    req.extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_default()
}

/// Tags every request with an id: the caller's `x-request-id` when present,
/// a fresh UUID otherwise. The id is stored as a [`RequestId`] extension and
/// echoed on the response.
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = match req.headers().get(REQUEST_ID_HEADER).map(HeaderValue::to_str) {
        Some(Ok(incoming)) if !incoming.is_empty() => incoming.to_owned(),
        _ => Uuid::new_v4().to_string(),
    };
    req.extensions_mut().insert(RequestId(id.clone()));

    let mut response = next.run(req).await;
    if let Ok(value) = HeaderValue::from_str(&id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

/// Middleware requiring a live admin session token.
///
/// No `Authorization` header at all is 403 `forbidden`; a malformed, unknown,
/// or expired token is 401 `unauthorized`.
pub async fn require_admin_session(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let rid = request_id_of(&req);
    let header = req.headers().get(AUTHORIZATION);
    if header.is_none() {
        return ApiError::new(rid, "forbidden", "admin token required").into_response();
    }
    let Some(token_hash) = extract_bearer_token(header).map(hash_session_token) else {
        return ApiError::new(rid, "unauthorized", "malformed authorization header")
            .into_response();
    };

    match saferoute_db::find_active_session(&state.pool, &token_hash).await {
        Ok(Some(session)) => {
            req.extensions_mut().insert(AdminId(session.admin_id));
            next.run(req).await
        }
        Ok(None) => ApiError::new(rid, "unauthorized", "invalid or expired token").into_response(),
        Err(e) => map_db_error(rid, &e).into_response(),
    }
}

/// Rejects requests over the shared limit with 429 and a `retry-after`
/// header in whole seconds.
pub async fn enforce_rate_limit(
    State(rate_limit): State<RateLimitState>,
    req: Request,
    next: Next,
) -> Response {
    let admitted = rate_limit
        .window
        .lock()
        .await
        .admit(Instant::now(), rate_limit.limit, rate_limit.length);

    match admitted {
        Ok(()) => next.run(req).await,
        Err(wait) => {
            let retry_after = wait.as_secs().max(1);
            tracing::warn!(path = %req.uri().path(), retry_after, "rate limit exceeded");
            let mut response =
                ApiError::new(request_id_of(&req), "rate_limited", "too many requests, slow down")
                    .into_response();
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(retry_after));
            response
        }
    }
}

fn extract_bearer_token(value: Option<&HeaderValue>) -> Option<&str> {
    value
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}
