//! Administrator login and shelter moderation.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use saferoute_core::credentials::{
    generate_session_token, hash_session_token, verify_password, verify_unknown_user,
};
use saferoute_db::AdminRow;
use serde::{Deserialize, Serialize};

use crate::middleware::{AdminId, RequestId};

use super::shelters::{parse_public_id, ShelterItem};
use super::{map_db_error, ApiError, ApiResponse, AppState};

const INVALID_CREDENTIALS: &str = "invalid username or password";

#[derive(Debug, Deserialize)]
pub(in crate::api) struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub(in crate::api) struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub(in crate::api) struct ModerationResponse {
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shelter: Option<ShelterItem>,
}

/// POST /api/admin/login: exchange credentials for a bearer token.
pub(in crate::api) async fn login(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    let rid = &req_id.0;
    let admin = saferoute_db::get_admin_by_username(&state.pool, body.username.trim())
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    let checked = tokio::task::spawn_blocking(move || check_credentials(admin, &body.password))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "password verification task failed");
            ApiError::new(rid, "internal_error", "login failed")
        })?;
    let Some(admin) = checked else {
        tracing::warn!("admin login rejected");
        return Err(ApiError::new(rid, "unauthorized", INVALID_CREDENTIALS));
    };

    let token = generate_session_token();
    let expires_at = Utc::now() + state.auth.session_ttl;
    saferoute_db::create_session(&state.pool, admin.id, &hash_session_token(&token), expires_at)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    match saferoute_db::delete_expired_sessions(&state.pool).await {
        Ok(0) => {}
        Ok(removed) => tracing::debug!(removed, "pruned expired admin sessions"),
        Err(e) => tracing::warn!(error = %e, "failed to prune expired admin sessions"),
    }

    tracing::info!(admin_id = admin.id, "admin logged in");
    Ok(Json(ApiResponse::new(
        LoginResponse { token, expires_at },
        req_id.0,
    )))
}

/// Returns the admin only when `password` matches. Unknown usernames still pay
/// for one Argon2 verification so both failures take the same time.
fn check_credentials(admin: Option<AdminRow>, password: &str) -> Option<AdminRow> {
    match admin {
        Some(admin) if verify_password(password, &admin.password_hash) => Some(admin),
        Some(_) => None,
        None => {
            let _ = verify_unknown_user(password);
            None
        }
    }
}

/// GET /api/admin/shelters/pending
pub(in crate::api) async fn list_pending_shelters(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<ShelterItem>>>, ApiError> {
    let rows = saferoute_db::list_pending_shelters(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    let items = rows.into_iter().map(ShelterItem::from).collect();
    Ok(Json(ApiResponse::new(items, req_id.0)))
}

/// PATCH|POST /api/admin/shelters/approve/{id}
pub(in crate::api) async fn approve_shelter(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(admin): Extension<AdminId>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<ModerationResponse>>, ApiError> {
    let public_id = parse_public_id(&req_id.0, &id)?;
    let row = saferoute_db::approve_shelter(&state.pool, public_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    tracing::info!(admin_id = admin.0, shelter_id = %public_id, "shelter approved");
    Ok(Json(ApiResponse::new(
        ModerationResponse {
            message: "Shelter approved",
            shelter: Some(ShelterItem::from(row)),
        },
        req_id.0,
    )))
}

/// DELETE|POST /api/admin/shelters/reject/{id}
pub(in crate::api) async fn reject_shelter(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(admin): Extension<AdminId>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<ModerationResponse>>, ApiError> {
    let public_id = parse_public_id(&req_id.0, &id)?;
    saferoute_db::delete_shelter(&state.pool, public_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    tracing::info!(admin_id = admin.0, shelter_id = %public_id, "shelter rejected");
    Ok(Json(ApiResponse::new(
        ModerationResponse {
            message: "Shelter rejected",
            shelter: None,
        },
        req_id.0,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use saferoute_core::credentials::hash_password;

    fn admin_with(password: &str) -> AdminRow {
        AdminRow {
            id: 7,
            username: "moderator".to_string(),
            password_hash: hash_password(password).unwrap(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn check_credentials_accepts_matching_password() {
        let admin = check_credentials(Some(admin_with("s3cret-pass")), "s3cret-pass");
        assert_eq!(admin.map(|a| a.id), Some(7));
    }

    #[test]
    fn check_credentials_rejects_wrong_password() {
        assert!(check_credentials(Some(admin_with("s3cret-pass")), "guess").is_none());
    }

    #[test]
    fn check_credentials_rejects_unknown_user() {
        assert!(check_credentials(None, "s3cret-pass").is_none());
    }
}
