//! Public shelter endpoints: listing, lookup, and submission.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use saferoute_core::{distance_km, Coordinate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState};

const MAX_NAME_CHARS: usize = 200;
const SUBMITTED_MESSAGE: &str = "Shelter submitted for approval";

// ---------------------------------------------------------------------------
// Request / response bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(in crate::api) struct ShelterListQuery {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub radius_meters: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub(in crate::api) struct SubmitShelterRequest {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub description: Option<String>,
}

/// Wire shape of a stored shelter, shared with the locator client.
#[derive(Debug, Serialize)]
pub(in crate::api) struct ShelterItem {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub description: Option<String>,
    pub approved: bool,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl From<saferoute_db::ShelterRow> for ShelterItem {
    fn from(row: saferoute_db::ShelterRow) -> Self {
        Self {
            id: row.public_id,
            name: row.name,
            latitude: row.latitude,
            longitude: row.longitude,
            description: row.description,
            approved: row.approved,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub(in crate::api) struct ShelterReceipt {
    pub message: &'static str,
    pub shelter: ShelterItem,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parses a public id; anything that is not a UUID cannot exist.
pub(in crate::api) fn parse_public_id(req_id: &str, raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::new(req_id, "not_found", "shelter not found"))
}

/// The proximity filter applies only when origin and radius are all present.
fn proximity_filter(
    req_id: &str,
    query: &ShelterListQuery,
) -> Result<Option<(Coordinate, f64)>, ApiError> {
    let origin = match (query.latitude, query.longitude) {
        (Some(latitude), Some(longitude)) => Some(
            Coordinate::try_new(latitude, longitude)
                .map_err(|e| ApiError::new(req_id, "validation_error", e.to_string()))?,
        ),
        _ => None,
    };
    Ok(origin
        .zip(query.radius_meters)
        .map(|(origin, radius)| (origin, f64::from(radius) / 1000.0)))
}

fn validate_submission(
    req_id: &str,
    body: &SubmitShelterRequest,
) -> Result<(String, Coordinate, Option<String>), ApiError> {
    let name = body.name.trim().to_owned();
    if name.is_empty() || name.chars().count() > MAX_NAME_CHARS {
        return Err(ApiError::new(
            req_id,
            "validation_error",
            format!("name must be 1-{MAX_NAME_CHARS} characters"),
        ));
    }
    let coordinate = Coordinate::try_new(body.latitude, body.longitude)
        .map_err(|e| ApiError::new(req_id, "validation_error", e.to_string()))?;
    let description = body
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(ToOwned::to_owned);
    Ok((name, coordinate, description))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/shelters: approved shelters, optionally within `radius_meters`.
pub(in crate::api) async fn list_shelters(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ShelterListQuery>,
) -> Result<Json<ApiResponse<Vec<ShelterItem>>>, ApiError> {
    let filter = proximity_filter(&req_id.0, &query)?;

    let rows = saferoute_db::list_approved_shelters(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let items = rows
        .into_iter()
        .filter(|row| {
            filter.is_none_or(|(origin, radius_km)| {
                distance_km(origin, Coordinate::new(row.latitude, row.longitude)) <= radius_km
            })
        })
        .map(ShelterItem::from)
        .collect();

    Ok(Json(ApiResponse::new(items, req_id.0)))
}

/// GET /api/shelters/{id}: one approved shelter.
pub(in crate::api) async fn get_shelter(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<ShelterItem>>, ApiError> {
    let public_id = parse_public_id(&req_id.0, &id)?;
    let row = saferoute_db::get_approved_shelter(&state.pool, public_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .ok_or_else(|| ApiError::new(req_id.0.clone(), "not_found", "shelter not found"))?;

    Ok(Json(ApiResponse::new(ShelterItem::from(row), req_id.0)))
}

/// POST /api/shelters: submit a shelter for moderation.
pub(in crate::api) async fn submit_shelter(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<SubmitShelterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ShelterReceipt>>), ApiError> {
    let (name, coordinate, description) = validate_submission(&req_id.0, &body)?;

    let row = saferoute_db::insert_pending_shelter(
        &state.pool,
        saferoute_db::NewShelter {
            name: &name,
            latitude: coordinate.latitude,
            longitude: coordinate.longitude,
            description: description.as_deref(),
        },
    )
    .await
    .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    tracing::info!(shelter_id = %row.public_id, "shelter submitted for moderation");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            ShelterReceipt {
                message: SUBMITTED_MESSAGE,
                shelter: ShelterItem::from(row),
            },
            req_id.0,
        )),
    ))
}
