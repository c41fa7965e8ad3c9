//! Wire types for the three collaborators. Fields the pipeline can survive
//! without are optional; normalisation decides what to drop.

use serde::{Deserialize, Serialize};

/// One record from the moderated shelter store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredShelterRecord {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub approved: Option<bool>,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<String>,
}

/// The store answers either with a bare array or with the `{ data, meta }`
/// response envelope used by the backend.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ShelterListBody {
    Bare(Vec<StoredShelterRecord>),
    Enveloped { data: Vec<StoredShelterRecord> },
}

impl ShelterListBody {
    pub(crate) fn into_records(self) -> Vec<StoredShelterRecord> {
        match self {
            ShelterListBody::Bare(records) | ShelterListBody::Enveloped { data: records } => {
                records
            }
        }
    }
}

/// Acknowledgement returned after a shelter submission.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SubmissionReceipt {
    pub message: String,
    pub shelter: StoredShelterRecord,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum SubmissionBody {
    Enveloped { data: SubmissionReceipt },
    Bare(SubmissionReceipt),
}

impl SubmissionBody {
    pub(crate) fn into_receipt(self) -> SubmissionReceipt {
        match self {
            SubmissionBody::Enveloped { data } | SubmissionBody::Bare(data) => data,
        }
    }
}

/// Error payloads: the backend envelope `{ error: { message } }` or a flat
/// `{ message }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ErrorBody {
    Enveloped { error: ErrorDetail },
    Flat { message: String },
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorDetail {
    pub(crate) message: String,
}

impl ErrorBody {
    pub(crate) fn into_message(self) -> String {
        match self {
            ErrorBody::Enveloped { error } => error.message,
            ErrorBody::Flat { message } => message,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct PlacesResponse {
    #[serde(default)]
    pub(crate) status: Option<String>,
    #[serde(default)]
    pub(crate) results: Vec<PlaceResult>,
    #[serde(default)]
    pub(crate) error_message: Option<String>,
}

/// One result of a places nearby search.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlaceResult {
    #[serde(default)]
    pub place_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub vicinity: Option<String>,
    #[serde(default)]
    pub geometry: Option<PlaceGeometry>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlaceGeometry {
    #[serde(default)]
    pub location: Option<LatLng>,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeocodeResponse {
    #[serde(default)]
    pub(crate) status: Option<String>,
    #[serde(default)]
    pub(crate) results: Vec<GeocodeResult>,
    #[serde(default)]
    pub(crate) error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeocodeResult {
    #[serde(default)]
    pub(crate) formatted_address: Option<String>,
}
