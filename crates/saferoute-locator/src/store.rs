//! HTTP client for the moderated shelter store (the backend's public API).

use reqwest::{Client, StatusCode, Url};
use serde::Serialize;

use saferoute_core::Coordinate;

use crate::error::LocatorError;
use crate::http::{build_client, ensure_success, get_json, parse_base_url, read_json};
use crate::types::{
    ErrorBody, ShelterListBody, StoredShelterRecord, SubmissionBody, SubmissionReceipt,
};

/// Body of `POST /shelters`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShelterSubmission {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Client for the moderated shelter store.
///
/// `base_url` is the API root (for example `http://localhost:5001/api`);
/// endpoints are resolved relative to it.
#[derive(Debug, Clone)]
pub struct ShelterStoreClient {
    client: Client,
    base_url: Url,
}

impl ShelterStoreClient {
    /// # Errors
    ///
    /// Returns [`LocatorError::Http`] if the `reqwest::Client` cannot be built
    /// or [`LocatorError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn new(base_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, LocatorError> {
        Ok(Self {
            client: build_client(timeout_secs, user_agent)?,
            base_url: parse_base_url(base_url)?,
        })
    }

    /// Lists approved shelters near `origin`.
    ///
    /// The origin is sent as `latitude`/`longitude` query parameters. The store
    /// owns any proximity filtering; every record returned is trusted.
    ///
    /// # Errors
    ///
    /// - [`LocatorError::Http`] on network failure or timeout.
    /// - [`LocatorError::UnexpectedStatus`] on a non-2xx status.
    /// - [`LocatorError::Deserialize`] if the body is neither a record array
    ///   nor a `{ data: [...] }` envelope.
    pub async fn list_approved_near(
        &self,
        origin: Coordinate,
    ) -> Result<Vec<StoredShelterRecord>, LocatorError> {
        let url = self.list_url(origin)?;
        let body: ShelterListBody = get_json(&self.client, url, "list approved shelters").await?;
        Ok(body.into_records())
    }

    /// Submits a new shelter for moderation.
    ///
    /// # Errors
    ///
    /// - [`LocatorError::Rejected`] when the store answers 4xx with a reason,
    ///   e.g. a duplicate name or location.
    /// - [`LocatorError::UnexpectedStatus`] for other non-2xx statuses.
    /// - [`LocatorError::Http`] / [`LocatorError::Deserialize`] as for reads.
    pub async fn submit(
        &self,
        submission: &ShelterSubmission,
    ) -> Result<SubmissionReceipt, LocatorError> {
        let url = self.endpoint("shelters")?;
        let response = self
            .client
            .post(url.clone())
            .json(submission)
            .send()
            .await
            .map_err(|e| LocatorError::Http(e.without_url()))?;

        let status = response.status();
        if status.is_client_error() {
            return Err(rejection(status, response).await);
        }
        let response = ensure_success(response, &url)?;
        let body: SubmissionBody = read_json(response, "submit shelter").await?;
        Ok(body.into_receipt())
    }

    fn endpoint(&self, path: &str) -> Result<Url, LocatorError> {
        self.base_url
            .join(path)
            .map_err(|e| LocatorError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })
    }

    fn list_url(&self, origin: Coordinate) -> Result<Url, LocatorError> {
        let mut url = self.endpoint("shelters")?;
        url.query_pairs_mut()
            .append_pair("latitude", &origin.latitude.to_string())
            .append_pair("longitude", &origin.longitude.to_string());
        Ok(url)
    }
}

async fn rejection(status: StatusCode, response: reqwest::Response) -> LocatorError {
    let message = match response.text().await {
        Ok(text) => serde_json::from_str::<ErrorBody>(&text)
            .map(ErrorBody::into_message)
            .unwrap_or(text),
        Err(e) => e.without_url().to_string(),
    };
    LocatorError::Rejected {
        status: status.as_u16(),
        message,
    }
}
