//! Reverse geocoding of the user's position into a display address.

use reqwest::{Client, Url};

use saferoute_core::{Coordinate, Locale};

use crate::error::LocatorError;
use crate::http::{build_client, get_json, parse_endpoint_url, redacted};
use crate::types::GeocodeResponse;

const SERVICE: &str = "geocode";

#[derive(Clone)]
pub struct GeocodeClient {
    client: Client,
    endpoint: Url,
    api_key: String,
}

impl std::fmt::Debug for GeocodeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeocodeClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("api_key", &"[redacted]")
            .finish_non_exhaustive()
    }
}

impl GeocodeClient {
    /// # Errors
    ///
    /// Returns [`LocatorError::Http`] if the `reqwest::Client` cannot be built
    /// or [`LocatorError::InvalidBaseUrl`] if `endpoint` does not parse.
    pub fn new(
        endpoint: &str,
        api_key: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, LocatorError> {
        Ok(Self {
            client: build_client(timeout_secs, user_agent)?,
            endpoint: parse_endpoint_url(endpoint)?,
            api_key: api_key.to_owned(),
        })
    }

    /// First formatted address for `position`, or `None` when the service has
    /// nothing for it.
    ///
    /// # Errors
    ///
    /// [`LocatorError::ServiceStatus`] for statuses other than `OK` and
    /// `ZERO_RESULTS`, plus the usual transport and shape failures.
    pub async fn reverse_geocode(
        &self,
        position: Coordinate,
        locale: Locale,
    ) -> Result<Option<String>, LocatorError> {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("latlng", &position.to_string())
            .append_pair("language", locale.language_code())
            .append_pair("key", &self.api_key);

        let context = format!("reverse geocode ({})", redacted(&url));
        let response: GeocodeResponse = get_json(&self.client, url, &context).await?;

        match response.status.as_deref() {
            None | Some("OK") => Ok(response
                .results
                .into_iter()
                .find_map(|r| r.formatted_address.filter(|a| !a.trim().is_empty()))),
            Some("ZERO_RESULTS") => Ok(None),
            Some(other) => Err(LocatorError::ServiceStatus {
                service: SERVICE,
                status: other.to_string(),
                message: response
                    .error_message
                    .unwrap_or_else(|| "no error message".to_string()),
            }),
        }
    }
}
