//! Client for the places nearby-search endpoint.

use reqwest::{Client, Url};

use saferoute_core::{Coordinate, Locale};

use crate::error::LocatorError;
use crate::http::{build_client, get_json, parse_endpoint_url, redacted};
use crate::types::{PlaceResult, PlacesResponse};

const SERVICE: &str = "places";

/// Keyword-driven nearby search against the places API.
#[derive(Clone)]
pub struct PlacesClient {
    client: Client,
    endpoint: Url,
    api_key: String,
    keyword: String,
}

impl std::fmt::Debug for PlacesClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlacesClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("api_key", &"[redacted]")
            .field("keyword", &self.keyword)
            .finish_non_exhaustive()
    }
}

impl PlacesClient {
    /// `endpoint` is the full nearby-search URL; query parameters are appended.
    ///
    /// # Errors
    ///
    /// Returns [`LocatorError::Http`] if the `reqwest::Client` cannot be built
    /// or [`LocatorError::InvalidBaseUrl`] if `endpoint` does not parse.
    pub fn new(
        endpoint: &str,
        api_key: &str,
        keyword: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, LocatorError> {
        Ok(Self {
            client: build_client(timeout_secs, user_agent)?,
            endpoint: parse_endpoint_url(endpoint)?,
            api_key: api_key.to_owned(),
            keyword: keyword.to_owned(),
        })
    }

    /// Searches for places matching the configured keyword within
    /// `radius_meters` of `origin`.
    ///
    /// `ZERO_RESULTS` is an empty list, not an error.
    ///
    /// # Errors
    ///
    /// - [`LocatorError::ServiceStatus`] if the envelope status is anything
    ///   other than `OK` or `ZERO_RESULTS`.
    /// - [`LocatorError::Http`] / [`LocatorError::UnexpectedStatus`] /
    ///   [`LocatorError::Deserialize`] for transport and shape failures.
    pub async fn nearby_search(
        &self,
        origin: Coordinate,
        radius_meters: u32,
        locale: Locale,
    ) -> Result<Vec<PlaceResult>, LocatorError> {
        let url = self.build_url(origin, radius_meters, locale);
        let context = format!("places nearby search ({})", redacted(&url));
        let response: PlacesResponse = get_json(&self.client, url, &context).await?;

        match response.status.as_deref() {
            None | Some("OK" | "ZERO_RESULTS") => Ok(response.results),
            Some(other) => Err(LocatorError::ServiceStatus {
                service: SERVICE,
                status: other.to_string(),
                message: response
                    .error_message
                    .unwrap_or_else(|| "no error message".to_string()),
            }),
        }
    }

    fn build_url(&self, origin: Coordinate, radius_meters: u32, locale: Locale) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("location", &origin.to_string())
            .append_pair("radius", &radius_meters.to_string())
            .append_pair("keyword", &self.keyword)
            .append_pair("language", locale.language_code())
            .append_pair("key", &self.api_key);
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> PlacesClient {
        PlacesClient::new(
            "https://maps.test/place/nearbysearch/json",
            "test-key",
            "bomb shelter",
            30,
            "saferoute-test",
        )
        .expect("client construction should not fail")
    }

    #[test]
    fn build_url_encodes_parameters() {
        let url = test_client().build_url(Coordinate::new(32.1, 34.8), 5000, Locale::He);
        assert_eq!(
            url.as_str(),
            "https://maps.test/place/nearbysearch/json?location=32.1%2C34.8&radius=5000&keyword=bomb+shelter&language=he&key=test-key"
        );
    }

    #[test]
    fn debug_redacts_api_key() {
        let rendered = format!("{:?}", test_client());
        assert!(!rendered.contains("test-key"));
    }
}
