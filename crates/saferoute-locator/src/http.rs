//! Shared plumbing for the collaborator clients: client construction, base
//! URL normalisation, and the GET-then-parse request path.

use std::time::Duration;

use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;

use crate::error::LocatorError;

const CONNECT_TIMEOUT_SECS: u64 = 10;

pub(crate) fn build_client(timeout_secs: u64, user_agent: &str) -> Result<Client, LocatorError> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .user_agent(user_agent)
        .build()
        .map_err(LocatorError::from)
}

/// Parses `raw` as a base URL with exactly one trailing slash, so that
/// [`Url::join`] appends to the path instead of replacing its last segment.
pub(crate) fn parse_base_url(raw: &str) -> Result<Url, LocatorError> {
    let normalised = format!("{}/", raw.trim_end_matches('/'));
    let url = Url::parse(&normalised).map_err(|e| LocatorError::InvalidBaseUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    if url.cannot_be_a_base() {
        return Err(LocatorError::InvalidBaseUrl {
            url: raw.to_string(),
            reason: "URL cannot be used as a base".to_string(),
        });
    }
    Ok(url)
}

/// Parses `raw` as a complete endpoint URL; query pairs are appended later.
pub(crate) fn parse_endpoint_url(raw: &str) -> Result<Url, LocatorError> {
    Url::parse(raw).map_err(|e| LocatorError::InvalidBaseUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })
}

/// The URL without its query string, safe to log or embed in errors.
pub(crate) fn redacted(url: &Url) -> String {
    let mut clean = url.clone();
    clean.set_query(None);
    clean.to_string()
}

/// Sends a GET, asserts a 2xx status, and parses the body as `T`.
pub(crate) async fn get_json<T: DeserializeOwned>(
    client: &Client,
    url: Url,
    context: &str,
) -> Result<T, LocatorError> {
    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| LocatorError::Http(e.without_url()))?;
    let response = ensure_success(response, &url)?;
    read_json(response, context).await
}

pub(crate) fn ensure_success(response: Response, url: &Url) -> Result<Response, LocatorError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(LocatorError::UnexpectedStatus {
            status: status.as_u16(),
            url: redacted(url),
        })
    }
}

pub(crate) async fn read_json<T: DeserializeOwned>(
    response: Response,
    context: &str,
) -> Result<T, LocatorError> {
    let body = response
        .text()
        .await
        .map_err(|e| LocatorError::Http(e.without_url()))?;
    serde_json::from_str(&body).map_err(|e| LocatorError::Deserialize {
        context: context.to_string(),
        source: e,
    })
}
