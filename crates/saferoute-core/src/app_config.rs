use std::net::SocketAddr;

use crate::geo::DedupTolerance;
use crate::i18n::Locale;
use crate::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// What the aggregator does when one of its two sources fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Any source failure fails the whole aggregation.
    #[default]
    AllOrNothing,
    /// Return whatever succeeded; fail only when every source fails.
    BestEffort,
}

impl std::str::FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all_or_nothing" => Ok(FailurePolicy::AllOrNothing),
            "best_effort" => Ok(FailurePolicy::BestEffort),
            other => Err(format!(
                "expected 'all_or_nothing' or 'best_effort', got '{other}'"
            )),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    /// Base URL of the moderated shelter API, e.g. `http://localhost:5001/api`.
    pub shelter_api_url: String,
    pub google_maps_api_key: Option<String>,
    pub places_url: String,
    pub geocode_url: String,
    pub search_radius_meters: u32,
    pub search_keyword: String,
    pub locale: Locale,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub failure_policy: FailurePolicy,
    pub dedup_tolerance: DedupTolerance,
    pub session_ttl_secs: u64,
}

impl AppConfig {
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] when `DATABASE_URL` is unset.
    pub fn require_database_url(&self) -> Result<&str, ConfigError> {
        self.database_url
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] when `GOOGLE_MAPS_API_KEY` is unset.
    pub fn require_google_maps_api_key(&self) -> Result<&str, ConfigError> {
        self.google_maps_api_key
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar("GOOGLE_MAPS_API_KEY".to_string()))
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[redacted]"),
            )
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("shelter_api_url", &self.shelter_api_url)
            .field(
                "google_maps_api_key",
                &self.google_maps_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("places_url", &self.places_url)
            .field("geocode_url", &self.geocode_url)
            .field("search_radius_meters", &self.search_radius_meters)
            .field("search_keyword", &self.search_keyword)
            .field("locale", &self.locale)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("failure_policy", &self.failure_policy)
            .field("dedup_tolerance", &self.dedup_tolerance)
            .field("session_ttl_secs", &self.session_ttl_secs)
            .finish()
    }
}
