use crate::app_config::{AppConfig, Environment, FailurePolicy};
use crate::geo::DedupTolerance;
use crate::i18n::Locale;
use crate::ConfigError;

const DEFAULT_PLACES_URL: &str = "https://maps.googleapis.com/maps/api/place/nearbysearch/json";
const DEFAULT_GEOCODE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if values are present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if values are present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a `HashMap`.
/// Every variable is optional here; binaries call the `require_*` accessors on
/// [`AppConfig`] for the ones they actually need.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let non_empty = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let parse_with = |var: &str, default: &str| -> Result<String, ConfigError> {
        let raw = or_default(var, default);
        if raw.trim().is_empty() {
            return Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: "value is empty".to_string(),
            });
        }
        Ok(raw)
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let env = parse_environment(&or_default("SAFEROUTE_ENV", "development"))?;

    let bind_addr = or_default("SAFEROUTE_BIND_ADDR", "0.0.0.0:5001")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("SAFEROUTE_BIND_ADDR", e.to_string()))?;
    let log_level = or_default("SAFEROUTE_LOG_LEVEL", "info");

    let database_url = non_empty("DATABASE_URL");
    let db_max_connections = parse_u32("SAFEROUTE_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("SAFEROUTE_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("SAFEROUTE_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let shelter_api_url = parse_with("SAFEROUTE_SHELTER_API_URL", "http://localhost:5001/api")?;
    let google_maps_api_key = non_empty("GOOGLE_MAPS_API_KEY");
    let places_url = parse_with("SAFEROUTE_PLACES_URL", DEFAULT_PLACES_URL)?;
    let geocode_url = parse_with("SAFEROUTE_GEOCODE_URL", DEFAULT_GEOCODE_URL)?;

    let search_radius_meters = parse_u32("SAFEROUTE_SEARCH_RADIUS_METERS", "5000")?;
    if search_radius_meters == 0 {
        return Err(invalid(
            "SAFEROUTE_SEARCH_RADIUS_METERS",
            "radius must be greater than zero".to_string(),
        ));
    }
    let search_keyword = parse_with("SAFEROUTE_SEARCH_KEYWORD", "bomb shelter")?;
    let locale = Locale::from_tag(&or_default("SAFEROUTE_LOCALE", "en"));

    let request_timeout_secs = parse_u64("SAFEROUTE_REQUEST_TIMEOUT_SECS", "30")?;
    if request_timeout_secs == 0 {
        return Err(invalid(
            "SAFEROUTE_REQUEST_TIMEOUT_SECS",
            "timeout must be greater than zero".to_string(),
        ));
    }
    let user_agent = or_default("SAFEROUTE_USER_AGENT", "saferoute/0.1 (shelter-finder)");

    let failure_policy = or_default("SAFEROUTE_FAILURE_POLICY", "all_or_nothing")
        .parse::<FailurePolicy>()
        .map_err(|reason| invalid("SAFEROUTE_FAILURE_POLICY", reason))?;
    let dedup_tolerance = or_default("SAFEROUTE_DEDUP_TOLERANCE", "fixed")
        .parse::<DedupTolerance>()
        .map_err(|reason| invalid("SAFEROUTE_DEDUP_TOLERANCE", reason))?;

    let session_ttl_secs = parse_u64("SAFEROUTE_SESSION_TTL_SECS", "3600")?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        database_url,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        shelter_api_url,
        google_maps_api_key,
        places_url,
        geocode_url,
        search_radius_meters,
        search_keyword,
        locale,
        request_timeout_secs,
        user_agent,
        failure_policy,
        dedup_tolerance,
        session_ttl_secs,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnvVar`] for anything other than
/// `development`, `test`, or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "SAFEROUTE_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
