pub mod app_config;
pub mod config;
pub mod credentials;
pub mod geo;
pub mod i18n;
pub mod navigation;
pub mod shelter;

pub use app_config::{AppConfig, Environment, FailurePolicy};
pub use config::{load_app_config, load_app_config_from_env};
pub use geo::{dedupe_shelters, distance_km, find_closest_shelter, DedupTolerance};
pub use i18n::{Locale, Message, Translator};
pub use shelter::{Coordinate, Shelter, ShelterSource};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    #[error("coordinate out of range: latitude {latitude}, longitude {longitude}")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    #[error("password hashing failed: {0}")]
    PasswordHash(String),
}
