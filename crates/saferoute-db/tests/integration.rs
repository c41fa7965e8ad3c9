//! Offline tests for saferoute-db pool configuration and row types.
//! These tests do not require a live database connection.

use saferoute_core::load_app_config_from_env;
use saferoute_db::{DbError, NewShelter, PoolConfig, ShelterRow};

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let mut app_config = load_app_config_from_env().expect("defaults should load");
    app_config.db_max_connections = 42;
    app_config.db_min_connections = 7;
    app_config.db_acquire_timeout_secs = 9;

    let pool_config = PoolConfig::from_app_config(&app_config);
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

/// Compile-time smoke test: confirm that [`ShelterRow`] has all expected
/// fields with the correct types. No database required.
#[test]
fn shelter_row_has_expected_fields() {
    use chrono::Utc;
    use uuid::Uuid;

    let row = ShelterRow {
        id: 1_i64,
        public_id: Uuid::new_v4(),
        name: "Dizengoff Shelter".to_string(),
        latitude: 32.0853,
        longitude: 34.7818,
        description: None,
        approved: false,
        created_at: Utc::now(),
    };

    assert_eq!(row.id, 1);
    assert!(!row.approved);
    assert!(row.description.is_none());
}

#[test]
fn new_shelter_borrows_fields() {
    let name = String::from("Basement");
    let shelter = NewShelter {
        name: &name,
        latitude: 1.0,
        longitude: 2.0,
        description: Some("under the stairs"),
    };
    assert_eq!(shelter.name, "Basement");
}

#[test]
fn conflict_error_names_constraint() {
    let err = DbError::Conflict {
        constraint: "shelters_name_key".to_string(),
    };
    assert_eq!(
        err.to_string(),
        "conflicts with existing record (shelters_name_key)"
    );
}
