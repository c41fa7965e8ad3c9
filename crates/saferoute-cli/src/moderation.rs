//! Shelter submission and administrator provisioning.

use saferoute_core::{credentials::hash_password, AppConfig};
use saferoute_db::DbError;
use saferoute_locator::{LocatorError, ShelterStoreClient, ShelterSubmission};

const MIN_PASSWORD_LEN: usize = 8;

/// Sends a shelter to the store's moderation queue.
///
/// # Errors
///
/// Returns an error if the store is unreachable or refuses the submission
/// (for example a duplicate name or location).
pub(crate) async fn run_submit(
    config: &AppConfig,
    name: String,
    latitude: f64,
    longitude: f64,
    description: Option<String>,
) -> anyhow::Result<()> {
    let client = ShelterStoreClient::new(
        &config.shelter_api_url,
        config.request_timeout_secs,
        &config.user_agent,
    )?;
    let submission = ShelterSubmission {
        name,
        latitude,
        longitude,
        description,
    };

    match client.submit(&submission).await {
        Ok(receipt) => {
            println!("{}", receipt.message);
            if let Some(id) = receipt.shelter.id.as_deref() {
                println!("submission id: {id}");
            }
            Ok(())
        }
        Err(LocatorError::Rejected { message, .. }) => {
            anyhow::bail!("submission rejected: {message}")
        }
        Err(e) => Err(e.into()),
    }
}

/// Creates an administrator account directly in the database.
///
/// # Errors
///
/// Returns an error if `DATABASE_URL` is unset, the password is too short, the
/// username is taken, or the database fails.
pub(crate) async fn run_create_admin(
    config: &AppConfig,
    username: &str,
    password: &str,
) -> anyhow::Result<()> {
    let username = username.trim();
    if username.is_empty() {
        anyhow::bail!("username must not be empty");
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        anyhow::bail!("password must be at least {MIN_PASSWORD_LEN} characters");
    }

    let database_url = config.require_database_url()?;

    let pool_config = saferoute_db::PoolConfig::from_app_config(config);
    let pool = saferoute_db::connect_pool(database_url, pool_config).await?;
    saferoute_db::run_migrations(&pool).await?;

    let password_hash = hash_password(password)?;
    match saferoute_db::admins::create_admin(&pool, username, &password_hash).await {
        Ok(admin) => {
            tracing::info!(admin_id = admin.id, username = %admin.username, "administrator created");
            println!("created administrator '{}'", admin.username);
            Ok(())
        }
        Err(DbError::Conflict { .. }) => {
            anyhow::bail!("an administrator named '{username}' already exists")
        }
        Err(e) => Err(e.into()),
    }
}
