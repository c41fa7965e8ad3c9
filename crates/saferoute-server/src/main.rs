mod api;
mod middleware;

use tracing_subscriber::EnvFilter;

use crate::api::{build_app, default_rate_limit_state, AppState, AuthSettings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = saferoute_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let auth = AuthSettings::from_app_config(&config)?;
    let pool = saferoute_db::connect_pool(
        config.require_database_url()?,
        saferoute_db::PoolConfig::from_app_config(&config),
    )
    .await?;
    let applied = saferoute_db::run_migrations(&pool).await?;
    let pruned = saferoute_db::delete_expired_sessions(&pool).await?;
    tracing::info!(applied, pruned_sessions = pruned, env = %config.env, "database ready");

    let app = build_app(AppState { pool, auth }, default_rate_limit_state());
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "shelter API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let signal = wait_for_shutdown().await;
            tracing::info!(signal, "draining connections before exit");
        })
        .await?;
    Ok(())
}

/// Resolves with the name of the first termination signal received.
async fn wait_for_shutdown() -> &'static str {
    #[cfg(unix)]
    {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => "SIGINT",
            _ = sigterm.recv() => "SIGTERM",
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        "ctrl-c"
    }
}
