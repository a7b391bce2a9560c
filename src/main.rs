use codegate::config::{Config, ServiceKind};
use codegate::db::UsersStorage;
use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = Config::load()?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        service = cfg.service.as_str(),
        listen_addr = %cfg.listen_addr,
        loglevel = %cfg.loglevel,
        api_key_configured = cfg.api_key.is_some(),
        database_configured = cfg.default_connection.is_some()
    );

    if cfg.service.is_gated() && cfg.api_key.is_none() {
        warn!("no ApiKey configured; every request will be rejected with 401");
    }

    if cfg.service == ServiceKind::Users {
        check_database(&cfg).await;
    }

    let app = codegate::app_for(&cfg);

    let listener = TcpListener::bind(&cfg.listen_addr).await?;
    info!("HTTP server listening on {}", cfg.listen_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// Startup diagnostic only: failures are logged and the server still starts.
async fn check_database(cfg: &Config) {
    let Some(url) = cfg.default_connection.as_deref() else {
        warn!("no DefaultConnection string found in configuration");
        return;
    };
    let _ = UsersStorage::new(url).startup_check(cfg.init_schema).await;
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
