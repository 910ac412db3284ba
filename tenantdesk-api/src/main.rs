//! # TenantDesk API Server
//!
//! Multi-tenant project and task backend. Every tenant's users, projects,
//! tasks and audit trail are isolated from every other tenant's.
//!
//! ## Startup
//!
//! 1. Load configuration from the environment
//! 2. Connect to PostgreSQL and run pending migrations
//! 3. Wire the core services against the PostgreSQL store
//! 4. Ensure the configured platform operator exists
//! 5. Serve HTTP until Ctrl+C or SIGTERM
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgresql://localhost/tenantdesk JWT_SECRET=$(openssl rand -hex 32) \
//!     cargo run -p tenantdesk-api
//! ```

use std::{net::SocketAddr, sync::Arc, time::Duration};

use tenantdesk_api::{
    app::{build_router, AppState},
    config::{Config, LogFormat},
};
use tenantdesk_shared::{
    db::{
        migrations::run_migrations,
        pool::{close_pool, create_pool},
    },
    service::{Services, SessionIssuer},
    store::PgStore,
};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// How often expired token revocations are purged
const REVOCATION_PURGE_INTERVAL: Duration = Duration::from_secs(3600);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing(config.log_format);

    tracing::info!(
        "TenantDesk API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let pool = create_pool(config.pool_config()).await?;
    run_migrations(&pool).await?;

    let store = Arc::new(PgStore::new(pool.clone()));
    let services = Services::new(store, config.session_config(), config.hashing_config())?;

    if let Some(seed) = config.super_admin_seed() {
        let operator = services.registry.bootstrap_super_admin(seed).await?;
        tracing::info!(user_id = %operator.id, "Platform operator ready");
    }

    tokio::spawn(purge_revocations(services.sessions.clone()));

    let bind_address = config.bind_address();
    let app = build_router(AppState::new(services, config));

    let listener = TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped, closing database pool");
    close_pool(pool).await;

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "tenantdesk_api=debug,tenantdesk_shared=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

/// Periodically drops revocations whose tokens have expired anyway
async fn purge_revocations(sessions: SessionIssuer) {
    let mut interval = tokio::time::interval(REVOCATION_PURGE_INTERVAL);

    loop {
        interval.tick().await;
        match sessions.purge_expired_revocations().await {
            Ok(0) => {}
            Ok(purged) => tracing::info!(purged, "Purged expired token revocations"),
            Err(e) => tracing::warn!(error = %e, "Failed to purge token revocations"),
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!(error = %e, "Failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, exiting...");
}
