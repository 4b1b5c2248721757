//! # FieldTask API Server
//!
//! Task management for field teams: technicians record tasks, managers see
//! every task and are notified whenever one is created.
//!
//! ## Usage
//!
//! ```bash
//! FIELDTASK__DATABASE__URL=postgresql://localhost/fieldtask \
//! FIELDTASK__SECURITY__HASH_KEY=... \
//! FIELDTASK__SECURITY__JWT_KEY=... \
//! cargo run -p fieldtask-api
//! ```

use fieldtask_api::{
    app::{build_router, AppState, Backends},
    config::Config,
};
use fieldtask_shared::{
    db::{
        migrations::run_migrations,
        pool::{close_pool, create_pool, DatabaseConfig},
    },
    services::notification::TracingSink,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "fieldtask_api=debug,fieldtask_shared=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "FieldTask API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::load()?;
    tracing::debug!(?config, "Configuration loaded");

    let pool = create_pool(DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..DatabaseConfig::default()
    })
    .await?;
    run_migrations(&pool).await?;

    let bind_address = config.bind_address();
    let state = AppState::new(
        config,
        Backends::postgres(pool.clone(), Arc::new(TracingSink)),
    );
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    close_pool(pool).await;
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, exiting...");
}
