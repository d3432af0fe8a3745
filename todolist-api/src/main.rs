//! # Todo List API Server
//!
//! Multi-user todo list service: users register or log in to obtain a bearer
//! token, then manage their own todos over JSON.
//!
//! ## Usage
//!
//! ```bash
//! JWT_SECRET=$(openssl rand -hex 32) cargo run -p todolist-api
//! ```
//!
//! Without `DATABASE_URL` the server keeps all data in memory.

use todolist_api::{
    app::{build_router, shutdown_on, AppState},
    config::{Config, LogFormat},
};
use todolist_shared::db::{
    migrations::run_migrations,
    pool::{close_pool, create_pool, DatabaseConfig},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    init_tracing(config.log_format);

    tracing::info!(
        "Todo List API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let mut pool = None;
    let state = match &config.database {
        Some(database) => {
            let db = create_pool(DatabaseConfig {
                url: database.url.clone(),
                max_connections: database.max_connections,
                ..DatabaseConfig::default()
            })
            .await?;

            if config.run_migrations {
                run_migrations(&db).await?;
            }

            pool = Some(db.clone());
            AppState::new(db, config.clone())
        }
        None => {
            tracing::warn!("DATABASE_URL not set, data will be kept in memory and lost on exit");
            AppState::in_memory(config.clone())
        }
    };

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    tracing::info!("Server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_on(tokio::signal::ctrl_c()))
        .await?;

    if let Some(pool) = pool {
        close_pool(pool).await;
    }

    tracing::info!("Server stopped");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "todolist_api=debug,todolist_shared=info,tower_http=debug".into()
    });

    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}
