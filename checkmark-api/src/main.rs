//! # Checkmark API Server
//!
//! Multi-user to-do list: a JSON API under `/api` and server-rendered pages,
//! both authenticated by a session cookie.
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=memory cargo run -p checkmark-api
//! ```

use checkmark_api::app::{build_router, AppState, Backends};
use checkmark_api::config::{Config, DatabaseBackend};
use checkmark_shared::auth::password::Argon2Hasher;
use checkmark_shared::auth::session::{MemorySessionStore, SessionStore};
use checkmark_shared::db::migrations::run_migrations;
use checkmark_shared::db::pool::{close_pool, create_pool, DatabaseConfig};
use checkmark_shared::redis::{RedisClient, RedisConfig, RedisSessionStore};
use checkmark_shared::repository::{MemoryRepository, PgRepository};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env first so RUST_LOG and LOG_FORMAT from it apply
    dotenvy::dotenv().ok();
    init_tracing();

    tracing::info!(
        "Checkmark API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    let sessions: Arc<dyn SessionStore> = match &config.redis_url {
        Some(url) => {
            let client = RedisClient::new(RedisConfig::new(url.clone())).await?;
            tracing::info!("Sessions stored in Redis");
            Arc::new(RedisSessionStore::new(client))
        }
        None => {
            tracing::info!("Sessions stored in process memory");
            Arc::new(MemorySessionStore::new())
        }
    };
    let hasher = Arc::new(Argon2Hasher::new(config.password));

    let (state, pool) = match config.database.backend() {
        DatabaseBackend::Memory => {
            tracing::warn!("DATABASE_URL=memory: all data is lost on shutdown");
            let repo = Arc::new(MemoryRepository::new());
            let backends = Backends {
                users: repo.clone(),
                tasks: repo,
                sessions,
                hasher,
            };
            (AppState::new(config, backends)?, None)
        }
        DatabaseBackend::Postgres(url) => {
            let pool = create_pool(DatabaseConfig {
                url,
                max_connections: config.database.max_connections,
                ..Default::default()
            })
            .await?;
            run_migrations(&pool).await?;

            let repo = Arc::new(PgRepository::new(pool.clone()));
            let backends = Backends {
                users: repo.clone(),
                tasks: repo,
                sessions,
                hasher,
            };
            (AppState::new(config, backends)?, Some(pool))
        }
    };

    let addr = state.config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(pool) = pool {
        close_pool(pool).await;
    }

    tracing::info!("Server stopped");
    Ok(())
}

/// `RUST_LOG` filter; `LOG_FORMAT=json` for JSON lines
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "checkmark_api=debug,checkmark_shared=debug,tower_http=debug".into()
    });
    let json = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Resolves on Ctrl-C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections...");
}
