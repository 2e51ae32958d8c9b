mod config;

use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::Layer;
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use anyhow::Context;
use rustls::crypto::ring::default_provider;
use sqlx::postgres::PgPoolOptions;

use am4_core::notifier::with_update_notifier;
use am4_core::{AppState, CredentialHasher};
use am4_database::store::MemoryUserStore;
use am4_database::{CacheService, Database, MIGRATOR, UserStore};

use crate::config::{ServerConfig, StoreBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let fmt_layer = tracing_subscriber::fmt::layer().with_filter(filter_fn(|metadata| {
        let within_info_level = *metadata.level() <= tracing::Level::INFO;
        if !within_info_level {
            return false;
        }

        !metadata.target().starts_with("sqlx::query")
    }));

    tracing_subscriber::registry().with(fmt_layer).init();

    default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("failed to install rustls ring provider"))?;

    dotenvy::dotenv().ok();

    let config = ServerConfig::from_env()?;

    let store: Arc<dyn UserStore> = match config.store {
        StoreBackend::Memory => {
            warn!("Using the in-memory user store; records are lost on restart.");
            Arc::new(MemoryUserStore::new())
        }
        StoreBackend::Postgres => Arc::new(connect_database(&config).await?),
    };

    let state = AppState::new(with_update_notifier(store), CredentialHasher::default());

    if config.api.require_admin_auth {
        if config.api.admin_token.is_none() {
            warn!("REQUIRE_ADMIN_AUTH=true but ADMIN_TOKEN is missing; every request will be refused.");
        } else {
            info!("Admin auth enabled.");
        }
    }

    let app = am4_api::router(state, config.api);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    info!(addr = %config.bind_addr, "am4 user service listening");

    tokio::select! {
        result = axum::serve(listener, app) => {
            if let Err(err) = result {
                error!(?err, "server error");
                return Err(err.into());
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received.");
        }
    }

    Ok(())
}

async fn connect_database(config: &ServerConfig) -> anyhow::Result<Database> {
    let database_url = config
        .database_url
        .as_deref()
        .context("DATABASE_URL is required when AM4_STORE=postgres")?;

    let db_pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(database_url)
        .await?;
    info!(
        max_connections = config.max_connections,
        "PostgreSQL connection established."
    );

    let cache = build_cache(config).await;
    let db = Database::with_cache(db_pool, cache);

    if config.auto_run_migrations {
        MIGRATOR.run(db.pool()).await?;
        info!("Database migrations applied.");
    } else {
        info!("Auto migrations disabled (set AUTO_RUN_MIGRATIONS=true to run at startup).");
    }

    Ok(db)
}

async fn build_cache(config: &ServerConfig) -> CacheService {
    let prefix = config.redis_key_prefix.clone();

    if !config.redis_enabled {
        info!("Redis cache disabled (set REDIS_ENABLED=true to enable).");
        return CacheService::disabled(prefix);
    }

    let Some(redis_url) = config.redis_url.as_deref() else {
        warn!(key_prefix = %prefix, "REDIS_ENABLED=true but REDIS_URL is missing; continuing with DB-only mode.");
        return CacheService::disabled(prefix);
    };

    let cache = match CacheService::redis(redis_url, prefix.clone()) {
        Ok(cache) => {
            info!(key_prefix = %prefix, "Redis cache enabled.");
            cache
        }
        Err(err) => {
            warn!(?err, key_prefix = %prefix, "Failed to initialize Redis cache; continuing with DB-only mode.");
            return CacheService::disabled(prefix);
        }
    };

    if let Err(err) = cache.ping().await {
        warn!(
            ?err,
            "Redis cache ping failed; lookups will fall back to the database."
        );
    } else {
        info!("Redis cache health check passed.");
    }

    cache
}
