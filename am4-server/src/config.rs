use std::net::SocketAddr;

use am4_api::{AdminToken, ApiConfig};
use am4_utils::env::{env_bool, env_string, env_string_or, env_u64};
use anyhow::{Context, bail};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8090";
pub const DEFAULT_REDIS_KEY_PREFIX: &str = "am4:prod";
pub const DEFAULT_MAX_CONNECTIONS: u64 = 5;

/// Where user records live.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl StoreBackend {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Some(Self::Postgres),
            "memory" | "mem" => Some(Self::Memory),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub store: StoreBackend,
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub auto_run_migrations: bool,
    pub redis_enabled: bool,
    pub redis_url: Option<String>,
    pub redis_key_prefix: String,
    pub api: ApiConfig,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let raw_store = env_string_or("AM4_STORE", "postgres");
        let Some(store) = StoreBackend::parse(&raw_store) else {
            bail!("AM4_STORE must be `postgres` or `memory`, got `{raw_store}`");
        };

        let database_url = env_string("DATABASE_URL");
        if store == StoreBackend::Postgres && database_url.is_none() {
            bail!("DATABASE_URL is required when AM4_STORE=postgres");
        }

        let bind_addr = env_string_or("BIND_ADDR", DEFAULT_BIND_ADDR);
        let bind_addr = bind_addr
            .parse::<SocketAddr>()
            .with_context(|| format!("invalid BIND_ADDR `{bind_addr}`"))?;

        let max_connections = env_u64("DATABASE_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)
            .clamp(1, u64::from(u32::MAX));

        Ok(Self {
            bind_addr,
            store,
            database_url,
            max_connections: u32::try_from(max_connections)?,
            auto_run_migrations: env_bool("AUTO_RUN_MIGRATIONS", true),
            redis_enabled: env_bool("REDIS_ENABLED", false),
            redis_url: env_string("REDIS_URL"),
            redis_key_prefix: env_string_or("REDIS_KEY_PREFIX", DEFAULT_REDIS_KEY_PREFIX),
            api: ApiConfig {
                require_admin_auth: env_bool("REQUIRE_ADMIN_AUTH", false),
                admin_token: env_string("ADMIN_TOKEN").map(AdminToken::new),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::StoreBackend;

    #[test]
    fn store_backend_names() {
        assert_eq!(StoreBackend::parse("postgres"), Some(StoreBackend::Postgres));
        assert_eq!(StoreBackend::parse(" PG "), Some(StoreBackend::Postgres));
        assert_eq!(StoreBackend::parse("Memory"), Some(StoreBackend::Memory));
        assert_eq!(StoreBackend::parse("sqlite"), None);
        assert_eq!(StoreBackend::parse(""), None);
    }
}
