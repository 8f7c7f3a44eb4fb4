use anyhow::{bail, Context, Result};

use crate::catalog::fetcher::DEFAULT_BATCH_SIZE;
use crate::roadmap::generator::RoadmapPolicy;

const DEFAULT_CAREERNET_BASE_URL: &str = "https://www.career.go.kr/cnet/front/openapi";
const DEFAULT_QNET_BASE_URL: &str = "http://openapi.q-net.or.kr/api/service/rest";
const DEFAULT_JWT_TTL_HOURS: i64 = 24;
const MIN_JWT_SECRET_LEN: usize = 32;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub anthropic_api_key: String,
    pub careernet_api_key: String,
    pub careernet_base_url: String,
    pub qnet_service_key: String,
    pub qnet_base_url: String,
    /// Max concurrent page requests while aggregating a catalog search.
    pub catalog_batch_size: usize,
    pub roadmap_max_attempts: u32,
    pub roadmap_min_nodes: usize,
    pub roadmap_max_nodes: usize,
    /// HMAC secret for signing session tokens.
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = RoadmapPolicy::default();
        let config = Config {
            database_url: require_env("DATABASE_URL")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            careernet_api_key: require_env("CAREERNET_API_KEY")?,
            careernet_base_url: env_or("CAREERNET_BASE_URL", DEFAULT_CAREERNET_BASE_URL),
            qnet_service_key: require_env("QNET_SERVICE_KEY")?,
            qnet_base_url: env_or("QNET_BASE_URL", DEFAULT_QNET_BASE_URL),
            catalog_batch_size: parse_env("CATALOG_BATCH_SIZE", DEFAULT_BATCH_SIZE)?,
            roadmap_max_attempts: parse_env("ROADMAP_MAX_ATTEMPTS", defaults.max_attempts)?,
            roadmap_min_nodes: parse_env("ROADMAP_MIN_NODES", defaults.min_nodes)?,
            roadmap_max_nodes: parse_env("ROADMAP_MAX_NODES", defaults.max_nodes)?,
            jwt_secret: require_env("JWT_SECRET")?,
            jwt_ttl_hours: parse_env("JWT_TTL_HOURS", DEFAULT_JWT_TTL_HOURS)?,
            port: parse_env("PORT", 8080)?,
            rust_log: env_or("RUST_LOG", "info"),
        };

        config.check()?;
        Ok(config)
    }

    fn check(&self) -> Result<()> {
        if self.catalog_batch_size == 0 {
            bail!("CATALOG_BATCH_SIZE must be at least 1");
        }
        if self.roadmap_max_attempts == 0 {
            bail!("ROADMAP_MAX_ATTEMPTS must be at least 1");
        }
        if self.roadmap_min_nodes > self.roadmap_max_nodes {
            bail!(
                "ROADMAP_MIN_NODES ({}) must not exceed ROADMAP_MAX_NODES ({})",
                self.roadmap_min_nodes,
                self.roadmap_max_nodes
            );
        }
        if self.jwt_secret.len() < MIN_JWT_SECRET_LEN {
            bail!("JWT_SECRET must be at least {MIN_JWT_SECRET_LEN} bytes");
        }
        if self.jwt_ttl_hours <= 0 {
            bail!("JWT_TTL_HOURS must be positive");
        }
        Ok(())
    }

    pub fn roadmap_policy(&self) -> RoadmapPolicy {
        RoadmapPolicy {
            max_attempts: self.roadmap_max_attempts,
            min_nodes: self.roadmap_min_nodes,
            max_nodes: self.roadmap_max_nodes,
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}
