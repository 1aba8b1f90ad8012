use std::env;
use std::net::SocketAddr;

use anyhow::{Context, Result};

/// The application's configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// The URL of the PostgreSQL database. Without one the in-memory store is used.
    pub database_url: Option<String>,
    /// The address the HTTP server binds to.
    pub bind_addr: SocketAddr,
    /// The maximum number of pooled database connections.
    pub db_pool_max_size: usize,
    /// Origins allowed by the CORS layer.
    pub cors_origins: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            db_pool_max_size: 16,
            cors_origins: vec!["http://localhost:3000".to_string()],
        }
    }
}

impl Config {
    /// Creates a new `Config` from environment variables.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `Config`.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let database_url = env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        let bind_addr = match env::var("BIND_ADDR") {
            Ok(addr) => addr
                .parse()
                .with_context(|| format!("Invalid BIND_ADDR: {}", addr))?,
            Err(_) => defaults.bind_addr,
        };

        let db_pool_max_size = match env::var("DB_POOL_MAX_SIZE") {
            Ok(size) => size.parse().context("Invalid DB_POOL_MAX_SIZE")?,
            Err(_) => defaults.db_pool_max_size,
        };

        if db_pool_max_size == 0 {
            anyhow::bail!("DB_POOL_MAX_SIZE must be at least 1");
        }

        let cors_origins = match env::var("CORS_ORIGINS") {
            Ok(origins) => parse_origins(&origins),
            Err(_) => defaults.cors_origins,
        };

        Ok(Self {
            database_url,
            bind_addr,
            db_pool_max_size,
            cors_origins,
        })
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}
