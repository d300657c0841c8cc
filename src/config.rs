//! # config — Environment Variables
//!
//! | Variable           | Default          | Meaning                                   |
//! |--------------------|------------------|-------------------------------------------|
//! | `BIND_ADDR`        | `127.0.0.1:3000` | HTTP listen address                       |
//! | `APP_VERSION`      | `dev`            | Returned by `/api/ping`                   |
//! | `API_KEY`          | (empty)          | Empty = dev mode, no `X-API-Key` check    |
//! | `IMPORT_MAX_BYTES` | `10485760`       | Request body limit (CSV payloads)         |
//! | `DEFAULT_LIMIT`    | `1000`           | Page size for `/api/trades` without limit |
//! | `DATABASE_URL`     | (unset)          | PostgreSQL store (`postgres` feature)     |

use std::net::SocketAddr;

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr:        SocketAddr,
    pub app_version:      String,
    /// None = dev mode (ไม่ตรวจ API key)
    pub api_key:          Option<String>,
    pub import_max_bytes: usize,
    pub default_limit:    usize,
    pub database_url:     Option<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let bind_addr = std::env::var("BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
            .parse()
            .context("BIND_ADDR must be host:port")?;

        let default_limit = env_usize("DEFAULT_LIMIT", 1000)?;
        if default_limit == 0 {
            anyhow::bail!("DEFAULT_LIMIT must be greater than 0");
        }

        Ok(Self {
            bind_addr,
            app_version:      non_empty("APP_VERSION").unwrap_or_else(|| "dev".to_string()),
            api_key:          non_empty("API_KEY"),
            import_max_bytes: env_usize("IMPORT_MAX_BYTES", 10 * 1024 * 1024)?,
            default_limit,
            database_url:     non_empty("DATABASE_URL"),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr:        SocketAddr::from(([127, 0, 0, 1], 3000)),
            app_version:      "dev".to_string(),
            api_key:          None,
            import_max_bytes: 10 * 1024 * 1024,
            default_limit:    1000,
            database_url:     None,
        }
    }
}

fn non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_usize(key: &str, default: usize) -> anyhow::Result<usize> {
    match non_empty(key) {
        Some(v) => v.trim().parse().with_context(|| format!("{key} must be a number")),
        None    => Ok(default),
    }
}
