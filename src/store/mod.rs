//! # store
//!
//! Persistence seam for trades. [`TradeStore`] dispatches to the configured
//! backend:
//!
//! | Backend  | When                                               |
//! |----------|----------------------------------------------------|
//! | Memory   | default, or `DATABASE_URL` unset                   |
//! | Postgres | built with `--features postgres` and `DATABASE_URL` |
//!
//! Every read returns an owned snapshot so callers never observe a store
//! that changes underneath a multi-pass computation.

pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

use uuid::Uuid;

use crate::config::Config;
use crate::models::{Query, Trade, TradeInput};

pub use memory::MemoryStore;
#[cfg(feature = "postgres")]
pub use postgres::PgStore;

pub enum TradeStore {
    Memory(MemoryStore),
    #[cfg(feature = "postgres")]
    Postgres(PgStore),
}

impl TradeStore {
    /// Picks the backend from config. Without the `postgres` feature this is
    /// always the in-memory store.
    pub async fn open(config: &Config) -> anyhow::Result<Self> {
        #[cfg(feature = "postgres")]
        {
            if let Some(url) = config.database_url.as_deref() {
                return Ok(TradeStore::Postgres(PgStore::connect(url).await?));
            }
        }

        let _ = config;
        Ok(TradeStore::Memory(MemoryStore::new()))
    }

    pub fn backend(&self) -> &'static str {
        match self {
            TradeStore::Memory(_) => "memory",
            #[cfg(feature = "postgres")]
            TradeStore::Postgres(_) => "postgres",
        }
    }

    pub async fn upsert(&self, input: TradeInput) -> anyhow::Result<Trade> {
        match self {
            TradeStore::Memory(s) => Ok(s.upsert(input).await),
            #[cfg(feature = "postgres")]
            TradeStore::Postgres(s) => s.upsert(input).await,
        }
    }

    pub async fn list(&self, query: &Query) -> anyhow::Result<Vec<Trade>> {
        match self {
            TradeStore::Memory(s) => Ok(s.list(query).await),
            #[cfg(feature = "postgres")]
            TradeStore::Postgres(s) => s.list(query).await,
        }
    }

    pub async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        match self {
            TradeStore::Memory(s) => Ok(s.delete(id).await),
            #[cfg(feature = "postgres")]
            TradeStore::Postgres(s) => s.delete(id).await,
        }
    }

    pub async fn contains_fill(&self, input: &TradeInput) -> anyhow::Result<bool> {
        match self {
            TradeStore::Memory(s) => Ok(s.contains_fill(input).await),
            #[cfg(feature = "postgres")]
            TradeStore::Postgres(s) => s.contains_fill(input).await,
        }
    }

    pub async fn count(&self) -> anyhow::Result<usize> {
        match self {
            TradeStore::Memory(s) => Ok(s.count().await),
            #[cfg(feature = "postgres")]
            TradeStore::Postgres(s) => s.count().await,
        }
    }
}

impl Default for TradeStore {
    fn default() -> Self {
        TradeStore::Memory(MemoryStore::new())
    }
}
