//! # store::memory
//!
//! In-process trade store. Default backend when no database is configured.
//!
//! ข้อมูลหายเมื่อ restart — ใช้สำหรับ dev / test หรือ desktop session เดียว

use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{Query, Trade, TradeInput};

#[derive(Debug, Default)]
pub struct MemoryStore {
    /// Insertion order is kept so equal entry times list deterministically.
    trades: RwLock<Vec<Trade>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert, or replace the record with the same id (keeping `created_at`).
    pub async fn upsert(&self, input: TradeInput) -> Trade {
        let now = Utc::now();
        let mut trades = self.trades.write().await;

        if let Some(id) = input.id {
            if let Some(existing) = trades.iter_mut().find(|t| t.id == id) {
                let created_at = existing.created_at;
                *existing = Trade { created_at, ..Trade::from_input(input, now) };
                return existing.clone();
            }
        }

        let trade = Trade::from_input(input, now);
        trades.push(trade.clone());
        trade
    }

    /// Filtered, entry-time ordered, paginated copy taken under one read lock.
    pub async fn list(&self, query: &Query) -> Vec<Trade> {
        let trades = self.trades.read().await;

        let mut matched: Vec<Trade> = trades
            .iter()
            .filter(|t| query.matches(t))
            .cloned()
            .collect();
        drop(trades);

        matched.sort_by_key(|t| t.entry_time);
        let page = matched.into_iter().skip(query.offset);
        match query.limit {
            Some(limit) => page.take(limit).collect(),
            None        => page.collect(),
        }
    }

    pub async fn delete(&self, id: Uuid) -> bool {
        let mut trades = self.trades.write().await;
        let before = trades.len();
        trades.retain(|t| t.id != id);
        trades.len() != before
    }

    pub async fn contains_fill(&self, input: &TradeInput) -> bool {
        self.trades.read().await.iter().any(|t| t.same_fill(input))
    }

    pub async fn count(&self) -> usize {
        self.trades.read().await.len()
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
