//! # state
//!
//! AppState ที่ inject เข้าทุก Axum handler — ตัว service กับ counters

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::config::Config;
use crate::service::JournalService;
use crate::store::TradeStore;

// ─── AppState ─────────────────────────────────────────────────────────────────

/// Top-level shared state injected into every Axum handler.
pub struct AppState {
    pub journal: JournalService,
    pub config:  Config,

    // ── Metrics ───────────────────────────────────────────────────────────────
    pub analytics_count: AtomicU64,
    pub import_count:    AtomicU64,
    pub started_at:      DateTime<Utc>,
}

impl AppState {
    pub fn new(store: TradeStore, config: Config) -> Self {
        Self {
            journal:         JournalService::new(store, &config),
            config,
            analytics_count: AtomicU64::new(0),
            import_count:    AtomicU64::new(0),
            started_at:      Utc::now(),
        }
    }

    #[inline]
    pub fn bump(counter: &AtomicU64) -> u64 {
        counter.fetch_add(1, Ordering::Relaxed) + 1
    }
}

/// Convenience type alias
pub type SharedState = Arc<AppState>;

pub fn build_state(store: TradeStore, config: Config) -> SharedState {
    Arc::new(AppState::new(store, config))
}
