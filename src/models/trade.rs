//! # models::trade
//!
//! Defines [`Trade`] — one journal entry (a buy/sell round-trip) — and
//! [`TradeInput`], the unsaved form that arrives from CSV rows or the
//! `/api/trades` endpoint.
//!
//! All timestamps are stored in UTC.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Side ─────────────────────────────────────────────────────────────────────

/// Position direction of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    #[serde(alias = "buy", alias = "LONG", alias = "BUY")]
    Long,
    #[serde(alias = "sell", alias = "SHORT", alias = "SELL")]
    Short,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Long  => "long",
            Side::Short => "short",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Side {
    type Err = String;

    /// รับทั้ง long/short และ buy/sell (ไม่สนตัวพิมพ์เล็ก-ใหญ่)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "long" | "buy"   => Ok(Side::Long),
            "short" | "sell" => Ok(Side::Short),
            other => Err(format!("unknown side '{other}'")),
        }
    }
}

// ─── Trade ────────────────────────────────────────────────────────────────────

/// A stored journal entry. Immutable once recorded except through an
/// explicit upsert with the same `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub id:          Uuid,
    pub symbol:      String,
    pub side:        Side,
    pub entry_time:  DateTime<Utc>,
    /// None = position still open
    pub exit_time:   Option<DateTime<Utc>>,
    pub entry_price: f64,
    pub exit_price:  Option<f64>,
    pub quantity:    f64,
    pub fees:        f64,
    pub notes:       String,
    pub created_at:  DateTime<Utc>,
    pub updated_at:  DateTime<Utc>,
}

impl Trade {
    /// Builds a fresh record from validated input, assigning an id when the
    /// input has none.
    pub fn from_input(input: TradeInput, now: DateTime<Utc>) -> Self {
        Self {
            id:          input.id.unwrap_or_else(Uuid::new_v4),
            symbol:      input.symbol,
            side:        input.side,
            entry_time:  input.entry_time,
            exit_time:   input.exit_time,
            entry_price: input.entry_price,
            exit_price:  input.exit_price,
            quantity:    input.quantity,
            fees:        input.fees,
            notes:       input.notes,
            created_at:  now,
            updated_at:  now,
        }
    }

    /// A trade counts toward analytics only once both exit fields are set.
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.exit_time.is_some() && self.exit_price.is_some()
    }

    /// Realized profit-or-loss after fees; `None` while the trade is open.
    pub fn realized_pnl(&self) -> Option<f64> {
        if !self.is_closed() {
            return None;
        }
        let exit = self.exit_price?;
        let gross = match self.side {
            Side::Long  => (exit - self.entry_price) * self.quantity,
            Side::Short => (self.entry_price - exit) * self.quantity,
        };
        Some(gross - self.fees)
    }

    /// Duplicate detection key used by imports.
    pub fn same_fill(&self, input: &TradeInput) -> bool {
        self.symbol == input.symbol
            && self.side == input.side
            && self.entry_time == input.entry_time
            && self.exit_time == input.exit_time
            && self.entry_price == input.entry_price
            && self.quantity == input.quantity
    }
}

// ─── TradeInput ───────────────────────────────────────────────────────────────

/// Unsaved trade payload. `id` is optional — the store assigns one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeInput {
    #[serde(default)]
    pub id:          Option<Uuid>,
    pub symbol:      String,
    pub side:        Side,
    pub entry_time:  DateTime<Utc>,
    #[serde(default)]
    pub exit_time:   Option<DateTime<Utc>>,
    pub entry_price: f64,
    #[serde(default)]
    pub exit_price:  Option<f64>,
    #[serde(alias = "qty")]
    pub quantity:    f64,
    #[serde(default)]
    pub fees:        f64,
    #[serde(default)]
    pub notes:       String,
}

impl TradeInput {
    /// Checks the invariants every stored trade must satisfy. Returns the
    /// first violation as a short human-readable reason.
    pub fn validate(&self) -> Result<(), String> {
        if self.symbol.trim().is_empty() {
            return Err("empty symbol".into());
        }
        if !self.entry_price.is_finite() || self.entry_price <= 0.0 {
            return Err(format!("entry_price must be positive, got {}", self.entry_price));
        }
        if let Some(exit) = self.exit_price {
            if !exit.is_finite() || exit <= 0.0 {
                return Err(format!("exit_price must be positive, got {exit}"));
            }
        }
        if !self.quantity.is_finite() || self.quantity <= 0.0 {
            return Err(format!("qty must be positive, got {}", self.quantity));
        }
        if !self.fees.is_finite() || self.fees < 0.0 {
            return Err(format!("fees must be non-negative, got {}", self.fees));
        }

        // exit_time กับ exit_price ต้องมาคู่กัน
        match (self.exit_time, self.exit_price) {
            (Some(_), None) => return Err("exit_time set without exit_price".into()),
            (None, Some(_)) => return Err("exit_price set without exit_time".into()),
            _ => {}
        }
        if let Some(exit_time) = self.exit_time {
            if exit_time < self.entry_time {
                return Err("exit_time is before entry_time".into());
            }
        }
        Ok(())
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
