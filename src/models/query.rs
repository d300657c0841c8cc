//! # models::query
//!
//! [`Query`] — filter + pagination criteria sent by the UI's "Apply Filters"
//! button. Shared by `/api/analytics` (JSON body) and `/api/trades` (query
//! string).

use std::fmt::Display;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::models::{Side, Trade};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Query {
    /// Exact symbol match.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub symbol:     Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub side:       Option<Side>,
    /// Inclusive lower bound on `entry_time`.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub start_time: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `entry_time`.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub end_time:   Option<DateTime<Utc>>,
    /// Page size. None = no limit; Some(0) is rejected.
    #[serde(default, deserialize_with = "number_or_empty")]
    pub limit:      Option<usize>,
    #[serde(default, deserialize_with = "number_or_zero")]
    pub offset:     usize,
    /// Client request sequence number, echoed back so a late response to a
    /// superseded request can be dropped by the caller.
    #[serde(default, deserialize_with = "number_or_empty")]
    pub seq:        Option<u64>,
}

impl Query {
    pub fn validate(&self) -> Result<(), String> {
        if self.limit == Some(0) {
            return Err("limit must be greater than 0".into());
        }
        if let (Some(start), Some(end)) = (self.start_time, self.end_time) {
            if start > end {
                return Err("startTime is after endTime".into());
            }
        }
        Ok(())
    }

    /// Filter predicate (pagination is applied separately by the store).
    pub fn matches(&self, trade: &Trade) -> bool {
        if let Some(symbol) = &self.symbol {
            if &trade.symbol != symbol {
                return false;
            }
        }
        if let Some(side) = self.side {
            if trade.side != side {
                return false;
            }
        }
        if let Some(start) = self.start_time {
            if trade.entry_time < start {
                return false;
            }
        }
        if let Some(end) = self.end_time {
            if trade.entry_time > end {
                return false;
            }
        }
        true
    }
}

/// The UI sends `""` for every untouched filter input; treat it as unset.
fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// JSON bodies carry numbers; query strings carry text, `""` when the
/// field was left blank.
#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText<N> {
    Number(N),
    Text(String),
}

fn number_or_empty<'de, D, N>(deserializer: D) -> Result<Option<N>, D::Error>
where
    D: Deserializer<'de>,
    N: Deserialize<'de> + FromStr,
    N::Err: Display,
{
    match Option::<NumberOrText<N>>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrText::Number(n)) => Ok(Some(n)),
        Some(NumberOrText::Text(s)) => match s.trim() {
            "" => Ok(None),
            s => s.parse().map(Some).map_err(serde::de::Error::custom),
        },
    }
}

fn number_or_zero<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    number_or_empty(deserializer).map(Option::unwrap_or_default)
}

// ─── Tests ────────────────────────────────────────────────────────────────────
