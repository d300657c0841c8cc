//! # models::report
//!
//! Result objects returned to the UI: [`Analytics`] and [`ImportReport`].
//! Neither is persisted — both are recomputed per call.

use serde::{Deserialize, Serialize};

/// Summary statistics over a filtered set of closed trades.
///
/// `None` means the statistic is undefined for the input (e.g. profit factor
/// with no losing trades). It serialises as JSON `null`, never as NaN/inf.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analytics {
    pub win_rate:      Option<f64>,
    pub profit_factor: Option<f64>,
    /// Peak-to-trough magnitude, always >= 0.
    #[serde(rename = "maxDD")]
    pub max_dd:        f64,
    pub sharpe:        Option<f64>,
    pub sortino:       Option<f64>,
    pub expectancy:    Option<f64>,
    /// Number of closed trades the figures were computed from.
    #[serde(default)]
    pub trades:        usize,
}

/// Outcome of one CSV import call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped:  usize,
    /// One entry per skipped row, in payload order.
    pub errors:   Vec<String>,
}

impl ImportReport {
    pub fn record_skip(&mut self, message: String) {
        self.skipped += 1;
        self.errors.push(message);
    }
}
