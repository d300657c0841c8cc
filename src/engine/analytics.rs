//! # engine::analytics
//!
//! **Analytics Engine** — turns a set of closed trades into the [`Analytics`]
//! summary shown on the dashboard.
//!
//! ## Conventions
//! - Per-trade return = realized P&L after fees (currency, not percent).
//! - Standard deviation is the **population** deviation (divide by n).
//! - Sortino uses downside deviation around a target of 0: RMS of the
//!   negative returns only.
//! - Profit factor with zero gross loss is undefined (`None`); an all-losing
//!   set therefore gives `Some(0.0)`.
//! - Max drawdown runs over the cumulative P&L points in exit-time order
//!   (ties: entry time, then input order). No implicit zero baseline.
//!
//! Every function here is pure. Undefined ratios are `None`, never NaN/inf.

use thiserror::Error;
use tracing::debug;

use crate::models::{Analytics, Trade};

#[derive(Debug, Error, PartialEq)]
pub enum AnalyticsError {
    /// A return was NaN or infinite (overflowed prices/quantities).
    #[error("non-finite profit-or-loss {value} for trade #{index}")]
    NonFiniteReturn { index: usize, value: f64 },

    /// Every return was finite but an aggregate (sum, square) overflowed.
    #[error("{metric} overflowed for the selected trades")]
    Overflow { metric: &'static str },
}

// ─── Entry Point ──────────────────────────────────────────────────────────────

/// Computes the summary over `trades`. Open trades are ignored.
///
/// The slice is not required to be sorted; chronological order is derived
/// here so callers may pass the store's entry-time ordering as-is.
pub fn compute(trades: &[Trade]) -> Result<Analytics, AnalyticsError> {
    let returns = chronological_returns(trades)?;

    let analytics = Analytics {
        win_rate:      win_rate(&returns),
        profit_factor: profit_factor(&returns),
        max_dd:        max_drawdown(&equity_curve(&returns)),
        sharpe:        sharpe(&returns),
        sortino:       sortino(&returns),
        expectancy:    expectancy(&returns),
        trades:        returns.len(),
    };
    ensure_finite(&analytics)?;

    debug!(
        trades   = analytics.trades,
        win_rate = ?analytics.win_rate,
        max_dd   = analytics.max_dd,
        "analytics computed"
    );
    Ok(analytics)
}

/// A statistic that overflowed is an error, not an absent value: `None`
/// is reserved for "undefined for this input".
fn ensure_finite(analytics: &Analytics) -> Result<(), AnalyticsError> {
    let checks = [
        ("winRate",      analytics.win_rate),
        ("profitFactor", analytics.profit_factor),
        ("maxDD",        Some(analytics.max_dd)),
        ("sharpe",       analytics.sharpe),
        ("sortino",      analytics.sortino),
        ("expectancy",   analytics.expectancy),
    ];
    for (metric, value) in checks {
        if value.is_some_and(|v| !v.is_finite()) {
            return Err(AnalyticsError::Overflow { metric });
        }
    }
    Ok(())
}

/// Realized P&L of every closed trade, ordered by exit time.
///
/// `sort_by` is stable, so trades with identical exit and entry times keep
/// their input order.
pub fn chronological_returns(trades: &[Trade]) -> Result<Vec<f64>, AnalyticsError> {
    let mut closed: Vec<(&Trade, f64)> = Vec::with_capacity(trades.len());
    for (index, trade) in trades.iter().enumerate() {
        let Some(pnl) = trade.realized_pnl() else { continue };
        if !pnl.is_finite() {
            return Err(AnalyticsError::NonFiniteReturn { index, value: pnl });
        }
        closed.push((trade, pnl));
    }

    closed.sort_by(|(a, _), (b, _)| {
        a.exit_time
            .cmp(&b.exit_time)
            .then_with(|| a.entry_time.cmp(&b.entry_time))
    });

    Ok(closed.into_iter().map(|(_, pnl)| pnl).collect())
}

/// Running sum of `returns`: one point per trade.
pub fn equity_curve(returns: &[f64]) -> Vec<f64> {
    returns
        .iter()
        .scan(0.0_f64, |sum, r| {
            *sum += r;
            Some(*sum)
        })
        .collect()
}

// ─── Statistics ───────────────────────────────────────────────────────────────

/// wins / total, where a win is P&L strictly above zero.
pub fn win_rate(returns: &[f64]) -> Option<f64> {
    if returns.is_empty() {
        return None;
    }
    let wins = returns.iter().filter(|r| **r > 0.0).count();
    Some(wins as f64 / returns.len() as f64)
}

/// gross profit / |gross loss|. None when there is no loss to divide by.
pub fn profit_factor(returns: &[f64]) -> Option<f64> {
    let (gross_profit, gross_loss) = returns.iter().fold((0.0, 0.0), |(gp, gl), &r| {
        if r > 0.0 {
            (gp + r, gl)
        } else if r < 0.0 {
            (gp, gl - r)
        } else {
            (gp, gl)
        }
    });

    if gross_loss == 0.0 {
        return None;
    }
    Some(gross_profit / gross_loss)
}

/// Largest peak-to-trough decline of `equity`, as a non-negative magnitude.
/// Single pass: track the running peak, measure each point against it.
pub fn max_drawdown(equity: &[f64]) -> f64 {
    let Some((&first, rest)) = equity.split_first() else {
        return 0.0;
    };

    let mut peak   = first;
    let mut max_dd = 0.0_f64;
    for &point in rest {
        if point > peak {
            peak = point;
        } else {
            max_dd = max_dd.max(peak - point);
        }
    }
    max_dd
}

/// Mean P&L per trade.
pub fn expectancy(returns: &[f64]) -> Option<f64> {
    mean(returns)
}

/// mean / population stddev. Needs at least two trades and non-zero spread.
pub fn sharpe(returns: &[f64]) -> Option<f64> {
    if returns.len() < 2 {
        return None;
    }
    // Identical returns have zero spread, but the rounded mean leaves a
    // residue of a few ulps that would blow the ratio up.
    if returns.iter().all(|r| *r == returns[0]) {
        return None;
    }
    let mean = mean(returns)?;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / returns.len() as f64;
    let sd = variance.sqrt();
    if sd == 0.0 {
        return None;
    }
    Some(mean / sd)
}

/// mean / downside deviation (RMS of the losing returns).
pub fn sortino(returns: &[f64]) -> Option<f64> {
    if returns.len() < 2 {
        return None;
    }
    let mean = mean(returns)?;

    let (downside_ss, n) = returns
        .iter()
        .filter(|r| **r < 0.0)
        .fold((0.0_f64, 0_usize), |(ss, n), r| (ss + r * r, n + 1));
    if n == 0 {
        return None;
    }

    let dd = (downside_ss / n as f64).sqrt();
    // ค่าติดลบเล็กมากจน r*r underflow เป็น 0 ได้
    if dd == 0.0 {
        return None;
    }
    Some(mean / dd)
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Side, TradeInput};
    use chrono::{DateTime, Duration, TimeZone, Utc};

    const EPS: f64 = 1e-9;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 2, 9, 30, 0).unwrap()
    }

    /// Long trade of qty 1, no fees, with the given P&L, exiting at
    /// `t0 + exit_min` minutes.
    fn trade(pnl: f64, entry_min: i64, exit_min: i64) -> Trade {
        let input = TradeInput {
            id:          None,
            symbol:      "ES".into(),
            side:        Side::Long,
            entry_time:  t0() + Duration::minutes(entry_min),
            exit_time:   Some(t0() + Duration::minutes(exit_min)),
            entry_price: 1000.0,
            exit_price:  Some(1000.0 + pnl),
            quantity:    1.0,
            fees:        0.0,
            notes:       String::new(),
        };
        Trade::from_input(input, t0())
    }

    fn sequential(pnls: &[f64]) -> Vec<Trade> {
        pnls.iter()
            .enumerate()
            .map(|(i, &p)| trade(p, i as i64 * 10, i as i64 * 10 + 5))
            .collect()
    }

    #[test]
    fn test_empty_input() {
        let a = compute(&[]).unwrap();
        assert_eq!(a.win_rate, None);
        assert_eq!(a.profit_factor, None);
        assert_eq!(a.sharpe, None);
        assert_eq!(a.sortino, None);
        assert_eq!(a.expectancy, None);
        assert_eq!(a.max_dd, 0.0);
        assert_eq!(a.trades, 0);
    }

    #[test]
    fn test_reference_scenario() {
        let a = compute(&sequential(&[100.0, -50.0, 30.0, -80.0, 20.0])).unwrap();
        assert_eq!(a.trades, 5);
        assert!((a.max_dd - 100.0).abs() < EPS);
        assert!((a.expectancy.unwrap() - 4.0).abs() < EPS);
        assert!((a.win_rate.unwrap() - 0.6).abs() < EPS);
        assert!((a.profit_factor.unwrap() - 150.0 / 130.0).abs() < EPS);
    }

    #[test]
    fn test_equity_curve_is_running_sum() {
        assert_eq!(
            equity_curve(&[100.0, -50.0, 30.0, -80.0, 20.0]),
            vec![100.0, 50.0, 80.0, 0.0, 20.0]
        );
    }

    #[test]
    fn test_all_winners() {
        let a = compute(&sequential(&[10.0, 20.0, 5.0])).unwrap();
        assert_eq!(a.profit_factor, None);
        assert_eq!(a.win_rate, Some(1.0));
        assert_eq!(a.sortino, None);
        assert_eq!(a.max_dd, 0.0);
    }

    #[test]
    fn test_all_losers() {
        let a = compute(&sequential(&[-10.0, -20.0, -5.0])).unwrap();
        assert_eq!(a.win_rate, Some(0.0));
        assert!(a.expectancy.unwrap() < 0.0);
        assert_eq!(a.profit_factor, Some(0.0));
        // cumulative -10, -30, -35 → peak -10, trough -35
        assert!((a.max_dd - 25.0).abs() < EPS);
    }

    #[test]
    fn test_flat_trades_are_not_wins_or_losses() {
        let a = compute(&sequential(&[0.0, 0.0])).unwrap();
        assert_eq!(a.win_rate, Some(0.0));
        assert_eq!(a.profit_factor, None);
        assert_eq!(a.sharpe, None); // zero variance
        assert_eq!(a.expectancy, Some(0.0));
    }

    #[test]
    fn test_single_trade() {
        let a = compute(&sequential(&[-40.0])).unwrap();
        assert_eq!(a.max_dd, 0.0); // one point cannot decline
        assert_eq!(a.sharpe, None);
        assert_eq!(a.sortino, None);
        assert_eq!(a.expectancy, Some(-40.0));
    }

    #[test]
    fn test_sharpe_uses_population_stddev() {
        // mean 0.5, deviations ±1.5 and ±0.5, divided by n (not n-1)
        let returns = [2.0, -1.0, 1.0, 0.0];
        let mean = 0.5;
        let var = [1.5_f64, -1.5, 0.5, -0.5].iter().map(|d| d * d).sum::<f64>() / 4.0;
        let expected = mean / var.sqrt();
        assert!((sharpe(&returns).unwrap() - expected).abs() < EPS);
    }

    #[test]
    fn test_sharpe_absent_for_repeated_fractional_returns() {
        assert_eq!(sharpe(&[0.1; 3]), None);
        assert_eq!(sharpe(&[1.1; 7]), None);
        assert_eq!(sharpe(&[-0.3; 5]), None);

        let a = compute(&sequential(&[0.25, 0.25, 0.25])).unwrap();
        assert_eq!(a.sharpe, None);
        assert_eq!(a.win_rate, Some(1.0));
    }

    #[test]
    fn test_aggregate_overflow_is_an_error() {
        // each return is finite, their sum is not
        let trades = sequential(&[1e308, 1e308, -1e308, -1e308]);
        let err = compute(&trades).unwrap_err();
        assert!(matches!(err, AnalyticsError::Overflow { .. }));
    }

    #[test]
    fn test_sortino_downside_only() {
        let returns = [1.0, -1.0, 2.0, -2.0, 3.0];
        // mean 0.6, downside RMS = sqrt((1 + 4) / 2)
        let expected = 0.6 / (2.5_f64).sqrt();
        let got = sortino(&returns).unwrap();
        assert!(got > 0.0);
        assert!((got - expected).abs() < EPS);
    }

    #[test]
    fn test_max_drawdown_from_curve() {
        assert_eq!(max_drawdown(&[100.0, 120.0, 90.0, 95.0, 80.0, 130.0]), 40.0);
        assert_eq!(max_drawdown(&[1.0, 2.0, 3.0]), 0.0);
        assert_eq!(max_drawdown(&[5.0]), 0.0);
        assert_eq!(max_drawdown(&[]), 0.0);
    }

    #[test]
    fn test_orders_by_exit_time_not_input_order() {
        // exits: +100 at 50m, -80 at 10m, -50 at 30m
        let trades = vec![trade(100.0, 0, 50), trade(-80.0, 0, 10), trade(-50.0, 0, 30)];
        // chronological -80, -50, +100 → cumulative -80, -130, -30
        assert_eq!(chronological_returns(&trades).unwrap(), vec![-80.0, -50.0, 100.0]);
        assert!((compute(&trades).unwrap().max_dd - 50.0).abs() < EPS);
    }

    #[test]
    fn test_exit_ties_break_on_entry_then_input_order() {
        let trades = vec![
            trade(-30.0, 20, 60),
            trade(50.0, 5, 60),
            trade(-10.0, 20, 60),
        ];
        assert_eq!(chronological_returns(&trades).unwrap(), vec![50.0, -30.0, -10.0]);
    }

    #[test]
    fn test_drawdown_monotone_when_appending_losses() {
        let mut pnls = vec![50.0, -20.0, 40.0];
        let mut last = compute(&sequential(&pnls)).unwrap().max_dd;
        for loss in [-5.0, -15.0, -1.0, -30.0] {
            pnls.push(loss);
            let dd = compute(&sequential(&pnls)).unwrap().max_dd;
            assert!(dd >= last);
            last = dd;
        }
    }

    #[test]
    fn test_open_trades_ignored() {
        let mut trades = sequential(&[10.0, -5.0]);
        let mut open = trade(0.0, 100, 100);
        open.exit_price = None;
        open.exit_time = None;
        trades.push(open);
        assert_eq!(compute(&trades).unwrap().trades, 2);
    }

    #[test]
    fn test_non_finite_return_fails() {
        let mut trades = sequential(&[10.0, -5.0]);
        trades[1].quantity = f64::INFINITY;
        let err = compute(&trades).unwrap_err();
        assert!(matches!(err, AnalyticsError::NonFiniteReturn { index: 1, .. }));
    }

    #[test]
    fn test_deterministic() {
        let trades = sequential(&[12.5, -3.25, 7.0, -9.5, 0.75]);
        let a = compute(&trades).unwrap();
        let b = compute(&trades).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.sharpe.map(f64::to_bits), b.sharpe.map(f64::to_bits));
    }
}
