//! # service
//!
//! [`JournalService`] — the operations the desktop UI calls. HTTP handlers in
//! `routes` are thin wrappers around these methods.
//!
//! ```text
//!  Ping          → app version
//!  GetAnalytics  → store snapshot → closed trades → engine::analytics
//!  ImportCSV     → engine::csv_import → dedupe → store (one import at a time)
//!  ListTrades / UpsertTrade / DeleteTrade
//! ```

use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    config::Config,
    engine::{analytics, csv_import::{self, ParsedRow}},
    error::AppError,
    models::{Analytics, ImportReport, Query, Trade, TradeInput},
    store::TradeStore,
};

pub struct JournalService {
    store:         TradeStore,
    app_version:   String,
    default_limit: usize,
    /// Serialises imports so the duplicate check and the inserts of one
    /// payload are not interleaved with another import.
    import_lock:   Mutex<()>,
}

impl JournalService {
    pub fn new(store: TradeStore, config: &Config) -> Self {
        Self {
            store,
            app_version:   config.app_version.clone(),
            default_limit: config.default_limit,
            import_lock:   Mutex::new(()),
        }
    }

    pub fn backend(&self) -> &'static str {
        self.store.backend()
    }

    // ─── Ping ─────────────────────────────────────────────────────────────────

    pub fn ping(&self) -> &str {
        &self.app_version
    }

    // ─── Analytics ────────────────────────────────────────────────────────────

    /// Computes [`Analytics`] over the trades selected by `query`.
    ///
    /// The store hands back an owned snapshot; the engine makes several
    /// passes over it without holding any lock.
    pub async fn get_analytics(&self, query: &Query) -> Result<Analytics, AppError> {
        query.validate().map_err(AppError::BadRequest)?;

        let trades = self.store.list(query).await?;
        let analytics = analytics::compute(&trades)?;

        debug!(
            selected = trades.len(),
            closed   = analytics.trades,
            symbol   = ?query.symbol,
            side     = ?query.side,
            "GetAnalytics"
        );
        Ok(analytics)
    }

    // ─── Trades ───────────────────────────────────────────────────────────────

    /// Lists trades; a query without a limit gets the configured page size.
    pub async fn list_trades(&self, mut query: Query) -> Result<Vec<Trade>, AppError> {
        query.validate().map_err(AppError::BadRequest)?;
        query.limit.get_or_insert(self.default_limit);
        Ok(self.store.list(&query).await?)
    }

    pub async fn upsert_trade(&self, input: TradeInput) -> Result<Trade, AppError> {
        input.validate().map_err(AppError::BadRequest)?;
        let trade = self.store.upsert(input).await?;
        info!(id = %trade.id, symbol = %trade.symbol, "trade saved");
        Ok(trade)
    }

    pub async fn delete_trade(&self, id: Uuid) -> Result<(), AppError> {
        if !self.store.delete(id).await? {
            return Err(AppError::NotFound(format!("trade {id}")));
        }
        info!(%id, "trade deleted");
        Ok(())
    }

    pub async fn trade_count(&self) -> Result<usize, AppError> {
        Ok(self.store.count().await?)
    }

    // ─── Import ───────────────────────────────────────────────────────────────

    /// Imports trades from CSV text. Bad or duplicate rows are skipped and
    /// reported; only an unusable header fails the call.
    pub async fn import_csv(&self, payload: &str) -> Result<ImportReport, AppError> {
        let rows = csv_import::parse(payload)?;

        let _guard = self.import_lock.lock().await;
        let mut report = ImportReport::default();

        for ParsedRow { line, result } in rows {
            let input = match result {
                Ok(input) => input,
                Err(reason) => {
                    report.record_skip(ParsedRow::error_message(line, &reason));
                    continue;
                }
            };

            // ข้ามแถวที่ซ้ำกับที่มีอยู่แล้ว (รวมถึงแถวก่อนหน้าใน payload เดียวกัน)
            if self.store.contains_fill(&input).await? {
                report.record_skip(ParsedRow::error_message(line, "duplicate trade"));
                continue;
            }

            match self.store.upsert(input).await {
                Ok(_) => report.imported += 1,
                Err(e) => {
                    warn!(line, error = %e, "import row failed to store");
                    report.record_skip(ParsedRow::error_message(line, &e.to_string()));
                }
            }
        }

        info!(
            imported = report.imported,
            skipped  = report.skipped,
            "📥 CSV import finished"
        );
        Ok(report)
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Side;

    const HEADER: &str = "symbol,side,entry_time,exit_time,entry_price,exit_price,qty,fees,notes";

    fn service() -> JournalService {
        JournalService::new(TradeStore::default(), &Config::default())
    }

    fn csv(rows: &[&str]) -> String {
        std::iter::once(HEADER).chain(rows.iter().copied()).collect::<Vec<_>>().join("\n")
    }

    /// Five closed long trades (qty 1, no fees) with P&L +100, -50, +30, -80, +20.
    fn reference_rows() -> Vec<&'static str> {
        vec![
            "ES,long,2024-01-02T09:00:00Z,2024-01-02T09:30:00Z,1000,1100,1,0,",
            "ES,long,2024-01-02T10:00:00Z,2024-01-02T10:30:00Z,1000,950,1,0,",
            "NQ,long,2024-01-02T11:00:00Z,2024-01-02T11:30:00Z,1000,1030,1,0,",
            "NQ,long,2024-01-02T12:00:00Z,2024-01-02T12:30:00Z,1000,920,1,0,",
            "ES,long,2024-01-02T13:00:00Z,2024-01-02T13:30:00Z,1000,1020,1,0,",
        ]
    }

    #[test]
    fn test_ping_returns_version() {
        let config = Config { app_version: "1.4.2".into(), ..Config::default() };
        let svc = JournalService::new(TradeStore::default(), &config);
        assert_eq!(svc.ping(), "1.4.2");
        assert_eq!(service().ping(), "dev");
    }

    #[tokio::test]
    async fn test_import_three_good_one_malformed() {
        let svc = service();
        let report = svc
            .import_csv(&csv(&[
                "AAPL,long,2024-01-02T14:30:00Z,2024-01-02T15:00:00Z,185,186,10,1,",
                "AAPL,short,2024-01-03T14:30:00Z,2024-01-03T15:00:00Z,186,184,10,1,",
                "AAPL,long,not-a-time,2024-01-04T15:00:00Z,184,185,10,1,",
                "MSFT,long,2024-01-04T14:30:00Z,,400,,2,0,open",
            ]))
            .await
            .unwrap();

        assert_eq!(report.imported, 3);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.errors, vec!["row 4: bad entry_time 'not-a-time'".to_string()]);
        assert_eq!(svc.trade_count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_reimport_skips_duplicates() {
        let svc = service();
        let payload = csv(&reference_rows());

        let first = svc.import_csv(&payload).await.unwrap();
        assert_eq!(first.imported, 5);

        let second = svc.import_csv(&payload).await.unwrap();
        assert_eq!(second.imported, 0);
        assert_eq!(second.skipped, 5);
        assert!(second.errors.iter().all(|e| e.ends_with("duplicate trade")));
        assert_eq!(svc.trade_count().await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_missing_header_fails_whole_import() {
        let err = service().import_csv("").await.unwrap_err();
        assert!(matches!(err, AppError::Import(_)));
    }

    #[tokio::test]
    async fn test_analytics_end_to_end() {
        let svc = service();
        svc.import_csv(&csv(&reference_rows())).await.unwrap();

        let a = svc.get_analytics(&Query::default()).await.unwrap();
        assert_eq!(a.trades, 5);
        assert!((a.max_dd - 100.0).abs() < 1e-9);
        assert!((a.expectancy.unwrap() - 4.0).abs() < 1e-9);
        assert!((a.win_rate.unwrap() - 0.6).abs() < 1e-9);
        assert!((a.profit_factor.unwrap() - 150.0 / 130.0).abs() < 1e-9);

        // Idempotent against an unchanged store.
        let again = svc.get_analytics(&Query::default()).await.unwrap();
        assert_eq!(a, again);
    }

    #[tokio::test]
    async fn test_sample_fixture_matches_expected() {
        let svc = service();
        let report = svc
            .import_csv(include_str!("../testdata/sample_trades.csv"))
            .await
            .unwrap();
        assert_eq!(report.imported, 6);

        let expected: Analytics =
            serde_json::from_str(include_str!("../testdata/expected.json")).unwrap();
        let got = svc.get_analytics(&Query::default()).await.unwrap();

        assert_eq!(got.trades, 5); // GOOG is still open
        let pairs = [
            (got.win_rate, expected.win_rate),
            (got.profit_factor, expected.profit_factor),
            (Some(got.max_dd), Some(expected.max_dd)),
            (got.sharpe, expected.sharpe),
            (got.sortino, expected.sortino),
            (got.expectancy, expected.expectancy),
        ];
        for (g, e) in pairs {
            assert!((g.unwrap() - e.unwrap()).abs() < 1e-9, "got {g:?}, expected {e:?}");
        }
    }

    #[tokio::test]
    async fn test_analytics_respects_filters() {
        let svc = service();
        svc.import_csv(&csv(&reference_rows())).await.unwrap();

        let nq = Query { symbol: Some("NQ".into()), ..Query::default() };
        let a = svc.get_analytics(&nq).await.unwrap();
        assert_eq!(a.trades, 2);
        assert_eq!(a.expectancy, Some(-25.0));

        let shorts = Query { side: Some(Side::Short), ..Query::default() };
        let empty = svc.get_analytics(&shorts).await.unwrap();
        assert_eq!(empty.trades, 0);
        assert_eq!(empty.win_rate, None);
        assert_eq!(empty.max_dd, 0.0);
    }

    #[tokio::test]
    async fn test_zero_limit_rejected() {
        let q = Query { limit: Some(0), ..Query::default() };
        let err = service().get_analytics(&q).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_list_applies_default_limit() {
        let config = Config { default_limit: 2, ..Config::default() };
        let svc = JournalService::new(TradeStore::default(), &config);
        svc.import_csv(&csv(&reference_rows())).await.unwrap();

        assert_eq!(svc.list_trades(Query::default()).await.unwrap().len(), 2);
        let all = Query { limit: Some(10), ..Query::default() };
        assert_eq!(svc.list_trades(all).await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_upsert_validates_and_delete_reports_missing() {
        let svc = service();
        let bad = TradeInput {
            id:          None,
            symbol:      "".into(),
            side:        Side::Long,
            entry_time:  chrono::Utc::now(),
            exit_time:   None,
            entry_price: 10.0,
            exit_price:  None,
            quantity:    1.0,
            fees:        0.0,
            notes:       String::new(),
        };
        assert!(matches!(svc.upsert_trade(bad.clone()).await, Err(AppError::BadRequest(_))));

        let good = TradeInput { symbol: "BTC".into(), ..bad };
        let saved = svc.upsert_trade(good).await.unwrap();
        svc.delete_trade(saved.id).await.unwrap();
        assert!(matches!(svc.delete_trade(saved.id).await, Err(AppError::NotFound(_))));
    }
}
