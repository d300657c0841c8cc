//! # store::postgres — PostgreSQL Trade Store
//!
//! ใช้ `sqlx` สำหรับ async PostgreSQL (เปิดด้วย feature `postgres`)
//!
//! ## Setup
//! 1. สร้าง database
//! 2. ตั้ง `DATABASE_URL` ใน `.env`
//! 3. Migration ใน `migrations/` ถูก embed และรันอัตโนมัติตอน startup

use anyhow::Context;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, Executor, PgPool, Postgres, QueryBuilder};
use tracing::info;
use uuid::Uuid;

use crate::models::{Query, Trade, TradeInput};

const TRADE_COLUMNS: &str = "id, symbol, side, entry_time, exit_time, entry_price, exit_price, \
                             qty, fees, notes, created_at, updated_at";

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// สร้าง PgPool และ run migration
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        info!("Connecting to PostgreSQL...");

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(std::time::Duration::from_secs(5))
            .connect(database_url)
            .await
            .context("Failed to connect to PostgreSQL")?;

        run_migrations(&pool).await?;

        info!("✅ PostgreSQL connected and migrations applied");
        Ok(Self { pool })
    }

    pub async fn upsert(&self, input: TradeInput) -> anyhow::Result<Trade> {
        let trade = Trade::from_input(input, Utc::now());

        let sql = format!(
            r#"
            INSERT INTO trades ({TRADE_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (id) DO UPDATE SET
              symbol      = EXCLUDED.symbol,
              side        = EXCLUDED.side,
              entry_time  = EXCLUDED.entry_time,
              exit_time   = EXCLUDED.exit_time,
              entry_price = EXCLUDED.entry_price,
              exit_price  = EXCLUDED.exit_price,
              qty         = EXCLUDED.qty,
              fees        = EXCLUDED.fees,
              notes       = EXCLUDED.notes,
              updated_at  = EXCLUDED.updated_at
            RETURNING {TRADE_COLUMNS}
            "#
        );

        let row: TradeRow = sqlx::query_as(&sql)
            .bind(trade.id)
            .bind(&trade.symbol)
            .bind(trade.side.as_str())
            .bind(trade.entry_time)
            .bind(trade.exit_time)
            .bind(trade.entry_price)
            .bind(trade.exit_price)
            .bind(trade.quantity)
            .bind(trade.fees)
            .bind(&trade.notes)
            .bind(trade.created_at)
            .bind(trade.updated_at)
            .fetch_one(&self.pool)
            .await
            .context("upsert trade failed")?;

        row.try_into()
    }

    /// One statement, so the result is a consistent snapshot.
    pub async fn list(&self, query: &Query) -> anyhow::Result<Vec<Trade>> {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {TRADE_COLUMNS} FROM trades WHERE TRUE"));

        if let Some(symbol) = &query.symbol {
            qb.push(" AND symbol = ").push_bind(symbol.clone());
        }
        if let Some(side) = query.side {
            qb.push(" AND side = ").push_bind(side.as_str());
        }
        if let Some(start) = query.start_time {
            qb.push(" AND entry_time >= ").push_bind(start);
        }
        if let Some(end) = query.end_time {
            qb.push(" AND entry_time <= ").push_bind(end);
        }
        qb.push(" ORDER BY entry_time ASC, created_at ASC");
        if let Some(limit) = query.limit {
            qb.push(" LIMIT ").push_bind(limit as i64);
        }
        if query.offset > 0 {
            qb.push(" OFFSET ").push_bind(query.offset as i64);
        }

        let rows: Vec<TradeRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .context("list trades failed")?;

        rows.into_iter().map(Trade::try_from).collect()
    }

    pub async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM trades WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("delete trade failed")?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn contains_fill(&self, input: &TradeInput) -> anyhow::Result<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
              SELECT 1 FROM trades
              WHERE symbol = $1 AND side = $2 AND entry_time = $3
                AND exit_time IS NOT DISTINCT FROM $4
                AND entry_price = $5 AND qty = $6
            )
            "#,
        )
        .bind(&input.symbol)
        .bind(input.side.as_str())
        .bind(input.entry_time)
        .bind(input.exit_time)
        .bind(input.entry_price)
        .bind(input.quantity)
        .fetch_one(&self.pool)
        .await
        .context("duplicate check failed")?;
        Ok(exists)
    }

    pub async fn count(&self) -> anyhow::Result<usize> {
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM trades")
            .fetch_one(&self.pool)
            .await
            .context("count trades failed")?;
        Ok(n.max(0) as usize)
    }
}

async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    // No bind arguments → simple query protocol, so the file may hold
    // several statements.
    pool.execute(include_str!("../../migrations/001_init.sql"))
        .await
        .context("Failed to run migration 001_init.sql")?;
    Ok(())
}

// ─── Row Mapping ──────────────────────────────────────────────────────────────

#[derive(sqlx::FromRow)]
struct TradeRow {
    id:          Uuid,
    symbol:      String,
    side:        String,
    entry_time:  DateTime<Utc>,
    exit_time:   Option<DateTime<Utc>>,
    entry_price: f64,
    exit_price:  Option<f64>,
    qty:         f64,
    fees:        f64,
    notes:       String,
    created_at:  DateTime<Utc>,
    updated_at:  DateTime<Utc>,
}

impl TryFrom<TradeRow> for Trade {
    type Error = anyhow::Error;

    fn try_from(row: TradeRow) -> Result<Self, Self::Error> {
        let side = row
            .side
            .parse()
            .map_err(|e: String| anyhow::anyhow!("trade {}: {e}", row.id))?;
        Ok(Trade {
            id:          row.id,
            symbol:      row.symbol,
            side,
            entry_time:  row.entry_time,
            exit_time:   row.exit_time,
            entry_price: row.entry_price,
            exit_price:  row.exit_price,
            quantity:    row.qty,
            fees:        row.fees,
            notes:       row.notes,
            created_at:  row.created_at,
            updated_at:  row.updated_at,
        })
    }
}
