//! # metricscheck
//!
//! Recomputes the analytics summary for a CSV export and compares it with a
//! JSON file of expected values (same shape as the `/api/analytics` result).
//!
//! ```bash
//! cargo run --bin metricscheck -- --csv testdata/sample_trades.csv --expected testdata/expected.json
//! ```
//!
//! Exit code 0 = all metrics match, 1 = at least one mismatch.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use tracing::warn;

use trade_journal::{
    engine::{analytics, csv_import},
    models::{Analytics, Trade},
};

#[derive(Parser, Debug)]
#[command(name = "metricscheck", about = "Check journal metrics against expected values")]
struct Cli {
    /// Input CSV (header: symbol,side,entry_time,exit_time,entry_price,exit_price,qty,fees,notes)
    #[arg(long)]
    csv: PathBuf,

    /// Expected metrics as JSON ({"winRate": .., "profitFactor": .., "maxDD": .., ...})
    #[arg(long)]
    expected: PathBuf,

    /// Absolute tolerance per metric
    #[arg(long, default_value_t = 1e-6)]
    tolerance: f64,
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let payload = std::fs::read_to_string(&cli.csv)
        .with_context(|| format!("reading {}", cli.csv.display()))?;
    let expected: Analytics = serde_json::from_str(
        &std::fs::read_to_string(&cli.expected)
            .with_context(|| format!("reading {}", cli.expected.display()))?,
    )
    .context("expected file is not a valid analytics JSON object")?;

    let now = Utc::now();
    let mut trades = Vec::new();
    for row in csv_import::parse(&payload)? {
        match row.result {
            Ok(input) => trades.push(Trade::from_input(input, now)),
            Err(reason) => warn!(line = row.line, %reason, "row skipped"),
        }
    }

    let got = analytics::compute(&trades)?;
    let checks = [
        ("winRate",      got.win_rate,      expected.win_rate),
        ("profitFactor", got.profit_factor, expected.profit_factor),
        ("maxDD",        Some(got.max_dd),  Some(expected.max_dd)),
        ("sharpe",       got.sharpe,        expected.sharpe),
        ("sortino",      got.sortino,       expected.sortino),
        ("expectancy",   got.expectancy,    expected.expectancy),
    ];

    println!("{:<14} {:>16} {:>16}  status", "metric", "got", "expected");
    let mut mismatches = 0;
    for (name, got, want) in checks {
        let ok = matches_within(got, want, cli.tolerance);
        if !ok {
            mismatches += 1;
        }
        println!(
            "{:<14} {:>16} {:>16}  {}",
            name,
            fmt_metric(got),
            fmt_metric(want),
            if ok { "ok" } else { "MISMATCH" }
        );
    }
    println!("closed trades: {}", got.trades);

    Ok(if mismatches == 0 { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn matches_within(got: Option<f64>, want: Option<f64>, tolerance: f64) -> bool {
    match (got, want) {
        (None, None)       => true,
        (Some(g), Some(w)) => (g - w).abs() <= tolerance,
        _                  => false,
    }
}

fn fmt_metric(v: Option<f64>) -> String {
    v.map(|x| format!("{x:.6}")).unwrap_or_else(|| "-".to_string())
}
