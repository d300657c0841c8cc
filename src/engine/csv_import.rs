//! # engine::csv_import
//!
//! Parses a CSV payload (pasted into the UI's import box) into validated
//! [`TradeInput`]s.
//!
//! ## Format
//! ```text
//! symbol,side,entry_time,exit_time,entry_price,exit_price,qty,fees,notes
//! AAPL,long,2024-01-02T14:30:00Z,2024-01-02T15:10:00Z,185.20,186.05,10,1.25,breakout
//! ```
//! - Columns are located by header name (case-insensitive) so order is free.
//! - `exit_time`, `exit_price`, `fees`, `notes` columns are optional.
//! - Times are RFC 3339; any offset is accepted and normalised to UTC.
//!
//! A broken header fails the whole import. A broken row only fails that row.

use chrono::{DateTime, Utc};
use csv::{ReaderBuilder, StringRecord, Trim};
use thiserror::Error;

use crate::models::{Side, TradeInput};

#[derive(Debug, Error, PartialEq)]
pub enum ImportError {
    #[error("CSV payload has no header row")]
    MissingHeader,

    #[error("CSV header is missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("unreadable CSV header: {0}")]
    BadHeader(String),
}

/// One data row after parsing: its 1-based line number in the payload and
/// either the parsed trade or the reason it was rejected.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRow {
    pub line:   u64,
    pub result: Result<TradeInput, String>,
}

impl ParsedRow {
    /// `row <line>: <reason>` — the format shown in the import report.
    pub fn error_message(line: u64, reason: &str) -> String {
        format!("row {line}: {reason}")
    }
}

// ─── Column Map ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
struct Columns {
    width:       usize,
    symbol:      usize,
    side:        usize,
    entry_time:  usize,
    exit_time:   Option<usize>,
    entry_price: usize,
    exit_price:  Option<usize>,
    qty:         usize,
    fees:        Option<usize>,
    notes:       Option<usize>,
}

impl Columns {
    fn from_header(header: &StringRecord) -> Result<Self, ImportError> {
        let find = |name: &str| {
            header
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let require = |name: &'static str| find(name).ok_or(ImportError::MissingColumn(name));

        Ok(Self {
            width:       header.len(),
            symbol:      require("symbol")?,
            side:        require("side")?,
            entry_time:  require("entry_time")?,
            exit_time:   find("exit_time"),
            entry_price: require("entry_price")?,
            exit_price:  find("exit_price"),
            qty:         find("qty").or_else(|| find("quantity")).ok_or(ImportError::MissingColumn("qty"))?,
            fees:        find("fees"),
            notes:       find("notes"),
        })
    }
}

// ─── Parser ───────────────────────────────────────────────────────────────────

/// Parses every data row of `payload`. Row failures are returned inline;
/// only header problems are fatal.
pub fn parse(payload: &str) -> Result<Vec<ParsedRow>, ImportError> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(payload.as_bytes());

    let header = reader
        .headers()
        .map_err(|e| ImportError::BadHeader(e.to_string()))?
        .clone();
    if header.iter().all(|h| h.is_empty()) {
        return Err(ImportError::MissingHeader);
    }
    let columns = Columns::from_header(&header)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let row = match record {
            Ok(record) => {
                let line = record.position().map(|p| p.line()).unwrap_or_default();
                ParsedRow { line, result: parse_record(&record, &columns) }
            }
            Err(e) => {
                let line = e.position().map(|p| p.line()).unwrap_or_default();
                ParsedRow { line, result: Err(e.to_string()) }
            }
        };
        rows.push(row);
    }
    Ok(rows)
}

fn parse_record(record: &StringRecord, columns: &Columns) -> Result<TradeInput, String> {
    if record.len() != columns.width {
        return Err(format!(
            "invalid record length: expected {} fields, got {}",
            columns.width,
            record.len()
        ));
    }

    let field = |idx: usize| record.get(idx).unwrap_or("");
    let optional = |idx: Option<usize>| idx.map(field).filter(|s| !s.is_empty());

    let symbol = field(columns.symbol).to_string();
    let side: Side = field(columns.side).parse()?;
    let entry_time = parse_time(field(columns.entry_time), "entry_time")?;
    let exit_time = optional(columns.exit_time)
        .map(|s| parse_time(s, "exit_time"))
        .transpose()?;
    let entry_price = parse_number(field(columns.entry_price), "entry_price")?;
    let exit_price = optional(columns.exit_price)
        .map(|s| parse_number(s, "exit_price"))
        .transpose()?;
    let quantity = parse_number(field(columns.qty), "qty")?;
    let fees = optional(columns.fees)
        .map(|s| parse_number(s, "fees"))
        .transpose()?
        .unwrap_or(0.0);
    let notes = optional(columns.notes).unwrap_or_default().to_string();

    let input = TradeInput {
        id: None,
        symbol,
        side,
        entry_time,
        exit_time,
        entry_price,
        exit_price,
        quantity,
        fees,
        notes,
    };
    input.validate()?;
    Ok(input)
}

fn parse_time(raw: &str, column: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| format!("bad {column} '{raw}'"))
}

fn parse_number(raw: &str, column: &str) -> Result<f64, String> {
    raw.parse::<f64>()
        .map_err(|_| format!("bad {column} '{raw}'"))
}

// ─── Tests ────────────────────────────────────────────────────────────────────
