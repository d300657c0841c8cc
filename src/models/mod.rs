//! Domain models shared across the journal backend.

pub mod query;
pub mod report;
pub mod trade;

pub use query::Query;
pub use report::{Analytics, ImportReport};
pub use trade::{Side, Trade, TradeInput};
