//! Pure computation: CSV parsing and performance statistics.

pub mod analytics;
pub mod csv_import;
