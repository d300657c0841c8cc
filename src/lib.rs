//! # Trade Journal — Backend
//!
//! ```text
//!  ┌─────────────┐  GET  /api/ping        ┌──────────────────────────────┐
//!  │  Desktop UI │  POST /api/analytics ─▶│ JournalService               │
//!  │             │  POST /api/import      │ ├─ engine::csv_import  📥    │
//!  └─────────────┘  GET  /api/trades      │ ├─ engine::analytics   📊    │
//!                                         │ └─ store (memory | postgres) │
//!                                         └──────────────────────────────┘
//! ```

pub mod auth;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod routes;
pub mod service;
pub mod state;
pub mod store;
