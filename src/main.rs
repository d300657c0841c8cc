//! Trade journal backend server.

use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use trade_journal::{config::Config, routes, state::build_state, store::TradeStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Load .env ──────────────────────────────────────────────────────────
    dotenvy::dotenv().ok();

    // ── 2. Structured logging ─────────────────────────────────────────────────
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::from_default_env()
                .add_directive("trade_journal=debug".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .init();

    // ── 3. Config + Store ─────────────────────────────────────────────────────
    let config = Config::from_env()?;
    let store = TradeStore::open(&config).await?;

    info!(
        version     = %config.app_version,
        store       = store.backend(),
        database    = config.database_url.is_some(),
        auth        = config.api_key.is_some(),
        "📒 Trade journal starting"
    );

    // ── 4. Router ─────────────────────────────────────────────────────────────
    let addr = config.bind_addr;
    let app = routes::router(build_state(store, config));

    // ── 5. Bind & Serve ───────────────────────────────────────────────────────
    info!(?addr, "🚀 Journal service listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
