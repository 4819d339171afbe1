//! Triage Service — Binary Entrypoint
//! Boots the Axum HTTP server, wiring config, shared state, and the
//! Prometheus recorder.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use mindcare_triage_engine::api::{self, AppState};
use mindcare_triage_engine::config::TriageConfig;
use mindcare_triage_engine::engine::ConversationEngine;
use mindcare_triage_engine::lexicon::Lexicon;
use mindcare_triage_engine::metrics::Metrics;
use mindcare_triage_engine::rng::SmallRngSource;
use mindcare_triage_engine::session::InMemorySessionStore;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("mindcare_triage_engine=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = TriageConfig::load()?;
    let metrics = Metrics::init(config.history_max_turns);

    let engine = ConversationEngine::new(
        Lexicon::builtin(),
        config,
        Box::new(InMemorySessionStore::with_capacity(config.history_max_turns)),
        Box::new(SmallRngSource::new()),
    );
    let state = AppState::new(Arc::new(engine));

    let app = api::router(state).merge(metrics.router());

    let port = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse::<u16>().ok())
        .unwrap_or(8080);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}
