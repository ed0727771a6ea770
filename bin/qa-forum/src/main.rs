//! # qa-forum Binary
//!
//! The entry point that wires the in-memory store, the broadcast hub and the
//! mutation service behind the HTTP and WebSocket router.

use std::sync::Arc;

use anyhow::Context;
use configs::{LogSettings, Settings};
use qa_api::{middleware, router, AppState};
use qa_core::hub::BroadcastHub;
use qa_services::MutationService;
use qa_store_memory::MemoryDocumentStore;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("failed to load settings")?;
    init_tracing(&settings.log);

    // 1. Storage and fan-out
    let store = Arc::new(MemoryDocumentStore::new());
    let hub = Arc::new(BroadcastHub::with_capacity(settings.hub.capacity));

    // 2. Mutation pipeline
    let service = Arc::new(MutationService::new(store, hub));

    // 3. HTTP surface
    let cors = middleware::cors_policy(settings.cors.allowed_origin.as_deref())
        .context("invalid CORS origin")?;
    let app = router(AppState::new(service), cors);

    let address = settings.server.address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;

    info!("🚀 qa-forum starting on http://{address}");
    axum::serve(listener, app).await?;
    Ok(())
}

fn init_tracing(log: &LogSettings) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));
    if log.json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
