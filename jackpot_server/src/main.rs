use anyhow::Context;
use clap::Parser;
use jackpot_core::StateStore;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod media;
mod routes;
mod state;

use crate::config::Config;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "info,tower_http=info".into()),
        )
        .init();

    let cfg = Config::parse();
    tokio::fs::create_dir_all(&cfg.uploads_dir)
        .await
        .with_context(|| format!("creating {}", cfg.uploads_dir.display()))?;

    let store = StateStore::in_dir(&cfg.data_dir);
    let doc = store
        .load()
        .with_context(|| format!("loading {}", store.path().display()))?;
    info!(
        path = %store.path().display(),
        combinations = doc.combinations.len(),
        spins = doc.spin_count(),
        "state loaded"
    );

    let state = AppState::new(store, cfg.uploads_dir.clone());
    let app = routes::router(state, &cfg.static_dir);

    let addr = cfg.listen_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}
