//! HTTP layer exposing the persisted insight table.

pub mod routes;
pub mod types;

use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::data::store::InsightCache;

#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<InsightCache>,
}

/// Routes over a shared cache; split out so tests can drive it directly.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/theme-insights", post(routes::theme_insight))
        .route("/theme-insights/reload", post(routes::reload))
        .route("/theme-insights/:key", get(routes::insight_by_key))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(path: PathBuf, host: String, port: u16) -> Result<()> {
    let state = AppState {
        cache: Arc::new(InsightCache::new(path)),
    };
    let addr: SocketAddr = format!("{host}:{port}").parse()?;
    info!(%addr, path = %state.cache.path().display(), "serving theme-insights API");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router(state).into_make_service())
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
        })
        .await?;
    Ok(())
}
