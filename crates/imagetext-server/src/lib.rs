pub mod config;
pub mod routes;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use imagetext_ocr::OcrEngine;
use imagetext_service::LocalService;
use tokio::net::TcpListener;

use config::ServerConfig;
use routes::{AppState, InnerAppState};

pub fn app_state(service: LocalService, config: &ServerConfig) -> AppState {
    Arc::new(InnerAppState {
        service,
        static_dir: config.static_dir.clone(),
        max_upload_bytes: config.max_upload_bytes,
    })
}

pub async fn serve(listener: TcpListener, state: AppState) -> Result<()> {
    let app = routes::build_router(state);
    axum::serve(listener, app).await?;
    Ok(())
}

/// Recognise the text in a local image file with `engine`.
pub async fn run_ocr(engine: &dyn OcrEngine, path: &Path) -> Result<String> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    engine
        .recognize(&bytes)
        .await
        .with_context(|| format!("{} failed on {}", engine.name(), path.display()))
}
