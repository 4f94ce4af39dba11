pub mod contacts;
pub mod health;
pub mod images;

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use imagetext_service::LocalService;
use serde_json::{json, Value};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub const GREETING: &str = "Hello from imagetext-server!";

pub struct InnerAppState {
    pub service: LocalService,
    /// Served at `/` when set; otherwise `/` returns [`GREETING`].
    pub static_dir: Option<PathBuf>,
    pub max_upload_bytes: usize,
}

pub type AppState = Arc<InnerAppState>;

pub type ApiError = (StatusCode, Json<Value>);

pub fn error_body(status: StatusCode, msg: impl Into<String>) -> ApiError {
    (status, Json(json!({ "error": msg.into() })))
}

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .merge(health::routes())
        .merge(images::routes())
        .merge(contacts::routes());

    let app = match &state.static_dir {
        Some(dir) => api.fallback_service(ServeDir::new(dir)),
        None => api.route("/", get(greeting)),
    };

    app.layer(DefaultBodyLimit::max(state.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn greeting() -> &'static str {
    GREETING
}
