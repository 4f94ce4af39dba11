use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use imagetext_core::contact::{Contact, CreateContact};
use imagetext_service::{ImageService, ServiceError};
use tracing::error;

use super::{error_body, ApiError, AppState};

pub fn routes() -> Router<AppState> {
    Router::new().route("/contacts", post(create_contact))
}

async fn create_contact(
    State(state): State<AppState>,
    input: Result<Json<CreateContact>, JsonRejection>,
) -> Result<(StatusCode, Json<Contact>), ApiError> {
    let Json(input) = input.map_err(|e| error_body(StatusCode::BAD_REQUEST, e.body_text()))?;
    state
        .service
        .create_contact(&input)
        .await
        .map(|c| (StatusCode::CREATED, Json(c)))
        .map_err(to_error)
}

fn to_error(e: ServiceError) -> ApiError {
    match &e {
        ServiceError::InvalidInput(_) | ServiceError::Conflict(_) => {
            error_body(StatusCode::BAD_REQUEST, e.to_string())
        }
        _ => {
            error!("contact creation failed: {e}");
            error_body(StatusCode::INTERNAL_SERVER_ERROR, "Contact creation failed")
        }
    }
}
