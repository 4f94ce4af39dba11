use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, Path, State,
    },
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use imagetext_core::image::{ImageText, UploadReceipt};
use imagetext_service::{ImageService, ImageUpload, ServiceError};
use serde::Serialize;
use tracing::{error, warn};

use super::{error_body, ApiError, AppState};

/// Multipart field carrying the file.
pub const IMAGE_FIELD: &str = "image";

const UPLOAD_FAILED: &str = "Image upload failed";
const RETRIEVAL_FAILED: &str = "Image retrieval failed";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/upload", post(upload_image))
        .route("/images/{id}", get(get_image))
        .route("/images/{id}/raw", get(get_image_raw))
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: &'static str,
    #[serde(flatten)]
    pub receipt: UploadReceipt,
}

async fn upload_image(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError> {
    let mut multipart = multipart.map_err(|e| error_body(e.status(), e.body_text()))?;
    let upload = read_upload(&mut multipart).await?;

    let receipt = state
        .service
        .upload_image(&upload)
        .await
        .map_err(|e| to_error(e, UPLOAD_FAILED))?;

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            message: "Image uploaded successfully",
            receipt,
        }),
    ))
}

/// Buffer the single `image` field. Other fields are skipped.
async fn read_upload(multipart: &mut Multipart) -> Result<ImageUpload, ApiError> {
    let mut upload = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        if upload.is_some() {
            return Err(error_body(
                StatusCode::BAD_REQUEST,
                "only one image may be uploaded per request",
            ));
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await.map_err(multipart_error)?;
        upload = Some(ImageUpload {
            filename,
            content_type,
            data,
        });
    }
    upload.ok_or_else(|| {
        error_body(
            StatusCode::BAD_REQUEST,
            format!("no file uploaded in field \"{IMAGE_FIELD}\""),
        )
    })
}

fn multipart_error(e: MultipartError) -> ApiError {
    let status = e.status();
    warn!("rejected multipart body ({status}): {e}");
    error_body(status, e.body_text())
}

async fn get_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ImageText>, ApiError> {
    state
        .service
        .get_image_text(&id)
        .await
        .map(Json)
        .map_err(|e| to_error(e, RETRIEVAL_FAILED))
}

async fn get_image_raw(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let image = state
        .service
        .get_image_data(&id)
        .await
        .map_err(|e| to_error(e, RETRIEVAL_FAILED))?;
    let headers = [
        (header::CONTENT_TYPE, image.format.mime_type().to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", image.download_name()),
        ),
    ];
    Ok((headers, image.data))
}

/// Client mistakes carry their message; everything else is logged and
/// replaced with `generic`.
fn to_error(e: ServiceError, generic: &str) -> ApiError {
    match &e {
        ServiceError::NotFound(_) => error_body(StatusCode::NOT_FOUND, "Image not found"),
        ServiceError::InvalidInput(_) | ServiceError::Conflict(_) => {
            error_body(StatusCode::BAD_REQUEST, e.to_string())
        }
        ServiceError::MalformedId(_) | ServiceError::Internal(_) => {
            error!("{generic}: {e}");
            error_body(StatusCode::INTERNAL_SERVER_ERROR, generic)
        }
    }
}
