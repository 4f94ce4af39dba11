use async_trait::async_trait;
use imagetext_core::contact::{Contact, CreateContact};
use imagetext_core::image::{ImageData, ImageFormat, ImageText, UploadReceipt};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode};

use crate::{ImageService, ImageUpload, ServiceError};

/// Async HTTP client implementation of ImageService.
/// Connects to a running imagetext-server.
pub struct HttpService {
    base_url: String,
    client: Client,
}

impl HttpService {
    pub fn new(base_url: &str) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        Self {
            base_url,
            client: Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub async fn health_check(&self) -> Result<(), ServiceError> {
        let resp = self
            .client
            .get(self.url("/api/health"))
            .send()
            .await
            .map_err(transport)?;
        check(resp).await.map(|_| ())
    }
}

fn transport(e: reqwest::Error) -> ServiceError {
    ServiceError::Internal(format!("request failed: {e}"))
}

/// Turn a non-success response into the matching `ServiceError`, using the
/// server's `{"error": ...}` body as the message.
async fn check(resp: Response) -> Result<Response, ServiceError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    let msg = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v["error"].as_str().map(str::to_string))
        .unwrap_or(body);
    Err(match status {
        StatusCode::NOT_FOUND => ServiceError::NotFound(msg),
        StatusCode::BAD_REQUEST | StatusCode::PAYLOAD_TOO_LARGE => {
            ServiceError::InvalidInput(msg)
        }
        StatusCode::CONFLICT => ServiceError::Conflict(msg),
        _ => ServiceError::Internal(format!("{status}: {msg}")),
    })
}

#[async_trait]
impl ImageService for HttpService {
    async fn upload_image(&self, upload: &ImageUpload) -> Result<UploadReceipt, ServiceError> {
        let mut part = Part::bytes(upload.data.to_vec()).file_name(upload.filename.clone());
        if let Some(ct) = &upload.content_type {
            part = part
                .mime_str(ct)
                .map_err(|e| ServiceError::InvalidInput(format!("content type {ct:?}: {e}")))?;
        }
        let form = Form::new().part("image", part);
        let resp = self
            .client
            .post(self.url("/upload"))
            .multipart(form)
            .send()
            .await
            .map_err(transport)?;
        check(resp)
            .await?
            .json()
            .await
            .map_err(|e| ServiceError::Internal(format!("decode upload response: {e}")))
    }

    async fn get_image_text(&self, id: &str) -> Result<ImageText, ServiceError> {
        let resp = self
            .client
            .get(self.url(&format!("/images/{id}")))
            .send()
            .await
            .map_err(transport)?;
        check(resp)
            .await?
            .json()
            .await
            .map_err(|e| ServiceError::Internal(format!("decode image text: {e}")))
    }

    async fn get_image_data(&self, id: &str) -> Result<ImageData, ServiceError> {
        let resp = self
            .client
            .get(self.url(&format!("/images/{id}/raw")))
            .send()
            .await
            .map_err(transport)?;
        let resp = check(resp).await?;
        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let format = ImageFormat::from_content_type(&content_type)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        let data = resp
            .bytes()
            .await
            .map_err(|e| ServiceError::Internal(format!("read image bytes: {e}")))?;
        Ok(ImageData {
            id: id.to_string(),
            format,
            data: data.to_vec(),
        })
    }

    async fn create_contact(&self, input: &CreateContact) -> Result<Contact, ServiceError> {
        let resp = self
            .client
            .post(self.url("/contacts"))
            .json(input)
            .send()
            .await
            .map_err(transport)?;
        check(resp)
            .await?
            .json()
            .await
            .map_err(|e| ServiceError::Internal(format!("decode contact: {e}")))
    }
}
