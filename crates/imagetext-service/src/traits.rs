use async_trait::async_trait;
use bytes::Bytes;
use imagetext_core::contact::{Contact, CreateContact};
use imagetext_core::image::{ImageData, ImageText, UploadReceipt};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("conflict: {0}")]
    Conflict(String),

    /// The identifier could not have been issued by the store.
    #[error("malformed id: {0}")]
    MalformedId(String),

    #[error("internal error: {0}")]
    Internal(String),
}

/// A file received on the upload path, fully buffered.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub filename: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// Upload and retrieval operations.
///
/// `LocalService` runs them against a database and OCR engine.
/// `HttpService` calls a running imagetext-server.
#[async_trait]
pub trait ImageService: Send + Sync {
    // -- Images --
    async fn upload_image(&self, upload: &ImageUpload) -> Result<UploadReceipt, ServiceError>;
    async fn get_image_text(&self, id: &str) -> Result<ImageText, ServiceError>;
    async fn get_image_data(&self, id: &str) -> Result<ImageData, ServiceError>;

    // -- Contacts --
    async fn create_contact(&self, input: &CreateContact) -> Result<Contact, ServiceError>;
}
