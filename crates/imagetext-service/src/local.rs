use std::sync::Arc;

use async_trait::async_trait;
use imagetext_core::contact::{Contact, CreateContact};
use imagetext_core::image::{
    is_valid_id, CreateImage, ImageData, ImageFormat, ImageText, UploadReceipt,
};
use imagetext_db::{Database, DbError};
use imagetext_ocr::OcrEngine;
use tracing::{error, info};

use crate::{ImageService, ImageUpload, ServiceError};

/// Local implementation backed by a database handle and an OCR engine.
pub struct LocalService {
    db: Arc<dyn Database>,
    ocr: Arc<dyn OcrEngine>,
}

impl LocalService {
    pub fn new(db: Arc<dyn Database>, ocr: Arc<dyn OcrEngine>) -> Self {
        Self { db, ocr }
    }

    pub fn ocr(&self) -> &Arc<dyn OcrEngine> {
        &self.ocr
    }

    pub async fn count_images(&self) -> Result<i64, ServiceError> {
        Ok(self.db.count_images().await?)
    }
}

impl From<DbError> for ServiceError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound(msg) => ServiceError::NotFound(msg),
            DbError::Conflict(msg) => ServiceError::Conflict(msg),
            other => ServiceError::Internal(other.to_string()),
        }
    }
}

#[async_trait]
impl ImageService for LocalService {
    async fn upload_image(&self, upload: &ImageUpload) -> Result<UploadReceipt, ServiceError> {
        let content_type = upload.content_type.as_deref().unwrap_or_default();
        let format = ImageFormat::from_content_type(content_type).map_err(|_| {
            ServiceError::InvalidInput(format!(
                "unsupported file type {content_type:?}; allowed: {}",
                ImageFormat::ALLOWED_CONTENT_TYPES.join(", ")
            ))
        })?;
        if upload.data.is_empty() {
            return Err(ServiceError::InvalidInput("uploaded image is empty".into()));
        }

        let extracted_text = self.ocr.recognize(&upload.data).await.map_err(|e| {
            error!(
                "{} failed on {:?} ({} bytes): {e}",
                self.ocr.name(),
                upload.filename,
                upload.data.len()
            );
            ServiceError::Internal(format!("ocr: {e}"))
        })?;

        let record = self
            .db
            .create_image(&CreateImage {
                format,
                filename: upload.filename.clone(),
                data: upload.data.to_vec(),
                extracted_text,
            })
            .await
            .map_err(|e| {
                error!("storing image {:?} failed: {e}", upload.filename);
                ServiceError::from(e)
            })?;

        info!(
            "stored image {} ({}, {} bytes, {} chars of text)",
            record.id,
            record.format,
            record.size_bytes,
            record.extracted_text.len()
        );
        Ok(UploadReceipt::from(&record))
    }

    async fn get_image_text(&self, id: &str) -> Result<ImageText, ServiceError> {
        if !is_valid_id(id) {
            return Err(ServiceError::MalformedId(id.to_string()));
        }
        let record = self.db.get_image(id).await?;
        Ok(ImageText::from(&record))
    }

    async fn get_image_data(&self, id: &str) -> Result<ImageData, ServiceError> {
        if !is_valid_id(id) {
            return Err(ServiceError::MalformedId(id.to_string()));
        }
        Ok(self.db.get_image(id).await?.into())
    }

    async fn create_contact(&self, input: &CreateContact) -> Result<Contact, ServiceError> {
        input
            .validate()
            .map_err(|e| ServiceError::InvalidInput(e.to_string()))?;
        let contact = self.db.create_contact(input).await?;
        info!("created contact {}", contact.id);
        Ok(contact)
    }
}
