use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Image encodings accepted for upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageFormat {
    Png,
    Jpeg,
}

impl ImageFormat {
    /// MIME types accepted on upload. `image/jpg` is not registered but
    /// browsers and some clients still send it.
    pub const ALLOWED_CONTENT_TYPES: &[&str] = &["image/png", "image/jpeg", "image/jpg"];

    pub fn as_str(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "png" => Some(ImageFormat::Png),
            "jpeg" => Some(ImageFormat::Jpeg),
            _ => None,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
        }
    }

    /// Resolve a `Content-Type` value against the allow-set. Parameters such
    /// as `; charset=...` are ignored and the comparison is case-insensitive.
    pub fn from_content_type(content_type: &str) -> Result<Self, CoreError> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match essence.as_str() {
            "image/png" => Ok(ImageFormat::Png),
            "image/jpeg" | "image/jpg" => Ok(ImageFormat::Jpeg),
            _ => Err(CoreError::UnsupportedContentType(content_type.to_string())),
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored image together with the text recognised in it.
///
/// Records are immutable once created; the store assigns `id` and
/// `created_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageRecord {
    pub id: String,
    pub format: ImageFormat,
    pub filename: String,
    pub size_bytes: i64,
    pub extracted_text: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip)]
    pub data: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct CreateImage {
    pub format: ImageFormat,
    pub filename: String,
    pub data: Vec<u8>,
    pub extracted_text: String,
}

/// What an uploader gets back after a successful upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadReceipt {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub extracted_text: String,
}

impl From<&ImageRecord> for UploadReceipt {
    fn from(r: &ImageRecord) -> Self {
        Self {
            id: r.id.clone(),
            timestamp: r.created_at,
            extracted_text: r.extracted_text.clone(),
        }
    }
}

/// The text view of a stored image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageText {
    pub extracted_text: String,
    pub upload_time: DateTime<Utc>,
}

impl From<&ImageRecord> for ImageText {
    fn from(r: &ImageRecord) -> Self {
        Self {
            extracted_text: r.extracted_text.clone(),
            upload_time: r.created_at,
        }
    }
}

/// The uploaded bytes of a stored image.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    pub id: String,
    pub format: ImageFormat,
    pub data: Vec<u8>,
}

impl ImageData {
    /// File name used when the bytes are served as an attachment.
    pub fn download_name(&self) -> String {
        format!("{}.{}", self.id, self.format.extension())
    }
}

impl From<ImageRecord> for ImageData {
    fn from(r: ImageRecord) -> Self {
        Self {
            id: r.id,
            format: r.format,
            data: r.data,
        }
    }
}

/// Whether `id` has the shape of an identifier the store hands out.
pub fn is_valid_id(id: &str) -> bool {
    uuid::Uuid::parse_str(id).is_ok()
}
