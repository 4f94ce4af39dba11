pub mod contact;
pub mod error;
pub mod image;

pub use contact::{Contact, CreateContact};
pub use error::CoreError;
pub use image::{CreateImage, ImageData, ImageFormat, ImageRecord, ImageText, UploadReceipt};
