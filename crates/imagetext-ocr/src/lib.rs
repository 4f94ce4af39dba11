//! OCR adapter: turns raw image bytes into text.
//!
//! The engine is a black box to the rest of the system. Callers get either
//! the recognised text or an `OcrError`; there is no retry here.

mod disabled;
mod mock;
mod tesseract;

pub use disabled::DisabledEngine;
pub use mock::MockEngine;
pub use tesseract::TesseractEngine;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum OcrError {
    #[error("ocr engine unavailable: {0}")]
    Unavailable(String),

    #[error("ocr failed: {0}")]
    Failed(String),

    #[error("ocr timed out after {0:?}")]
    Timeout(Duration),
}

/// Trait for text recognition backends.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Human-readable engine name for logging.
    fn name(&self) -> &str;

    /// Check that the engine can run. Called once at startup.
    async fn preflight_check(&self) -> Result<(), OcrError>;

    /// Recognise the text in an encoded PNG or JPEG image.
    async fn recognize(&self, image: &[u8]) -> Result<String, OcrError>;
}

/// Which engine to construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineKind {
    Tesseract,
    Disabled,
}

#[derive(Debug, Clone)]
pub struct OcrConfig {
    pub engine: EngineKind,
    /// Path or name of the `tesseract` executable.
    pub tesseract_path: PathBuf,
    /// Tesseract language code(s), e.g. `eng` or `eng+deu`.
    pub language: String,
    /// Kill the engine after this long. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            engine: EngineKind::Tesseract,
            tesseract_path: PathBuf::from("tesseract"),
            language: "eng".into(),
            timeout: None,
        }
    }
}

/// Create an `OcrEngine` from configuration.
pub fn create_engine(config: &OcrConfig) -> Arc<dyn OcrEngine> {
    match config.engine {
        EngineKind::Tesseract => Arc::new(TesseractEngine::new(config)),
        EngineKind::Disabled => Arc::new(DisabledEngine),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_engine_respects_kind() {
        let config = OcrConfig::default();
        assert_eq!(create_engine(&config).name(), "tesseract");

        let config = OcrConfig {
            engine: EngineKind::Disabled,
            ..OcrConfig::default()
        };
        assert_eq!(create_engine(&config).name(), "disabled");
    }

    #[tokio::test]
    async fn disabled_engine_returns_empty_text() {
        let engine = DisabledEngine;
        engine.preflight_check().await.unwrap();
        assert_eq!(engine.recognize(b"anything").await.unwrap(), "");
    }
}
