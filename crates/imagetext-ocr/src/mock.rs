use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::{OcrEngine, OcrError};

/// A mock engine for testing that returns a preconfigured result and
/// counts how often it was called.
pub struct MockEngine {
    result: Result<String, String>,
    calls: AtomicUsize,
}

impl MockEngine {
    /// Create a mock that recognises `text` in every image.
    pub fn success(text: &str) -> Self {
        Self {
            result: Ok(text.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Create a mock whose every call fails with `OcrError::Failed`.
    pub fn failure(message: &str) -> Self {
        Self {
            result: Err(message.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OcrEngine for MockEngine {
    fn name(&self) -> &str {
        "mock"
    }

    async fn preflight_check(&self) -> Result<(), OcrError> {
        Ok(())
    }

    async fn recognize(&self, _image: &[u8]) -> Result<String, OcrError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone().map_err(OcrError::Failed)
    }
}
