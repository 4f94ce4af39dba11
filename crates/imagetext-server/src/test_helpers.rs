use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use imagetext_db::{Database, SqliteDatabase};
use imagetext_ocr::{MockEngine, OcrEngine};
use imagetext_service::LocalService;
use tokio::net::TcpListener;

use crate::config::DEFAULT_MAX_UPLOAD_BYTES;
use crate::routes::{build_router, InnerAppState};

/// Text the default test engine "recognises" in every image.
pub const TEST_OCR_TEXT: &str = "HELLO";

/// App state over the given handles, no static dir, default upload limit.
pub fn test_state(db: Arc<dyn Database>, ocr: Arc<dyn OcrEngine>) -> InnerAppState {
    InnerAppState {
        service: LocalService::new(db, ocr),
        static_dir: None,
        max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
    }
}

/// Build a test router with in-memory SQLite and an OCR engine that always
/// returns [`TEST_OCR_TEXT`].
pub async fn test_router() -> Router {
    let db = Arc::new(SqliteDatabase::open_in_memory().unwrap());
    let ocr = Arc::new(MockEngine::success(TEST_OCR_TEXT));
    test_router_with(db, ocr, None)
}

pub fn test_router_with(
    db: Arc<dyn Database>,
    ocr: Arc<dyn OcrEngine>,
    static_dir: Option<PathBuf>,
) -> Router {
    let mut state = test_state(db, ocr);
    state.static_dir = static_dir;
    build_router(Arc::new(state))
}

/// A running test server with base_url and background task handle.
pub struct TestServer {
    pub base_url: String,
    _handle: tokio::task::JoinHandle<()>,
}

/// Spawn an axum test server on a random port. Returns the TestServer
/// with the `base_url` (e.g. "http://127.0.0.1:12345").
pub async fn spawn_test_server() -> TestServer {
    spawn_test_server_with(test_router().await).await
}

pub async fn spawn_test_server_with(app: Router) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{addr}");
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    TestServer {
        base_url,
        _handle: handle,
    }
}

/// One file part of a `multipart/form-data` body: field name, filename,
/// optional content type, and bytes.
pub type FilePart<'a> = (&'a str, &'a str, Option<&'a str>, &'a [u8]);

/// Encode a single-file `multipart/form-data` body. Returns the request
/// `Content-Type` header value and the body. A `None` content type omits the
/// part's `Content-Type` header.
pub fn multipart_body(
    field: &str,
    filename: &str,
    content_type: Option<&str>,
    data: &[u8],
) -> (String, Vec<u8>) {
    multipart_parts(&[(field, filename, content_type, data)])
}

pub fn multipart_parts(parts: &[FilePart<'_>]) -> (String, Vec<u8>) {
    let boundary = "imagetext-test-boundary";
    let mut body = Vec::new();
    for (field, filename, content_type, data) in parts {
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n"
            )
            .as_bytes(),
        );
        if let Some(ct) = content_type {
            body.extend_from_slice(format!("Content-Type: {ct}\r\n").as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    (format!("multipart/form-data; boundary={boundary}"), body)
}
