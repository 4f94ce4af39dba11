//! End-to-end tests for HttpService and raw reqwest clients against a real server.
//!
//! Each test spawns an in-process axum server on 127.0.0.1:0 with in-memory
//! SQLite and a mock OCR engine, then drives it over HTTP.

use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use imagetext_core::contact::CreateContact;
use imagetext_core::image::ImageFormat;
use imagetext_db::{Database, SqliteDatabase};
use imagetext_ocr::MockEngine;
use imagetext_server::test_helpers::{spawn_test_server, spawn_test_server_with, test_router_with};
use imagetext_service::{HttpService, ImageService, ImageUpload, ServiceError};
use reqwest::multipart::{Form, Part};

async fn spawn_server() -> String {
    let server = spawn_test_server().await;
    server.base_url
}

fn png_upload() -> ImageUpload {
    ImageUpload {
        filename: "hello.png".into(),
        content_type: Some("image/png".into()),
        data: Bytes::from_static(b"\x89PNG\r\n\x1a\n fake"),
    }
}

#[tokio::test]
async fn health_check_via_http() {
    let url = spawn_server().await;
    HttpService::new(&url).health_check().await.unwrap();
}

#[tokio::test]
async fn hello_scenario_via_http() {
    let url = spawn_server().await;
    let svc = HttpService::new(&url);
    let before = Utc::now();

    let receipt = svc.upload_image(&png_upload()).await.unwrap();
    assert!(receipt.extracted_text.contains("HELLO"));
    assert!(!receipt.id.is_empty());

    let text = svc.get_image_text(&receipt.id).await.unwrap();
    assert!(text.extracted_text.contains("HELLO"));
    assert!(text.upload_time >= before);

    // Retrieval is stable.
    assert_eq!(svc.get_image_text(&receipt.id).await.unwrap(), text);

    let data = svc.get_image_data(&receipt.id).await.unwrap();
    assert_eq!(data.format, ImageFormat::Png);
    assert_eq!(data.data, png_upload().data.to_vec());
}

#[tokio::test]
async fn upload_response_shape() {
    let url = spawn_server().await;
    let form = Form::new().part(
        "image",
        Part::bytes(b"\xff\xd8\xff".to_vec())
            .file_name("photo.jpg")
            .mime_str("image/jpeg")
            .unwrap(),
    );
    let resp = reqwest::Client::new()
        .post(format!("{url}/upload"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::CREATED);
    let v: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(v["message"], "Image uploaded successfully");
    assert_eq!(v["extractedText"], "HELLO");
    assert!(v["timestamp"].is_string());
    let id = v["id"].as_str().unwrap();

    let resp = reqwest::get(format!("{url}/images/{id}/raw")).await.unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    assert_eq!(resp.headers()["content-type"], "image/jpeg");
    assert_eq!(
        resp.headers()["content-disposition"],
        format!("attachment; filename=\"{id}.jpg\"").as_str()
    );
    assert_eq!(resp.bytes().await.unwrap().as_ref(), b"\xff\xd8\xff");
}

#[tokio::test]
async fn disallowed_type_persists_nothing() {
    let db = Arc::new(SqliteDatabase::open_in_memory().unwrap());
    let ocr = Arc::new(MockEngine::success("HELLO"));
    let server = spawn_test_server_with(test_router_with(db.clone(), ocr.clone(), None)).await;
    let svc = HttpService::new(&server.base_url);

    let upload = ImageUpload {
        content_type: Some("image/gif".into()),
        ..png_upload()
    };
    let err = svc.upload_image(&upload).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(_)), "got {err:?}");
    assert_eq!(db.count_images().await.unwrap(), 0);
    assert_eq!(ocr.calls(), 0);

    svc.upload_image(&png_upload()).await.unwrap();
    assert_eq!(db.count_images().await.unwrap(), 1);
}

#[tokio::test]
async fn unknown_id_is_not_found() {
    let url = spawn_server().await;
    let svc = HttpService::new(&url);
    let id = uuid::Uuid::new_v4().to_string();

    match svc.get_image_text(&id).await {
        Err(ServiceError::NotFound(msg)) => assert_eq!(msg, "Image not found"),
        other => panic!("expected not found, got {other:?}"),
    }
    assert!(matches!(
        svc.get_image_data(&id).await,
        Err(ServiceError::NotFound(_))
    ));

    let resp = reqwest::get(format!("{url}/images/not-a-uuid")).await.unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn duplicate_contact_email_via_http() {
    let url = spawn_server().await;
    let svc = HttpService::new(&url);
    let input = CreateContact {
        name: "Grace".into(),
        phone_number: "555-0199".into(),
        email: "grace@example.com".into(),
    };

    let contact = svc.create_contact(&input).await.unwrap();
    assert_eq!(contact.email, "grace@example.com");

    match svc.create_contact(&input).await {
        Err(ServiceError::InvalidInput(msg)) => assert!(msg.contains("grace@example.com"), "{msg}"),
        other => panic!("expected 400, got {other:?}"),
    }
}
