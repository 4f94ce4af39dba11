// Backend-agnostic integration tests for the Database trait.
//
// Each public async function accepts `&dyn Database` so that the same logic
// can be exercised against both the SQLite and Postgres backends.

#![allow(dead_code)]

use chrono::Utc;
use imagetext_core::contact::CreateContact;
use imagetext_core::image::{CreateImage, ImageFormat};
use imagetext_db::{Database, DbError};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn make_image(text: &str) -> CreateImage {
    CreateImage {
        format: ImageFormat::Png,
        filename: "scan.png".into(),
        data: vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0, 1, 2, 3],
        extracted_text: text.to_string(),
    }
}

fn make_contact(email: &str) -> CreateContact {
    CreateContact {
        name: "Ada Lovelace".into(),
        phone_number: "555-0100".into(),
        email: email.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Image tests
// ---------------------------------------------------------------------------

/// Create assigns id, timestamp and size; get returns the same bytes and text.
pub async fn test_image_create_and_get(db: &dyn Database) {
    let before = Utc::now();
    let input = make_image("HELLO");
    let created = db.create_image(&input).await.unwrap();

    assert!(!created.id.is_empty());
    assert_eq!(created.format, ImageFormat::Png);
    assert_eq!(created.filename, "scan.png");
    assert_eq!(created.size_bytes, input.data.len() as i64);
    assert_eq!(created.data, input.data);
    assert_eq!(created.extracted_text, "HELLO");
    assert!(created.created_at >= before - chrono::Duration::seconds(1));

    let fetched = db.get_image(&created.id).await.unwrap();
    assert_eq!(fetched.id, created.id);
    assert_eq!(fetched.data, input.data);
    assert_eq!(fetched.extracted_text, "HELLO");
    assert_eq!(fetched.created_at, created.created_at);
}

/// Each create yields a distinct identifier.
pub async fn test_image_ids_unique(db: &dyn Database) {
    let a = db.create_image(&make_image("a")).await.unwrap();
    let b = db.create_image(&make_image("b")).await.unwrap();
    assert_ne!(a.id, b.id);
    assert_eq!(db.count_images().await.unwrap(), 2);
}

pub async fn test_image_not_found(db: &dyn Database) {
    let err = db
        .get_image(&uuid::Uuid::new_v4().to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::NotFound(_)), "got {err:?}");
}

/// Jpeg records keep their format and empty text survives the round trip.
pub async fn test_image_jpeg_without_text(db: &dyn Database) {
    let created = db
        .create_image(&CreateImage {
            format: ImageFormat::Jpeg,
            filename: String::new(),
            data: vec![0xff, 0xd8, 0xff, 0xe0],
            extracted_text: String::new(),
        })
        .await
        .unwrap();
    let fetched = db.get_image(&created.id).await.unwrap();
    assert_eq!(fetched.format, ImageFormat::Jpeg);
    assert_eq!(fetched.extracted_text, "");
    assert_eq!(fetched.size_bytes, 4);
}

/// Repeated reads of the same record return identical content.
pub async fn test_image_reads_stable(db: &dyn Database) {
    let created = db.create_image(&make_image("stable")).await.unwrap();
    let first = db.get_image(&created.id).await.unwrap();
    let second = db.get_image(&created.id).await.unwrap();
    assert_eq!(first.data, second.data);
    assert_eq!(first.extracted_text, second.extracted_text);
    assert_eq!(first.created_at, second.created_at);
}

// ---------------------------------------------------------------------------
// Contact tests
// ---------------------------------------------------------------------------

pub async fn test_contact_create_and_get(db: &dyn Database) {
    let created = db
        .create_contact(&make_contact("ada@example.com"))
        .await
        .unwrap();
    assert_eq!(created.name, "Ada Lovelace");
    assert_eq!(created.phone_number, "555-0100");

    let fetched = db.get_contact(&created.id).await.unwrap();
    assert_eq!(fetched.email, "ada@example.com");
    assert_eq!(db.count_contacts().await.unwrap(), 1);

    let err = db.get_contact("missing").await.unwrap_err();
    assert!(matches!(err, DbError::NotFound(_)), "got {err:?}");
}

/// A second contact with the same email is rejected and not stored.
pub async fn test_contact_email_unique(db: &dyn Database) {
    db.create_contact(&make_contact("dup@example.com"))
        .await
        .unwrap();
    let err = db
        .create_contact(&make_contact("dup@example.com"))
        .await
        .unwrap_err();
    match err {
        DbError::Conflict(msg) => assert!(msg.contains("dup@example.com"), "{msg}"),
        other => panic!("expected conflict, got {other:?}"),
    }
    assert_eq!(db.count_contacts().await.unwrap(), 1);

    db.create_contact(&make_contact("other@example.com"))
        .await
        .unwrap();
    assert_eq!(db.count_contacts().await.unwrap(), 2);
}
