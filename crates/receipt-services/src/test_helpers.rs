use receipt_core::{SchemaSource, Settings, UnknownImagePolicy};
use receipt_storage::{LocalBlobStore, LocalTableStore, Row};
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;

pub(crate) const CONFIG_BOOK: &str = "config";
pub(crate) const LEDGER_BOOK: &str = "ledger";
pub(crate) const RECEIPT_FOLDER: &str = "receipts";

pub(crate) fn destination_rows() -> Vec<Row> {
    vec![
        vec![json!("disabled"), json!("key"), json!("label"), json!("store"), json!("table"), json!("folder")],
        vec![json!(""), json!("travel"), json!("Travel"), json!(LEDGER_BOOK), json!("travel"), json!(RECEIPT_FOLDER)],
        vec![json!("off"), json!("archive"), json!("Archive"), json!(LEDGER_BOOK), json!("archive"), json!(RECEIPT_FOLDER)],
    ]
}

pub(crate) fn input_rows() -> Vec<Row> {
    vec![
        vec![json!("name"), json!("maxLength"), json!("required")],
        vec![json!("date"), json!(10), json!(true)],
        vec![json!("name"), json!(50), json!(true)],
        vec![json!("amount"), json!(10), json!(true)],
        vec![json!("detail"), json!(200), json!(true)],
        vec![json!("note"), json!(500), json!("")],
        vec![json!("noImageReason"), json!(200), json!("")],
    ]
}

/// Table store holding a provisioned configuration book and an empty ledger.
pub(crate) async fn config_tables() -> (TempDir, Arc<LocalTableStore>) {
    let dir = tempfile::tempdir().unwrap();
    let tables = LocalTableStore::new(dir.path()).await.unwrap();

    tables
        .write_section(CONFIG_BOOK, "destinations", &destination_rows())
        .await
        .unwrap();
    tables
        .write_section(CONFIG_BOOK, "inputs", &input_rows())
        .await
        .unwrap();
    tables
        .write_section(
            LEDGER_BOOK,
            "travel",
            &[vec![
                json!("date"),
                json!("name"),
                json!("amount"),
                json!("detail"),
                json!("receipt"),
                json!("note"),
            ]],
        )
        .await
        .unwrap();

    (dir, Arc::new(tables))
}

/// Blob store with the receipt folder provisioned.
pub(crate) async fn receipt_blobs() -> (TempDir, Arc<LocalBlobStore>) {
    let dir = tempfile::tempdir().unwrap();
    let blobs = LocalBlobStore::new(dir.path()).await.unwrap();
    blobs.create_folder(RECEIPT_FOLDER).await.unwrap();
    (dir, Arc::new(blobs))
}

pub(crate) fn test_settings(verify_url: &str) -> Settings {
    Settings {
        server_port: 0,
        environment: "test".to_string(),
        cors_origins: vec!["*".to_string()],
        recaptcha_secret: "test-secret".to_string(),
        recaptcha_verify_url: verify_url.to_string(),
        recaptcha_score_threshold: 0.5,
        recaptcha_timeout_secs: 5,
        config_store_ref: CONFIG_BOOK.to_string(),
        table_store_path: String::new(),
        blob_store_path: String::new(),
        field_schema_source: SchemaSource::Table,
        unknown_image_policy: UnknownImagePolicy::FallbackJpeg,
        max_request_body_bytes: 1024 * 1024,
    }
}
