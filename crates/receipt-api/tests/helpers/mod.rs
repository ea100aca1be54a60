//! Test helpers: provision local stores, mock the verification endpoint and
//! build the router for integration tests.
//!
//! Run from workspace root: `cargo test -p receipt-api`.

#![allow(dead_code)]

pub mod fixtures;

use axum_test::TestServer;
use receipt_api::constants;
use receipt_api::setup::{routes, services};
use receipt_core::{SchemaSource, Settings, UnknownImagePolicy};
use receipt_storage::{LocalBlobStore, LocalTableStore, Row};
use serde_json::{json, Value};
use tempfile::TempDir;

pub const CONFIG_BOOK: &str = "config";
pub const LEDGER_BOOK: &str = "ledger";
pub const RECEIPT_FOLDER: &str = "receipts";

/// API path prefix for tests (e.g. `/api/v0`).
pub fn api_path(path: &str) -> String {
    format!("{}{}", constants::API_PREFIX, path)
}

/// Test application: server, mocked verifier and owned storage directories.
pub struct TestApp {
    pub server: TestServer,
    pub verifier: mockito::ServerGuard,
    pub tables: LocalTableStore,
    pub tables_dir: TempDir,
    pub blobs_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Mock the verification endpoint with a successful answer.
    pub async fn mock_score(&mut self, score: f64, calls: usize) -> mockito::Mock {
        self.verifier
            .mock("POST", "/siteverify")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "success": true, "score": score }).to_string())
            .expect(calls)
            .create_async()
            .await
    }

    /// Rows of the travel record table, header included.
    pub async fn ledger_rows(&self) -> Vec<Row> {
        use receipt_storage::TableStore;

        self.tables
            .read_section(LEDGER_BOOK, "travel")
            .await
            .expect("Failed to read ledger")
            .expect("Ledger table missing")
    }
}

pub fn create_test_settings(verify_url: &str, tables_dir: &TempDir, blobs_dir: &TempDir) -> Settings {
    Settings {
        server_port: 0,
        environment: "test".to_string(),
        cors_origins: vec!["*".to_string()],
        recaptcha_secret: "test-secret".to_string(),
        recaptcha_verify_url: verify_url.to_string(),
        recaptcha_score_threshold: 0.5,
        recaptcha_timeout_secs: 5,
        config_store_ref: CONFIG_BOOK.to_string(),
        table_store_path: tables_dir.path().to_string_lossy().into_owned(),
        blob_store_path: blobs_dir.path().to_string_lossy().into_owned(),
        field_schema_source: SchemaSource::Table,
        unknown_image_policy: UnknownImagePolicy::FallbackJpeg,
        max_request_body_bytes: 1024 * 1024,
    }
}

async fn provision_tables(tables: &LocalTableStore) {
    let destinations: Vec<Row> = vec![
        vec![json!("disabled"), json!("key"), json!("label"), json!("store"), json!("table"), json!("folder")],
        vec![json!(""), json!("travel"), json!("Travel"), json!(LEDGER_BOOK), json!("travel"), json!(RECEIPT_FOLDER)],
        vec![json!("x"), json!("archive"), json!("Archive"), json!(LEDGER_BOOK), json!("archive"), json!(RECEIPT_FOLDER)],
        vec![json!(""), json!("meals"), json!("Meals"), json!(LEDGER_BOOK), json!("meals"), json!(RECEIPT_FOLDER)],
    ];
    let inputs: Vec<Row> = vec![
        vec![json!("name"), json!("maxLength"), json!("required")],
        vec![json!("date"), json!(10), json!(true)],
        vec![json!("name"), json!(50), json!(true)],
        vec![json!("amount"), json!(10), json!(true)],
        vec![json!("detail"), json!(200), json!(true)],
        vec![json!("note"), json!(500), json!(false)],
        vec![json!("noImageReason"), json!(200), json!(false)],
    ];
    let header: Vec<Row> = vec![vec![
        json!("date"),
        json!("name"),
        json!("amount"),
        json!("detail"),
        json!("receipt"),
        json!("note"),
    ]];

    tables
        .write_section(CONFIG_BOOK, "destinations", &destinations)
        .await
        .expect("Failed to write destinations");
    tables
        .write_section(CONFIG_BOOK, "inputs", &inputs)
        .await
        .expect("Failed to write inputs");
    tables
        .write_section(LEDGER_BOOK, "travel", &header)
        .await
        .expect("Failed to write ledger");
}

/// Setup test app with provisioned local stores and a mock verifier.
pub async fn setup_test_app() -> TestApp {
    let tables_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let blobs_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let verifier = mockito::Server::new_async().await;

    let settings = create_test_settings(
        &format!("{}/siteverify", verifier.url()),
        &tables_dir,
        &blobs_dir,
    );

    let tables = LocalTableStore::new(tables_dir.path())
        .await
        .expect("Failed to create table store");
    provision_tables(&tables).await;
    LocalBlobStore::new(blobs_dir.path())
        .await
        .expect("Failed to create blob store")
        .create_folder(RECEIPT_FOLDER)
        .await
        .expect("Failed to create receipt folder");

    let state = services::initialize_services(&settings)
        .await
        .expect("Failed to initialize services");
    let app = routes::setup_routes(&settings, state).expect("Failed to setup routes");
    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        verifier,
        tables,
        tables_dir,
        blobs_dir,
    }
}

/// A complete, valid submission with an attached image.
pub fn submission_with_image() -> Value {
    json!({
        "destination": "travel",
        "recaptchaToken": "token-1",
        "receiptImage": fixtures::png_data_url(),
        "date": "2024-05-01",
        "name": "Bob",
        "amount": "1200",
        "detail": "Taxi",
        "note": "airport"
    })
}

/// A complete, valid submission without an image.
pub fn submission_without_image() -> Value {
    json!({
        "destination": "travel",
        "recaptchaToken": "token-1",
        "noImageReason": "Lost on the train",
        "date": "2024-05-02",
        "name": "Alice",
        "amount": "480",
        "detail": "Lunch"
    })
}
