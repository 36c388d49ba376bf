//! RemoteStore against a mock deployment

use docport_import::config::{ImportConfig, ENV_DEPLOYMENT_URL};
use docport_import::importer::{ImportOptions, Importer};
use docport_import::store::{DocumentStore, RemoteStore};
use docport_import::{Document, ImportError};
use serde_json::json;
use wiremock::{
    matchers::{body_partial_json, method, path},
    Mock, MockServer, ResponseTemplate,
};

fn config_for(server: &MockServer) -> ImportConfig {
    let uri = server.uri();
    ImportConfig::from_lookup(".", move |name| (name == ENV_DEPLOYMENT_URL).then(|| uri.clone()))
        .expect("valid config")
}

fn document() -> Document {
    json!({"name": "Tech", "createdAt": 1_700_000_000_000_i64})
        .as_object()
        .cloned()
        .unwrap()
}

#[tokio::test]
async fn test_insert_returns_assigned_id() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/mutation"))
        .and(body_partial_json(json!({
            "path": "import:insertDocument",
            "args": {"table": "content_categories", "document": {"name": "Tech"}},
            "format": "json"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "value": "jd7abc123",
            "logLines": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = RemoteStore::new(&config_for(&server)).unwrap();
    let id = store.insert("content_categories", &document()).await.unwrap();
    assert_eq!(id, "jd7abc123");
}

#[tokio::test]
async fn test_mutation_error_is_rejection() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/mutation"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "error",
            "errorMessage": "Object is missing the required field `slug`"
        })))
        .mount(&server)
        .await;

    let store = RemoteStore::new(&config_for(&server)).unwrap();
    let err = store.insert("articles", &document()).await.unwrap_err();

    match err {
        ImportError::Rejected { table, message } => {
            assert_eq!(table, "articles");
            assert!(message.contains("slug"));
        },
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_http_failure_is_rejection() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream unavailable"))
        .mount(&server)
        .await;

    let store = RemoteStore::new(&config_for(&server)).unwrap();
    let err = store.insert("profiles", &document()).await.unwrap_err();
    assert!(err.to_string().contains("HTTP 500"), "{err}");
}

#[tokio::test]
async fn test_importer_continues_after_store_errors() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({"args": {"document": {"name": "Broken"}}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "error",
            "errorMessage": "validation failed"
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "value": "new-id"
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("content_categories.csv"),
        "id,name\n1,Tech\n2,Broken\n3,Design\n",
    )
    .unwrap();

    let store = RemoteStore::new(&config_for(&server)).unwrap();
    let mut importer = Importer::new(store, ImportOptions::default());
    let report = importer.run(dir.path()).await.unwrap();

    let table = report.table("content_categories").unwrap();
    assert_eq!(table.inserted, 2);
    assert_eq!(table.failed_rows, 1);
    assert_eq!(importer.id_maps().resolve("content_categories", "3"), Some("new-id"));
    assert_eq!(importer.id_maps().resolve("content_categories", "2"), None);
    assert_eq!(report.exit_code(), 1);
}
