use axum::body::{Body, Bytes};
use axum::http::{Request, StatusCode};
use axum::Router;
use cranfield_core::builder::{build_index, normalize_documents, write_index};
use cranfield_core::persist::DataPaths;
use cranfield_core::{DocMeta, Document, VectorizerConfig};
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::tempdir;
use tower::ServiceExt;

fn doc(id: &str, title: &str, text: &str) -> Document {
    Document { doc_id: id.into(), title: title.into(), text: text.into(), metadata: DocMeta::default() }
}

fn build_tiny_index(dir: &std::path::Path) {
    let docs = normalize_documents(vec![
        doc("1", "Boundary layers", "laminar boundary layer on a flat plate"),
        doc("2", "Heat transfer", "heat flux measured at the wall of a cylinder"),
        doc("3", "Shock waves", "supersonic flow with an attached shock wave"),
    ]);
    let config = VectorizerConfig { min_df: 1, max_df: 0.95, min_token_len: 2 };
    let index = build_index(&docs, config).unwrap();
    write_index(&DataPaths::new(dir), &index).unwrap();
}

fn app() -> (tempfile::TempDir, Router) {
    let dir = tempdir().unwrap();
    build_tiny_index(dir.path());
    let app = cranfield_server::build_app(dir.path()).unwrap();
    (dir, app)
}

async fn call(app: Router, uri: &str) -> (StatusCode, Bytes) {
    let req = Request::get(uri).body(Body::empty()).unwrap();
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    (status, body)
}

#[tokio::test]
async fn search_returns_ranked_results() {
    let (_dir, app) = app();

    let (status, body) = call(app, "/search?q=heat&k=2").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    let arr = json.as_array().unwrap();
    assert!(arr.len() <= 2);
    assert_eq!(arr[0]["doc_id"], "2");
    assert_eq!(arr[0]["title"], "Heat transfer");
    assert!(arr[0]["score"].as_f64().unwrap() > 0.0);
    assert!(arr[0]["snippet"].as_str().unwrap().ends_with("..."));
}

#[tokio::test]
async fn search_defaults_to_ten_and_returns_everything_for_small_corpus() {
    let (_dir, app) = app();
    let (status, body) = call(app, "/search?q=laminar%20shock").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    let scores: Vec<f64> = json.as_array().unwrap().iter().map(|h| h["score"].as_f64().unwrap()).collect();
    assert_eq!(scores.len(), 3);
    assert!(scores.windows(2).all(|w| w[0] >= w[1]));
}

#[tokio::test]
async fn missing_query_is_bad_request() {
    let (_dir, app) = app();
    for uri in ["/search", "/search?q=", "/search?q=%20%20&k=3"] {
        let (status, body) = call(app.clone(), uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "uri: {uri}");
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Missing query parameter 'q'");
    }
}

#[tokio::test]
async fn invalid_k_is_bad_request() {
    let (_dir, app) = app();
    let (status, body) = call(app, "/search?q=heat&k=zero").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"], "Invalid query parameter 'k'");
}

#[tokio::test]
async fn doc_lookup_hits_and_misses() {
    let (_dir, app) = app();

    let (status, body) = call(app.clone(), "/doc/3").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["title"], "Shock waves");
    assert_eq!(json["text"], "supersonic flow with an attached shock wave");

    let (status, body) = call(app, "/doc/999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"], "Document not found");
}

#[tokio::test]
async fn health_is_ok() {
    let (_dir, app) = app();
    let (status, body) = call(app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(&body[..], b"ok");
}

#[test]
fn missing_artifacts_fail_at_startup() {
    let dir = tempdir().unwrap();
    assert!(cranfield_server::build_app(dir.path()).is_err());
}
