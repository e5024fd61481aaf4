use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::{json, Value};

use review_recs::{
    api::{create_router, AppState},
    data::Catalog,
    models::{Business, CategoriesField, RawReview},
    services::{
        embedding::HashingEmbedder, sentiment::LexiconSentiment, ProfileBuilder, Recommender,
    },
    store::{ArtifactCache, FileArtifactStore},
};

fn business(id: &str, name: &str, categories: &str) -> Business {
    Business::new(id, name, CategoriesField::Text(categories.to_string()))
}

fn test_catalog() -> Catalog {
    let businesses = vec![
        business("p1", "Luigi's", "Italian, Pizza"),
        business("p2", "Tony's", "Pizza, Italian"),
        business("p3", "Mama Mia", "['Italian', 'Pasta']"),
        business("t1", "Tire Shop", "Automotive"),
        business("q1", "Quiet Place", "Italian"),
    ];
    let reviews = vec![
        RawReview::new("r1", "p1", "great pizza with fresh basil"),
        RawReview::new("r2", "p2", "pizza crust and basil"),
        RawReview::new("r3", "p1", "pizza crust was perfect"),
        RawReview::new("r4", "p3", "pasta and pizza nice"),
        RawReview::new("r5", "t1", "brake pads alignment oil change"),
        RawReview::new("r6", "p2", "good pizza"),
    ];
    Catalog::new(businesses, reviews)
}

fn create_test_server() -> (TestServer, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let cache = Arc::new(ArtifactCache::new(Arc::new(FileArtifactStore::new(dir.path()))));
    let builder = ProfileBuilder::new(
        cache,
        Arc::new(HashingEmbedder::new(64)),
        Arc::new(LexiconSentiment::new()),
    );
    let state = AppState::new(test_catalog(), builder, Recommender::new(10, 5));
    let app = create_router(state);
    (TestServer::new(app).unwrap(), dir)
}

#[tokio::test]
async fn test_health_check() {
    let (server, _dir) = create_test_server();
    let response = server.get("/health").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_similarity_recommendations() {
    let (server, _dir) = create_test_server();

    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({ "seed_ids": ["p1"] }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["is_fallback"], false);
    assert_eq!(body["business_ids"], json!(["p2", "p3"]));
    assert_eq!(body["items"][0]["name"], "Tony's");
    assert_eq!(body["items"][1]["categories"], json!(["Italian", "Pasta"]));
    assert!(!body["log"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_category_fallback() {
    let (server, _dir) = create_test_server();

    // q1 has no reviews, so its profile is all zeros
    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({ "seed_ids": ["q1"] }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["is_fallback"], true);
    assert_eq!(body["business_ids"], json!(["p1", "p2", "p3"]));
}

#[tokio::test]
async fn test_fallback_without_overlap_is_empty() {
    let (server, _dir) = create_test_server();

    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({ "seed_ids": ["t1"], "limit": 3 }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["is_fallback"], true);
    assert_eq!(body["business_ids"], json!([]));
}

#[tokio::test]
async fn test_empty_and_unknown_seeds() {
    let (server, _dir) = create_test_server();

    for seeds in [json!([]), json!(["nope"])] {
        let response = server
            .post("/api/v1/recommendations")
            .json(&json!({ "seed_ids": seeds }))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["business_ids"], json!([]));
        assert_eq!(body["is_fallback"], false);
    }
}

#[tokio::test]
async fn test_malformed_request_is_rejected() {
    let (server, _dir) = create_test_server();

    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({ "seeds": "p1" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = server.post("/api/v1/recommendations").text("{oops").await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_rebuild_profiles() {
    let (server, dir) = create_test_server();

    let response = server.post("/api/v1/profiles/rebuild").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["profiles"], 5);
    assert_eq!(body["vector_len"], 65);
    assert_eq!(
        body["recomputed"],
        json!(["aggregated_text", "sentiment_scores", "item_profiles"])
    );
    assert!(dir.path().join("item_profiles_d64.json").is_file());

    let response = server
        .post("/api/v1/profiles/rebuild")
        .json(&json!({ "artifacts": ["sentiment_scores"] }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["recomputed"], json!(["sentiment_scores"]));
}

#[tokio::test]
async fn test_rebuild_rejects_unknown_artifact() {
    let (server, _dir) = create_test_server();

    let response = server
        .post("/api/v1/profiles/rebuild")
        .json(&json!({ "artifacts": ["bogus_name"] }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("invalid rebuild request"));

    let response = server.post("/api/v1/profiles/rebuild").text("{oops").await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_invalidate_artifact() {
    let (server, dir) = create_test_server();
    let profiles_file = dir.path().join("item_profiles_d64.json");

    server
        .post("/api/v1/recommendations")
        .json(&json!({ "seed_ids": ["p1"] }))
        .await
        .assert_status_ok();
    assert!(profiles_file.is_file());

    let response = server.delete("/api/v1/artifacts/item_profiles").await;
    response.assert_status(StatusCode::NO_CONTENT);
    assert!(!profiles_file.is_file());

    // Rebuilt on the next request
    server
        .post("/api/v1/recommendations")
        .json(&json!({ "seed_ids": ["p1"] }))
        .await
        .assert_status_ok();
    assert!(profiles_file.is_file());

    let response = server.delete("/api/v1/artifacts/not_an_artifact").await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_item() {
    let (server, _dir) = create_test_server();

    let response = server.get("/api/v1/items/p3").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["name"], "Mama Mia");
    assert_eq!(body["categories"], json!(["Italian", "Pasta"]));

    let response = server.get("/api/v1/items/missing").await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let (server, _dir) = create_test_server();

    let response = server
        .get("/health")
        .add_header(
            HeaderName::from_static("x-request-id"),
            HeaderValue::from_static("trace-7"),
        )
        .await;
    assert_eq!(response.header("x-request-id"), "trace-7");

    let response = server.get("/health").await;
    let generated = response.header("x-request-id");
    assert_eq!(generated.to_str().unwrap().len(), 36);
}
