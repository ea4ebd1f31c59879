//! HTTP API integration tests
//!
//! Requests go through the full router with `tower::ServiceExt::oneshot`.

mod helpers;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use helpers::CorpusFixture;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower::ServiceExt;
use zrviz_common::config::TomlConfig;
use zrviz_common::db::init_memory_database;
use zrviz_web::db::{categories, corpora, places, topics};
use zrviz_web::import::CorpusImporter;
use zrviz_web::{build_router, AppState};

const TOKEN: &str = "s3cret";

struct TestApp {
    app: Router,
    pool: SqlitePool,
    corpus_id: i64,
    fixture: CorpusFixture,
}

async fn setup_with_token(token: Option<&str>) -> TestApp {
    let pool = init_memory_database().await.unwrap();
    let fixture = CorpusFixture::new();
    let summary = CorpusImporter::new(pool.clone())
        .import(&fixture.request("buckeye"))
        .await
        .unwrap();

    let mut config = TomlConfig::default();
    config.server.access_token = token.map(str::to_string);
    let state = AppState::new(pool.clone(), &config, fixture.root().join("tmp"));

    TestApp {
        app: build_router(state),
        pool,
        corpus_id: summary.corpus_id,
        fixture,
    }
}

async fn setup() -> TestApp {
    setup_with_token(Some(TOKEN)).await
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn get_with_token(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Option<String>, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let body = response.into_body().collect().await.unwrap().to_bytes().to_vec();
    (status, content_type, body)
}

async fn send_json(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, _, body) = send(app, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_health_endpoint() {
    let t = setup().await;

    let (status, json) = send_json(&t.app, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["module"], "zrviz-web");
    assert!(json["version"].is_string());
    assert!(json["uptime_seconds"].is_u64());
}

#[tokio::test]
async fn test_list_corpora() {
    let t = setup().await;

    let (status, json) = send_json(&t.app, get("/api/corpora")).await;

    assert_eq!(status, StatusCode::OK);
    let corpora = json.as_array().unwrap();
    assert_eq!(corpora.len(), 1);
    assert_eq!(corpora[0]["name"], "buckeye");
    assert_eq!(corpora[0]["audio_rate"], 16000);
}

#[tokio::test]
async fn test_corpus_wordcloud_shape() {
    let t = setup().await;
    let uri = format!("/api/corpora/{}/wordcloud", t.corpus_id);

    let (status, json) = send_json(&t.app, get(&uri)).await;

    assert_eq!(status, StatusCode::OK);
    let terms = json["terms"].as_array().unwrap();
    assert_eq!(terms.len(), 3);
    assert_eq!(terms[0]["label"], "pt0");
    assert_eq!(terms[0]["zr_term_index"], 0);
    assert_eq!(terms[0]["total_audio_fragments"], 3);
    assert_eq!(terms[0]["total_documents"], 2);
    assert_eq!(terms[0]["audio_fragment_ids"].as_array().unwrap().len(), 3);
    assert_eq!(terms[0]["id"], terms[0]["term_id"]);
}

#[tokio::test]
async fn test_document_detail_and_neighbours() {
    let t = setup().await;
    let uri = format!("/api/corpora/{}/documents/1", t.corpus_id);

    let (status, json) = send_json(&t.app, get(&uri)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["document_id"], 1);
    assert_eq!(json["document_index"], 0);
    assert_eq!(json["document_audio_identifier"], "s01");
    assert_eq!(json["document_duration"], 2.0);
    assert_eq!(json["previous_document_id"], 3);
    assert_eq!(json["next_document_id"], 2);
    assert_eq!(json["document_transcript"]["document_id"], 1);
    assert_eq!(json["document_transcript"]["text"], "");
}

#[tokio::test]
async fn test_document_fragments_and_wordcloud() {
    let t = setup().await;

    let uri = format!("/api/corpora/{}/documents/2/audio_fragments", t.corpus_id);
    let (status, json) = send_json(&t.app, get(&uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json,
        json!([
            {"audio_fragment_id": 3, "start_offset": 20, "end_offset": 80},
            {"audio_fragment_id": 5, "start_offset": 120, "end_offset": 170},
        ])
    );

    let uri = format!("/api/corpora/{}/documents/1/wordcloud", t.corpus_id);
    let (status, json) = send_json(&t.app, get(&uri)).await;
    assert_eq!(status, StatusCode::OK);
    let terms = json["terms"].as_array().unwrap();
    assert_eq!(terms.len(), 3);
    assert_eq!(terms[1]["first_start_offset_in_document"], 1.0);
    assert!(terms[2]["tf_idf"].as_f64().unwrap() > 0.0);
}

#[tokio::test]
async fn test_unknown_entities_are_404() {
    let t = setup().await;

    for uri in [
        "/api/corpora/99/wordcloud".to_string(),
        format!("/api/corpora/{}/documents/99", t.corpus_id),
        format!("/api/corpora/{}/terms/99/audio_fragments", t.corpus_id),
        format!("/api/corpora/{}/topics/99/wordcloud", t.corpus_id),
    ] {
        let (status, json) = send_json(&t.app, get(&uri)).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{}", uri);
        assert_eq!(json["error"]["code"], "NOT_FOUND");
    }
}

#[tokio::test]
async fn test_document_of_other_corpus_is_404() {
    let t = setup().await;
    let other = CorpusImporter::new(t.pool.clone())
        .import(&t.fixture.request("copy"))
        .await
        .unwrap();

    // Document 4 belongs to the second corpus
    let uri = format!("/api/corpora/{}/documents/4", t.corpus_id);
    let (status, _) = send_json(&t.app, get(&uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let uri = format!("/api/corpora/{}/documents/4", other.corpus_id);
    let (status, _) = send_json(&t.app, get(&uri)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_protected_corpus_requires_token() {
    let t = setup().await;
    corpora::set_protected(&t.pool, t.corpus_id, true).await.unwrap();
    let uri = format!("/api/corpora/{}/wordcloud", t.corpus_id);

    let (status, json) = send_json(&t.app, get(&uri)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"]["code"], "UNAUTHORIZED");

    let (status, _) = send_json(&t.app, get_with_token(&uri, "wrong")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send_json(&t.app, get_with_token(&uri, TOKEN)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_protected_corpus_without_configured_token() {
    let t = setup_with_token(None).await;
    corpora::set_protected(&t.pool, t.corpus_id, true).await.unwrap();
    let uri = format!("/api/corpora/{}/documents", t.corpus_id);

    let (status, _) = send_json(&t.app, get_with_token(&uri, TOKEN)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_topic_toggle_and_topic_views() {
    let t = setup().await;
    let topic_id = topics::insert_topic(&t.pool, t.corpus_id, "flood", "Flooding")
        .await
        .unwrap();
    let topics_uri = format!("/api/corpora/{}/documents/2/topics", t.corpus_id);

    let (status, json) = send_json(&t.app, get(&topics_uri)).await;
    assert_eq!(status, StatusCode::OK);
    let key = topic_id.to_string();
    assert_eq!(json[&key]["label"], "flood");
    assert!(json[&key].get("selected").is_none());

    let (status, _) = send_json(
        &t.app,
        post_json(&topics_uri, json!({"document_topic_id": topic_id, "action": "add"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, json) = send_json(&t.app, get(&topics_uri)).await;
    assert_eq!(json[&key]["selected"], true);

    let uri = format!("/api/corpora/{}/topics/{}/wordcloud", t.corpus_id, topic_id);
    let (status, json) = send_json(&t.app, get(&uri)).await;
    assert_eq!(status, StatusCode::OK);
    let terms = json["terms"].as_array().unwrap();
    assert_eq!(terms.len(), 1);
    assert_eq!(terms[0]["label"], "pt0");
    assert_eq!(terms[0]["total_audio_fragments"], 2);
    assert_eq!(terms[0]["css_class"], "");

    let (status, _) = send_json(
        &t.app,
        post_json(&topics_uri, json!({"document_topic_id": topic_id, "action": "remove"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (_, json) = send_json(&t.app, get(&uri)).await;
    assert!(json["terms"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_topic_params_follow_term_info() {
    let t = setup().await;
    let topic_id = topics::insert_topic(&t.pool, t.corpus_id, "flood", "")
        .await
        .unwrap();

    let uri = format!("/api/topics/{}/wordcloud/params", topic_id);
    let (status, json) = send_json(&t.app, get(&uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["default_sort_key"], "total_audio_fragments");

    topics::insert_term_info(&t.pool, topic_id, 1, "keyword", 0.9).await.unwrap();
    topics::insert_term_info(&t.pool, topic_id, 2, "location", 0.5).await.unwrap();

    let (_, json) = send_json(&t.app, get(&uri)).await;
    assert_eq!(json["default_sort_key"], "term_info_location");
    let sort_keys: Vec<&str> = json["sort_keys"]
        .as_array()
        .unwrap()
        .iter()
        .map(|k| k["key_name"].as_str().unwrap())
        .collect();
    assert!(sort_keys.contains(&"term_info_keyword"));

    let (status, json) = send_json(&t.app, get("/api/wordcloud/params/document")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["default_sort_key"], "first_start_offset_in_document");
}

#[tokio::test]
async fn test_situation_frames_export() {
    let t = setup().await;
    let flood = topics::insert_topic(&t.pool, t.corpus_id, "flood", "").await.unwrap();
    let shelter = topics::insert_topic(&t.pool, t.corpus_id, "shelter", "").await.unwrap();
    places::insert_place(&t.pool, t.corpus_id, "KB-4321", "Kathmandu", "Yen")
        .await
        .unwrap();

    let s01_topics = format!("/api/corpora/{}/documents/1/topics", t.corpus_id);
    let s03_topics = format!("/api/corpora/{}/documents/3/topics", t.corpus_id);
    let (status, _) = send_json(
        &t.app,
        post_json(
            &s01_topics,
            json!({"document_topic_id": flood, "action": "add", "place_kb_id": "KB-4321"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    send_json(
        &t.app,
        post_json(&s03_topics, json!({"document_topic_id": shelter, "action": "add"})),
    )
    .await;

    let uri = format!("/api/corpora/{}/situation_frames", t.corpus_id);
    let (status, content_type, body) = send(&t.app, get(&uri)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("application/json"));
    let text = String::from_utf8(body).unwrap();
    assert!(text.ends_with("]\n"));

    let frames: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(
        frames,
        json!([
            {"DocumentID": "s01", "Place_KB_ID": "KB-4321", "Type": "flood", "TypeConfidence": 1.0},
            {"DocumentID": "s03", "Type": "shelter", "TypeConfidence": 1.0},
        ])
    );
}

#[tokio::test]
async fn test_unknown_place_is_404() {
    let t = setup().await;
    let flood = topics::insert_topic(&t.pool, t.corpus_id, "flood", "").await.unwrap();
    let uri = format!("/api/corpora/{}/documents/1/topics", t.corpus_id);

    let (status, _) = send_json(
        &t.app,
        post_json(
            &uri,
            json!({"document_topic_id": flood, "action": "add", "place_kb_id": "KB-0"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(topics::topic_ids_for_document(&t.pool, 1).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_place_autocomplete() {
    let t = setup().await;
    places::insert_place(&t.pool, t.corpus_id, "KB-1", "Kathmandu", "Yen")
        .await
        .unwrap();
    places::insert_place(&t.pool, t.corpus_id, "KB-2", "Pokhara", "Pokhara")
        .await
        .unwrap();

    let uri = format!("/api/corpora/{}/places/english?term=KATH", t.corpus_id);
    let (status, json) = send_json(&t.app, get(&uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!([{"label": "Kathmandu", "value": "KB-1"}]));

    let uri = format!("/api/corpora/{}/places/native?term=yen", t.corpus_id);
    let (_, json) = send_json(&t.app, get(&uri)).await;
    assert_eq!(json, json!([{"label": "Yen", "value": "KB-1"}]));
}

#[tokio::test]
async fn test_transcript_update() {
    let t = setup().await;
    let uri = format!("/api/corpora/{}/documents/2/transcript", t.corpus_id);

    let (status, json) = send_json(&t.app, post_json(&uri, json!({"text": "water is rising"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["text"], "water is rising");

    let (_, json) = send_json(&t.app, get(&uri)).await;
    assert_eq!(json["text"], "water is rising");
    assert_eq!(json["document_id"], 2);
}

#[tokio::test]
async fn test_term_label_update() {
    let t = setup().await;

    let (status, json) = send_json(&t.app, post_json("/api/terms/1", json!({"label": "water"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["label"], "water");
    assert_eq!(json["zr_term_index"], 0);

    let (status, json) = send_json(&t.app, post_json("/api/terms/1", json!({"label": "  "}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "BAD_REQUEST");

    // pt3 never occurs, so it belongs to no corpus
    let (status, _) = send_json(&t.app, post_json("/api/terms/4", json!({"label": "x"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_term_occurrences_and_categories() {
    let t = setup().await;

    let uri = format!("/api/corpora/{}/terms/2/audio_fragments", t.corpus_id);
    let (status, json) = send_json(&t.app, get(&uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json,
        json!([
            {"duration": 50, "audio_identifier": "s01", "document_id": 1, "document_index": 0},
            {"duration": 25, "audio_identifier": "s03", "document_id": 3, "document_index": 2},
        ])
    );

    let category = categories::insert_category(&t.pool, t.corpus_id, "weather").await.unwrap();
    let uri = format!("/api/corpora/{}/terms/2/categories", t.corpus_id);
    let (status, _) = send_json(
        &t.app,
        post_json(&uri, json!({"term_category_id": category, "action": "add"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, json) = send_json(&t.app, get(&uri)).await;
    let key = category.to_string();
    assert_eq!(json[&key]["name"], "weather");
    assert_eq!(json[&key]["selected"], true);

    send_json(
        &t.app,
        post_json(&uri, json!({"term_category_id": category, "action": "remove"})),
    )
    .await;
    let (_, json) = send_json(&t.app, get(&uri)).await;
    assert!(json[&key].get("selected").is_none());
}

#[tokio::test]
async fn test_wav_endpoints() {
    let t = setup().await;

    let uri = format!("/api/corpora/{}/documents/1/wav", t.corpus_id);
    let (status, content_type, body) = send(&t.app, get(&uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("audio/wav"));
    assert_eq!(body, std::fs::read(t.fixture.audio_path("s01")).unwrap());

    let uri = format!("/api/corpora/{}/terms/1/wav", t.corpus_id);
    let (status, content_type, body) = send(&t.app, get(&uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("audio/wav"));

    let reader = hound::WavReader::new(std::io::Cursor::new(body)).unwrap();
    assert_eq!(reader.spec().sample_rate, 16000);
    // Fragments 1, 3 and 5: 0.5 s + 0.6 s + 0.5 s
    let frames = reader.duration() as i64;
    assert!((frames - 25600).abs() <= 3, "unexpected frame count {}", frames);

    let scratch = t.fixture.root().join("tmp");
    assert_eq!(std::fs::read_dir(scratch).unwrap().count(), 0);
}

#[tokio::test]
async fn test_missing_document_audio_is_server_error() {
    let t = setup().await;
    std::fs::remove_file(t.fixture.audio_path("s02")).unwrap();

    let uri = format!("/api/corpora/{}/documents/2/wav", t.corpus_id);
    let (status, json) = send_json(&t.app, get(&uri)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"]["code"], "IO_ERROR");
}
