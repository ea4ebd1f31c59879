//! Document endpoints: listing, detail, topics and transcripts

use std::collections::BTreeMap;

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use zrviz_common::db::{Document, DocumentTranscript};

use super::access::authorize_corpus;
use super::ToggleAction;
use crate::db::{documents, fragments, places, topics, transcripts};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct DocumentDetail {
    pub corpus_id: i64,
    pub document_id: i64,
    pub document_index: i64,
    pub document_audio_identifier: String,
    /// Seconds
    pub document_duration: f64,
    pub previous_document_id: i64,
    pub next_document_id: i64,
    pub document_transcript: DocumentTranscript,
}

#[derive(Debug, Serialize)]
pub struct DocumentFragment {
    pub audio_fragment_id: i64,
    pub start_offset: i64,
    pub end_offset: i64,
}

#[derive(Debug, Serialize)]
pub struct TopicEntry {
    pub label: String,
    pub description: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub selected: bool,
}

#[derive(Debug, Deserialize)]
pub struct TopicToggleRequest {
    pub document_topic_id: i64,
    pub action: ToggleAction,
    /// Knowledge-base id of a place to record with the label
    #[serde(default)]
    pub place_kb_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TranscriptUpdateRequest {
    pub text: String,
}

/// Load the corpus (checking access) and a document inside it
async fn load_document(
    state: &AppState,
    headers: &HeaderMap,
    corpus_id: i64,
    document_id: i64,
) -> ApiResult<Document> {
    authorize_corpus(state, headers, corpus_id).await?;
    Ok(documents::get_corpus_document(&state.db, corpus_id, document_id).await?)
}

/// GET /api/corpora/:corpus_id/documents
pub async fn list_documents(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(corpus_id): Path<i64>,
) -> ApiResult<Json<Vec<Document>>> {
    authorize_corpus(&state, &headers, corpus_id).await?;
    Ok(Json(documents::list_documents(&state.db, corpus_id).await?))
}

/// GET /api/corpora/:corpus_id/documents/:document_id
pub async fn document_detail(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((corpus_id, document_id)): Path<(i64, i64)>,
) -> ApiResult<Json<DocumentDetail>> {
    let document = load_document(&state, &headers, corpus_id, document_id).await?;
    let neighbours = documents::neighbours(&state.db, &document).await?;
    let transcript = transcripts::get_or_create(&state.db, document.id).await?;

    Ok(Json(DocumentDetail {
        corpus_id,
        document_id: document.id,
        document_index: document.document_index,
        document_duration: document.duration_in_seconds(),
        document_audio_identifier: document.audio_identifier,
        previous_document_id: neighbours.previous_document_id,
        next_document_id: neighbours.next_document_id,
        document_transcript: transcript,
    }))
}

/// GET /api/corpora/:corpus_id/documents/:document_id/audio_fragments
pub async fn document_fragments(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((corpus_id, document_id)): Path<(i64, i64)>,
) -> ApiResult<Json<Vec<DocumentFragment>>> {
    let document = load_document(&state, &headers, corpus_id, document_id).await?;

    let fragments = fragments::fragments_for_document(&state.db, document.id)
        .await?
        .into_iter()
        .map(|f| DocumentFragment {
            audio_fragment_id: f.id,
            start_offset: f.start_offset,
            end_offset: f.end_offset,
        })
        .collect();

    Ok(Json(fragments))
}

/// GET /api/corpora/:corpus_id/documents/:document_id/topics
///
/// Every topic of the corpus keyed by id, with `selected` set on the ones the
/// document is tagged with.
pub async fn document_topics(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((corpus_id, document_id)): Path<(i64, i64)>,
) -> ApiResult<Json<BTreeMap<i64, TopicEntry>>> {
    let document = load_document(&state, &headers, corpus_id, document_id).await?;
    let selected = topics::topic_ids_for_document(&state.db, document.id).await?;

    let entries = topics::list_topics(&state.db, corpus_id)
        .await?
        .into_iter()
        .map(|topic| {
            let entry = TopicEntry {
                selected: selected.contains(&topic.id),
                label: topic.label,
                description: topic.description,
            };
            (topic.id, entry)
        })
        .collect();

    Ok(Json(entries))
}

/// POST /api/corpora/:corpus_id/documents/:document_id/topics
pub async fn toggle_document_topic(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((corpus_id, document_id)): Path<(i64, i64)>,
    Json(request): Json<TopicToggleRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let document = load_document(&state, &headers, corpus_id, document_id).await?;
    let topic = topics::get_topic(&state.db, request.document_topic_id).await?;
    if topic.corpus_id != corpus_id {
        return Err(ApiError::NotFound(format!("DocumentTopic {}", topic.id)));
    }

    match request.action {
        ToggleAction::Add => {
            let place_id = match request.place_kb_id.as_deref() {
                Some(kb_id) => Some(places::find_by_kb_id(&state.db, corpus_id, kb_id).await?.id),
                None => None,
            };
            topics::tag_document(&state.db, document.id, topic.id, place_id).await?;
            info!("Tagged document {} with topic '{}'", document.id, topic.label);
        }
        ToggleAction::Remove => {
            topics::untag_document(&state.db, document.id, topic.id).await?;
            info!("Untagged document {} from topic '{}'", document.id, topic.label);
        }
    }

    Ok(Json(serde_json::json!({})))
}

/// GET /api/corpora/:corpus_id/documents/:document_id/transcript
pub async fn get_transcript(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((corpus_id, document_id)): Path<(i64, i64)>,
) -> ApiResult<Json<DocumentTranscript>> {
    let document = load_document(&state, &headers, corpus_id, document_id).await?;
    Ok(Json(transcripts::get_or_create(&state.db, document.id).await?))
}

/// POST /api/corpora/:corpus_id/documents/:document_id/transcript
pub async fn update_transcript(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((corpus_id, document_id)): Path<(i64, i64)>,
    Json(request): Json<TranscriptUpdateRequest>,
) -> ApiResult<Json<DocumentTranscript>> {
    let document = load_document(&state, &headers, corpus_id, document_id).await?;
    let transcript = transcripts::update_text(&state.db, document.id, &request.text).await?;
    info!("Updated transcript of document {}", document.id);
    Ok(Json(transcript))
}

pub fn document_routes() -> Router<AppState> {
    Router::new()
        .route("/api/corpora/:corpus_id/documents", get(list_documents))
        .route("/api/corpora/:corpus_id/documents/:document_id", get(document_detail))
        .route(
            "/api/corpora/:corpus_id/documents/:document_id/audio_fragments",
            get(document_fragments),
        )
        .route(
            "/api/corpora/:corpus_id/documents/:document_id/topics",
            get(document_topics).post(toggle_document_topic),
        )
        .route(
            "/api/corpora/:corpus_id/documents/:document_id/transcript",
            get(get_transcript).post(update_transcript),
        )
}
