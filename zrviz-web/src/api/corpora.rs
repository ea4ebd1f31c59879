//! Corpus-level endpoints

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use zrviz_common::db::Corpus;

use super::access::authorize_corpus;
use crate::db::places::{self, PlaceName, PlaceSuggestion};
use crate::db::{corpora, topics};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct AutocompleteQuery {
    pub term: String,
}

/// One exported situation frame; keys serialise in sorted order
#[derive(Debug, Serialize)]
pub struct SituationFrame {
    #[serde(rename = "DocumentID")]
    pub document_id: String,
    #[serde(rename = "Place_KB_ID", skip_serializing_if = "Option::is_none")]
    pub place_kb_id: Option<String>,
    #[serde(rename = "Type")]
    pub frame_type: String,
    #[serde(rename = "TypeConfidence")]
    pub type_confidence: f64,
}

/// GET /api/corpora
pub async fn list_corpora(State(state): State<AppState>) -> ApiResult<Json<Vec<Corpus>>> {
    Ok(Json(corpora::list_corpora(&state.db).await?))
}

/// GET /api/corpora/:corpus_id/situation_frames
///
/// Pretty-printed JSON array with a trailing newline.
pub async fn situation_frames(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(corpus_id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    authorize_corpus(&state, &headers, corpus_id).await?;

    let frames: Vec<SituationFrame> = topics::situation_frames(&state.db, corpus_id)
        .await?
        .into_iter()
        .map(|row| SituationFrame {
            document_id: row.audio_identifier,
            place_kb_id: row.place_kb_id,
            frame_type: row.topic_label,
            type_confidence: 1.0,
        })
        .collect();

    let mut body = serde_json::to_string_pretty(&frames)
        .map_err(|e| ApiError::Internal(format!("Failed to serialise situation frames: {}", e)))?;
    body.push('\n');

    Ok(([(header::CONTENT_TYPE, "application/json")], body))
}

/// GET /api/corpora/:corpus_id/places/english?term=
pub async fn english_place_autocomplete(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(corpus_id): Path<i64>,
    Query(query): Query<AutocompleteQuery>,
) -> ApiResult<Json<Vec<PlaceSuggestion>>> {
    authorize_corpus(&state, &headers, corpus_id).await?;
    let suggestions = places::autocomplete(&state.db, corpus_id, PlaceName::English, &query.term).await?;
    Ok(Json(suggestions))
}

/// GET /api/corpora/:corpus_id/places/native?term=
pub async fn native_place_autocomplete(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(corpus_id): Path<i64>,
    Query(query): Query<AutocompleteQuery>,
) -> ApiResult<Json<Vec<PlaceSuggestion>>> {
    authorize_corpus(&state, &headers, corpus_id).await?;
    let suggestions = places::autocomplete(&state.db, corpus_id, PlaceName::Native, &query.term).await?;
    Ok(Json(suggestions))
}

pub fn corpus_routes() -> Router<AppState> {
    Router::new()
        .route("/api/corpora", get(list_corpora))
        .route("/api/corpora/:corpus_id/situation_frames", get(situation_frames))
        .route("/api/corpora/:corpus_id/places/english", get(english_place_autocomplete))
        .route("/api/corpora/:corpus_id/places/native", get(native_place_autocomplete))
}
