//! WAV endpoints
//!
//! Rendering runs on the blocking pool; the handler only awaits the result.

use std::path::PathBuf;

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap},
    response::IntoResponse,
    routing::get,
    Router,
};
use tracing::debug;

use super::access::authorize_corpus;
use crate::db::{documents, fragments, terms};
use crate::error::ApiResult;
use crate::AppState;

const WAV_CONTENT_TYPE: &str = "audio/wav";

fn wav_response(bytes: Vec<u8>) -> impl IntoResponse {
    ([(header::CONTENT_TYPE, WAV_CONTENT_TYPE)], bytes)
}

/// GET /api/corpora/:corpus_id/documents/:document_id/wav
pub async fn document_wav(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((corpus_id, document_id)): Path<(i64, i64)>,
) -> ApiResult<impl IntoResponse> {
    authorize_corpus(&state, &headers, corpus_id).await?;
    let document = documents::get_corpus_document(&state.db, corpus_id, document_id).await?;

    let renderer = state.renderer.clone();
    let audio_path = PathBuf::from(&document.audio_path);
    let bytes =
        tokio::task::spawn_blocking(move || renderer.render_document_wav(&audio_path)).await??;

    debug!("Serving {} bytes for document {}", bytes.len(), document.id);
    Ok(wav_response(bytes))
}

/// GET /api/corpora/:corpus_id/terms/:term_id/wav
///
/// Splices the term's first `term_clip_limit` fragments at the corpus format.
pub async fn term_wav(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((corpus_id, term_id)): Path<(i64, i64)>,
) -> ApiResult<impl IntoResponse> {
    let corpus = authorize_corpus(&state, &headers, corpus_id).await?;
    let term = terms::get_corpus_term(&state.db, corpus_id, term_id).await?;
    let clips = fragments::clip_sources(&state.db, term.id, state.views.term_clip_limit).await?;

    let renderer = state.renderer.clone();
    let format = corpus.audio_format();
    let bytes = tokio::task::spawn_blocking(move || renderer.render_term_wav(&clips, format)).await??;

    debug!("Serving {} bytes for term {}", bytes.len(), term.id);
    Ok(wav_response(bytes))
}

pub fn audio_routes() -> Router<AppState> {
    Router::new()
        .route("/api/corpora/:corpus_id/documents/:document_id/wav", get(document_wav))
        .route("/api/corpora/:corpus_id/terms/:term_id/wav", get(term_wav))
}
