//! Wordcloud views and their parameter descriptors

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    routing::get,
    Json, Router,
};

use super::access::authorize_corpus;
use crate::aggregate::{
    self, CorpusTerm, DocumentTerm, TopicTerm, Wordcloud, WordcloudParams,
};
use crate::db::{documents, topics};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// GET /api/corpora/:corpus_id/wordcloud
pub async fn corpus_wordcloud(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(corpus_id): Path<i64>,
) -> ApiResult<Json<Wordcloud<CorpusTerm>>> {
    authorize_corpus(&state, &headers, corpus_id).await?;
    let wordcloud = aggregate::corpus_wordcloud(&state.db, corpus_id, state.views.term_limit()).await?;
    Ok(Json(wordcloud))
}

/// GET /api/corpora/:corpus_id/documents/:document_id/wordcloud
pub async fn document_wordcloud(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((corpus_id, document_id)): Path<(i64, i64)>,
) -> ApiResult<Json<Wordcloud<DocumentTerm>>> {
    authorize_corpus(&state, &headers, corpus_id).await?;
    let document = documents::get_corpus_document(&state.db, corpus_id, document_id).await?;
    Ok(Json(aggregate::document_wordcloud(&state.db, corpus_id, document.id).await?))
}

/// GET /api/corpora/:corpus_id/topics/:topic_id/wordcloud
pub async fn topic_wordcloud(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((corpus_id, topic_id)): Path<(i64, i64)>,
) -> ApiResult<Json<Wordcloud<TopicTerm>>> {
    authorize_corpus(&state, &headers, corpus_id).await?;
    let topic = topics::get_topic(&state.db, topic_id).await?;
    if topic.corpus_id != corpus_id {
        return Err(ApiError::NotFound(format!("DocumentTopic {}", topic_id)));
    }
    Ok(Json(aggregate::topic_wordcloud(&state.db, corpus_id, topic.id).await?))
}

/// GET /api/wordcloud/params/corpus
pub async fn corpus_params() -> Json<WordcloudParams> {
    Json(aggregate::corpus_params())
}

/// GET /api/wordcloud/params/document
pub async fn document_params() -> Json<WordcloudParams> {
    Json(aggregate::document_params())
}

/// GET /api/topics/:topic_id/wordcloud/params
pub async fn topic_params(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(topic_id): Path<i64>,
) -> ApiResult<Json<WordcloudParams>> {
    let topic = topics::get_topic(&state.db, topic_id).await?;
    authorize_corpus(&state, &headers, topic.corpus_id).await?;

    let categories = topics::term_info_categories(&state.db, topic.id).await?;
    Ok(Json(aggregate::topic_params(
        &categories,
        state.views.topic_sort_default,
    )))
}

pub fn wordcloud_routes() -> Router<AppState> {
    Router::new()
        .route("/api/corpora/:corpus_id/wordcloud", get(corpus_wordcloud))
        .route(
            "/api/corpora/:corpus_id/documents/:document_id/wordcloud",
            get(document_wordcloud),
        )
        .route(
            "/api/corpora/:corpus_id/topics/:topic_id/wordcloud",
            get(topic_wordcloud),
        )
        .route("/api/wordcloud/params/corpus", get(corpus_params))
        .route("/api/wordcloud/params/document", get(document_params))
        .route("/api/topics/:topic_id/wordcloud/params", get(topic_params))
}
