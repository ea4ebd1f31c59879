//! Term endpoints: occurrences, categories and label edits

use std::collections::BTreeMap;

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use zrviz_common::db::Term;

use super::access::authorize_corpus;
use super::ToggleAction;
use crate::db::fragments::{self, TermOccurrence};
use crate::db::{categories, terms};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct CategoryEntry {
    pub name: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub selected: bool,
}

#[derive(Debug, Deserialize)]
pub struct CategoryToggleRequest {
    pub term_category_id: i64,
    pub action: ToggleAction,
}

#[derive(Debug, Deserialize)]
pub struct LabelUpdateRequest {
    pub label: String,
}

/// GET /api/corpora/:corpus_id/terms/:term_id/audio_fragments
pub async fn term_fragments(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((corpus_id, term_id)): Path<(i64, i64)>,
) -> ApiResult<Json<Vec<TermOccurrence>>> {
    authorize_corpus(&state, &headers, corpus_id).await?;
    let term = terms::get_corpus_term(&state.db, corpus_id, term_id).await?;
    Ok(Json(fragments::occurrences_for_term(&state.db, term.id).await?))
}

/// GET /api/corpora/:corpus_id/terms/:term_id/categories
pub async fn term_categories(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((corpus_id, term_id)): Path<(i64, i64)>,
) -> ApiResult<Json<BTreeMap<i64, CategoryEntry>>> {
    authorize_corpus(&state, &headers, corpus_id).await?;
    let term = terms::get_corpus_term(&state.db, corpus_id, term_id).await?;
    let selected = categories::category_ids_for_term(&state.db, term.id).await?;

    let entries = categories::list_categories(&state.db, corpus_id)
        .await?
        .into_iter()
        .map(|category| {
            let entry = CategoryEntry {
                selected: selected.contains(&category.id),
                name: category.name,
            };
            (category.id, entry)
        })
        .collect();

    Ok(Json(entries))
}

/// POST /api/corpora/:corpus_id/terms/:term_id/categories
pub async fn toggle_term_category(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((corpus_id, term_id)): Path<(i64, i64)>,
    Json(request): Json<CategoryToggleRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    authorize_corpus(&state, &headers, corpus_id).await?;
    let term = terms::get_corpus_term(&state.db, corpus_id, term_id).await?;
    let category = categories::get_category(&state.db, request.term_category_id).await?;
    if category.corpus_id != corpus_id {
        return Err(ApiError::NotFound(format!("TermCategory {}", category.id)));
    }

    match request.action {
        ToggleAction::Add => categories::attach_term(&state.db, category.id, term.id).await?,
        ToggleAction::Remove => categories::detach_term(&state.db, category.id, term.id).await?,
    }
    info!("{:?} category '{}' on term {}", request.action, category.name, term.id);

    Ok(Json(serde_json::json!({})))
}

/// POST /api/terms/:term_id
///
/// The corpus is inferred from the term's fragments.
pub async fn update_term_label(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(term_id): Path<i64>,
    Json(request): Json<LabelUpdateRequest>,
) -> ApiResult<Json<Term>> {
    let corpus_id = terms::term_corpus_id(&state.db, term_id).await?;
    authorize_corpus(&state, &headers, corpus_id).await?;

    terms::update_label(&state.db, term_id, &request.label).await?;
    info!("Relabelled term {} as '{}'", term_id, request.label);

    Ok(Json(terms::get_term(&state.db, term_id).await?))
}

pub fn term_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/corpora/:corpus_id/terms/:term_id/audio_fragments",
            get(term_fragments),
        )
        .route(
            "/api/corpora/:corpus_id/terms/:term_id/categories",
            get(term_categories).post(toggle_term_category),
        )
        .route("/api/terms/:term_id", post(update_term_label))
}
