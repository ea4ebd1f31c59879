//! Protected corpus access
//!
//! A protected corpus is served only to requests carrying
//! `Authorization: Bearer <token>` with the configured token. When no token is
//! configured, protected corpora are refused outright.

use axum::http::{header::AUTHORIZATION, HeaderMap};
use tracing::warn;
use zrviz_common::db::Corpus;

use crate::db::corpora;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Load a corpus, enforcing its protection flag
pub async fn authorize_corpus(state: &AppState, headers: &HeaderMap, corpus_id: i64) -> ApiResult<Corpus> {
    let corpus = corpora::get_corpus(&state.db, corpus_id).await?;
    if corpus.protected_corpus {
        check_token(state.access_token.as_deref(), headers)?;
    }
    Ok(corpus)
}

fn check_token(expected: Option<&str>, headers: &HeaderMap) -> ApiResult<()> {
    let Some(expected) = expected else {
        warn!("Refusing protected corpus: no access token configured");
        return Err(ApiError::Unauthorized("Corpus is protected".to_string()));
    };

    match bearer_token(headers) {
        Some(provided) if provided == expected => Ok(()),
        Some(_) => Err(ApiError::Unauthorized("Invalid access token".to_string())),
        None => Err(ApiError::Unauthorized("Access token required".to_string())),
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}
