//! Corpus wordcloud

use serde::Serialize;
use sqlx::SqlitePool;
use zrviz_common::Result;

use super::stats::{corpus_term_stats, fragment_ids_by_term};
use super::Wordcloud;

#[derive(Debug, Clone, Serialize)]
pub struct CorpusTerm {
    pub label: String,
    pub zr_term_index: i64,
    pub id: i64,
    pub term_id: i64,
    pub corpus_id: i64,
    pub audio_fragment_ids: Vec<i64>,
    pub total_audio_fragments: i64,
    pub total_documents: i64,
}

/// Most frequent terms of a corpus
///
/// Two queries: the grouped counts and the fragment id list.
pub async fn corpus_wordcloud(
    pool: &SqlitePool,
    corpus_id: i64,
    limit: Option<usize>,
) -> Result<Wordcloud<CorpusTerm>> {
    let stats = corpus_term_stats(pool, corpus_id, limit).await?;
    let mut fragment_ids = fragment_ids_by_term(pool, corpus_id).await?;

    let terms = stats
        .into_iter()
        .map(|s| CorpusTerm {
            audio_fragment_ids: fragment_ids.remove(&s.term_id).unwrap_or_default(),
            label: s.label,
            zr_term_index: s.zr_term_index,
            id: s.term_id,
            term_id: s.term_id,
            corpus_id,
            total_audio_fragments: s.fragment_count,
            total_documents: s.document_count,
        })
        .collect();

    Ok(Wordcloud::new(terms))
}
