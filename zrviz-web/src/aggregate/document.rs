//! Document wordcloud with TF-IDF

use std::collections::HashMap;

use serde::Serialize;
use sqlx::{FromRow, SqlitePool};
use zrviz_common::Result;

use super::stats::{fragment_ids_by_term, tf_idf};
use super::{serialize_seconds, Wordcloud};
use crate::db::corpora;

#[derive(Debug, Clone, Serialize)]
pub struct DocumentTerm {
    pub label: String,
    pub zr_term_index: i64,
    pub id: i64,
    pub term_id: i64,
    pub corpus_id: i64,
    pub audio_fragment_ids: Vec<i64>,
    /// Hundredths internally, seconds on the wire
    #[serde(serialize_with = "serialize_seconds")]
    pub first_start_offset_in_document: i64,
    pub tf_idf: f64,
    pub total_audio_fragments: i64,
    pub total_audio_fragments_in_document: i64,
    pub total_documents: i64,
}

#[derive(Debug, FromRow)]
struct InDocumentRow {
    term_id: i64,
    label: String,
    zr_term_index: i64,
    occurrences: i64,
    first_start_offset: i64,
}

#[derive(Debug, FromRow)]
struct CorpusCountRow {
    term_id: i64,
    fragment_count: i64,
    document_count: i64,
}

/// Terms of one document, ordered by first appearance
pub async fn document_wordcloud(
    pool: &SqlitePool,
    corpus_id: i64,
    document_id: i64,
) -> Result<Wordcloud<DocumentTerm>> {
    let total_documents = corpora::count_documents(pool, corpus_id).await?;

    let in_document = sqlx::query_as::<_, InDocumentRow>(
        r#"
        SELECT t.id AS term_id,
               t.label,
               t.zr_term_index,
               COUNT(af.id) AS occurrences,
               MIN(af.start_offset) AS first_start_offset
        FROM audio_fragments af
        JOIN terms t ON t.id = af.term_id
        WHERE af.document_id = ?
        GROUP BY t.id
        ORDER BY first_start_offset ASC, t.id ASC
        "#,
    )
    .bind(document_id)
    .fetch_all(pool)
    .await?;

    let corpus_counts: HashMap<i64, CorpusCountRow> = sqlx::query_as::<_, CorpusCountRow>(
        r#"
        SELECT af.term_id,
               COUNT(af.id) AS fragment_count,
               COUNT(DISTINCT af.document_id) AS document_count
        FROM audio_fragments af
        JOIN documents d ON d.id = af.document_id
        WHERE d.corpus_id = ?
          AND af.term_id IN (SELECT term_id FROM audio_fragments WHERE document_id = ?)
        GROUP BY af.term_id
        "#,
    )
    .bind(corpus_id)
    .bind(document_id)
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(|row| (row.term_id, row))
    .collect();

    let mut fragment_ids = fragment_ids_by_term(pool, corpus_id).await?;

    let terms = in_document
        .into_iter()
        .map(|row| {
            let (total_audio_fragments, total_documents_with_term) = corpus_counts
                .get(&row.term_id)
                .map(|c| (c.fragment_count, c.document_count))
                .unwrap_or((row.occurrences, 1));

            DocumentTerm {
                audio_fragment_ids: fragment_ids.remove(&row.term_id).unwrap_or_default(),
                tf_idf: tf_idf(row.occurrences, total_documents, total_documents_with_term),
                label: row.label,
                zr_term_index: row.zr_term_index,
                id: row.term_id,
                term_id: row.term_id,
                corpus_id,
                first_start_offset_in_document: row.first_start_offset,
                total_audio_fragments,
                total_audio_fragments_in_document: row.occurrences,
                total_documents: total_documents_with_term,
            }
        })
        .collect();

    Ok(Wordcloud::new(terms))
}
