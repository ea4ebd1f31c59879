//! Shared per-term statistics

use std::collections::HashMap;

use serde::Serialize;
use sqlx::{FromRow, SqlitePool};
use zrviz_common::Result;

/// Occurrence counts of one term over some set of documents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct TermStats {
    pub term_id: i64,
    pub label: String,
    pub zr_term_index: i64,
    pub fragment_count: i64,
    pub document_count: i64,
}

/// `occurrences × ln(total_documents / (1 + documents_with_term))`
///
/// Smoothing by one in the denominator makes a term present in every
/// document score negative.
pub fn tf_idf(occurrences: i64, total_documents: i64, documents_with_term: i64) -> f64 {
    occurrences as f64 * (total_documents as f64 / (1.0 + documents_with_term as f64)).ln()
}

/// Fragment ids of every term used in the corpus, in id order
pub async fn fragment_ids_by_term(pool: &SqlitePool, corpus_id: i64) -> Result<HashMap<i64, Vec<i64>>> {
    let pairs: Vec<(i64, i64)> = sqlx::query_as(
        r#"
        SELECT af.term_id, af.id
        FROM audio_fragments af
        JOIN documents d ON d.id = af.document_id
        WHERE d.corpus_id = ?
        ORDER BY af.id ASC
        "#,
    )
    .bind(corpus_id)
    .fetch_all(pool)
    .await?;

    let mut by_term: HashMap<i64, Vec<i64>> = HashMap::new();
    for (term_id, fragment_id) in pairs {
        by_term.entry(term_id).or_default().push(fragment_id);
    }
    Ok(by_term)
}

/// Corpus-wide counts for every term, ordered by fragment count descending
///
/// `limit` of `None` returns every term.
pub async fn corpus_term_stats(
    pool: &SqlitePool,
    corpus_id: i64,
    limit: Option<usize>,
) -> Result<Vec<TermStats>> {
    // SQLite treats a negative LIMIT as no limit.
    let limit = limit.map(|n| n as i64).unwrap_or(-1);

    let stats = sqlx::query_as::<_, TermStats>(
        r#"
        SELECT t.id AS term_id,
               t.label,
               t.zr_term_index,
               COUNT(af.id) AS fragment_count,
               COUNT(DISTINCT af.document_id) AS document_count
        FROM audio_fragments af
        JOIN documents d ON d.id = af.document_id
        JOIN terms t ON t.id = af.term_id
        WHERE d.corpus_id = ?
        GROUP BY t.id
        ORDER BY fragment_count DESC, t.id ASC
        LIMIT ?
        "#,
    )
    .bind(corpus_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(stats)
}

/// Counts restricted to the documents tagged with a topic
pub async fn topic_term_stats(pool: &SqlitePool, corpus_id: i64, topic_id: i64) -> Result<Vec<TermStats>> {
    let stats = sqlx::query_as::<_, TermStats>(
        r#"
        SELECT t.id AS term_id,
               t.label,
               t.zr_term_index,
               COUNT(af.id) AS fragment_count,
               COUNT(DISTINCT af.document_id) AS document_count
        FROM audio_fragments af
        JOIN documents d ON d.id = af.document_id
        JOIN situation_frame_labels sfl ON sfl.document_id = d.id
        JOIN terms t ON t.id = af.term_id
        WHERE d.corpus_id = ? AND sfl.document_topic_id = ?
        GROUP BY t.id
        ORDER BY fragment_count DESC, t.id ASC
        "#,
    )
    .bind(corpus_id)
    .bind(topic_id)
    .fetch_all(pool)
    .await?;

    Ok(stats)
}
