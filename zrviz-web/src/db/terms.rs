//! Term persistence
//!
//! Terms carry no corpus column. Their corpus is the corpus of the documents
//! their fragments belong to.

use sqlx::{SqliteExecutor, SqlitePool};
use zrviz_common::db::Term;
use zrviz_common::{Error, Result};

use super::not_found;

pub async fn insert_term<'c>(
    executor: impl SqliteExecutor<'c>,
    label: &str,
    zr_term_index: i64,
) -> Result<i64> {
    let id = sqlx::query("INSERT INTO terms (label, zr_term_index) VALUES (?, ?)")
        .bind(label)
        .bind(zr_term_index)
        .execute(executor)
        .await?
        .last_insert_rowid();

    Ok(id)
}

pub async fn get_term(pool: &SqlitePool, term_id: i64) -> Result<Term> {
    sqlx::query_as::<_, Term>("SELECT id, label, zr_term_index FROM terms WHERE id = ?")
        .bind(term_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| not_found("Term", term_id))
}

/// Load a term only if at least one of its fragments lies in `corpus_id`
pub async fn get_corpus_term(pool: &SqlitePool, corpus_id: i64, term_id: i64) -> Result<Term> {
    sqlx::query_as::<_, Term>(
        r#"
        SELECT t.id, t.label, t.zr_term_index
        FROM terms t
        WHERE t.id = ?
          AND EXISTS (
              SELECT 1
              FROM audio_fragments af
              JOIN documents d ON d.id = af.document_id
              WHERE af.term_id = t.id AND d.corpus_id = ?
          )
        "#,
    )
    .bind(term_id)
    .bind(corpus_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| not_found("Term", term_id))
}

pub async fn update_label(pool: &SqlitePool, term_id: i64, label: &str) -> Result<()> {
    if label.trim().is_empty() {
        return Err(Error::InvalidInput("Term label must not be empty".to_string()));
    }

    let result = sqlx::query("UPDATE terms SET label = ? WHERE id = ?")
        .bind(label)
        .bind(term_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(not_found("Term", term_id));
    }
    Ok(())
}

/// Every term with at least one fragment in the corpus, by term index
pub async fn terms_for_corpus(pool: &SqlitePool, corpus_id: i64) -> Result<Vec<Term>> {
    let terms = sqlx::query_as::<_, Term>(
        r#"
        SELECT DISTINCT t.id, t.label, t.zr_term_index
        FROM terms t
        JOIN audio_fragments af ON af.term_id = t.id
        JOIN documents d ON d.id = af.document_id
        WHERE d.corpus_id = ?
        ORDER BY t.zr_term_index ASC, t.id ASC
        "#,
    )
    .bind(corpus_id)
    .fetch_all(pool)
    .await?;

    Ok(terms)
}

/// Corpus of the term's first fragment
pub async fn term_corpus_id(pool: &SqlitePool, term_id: i64) -> Result<i64> {
    sqlx::query_scalar::<_, i64>(
        r#"
        SELECT d.corpus_id
        FROM audio_fragments af
        JOIN documents d ON d.id = af.document_id
        WHERE af.term_id = ?
        ORDER BY af.id ASC
        LIMIT 1
        "#,
    )
    .bind(term_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| not_found("Term", term_id))
}
