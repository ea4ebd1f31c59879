//! Corpus persistence

use sqlx::{SqliteExecutor, SqlitePool};
use zrviz_common::db::{AudioFormat, Corpus};
use zrviz_common::Result;

use super::not_found;

/// Corpus-level values supplied at import time
#[derive(Debug, Clone)]
pub struct NewCorpus {
    pub name: String,
    pub format: AudioFormat,
    pub protected: bool,
}

pub async fn insert_corpus<'c>(executor: impl SqliteExecutor<'c>, corpus: &NewCorpus) -> Result<i64> {
    let id = sqlx::query(
        r#"
        INSERT INTO corpora (name, audio_rate, audio_channels, audio_precision, protected_corpus)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&corpus.name)
    .bind(corpus.format.rate as i64)
    .bind(corpus.format.channels as i64)
    .bind(corpus.format.precision as i64)
    .bind(corpus.protected)
    .execute(executor)
    .await?
    .last_insert_rowid();

    Ok(id)
}

pub async fn get_corpus(pool: &SqlitePool, corpus_id: i64) -> Result<Corpus> {
    sqlx::query_as::<_, Corpus>(
        r#"
        SELECT id, name, audio_rate, audio_channels, audio_precision, protected_corpus
        FROM corpora
        WHERE id = ?
        "#,
    )
    .bind(corpus_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| not_found("Corpus", corpus_id))
}

pub async fn list_corpora(pool: &SqlitePool) -> Result<Vec<Corpus>> {
    let corpora = sqlx::query_as::<_, Corpus>(
        r#"
        SELECT id, name, audio_rate, audio_channels, audio_precision, protected_corpus
        FROM corpora
        ORDER BY id ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(corpora)
}

pub async fn set_protected(pool: &SqlitePool, corpus_id: i64, protected: bool) -> Result<()> {
    let result = sqlx::query("UPDATE corpora SET protected_corpus = ? WHERE id = ?")
        .bind(protected)
        .bind(corpus_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(not_found("Corpus", corpus_id));
    }
    Ok(())
}

pub async fn count_documents(pool: &SqlitePool, corpus_id: i64) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents WHERE corpus_id = ?")
        .bind(corpus_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}
