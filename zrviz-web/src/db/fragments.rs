//! Audio fragment persistence

use serde::Serialize;
use sqlx::{FromRow, SqliteExecutor, SqlitePool};
use zrviz_common::db::AudioFragment;
use zrviz_common::Result;

#[derive(Debug, Clone)]
pub struct NewAudioFragment {
    pub document_id: i64,
    pub term_id: i64,
    pub zr_fragment_index: i64,
    pub start_offset: i64,
    pub end_offset: i64,
    pub score: f64,
}

impl NewAudioFragment {
    pub fn duration(&self) -> i64 {
        self.end_offset - self.start_offset
    }
}

/// A term occurrence joined with its document
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TermOccurrence {
    pub duration: i64,
    pub audio_identifier: String,
    pub document_id: i64,
    pub document_index: i64,
}

/// Everything needed to cut one fragment out of its source file
#[derive(Debug, Clone, FromRow)]
pub struct ClipSource {
    pub fragment_id: i64,
    pub audio_path: String,
    pub start_offset: i64,
    pub duration: i64,
}

pub async fn insert_fragment<'c>(
    executor: impl SqliteExecutor<'c>,
    fragment: &NewAudioFragment,
) -> Result<i64> {
    let id = sqlx::query(
        r#"
        INSERT INTO audio_fragments
            (document_id, term_id, zr_fragment_index, start_offset, end_offset, duration, score)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(fragment.document_id)
    .bind(fragment.term_id)
    .bind(fragment.zr_fragment_index)
    .bind(fragment.start_offset)
    .bind(fragment.end_offset)
    .bind(fragment.duration())
    .bind(fragment.score)
    .execute(executor)
    .await?
    .last_insert_rowid();

    Ok(id)
}

pub async fn fragments_for_document(pool: &SqlitePool, document_id: i64) -> Result<Vec<AudioFragment>> {
    let fragments = sqlx::query_as::<_, AudioFragment>(
        r#"
        SELECT id, document_id, term_id, zr_fragment_index, start_offset, end_offset, duration, score
        FROM audio_fragments
        WHERE document_id = ?
        ORDER BY id ASC
        "#,
    )
    .bind(document_id)
    .fetch_all(pool)
    .await?;

    Ok(fragments)
}

pub async fn occurrences_for_term(pool: &SqlitePool, term_id: i64) -> Result<Vec<TermOccurrence>> {
    let occurrences = sqlx::query_as::<_, TermOccurrence>(
        r#"
        SELECT af.duration, d.audio_identifier, af.document_id, d.document_index
        FROM audio_fragments af
        JOIN documents d ON d.id = af.document_id
        WHERE af.term_id = ?
        ORDER BY af.id ASC
        "#,
    )
    .bind(term_id)
    .fetch_all(pool)
    .await?;

    Ok(occurrences)
}

/// First `limit` fragments of a term, by fragment id
pub async fn clip_sources(pool: &SqlitePool, term_id: i64, limit: usize) -> Result<Vec<ClipSource>> {
    let sources = sqlx::query_as::<_, ClipSource>(
        r#"
        SELECT af.id AS fragment_id, d.audio_path, af.start_offset, af.duration
        FROM audio_fragments af
        JOIN documents d ON d.id = af.document_id
        WHERE af.term_id = ?
        ORDER BY af.id ASC
        LIMIT ?
        "#,
    )
    .bind(term_id)
    .bind(limit as i64)
    .fetch_all(pool)
    .await?;

    Ok(sources)
}

pub async fn count_for_term(pool: &SqlitePool, term_id: i64) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM audio_fragments WHERE term_id = ?")
        .bind(term_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}
