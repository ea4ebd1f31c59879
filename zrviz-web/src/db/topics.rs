//! Document topics, situation frame labels and per-topic term info

use serde::Serialize;
use sqlx::{FromRow, SqliteExecutor, SqlitePool};
use zrviz_common::db::{DocumentTopic, DocumentTopicTermInfo};
use zrviz_common::Result;

use super::not_found;

/// One situation frame row for the export
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SituationFrameRow {
    pub audio_identifier: String,
    pub topic_label: String,
    pub place_kb_id: Option<String>,
}

pub async fn insert_topic(
    pool: &SqlitePool,
    corpus_id: i64,
    label: &str,
    description: &str,
) -> Result<i64> {
    let id = sqlx::query("INSERT INTO document_topics (corpus_id, label, description) VALUES (?, ?, ?)")
        .bind(corpus_id)
        .bind(label)
        .bind(description)
        .execute(pool)
        .await?
        .last_insert_rowid();

    Ok(id)
}

pub async fn get_topic(pool: &SqlitePool, topic_id: i64) -> Result<DocumentTopic> {
    sqlx::query_as::<_, DocumentTopic>(
        "SELECT id, corpus_id, label, description FROM document_topics WHERE id = ?",
    )
    .bind(topic_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| not_found("DocumentTopic", topic_id))
}

pub async fn list_topics(pool: &SqlitePool, corpus_id: i64) -> Result<Vec<DocumentTopic>> {
    let topics = sqlx::query_as::<_, DocumentTopic>(
        "SELECT id, corpus_id, label, description FROM document_topics WHERE corpus_id = ? ORDER BY id ASC",
    )
    .bind(corpus_id)
    .fetch_all(pool)
    .await?;

    Ok(topics)
}

/// Ids of the topics a document is tagged with
pub async fn topic_ids_for_document(pool: &SqlitePool, document_id: i64) -> Result<Vec<i64>> {
    let ids = sqlx::query_scalar::<_, i64>(
        "SELECT document_topic_id FROM situation_frame_labels WHERE document_id = ? ORDER BY document_topic_id",
    )
    .bind(document_id)
    .fetch_all(pool)
    .await?;

    Ok(ids)
}

/// Tag a document with a topic; tagging twice keeps a single label
///
/// A place given on a repeated tag replaces the stored one.
pub async fn tag_document(
    pool: &SqlitePool,
    document_id: i64,
    topic_id: i64,
    place_id: Option<i64>,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO situation_frame_labels (document_id, document_topic_id, place_id)
        VALUES (?, ?, ?)
        ON CONFLICT (document_id, document_topic_id)
        DO UPDATE SET place_id = COALESCE(excluded.place_id, situation_frame_labels.place_id)
        "#,
    )
    .bind(document_id)
    .bind(topic_id)
    .bind(place_id)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn untag_document(pool: &SqlitePool, document_id: i64, topic_id: i64) -> Result<()> {
    sqlx::query("DELETE FROM situation_frame_labels WHERE document_id = ? AND document_topic_id = ?")
        .bind(document_id)
        .bind(topic_id)
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn insert_term_info<'c>(
    executor: impl SqliteExecutor<'c>,
    topic_id: i64,
    term_id: i64,
    category: &str,
    score: f64,
) -> Result<i64> {
    let id = sqlx::query(
        r#"
        INSERT INTO document_topic_term_info (document_topic_id, term_id, category, score)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(topic_id)
    .bind(term_id)
    .bind(category)
    .bind(score)
    .execute(executor)
    .await?
    .last_insert_rowid();

    Ok(id)
}

pub async fn term_info_for_topic(pool: &SqlitePool, topic_id: i64) -> Result<Vec<DocumentTopicTermInfo>> {
    let rows = sqlx::query_as::<_, DocumentTopicTermInfo>(
        r#"
        SELECT id, document_topic_id, term_id, category, score
        FROM document_topic_term_info
        WHERE document_topic_id = ?
        ORDER BY id ASC
        "#,
    )
    .bind(topic_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Distinct term-info categories of a topic, alphabetically
pub async fn term_info_categories(pool: &SqlitePool, topic_id: i64) -> Result<Vec<String>> {
    let categories = sqlx::query_scalar::<_, String>(
        r#"
        SELECT DISTINCT category
        FROM document_topic_term_info
        WHERE document_topic_id = ?
        ORDER BY category ASC
        "#,
    )
    .bind(topic_id)
    .fetch_all(pool)
    .await?;

    Ok(categories)
}

/// Every situation frame label of the corpus, by document then label id
pub async fn situation_frames(pool: &SqlitePool, corpus_id: i64) -> Result<Vec<SituationFrameRow>> {
    let rows = sqlx::query_as::<_, SituationFrameRow>(
        r#"
        SELECT d.audio_identifier, dt.label AS topic_label, p.kb_id AS place_kb_id
        FROM situation_frame_labels sfl
        JOIN documents d ON d.id = sfl.document_id
        JOIN document_topics dt ON dt.id = sfl.document_topic_id
        LEFT JOIN places p ON p.id = sfl.place_id
        WHERE d.corpus_id = ?
        ORDER BY d.id ASC, sfl.id ASC
        "#,
    )
    .bind(corpus_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
