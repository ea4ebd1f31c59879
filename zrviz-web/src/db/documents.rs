//! Document persistence and navigation

use serde::Serialize;
use sqlx::{SqliteExecutor, SqlitePool};
use zrviz_common::db::Document;
use zrviz_common::Result;

use super::not_found;

#[derive(Debug, Clone)]
pub struct NewDocument {
    pub corpus_id: i64,
    pub document_index: i64,
    pub audio_path: String,
    pub audio_identifier: String,
    pub duration: i64,
}

/// Previous/next document ids, wrapping around the corpus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DocumentNeighbours {
    pub previous_document_id: i64,
    pub next_document_id: i64,
}

const DOCUMENT_COLUMNS: &str =
    "id, corpus_id, document_index, audio_path, audio_identifier, duration";

pub async fn insert_document<'c>(
    executor: impl SqliteExecutor<'c>,
    document: &NewDocument,
) -> Result<i64> {
    let id = sqlx::query(
        r#"
        INSERT INTO documents (corpus_id, document_index, audio_path, audio_identifier, duration)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(document.corpus_id)
    .bind(document.document_index)
    .bind(&document.audio_path)
    .bind(&document.audio_identifier)
    .bind(document.duration)
    .execute(executor)
    .await?
    .last_insert_rowid();

    Ok(id)
}

/// Load a document, treating one from another corpus as missing
pub async fn get_corpus_document(
    pool: &SqlitePool,
    corpus_id: i64,
    document_id: i64,
) -> Result<Document> {
    sqlx::query_as::<_, Document>(&format!(
        "SELECT {} FROM documents WHERE id = ? AND corpus_id = ?",
        DOCUMENT_COLUMNS
    ))
    .bind(document_id)
    .bind(corpus_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| not_found("Document", document_id))
}

pub async fn list_documents(pool: &SqlitePool, corpus_id: i64) -> Result<Vec<Document>> {
    let documents = sqlx::query_as::<_, Document>(&format!(
        "SELECT {} FROM documents WHERE corpus_id = ? ORDER BY document_index ASC, id ASC",
        DOCUMENT_COLUMNS
    ))
    .bind(corpus_id)
    .fetch_all(pool)
    .await?;

    Ok(documents)
}

/// Documents whose duration was never probed successfully
pub async fn documents_without_duration(pool: &SqlitePool, corpus_id: i64) -> Result<Vec<Document>> {
    let documents = sqlx::query_as::<_, Document>(&format!(
        "SELECT {} FROM documents WHERE corpus_id = ? AND duration = 0 ORDER BY document_index ASC",
        DOCUMENT_COLUMNS
    ))
    .bind(corpus_id)
    .fetch_all(pool)
    .await?;

    Ok(documents)
}

pub async fn set_duration(pool: &SqlitePool, document_id: i64, duration: i64) -> Result<()> {
    let result = sqlx::query("UPDATE documents SET duration = ? WHERE id = ?")
        .bind(duration)
        .bind(document_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(not_found("Document", document_id));
    }
    Ok(())
}

/// Cyclic neighbours of `document` by document index
///
/// The first document's predecessor is the last one and vice versa. When
/// several documents share an index the lowest id wins.
pub async fn neighbours(pool: &SqlitePool, document: &Document) -> Result<DocumentNeighbours> {
    let last_index: i64 =
        sqlx::query_scalar("SELECT MAX(document_index) FROM documents WHERE corpus_id = ?")
            .bind(document.corpus_id)
            .fetch_one(pool)
            .await?;

    let previous_index = if document.document_index == 0 {
        last_index
    } else {
        document.document_index - 1
    };
    let next_index = if document.document_index == last_index {
        0
    } else {
        document.document_index + 1
    };

    let rows: Vec<(i64, i64)> = sqlx::query_as(
        r#"
        SELECT document_index, MIN(id)
        FROM documents
        WHERE corpus_id = ? AND document_index IN (?, ?)
        GROUP BY document_index
        "#,
    )
    .bind(document.corpus_id)
    .bind(previous_index)
    .bind(next_index)
    .fetch_all(pool)
    .await?;

    let lookup = |index: i64| {
        rows.iter()
            .find(|(i, _)| *i == index)
            .map(|(_, id)| *id)
            .ok_or_else(|| {
                zrviz_common::Error::NotFound(format!(
                    "Document with index {} in corpus {}",
                    index, document.corpus_id
                ))
            })
    };

    Ok(DocumentNeighbours {
        previous_document_id: lookup(previous_index)?,
        next_document_id: lookup(next_index)?,
    })
}
