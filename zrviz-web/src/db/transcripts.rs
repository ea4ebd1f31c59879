//! Document transcripts

use sqlx::SqlitePool;
use zrviz_common::db::DocumentTranscript;
use zrviz_common::Result;

/// Fetch the document's transcript, creating an empty one on first access
pub async fn get_or_create(pool: &SqlitePool, document_id: i64) -> Result<DocumentTranscript> {
    let mut tx = pool.begin().await?;

    let existing = sqlx::query_as::<_, DocumentTranscript>(
        "SELECT id, document_id, text FROM document_transcripts WHERE document_id = ? ORDER BY id LIMIT 1",
    )
    .bind(document_id)
    .fetch_optional(&mut *tx)
    .await?;

    let transcript = match existing {
        Some(transcript) => transcript,
        None => {
            let id = sqlx::query("INSERT INTO document_transcripts (document_id, text) VALUES (?, '')")
                .bind(document_id)
                .execute(&mut *tx)
                .await?
                .last_insert_rowid();
            DocumentTranscript {
                id,
                document_id,
                text: String::new(),
            }
        }
    };

    tx.commit().await?;
    Ok(transcript)
}

pub async fn update_text(pool: &SqlitePool, document_id: i64, text: &str) -> Result<DocumentTranscript> {
    let transcript = get_or_create(pool, document_id).await?;

    sqlx::query("UPDATE document_transcripts SET text = ? WHERE id = ?")
        .bind(text)
        .bind(transcript.id)
        .execute(pool)
        .await?;

    Ok(DocumentTranscript {
        text: text.to_string(),
        ..transcript
    })
}
