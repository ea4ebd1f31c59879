//! Knowledge-base places

use serde::Serialize;
use sqlx::{FromRow, SqlitePool};
use zrviz_common::db::Place;
use zrviz_common::{Error, Result};

/// Which place name an autocomplete query matches against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceName {
    English,
    Native,
}

/// Autocomplete suggestion: display name plus the knowledge-base id
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct PlaceSuggestion {
    pub label: String,
    pub value: String,
}

pub async fn insert_place(
    pool: &SqlitePool,
    corpus_id: i64,
    kb_id: &str,
    english_name: &str,
    native_name: &str,
) -> Result<i64> {
    let id = sqlx::query(
        "INSERT INTO places (corpus_id, kb_id, english_name, native_name) VALUES (?, ?, ?, ?)",
    )
    .bind(corpus_id)
    .bind(kb_id)
    .bind(english_name)
    .bind(native_name)
    .execute(pool)
    .await?
    .last_insert_rowid();

    Ok(id)
}

pub async fn find_by_kb_id(pool: &SqlitePool, corpus_id: i64, kb_id: &str) -> Result<Place> {
    sqlx::query_as::<_, Place>(
        r#"
        SELECT id, corpus_id, kb_id, english_name, native_name
        FROM places
        WHERE corpus_id = ? AND kb_id = ?
        ORDER BY id ASC
        LIMIT 1
        "#,
    )
    .bind(corpus_id)
    .bind(kb_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| Error::NotFound(format!("Place {}", kb_id)))
}

/// Case-insensitive substring search over one of the place names
pub async fn autocomplete(
    pool: &SqlitePool,
    corpus_id: i64,
    name: PlaceName,
    term: &str,
) -> Result<Vec<PlaceSuggestion>> {
    let column = match name {
        PlaceName::English => "english_name",
        PlaceName::Native => "native_name",
    };

    let suggestions = sqlx::query_as::<_, PlaceSuggestion>(&format!(
        r#"
        SELECT {column} AS label, kb_id AS value
        FROM places
        WHERE corpus_id = ? AND instr(lower({column}), lower(?)) > 0
        ORDER BY id ASC
        "#
    ))
    .bind(corpus_id)
    .bind(term)
    .fetch_all(pool)
    .await?;

    Ok(suggestions)
}
