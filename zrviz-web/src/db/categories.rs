//! Term categories

use sqlx::SqlitePool;
use zrviz_common::db::TermCategory;
use zrviz_common::Result;

use super::not_found;

pub async fn insert_category(pool: &SqlitePool, corpus_id: i64, name: &str) -> Result<i64> {
    let id = sqlx::query("INSERT INTO term_categories (corpus_id, name) VALUES (?, ?)")
        .bind(corpus_id)
        .bind(name)
        .execute(pool)
        .await?
        .last_insert_rowid();

    Ok(id)
}

pub async fn get_category(pool: &SqlitePool, category_id: i64) -> Result<TermCategory> {
    sqlx::query_as::<_, TermCategory>("SELECT id, corpus_id, name FROM term_categories WHERE id = ?")
        .bind(category_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| not_found("TermCategory", category_id))
}

pub async fn list_categories(pool: &SqlitePool, corpus_id: i64) -> Result<Vec<TermCategory>> {
    let categories = sqlx::query_as::<_, TermCategory>(
        "SELECT id, corpus_id, name FROM term_categories WHERE corpus_id = ? ORDER BY id ASC",
    )
    .bind(corpus_id)
    .fetch_all(pool)
    .await?;

    Ok(categories)
}

pub async fn category_ids_for_term(pool: &SqlitePool, term_id: i64) -> Result<Vec<i64>> {
    let ids = sqlx::query_scalar::<_, i64>(
        "SELECT term_category_id FROM term_category_terms WHERE term_id = ? ORDER BY term_category_id",
    )
    .bind(term_id)
    .fetch_all(pool)
    .await?;

    Ok(ids)
}

pub async fn attach_term(pool: &SqlitePool, category_id: i64, term_id: i64) -> Result<()> {
    sqlx::query("INSERT OR IGNORE INTO term_category_terms (term_category_id, term_id) VALUES (?, ?)")
        .bind(category_id)
        .bind(term_id)
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn detach_term(pool: &SqlitePool, category_id: i64, term_id: i64) -> Result<()> {
    sqlx::query("DELETE FROM term_category_terms WHERE term_category_id = ? AND term_id = ?")
        .bind(category_id)
        .bind(term_id)
        .execute(pool)
        .await?;

    Ok(())
}
