//! Per-topic term info import
//!
//! Input is a whitespace-separated table, one row per line:
//!
//! ```text
//! <zr_term_index> <category> <score>
//! ```
//!
//! Blank lines and lines starting with `#` are ignored.

use std::collections::HashMap;
use std::path::Path;

use sqlx::SqlitePool;
use tracing::info;
use zrviz_common::{Error, Result};

use crate::db::{terms, topics};

const TERM_INFO_FILE: &str = "term info";

/// One parsed row of a term info file
#[derive(Debug, Clone, PartialEq)]
pub struct TermInfoRow {
    pub zr_term_index: i64,
    pub category: String,
    pub score: f64,
}

pub fn parse_term_info_line(line_number: usize, line: &str) -> Result<Option<TermInfoRow>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let fields: Vec<&str> = line.split_whitespace().collect();
    let [index, category, score] = fields.as_slice() else {
        return Err(Error::parse(
            TERM_INFO_FILE,
            line_number,
            format!("expected 3 fields, found {}", fields.len()),
        ));
    };

    let zr_term_index = index.parse::<i64>().map_err(|_| {
        Error::parse(TERM_INFO_FILE, line_number, format!("term index '{}' is not an integer", index))
    })?;
    let score = score.parse::<f64>().map_err(|_| {
        Error::parse(TERM_INFO_FILE, line_number, format!("score '{}' is not a number", score))
    })?;

    Ok(Some(TermInfoRow {
        zr_term_index,
        category: category.to_string(),
        score,
    }))
}

/// Attach the rows of `path` to a topic
///
/// Term indexes are resolved among the terms of the topic's corpus. An
/// unknown index aborts the import with nothing written.
pub async fn import_term_info(pool: &SqlitePool, topic_id: i64, path: &Path) -> Result<usize> {
    let topic = topics::get_topic(pool, topic_id).await?;
    let text = tokio::fs::read_to_string(path).await?;

    let rows = text
        .lines()
        .enumerate()
        .filter_map(|(i, line)| parse_term_info_line(i + 1, line).transpose())
        .collect::<Result<Vec<_>>>()?;

    let term_by_index: HashMap<i64, i64> = terms::terms_for_corpus(pool, topic.corpus_id)
        .await?
        .into_iter()
        .map(|t| (t.zr_term_index, t.id))
        .collect();

    let mut tx = pool.begin().await?;
    for row in &rows {
        let term_id = term_by_index.get(&row.zr_term_index).copied().ok_or_else(|| {
            Error::InvalidInput(format!(
                "Term index {} has no term in corpus {}",
                row.zr_term_index, topic.corpus_id
            ))
        })?;
        topics::insert_term_info(&mut *tx, topic_id, term_id, &row.category, row.score).await?;
    }
    tx.commit().await?;

    info!(
        "Imported {} term info rows for topic '{}' ({})",
        rows.len(),
        topic.label,
        topic_id
    );
    Ok(rows.len())
}
