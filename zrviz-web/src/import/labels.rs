//! Term label backup

use std::io::Write;

use sqlx::SqlitePool;
use tracing::info;
use zrviz_common::Result;

use crate::db::terms;

/// Write `zr_term_index<TAB>label` for every term of the corpus
///
/// Returns the number of lines written.
pub async fn export_term_labels<W: Write>(pool: &SqlitePool, corpus_id: i64, mut writer: W) -> Result<usize> {
    let terms = terms::terms_for_corpus(pool, corpus_id).await?;

    for term in &terms {
        writeln!(writer, "{}\t{}", term.zr_term_index, term.label)?;
    }
    writer.flush()?;

    info!("Exported {} term labels for corpus {}", terms.len(), corpus_id);
    Ok(terms.len())
}
