//! Corpus importer
//!
//! Turns one run of the discovery pipeline into a corpus. All rows of an
//! import are written inside a single transaction, so a malformed line leaves
//! the database untouched.

pub mod labels;
pub mod parser;
pub mod probe;
pub mod term_info;

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};
use zrviz_common::db::AudioFormat;
use zrviz_common::{Error, Result};

use crate::db::{corpora, documents, fragments, terms};
use parser::FilenameEntry;
use probe::{DurationProbe, SymphoniaProbe};

pub use labels::export_term_labels;
pub use term_info::import_term_info;

/// Input files and corpus parameters for one import
#[derive(Debug, Clone)]
pub struct ImportRequest {
    pub corpus_name: String,
    /// Fragment ("nodes") file
    pub fragments_path: PathBuf,
    /// Cluster ("dedups") file
    pub clusters_path: PathBuf,
    /// Audio file list
    pub filenames_path: PathBuf,
    pub format: AudioFormat,
    pub protected: bool,
}

/// Row counts produced by an import
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub corpus_id: i64,
    pub documents: usize,
    pub terms: usize,
    pub audio_fragments: usize,
    /// Documents whose audio file was missing
    pub missing_audio: usize,
}

/// Builds corpora from pipeline output
#[derive(Clone)]
pub struct CorpusImporter {
    pool: SqlitePool,
    probe: Arc<dyn DurationProbe>,
}

impl CorpusImporter {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            probe: Arc::new(SymphoniaProbe),
        }
    }

    pub fn with_probe(mut self, probe: Arc<dyn DurationProbe>) -> Self {
        self.probe = probe;
        self
    }

    /// Import a corpus
    ///
    /// Importing the same files twice creates two independent corpora.
    pub async fn import(&self, request: &ImportRequest) -> Result<ImportSummary> {
        info!("Importing corpus '{}'", request.corpus_name);

        let filenames_text = read_input(&request.filenames_path).await?;
        let clusters_text = read_input(&request.clusters_path).await?;
        let fragments_text = read_input(&request.fragments_path).await?;

        let entries = parser::parse_filenames(&filenames_text)?;
        let clusters = parser::parse_clusters(&clusters_text)?;
        let known: HashSet<&str> = entries.iter().map(|e| e.audio_identifier.as_str()).collect();
        let resolved = parser::resolve_fragments(&fragments_text, &clusters, &known)?;

        let durations = self.probe_durations(&entries, request.format).await?;
        let missing_audio = durations.iter().filter(|d| d.is_none()).count();

        let mut tx = self.pool.begin().await?;

        let corpus_id = corpora::insert_corpus(
            &mut *tx,
            &corpora::NewCorpus {
                name: request.corpus_name.clone(),
                format: request.format,
                protected: request.protected,
            },
        )
        .await?;

        // Identifiers are not unique across the list; the last entry wins.
        let mut document_ids: HashMap<&str, i64> = HashMap::with_capacity(entries.len());
        for (entry, duration) in entries.iter().zip(&durations) {
            let document_id = documents::insert_document(
                &mut *tx,
                &documents::NewDocument {
                    corpus_id,
                    document_index: entry.document_index,
                    audio_path: entry.audio_path.clone(),
                    audio_identifier: entry.audio_identifier.clone(),
                    duration: duration.unwrap_or(0),
                },
            )
            .await?;
            document_ids.insert(entry.audio_identifier.as_str(), document_id);
        }

        let mut term_ids = Vec::with_capacity(clusters.term_count);
        for term_index in 0..clusters.term_count {
            let label = format!("pt{}", term_index);
            term_ids.push(terms::insert_term(&mut *tx, &label, term_index as i64).await?);
        }

        for fragment in &resolved {
            let document_id = document_ids
                .get(fragment.record.audio_identifier.as_str())
                .copied()
                .ok_or_else(|| {
                    Error::Internal(format!(
                        "Fragment {} resolved to unknown document",
                        fragment.line_number
                    ))
                })?;

            fragments::insert_fragment(
                &mut *tx,
                &fragments::NewAudioFragment {
                    document_id,
                    term_id: term_ids[fragment.cluster_index],
                    zr_fragment_index: fragment.line_number,
                    start_offset: fragment.record.start_offset,
                    end_offset: fragment.record.end_offset,
                    score: fragment.record.score,
                },
            )
            .await?;
        }

        tx.commit().await?;

        let summary = ImportSummary {
            corpus_id,
            documents: entries.len(),
            terms: term_ids.len(),
            audio_fragments: resolved.len(),
            missing_audio,
        };
        info!(
            "Imported corpus '{}' (id {}): {} documents, {} terms, {} fragments",
            request.corpus_name, corpus_id, summary.documents, summary.terms, summary.audio_fragments
        );
        Ok(summary)
    }

    /// Re-probe every document of the corpus whose duration is still 0
    ///
    /// Returns the number of documents updated. Files that are still missing
    /// are skipped.
    pub async fn backfill_durations(&self, corpus_id: i64) -> Result<usize> {
        let corpus = corpora::get_corpus(&self.pool, corpus_id).await?;
        let pending = documents::documents_without_duration(&self.pool, corpus_id).await?;
        let entries: Vec<FilenameEntry> = pending
            .iter()
            .map(|d| FilenameEntry {
                document_index: d.document_index,
                audio_path: d.audio_path.clone(),
                audio_identifier: d.audio_identifier.clone(),
            })
            .collect();

        let durations = self.probe_durations(&entries, corpus.audio_format()).await?;

        let mut updated = 0;
        for (document, duration) in pending.iter().zip(durations) {
            if let Some(duration) = duration.filter(|d| *d > 0) {
                documents::set_duration(&self.pool, document.id, duration).await?;
                updated += 1;
            }
        }

        info!(
            "Backfilled durations for {} of {} documents in corpus {}",
            updated,
            pending.len(),
            corpus_id
        );
        Ok(updated)
    }

    /// Probe each entry off the async runtime
    ///
    /// `None` marks a missing audio file. A file that exists but cannot be
    /// probed fails the whole batch.
    async fn probe_durations(
        &self,
        entries: &[FilenameEntry],
        format: AudioFormat,
    ) -> Result<Vec<Option<i64>>> {
        let paths: Vec<PathBuf> = entries.iter().map(|e| PathBuf::from(&e.audio_path)).collect();
        let probe = Arc::clone(&self.probe);

        tokio::task::spawn_blocking(move || {
            paths
                .iter()
                .map(|path| {
                    if !path.is_file() {
                        warn!("Unable to find audio file with path '{}'", path.display());
                        return Ok(None);
                    }
                    let length = probe.probe(path)?;
                    let duration = length.duration_hundredths(&format);
                    debug!(path = %path.display(), duration, "Probed duration");
                    Ok(Some(duration))
                })
                .collect::<Result<Vec<_>>>()
        })
        .await
        .map_err(|e| Error::Internal(format!("Probe task failed: {}", e)))?
    }
}

async fn read_input(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path).await.map_err(|e| {
        Error::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to read {}: {}", path.display(), e),
        ))
    })
}
