//! Line parsers for the pipeline output files
//!
//! Three files describe one run of the discovery pipeline:
//!
//! - filename list: one audio path per line, line position = document index
//! - cluster file: one term per line, listing fragment line numbers
//! - fragment file: `identifier start end score _ _` per line
//!
//! Cluster values are compared against 1-based fragment line numbers. A
//! cluster value of 0 therefore never matches a fragment, so `0 1` selects
//! line 1 only. Upstream corpora depend on this numbering; do not shift it
//! to 0-based even where older descriptions read `0 1` as lines 1 and 2.
//!
//! Everything here is synchronous and touches neither disk nor database.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use tracing::{debug, warn};
use zrviz_common::{Error, Result};

/// File labels used in parse errors
pub const FILENAMES_FILE: &str = "filenames";
pub const CLUSTERS_FILE: &str = "clusters";
pub const FRAGMENTS_FILE: &str = "fragments";

/// One line of the filename list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilenameEntry {
    pub document_index: i64,
    pub audio_path: String,
    /// Basename without extension
    pub audio_identifier: String,
}

/// One referenced line of the fragment file
#[derive(Debug, Clone, PartialEq)]
pub struct FragmentRecord {
    pub audio_identifier: String,
    pub start_offset: i64,
    pub end_offset: i64,
    pub score: f64,
}

/// A fragment line matched to the cluster that claims it
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedFragment {
    /// 1-based line number in the fragment file
    pub line_number: i64,
    /// 0-based position of the owning cluster line
    pub cluster_index: usize,
    pub record: FragmentRecord,
}

/// Cluster file contents: the number of terms and who owns each fragment line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterAssignment {
    pub term_count: usize,
    pub owner_by_fragment: BTreeMap<i64, usize>,
}

/// Parse line `line_number` (1-based) of the filename list
pub fn parse_filename_line(line_number: usize, line: &str) -> Result<FilenameEntry> {
    let audio_path = line.trim();
    if audio_path.is_empty() {
        return Err(Error::parse(FILENAMES_FILE, line_number, "empty filename"));
    }

    let audio_identifier = Path::new(audio_path)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .ok_or_else(|| Error::parse(FILENAMES_FILE, line_number, "no file name component"))?
        .to_string();

    Ok(FilenameEntry {
        document_index: line_number as i64 - 1,
        audio_path: audio_path.to_string(),
        audio_identifier,
    })
}

pub fn parse_filenames(text: &str) -> Result<Vec<FilenameEntry>> {
    text.lines()
        .enumerate()
        .map(|(i, line)| parse_filename_line(i + 1, line))
        .collect()
}

/// Parse the fragment references of one cluster line
///
/// An empty line is a cluster without fragments.
pub fn parse_cluster_line(line_number: usize, line: &str) -> Result<Vec<i64>> {
    line.split_whitespace()
        .map(|value| {
            value.parse::<i64>().map_err(|_| {
                Error::parse(
                    CLUSTERS_FILE,
                    line_number,
                    format!("fragment reference '{}' is not an integer", value),
                )
            })
        })
        .collect()
}

/// Parse the whole cluster file
///
/// Every line yields a term, including empty ones. A fragment claimed by more
/// than one cluster belongs to the last cluster naming it.
pub fn parse_clusters(text: &str) -> Result<ClusterAssignment> {
    let mut assignment = ClusterAssignment::default();

    for (cluster_index, line) in text.lines().enumerate() {
        for fragment in parse_cluster_line(cluster_index + 1, line)? {
            if let Some(previous) = assignment.owner_by_fragment.insert(fragment, cluster_index) {
                if previous != cluster_index {
                    warn!(
                        "Fragment {} listed by clusters {} and {}, keeping {}",
                        fragment, previous, cluster_index, cluster_index
                    );
                }
            }
        }
        assignment.term_count += 1;
    }

    Ok(assignment)
}

/// Parse line `line_number` (1-based) of the fragment file
pub fn parse_fragment_line(line_number: usize, line: &str) -> Result<FragmentRecord> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != 6 {
        return Err(Error::parse(
            FRAGMENTS_FILE,
            line_number,
            format!("expected 6 fields, found {}", fields.len()),
        ));
    }

    let offset = |value: &str, name: &str| {
        value.parse::<i64>().map_err(|_| {
            Error::parse(
                FRAGMENTS_FILE,
                line_number,
                format!("{} '{}' is not an integer", name, value),
            )
        })
    };

    let start_offset = offset(fields[1], "start")?;
    let end_offset = offset(fields[2], "end")?;
    let score = fields[3].parse::<f64>().map_err(|_| {
        Error::parse(
            FRAGMENTS_FILE,
            line_number,
            format!("score '{}' is not a number", fields[3]),
        )
    })?;

    Ok(FragmentRecord {
        audio_identifier: fields[0].to_string(),
        start_offset,
        end_offset,
        score,
    })
}

/// Parse the fragment lines referenced by `clusters`
///
/// Unreferenced lines are skipped without being parsed. Every resolved
/// fragment must name one of `known_identifiers`.
pub fn resolve_fragments(
    text: &str,
    clusters: &ClusterAssignment,
    known_identifiers: &HashSet<&str>,
) -> Result<Vec<ResolvedFragment>> {
    let mut resolved = Vec::with_capacity(clusters.owner_by_fragment.len());

    for (i, line) in text.lines().enumerate() {
        let line_number = i + 1;
        let Some(&cluster_index) = clusters.owner_by_fragment.get(&(line_number as i64)) else {
            continue;
        };

        let record = parse_fragment_line(line_number, line)?;
        if !known_identifiers.contains(record.audio_identifier.as_str()) {
            return Err(Error::parse(
                FRAGMENTS_FILE,
                line_number,
                format!("unknown audio identifier '{}'", record.audio_identifier),
            ));
        }

        resolved.push(ResolvedFragment {
            line_number: line_number as i64,
            cluster_index,
            record,
        });
    }

    let unmatched = clusters.owner_by_fragment.len() - resolved.len();
    if unmatched > 0 {
        debug!("{} cluster references matched no fragment line", unmatched);
    }

    Ok(resolved)
}
