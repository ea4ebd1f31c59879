//! Entity models
//!
//! Offsets and durations are hundredths of a second (see [`crate::time`]).

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::time::hundredths_to_seconds;

/// Audio characteristics shared by every document of a corpus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioFormat {
    /// Sample rate in Hz
    pub rate: u32,
    /// Channel count
    pub channels: u16,
    /// Bits per sample
    pub precision: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Corpus {
    pub id: i64,
    pub name: String,
    pub audio_rate: i64,
    pub audio_channels: i64,
    pub audio_precision: i64,
    pub protected_corpus: bool,
}

impl Corpus {
    pub fn audio_format(&self) -> AudioFormat {
        AudioFormat {
            rate: self.audio_rate as u32,
            channels: self.audio_channels as u16,
            precision: self.audio_precision as u16,
        }
    }
}

/// An audio document belonging to one corpus
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Document {
    pub id: i64,
    pub corpus_id: i64,
    /// Zero-based position in the corpus filename list
    pub document_index: i64,
    pub audio_path: String,
    pub audio_identifier: String,
    pub duration: i64,
}

impl Document {
    pub fn duration_in_seconds(&self) -> f64 {
        hundredths_to_seconds(self.duration)
    }
}

/// A recurring unit discovered by the pipeline
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Term {
    pub id: i64,
    pub label: String,
    pub zr_term_index: i64,
}

/// One occurrence of a term inside a document
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AudioFragment {
    pub id: i64,
    pub document_id: i64,
    pub term_id: i64,
    /// 1-based line number in the upstream fragment file
    pub zr_fragment_index: i64,
    pub start_offset: i64,
    pub end_offset: i64,
    pub duration: i64,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DocumentTopic {
    pub id: i64,
    pub corpus_id: i64,
    pub label: String,
    pub description: String,
}

/// Link between a document and a topic, optionally naming a place
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SituationFrameLabel {
    pub id: i64,
    pub document_id: i64,
    pub document_topic_id: i64,
    pub place_id: Option<i64>,
}

/// Per-topic numeric score of a term under a named category
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DocumentTopicTermInfo {
    pub id: i64,
    pub document_topic_id: i64,
    pub term_id: i64,
    pub category: String,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TermCategory {
    pub id: i64,
    pub corpus_id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DocumentTranscript {
    pub id: i64,
    pub document_id: i64,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Place {
    pub id: i64,
    pub corpus_id: i64,
    pub kb_id: String,
    pub english_name: String,
    pub native_name: String,
}
