//! Wordcloud aggregation
//!
//! Each view is assembled from a constant number of grouped SQL queries,
//! independent of how many terms the corpus holds. Offsets stay in
//! hundredths until serialisation.

pub mod corpus;
pub mod document;
pub mod params;
pub mod stats;
pub mod topic;

use serde::{Serialize, Serializer};
use zrviz_common::time::hundredths_to_seconds;

pub use corpus::{corpus_wordcloud, CorpusTerm};
pub use document::{document_wordcloud, DocumentTerm};
pub use params::{corpus_params, document_params, topic_params, ParamKey, WordcloudParams};
pub use stats::{fragment_ids_by_term, tf_idf, TermStats};
pub use topic::{topic_wordcloud, TopicTerm};

/// Wordcloud payload, `{"terms": [...]}` on the wire
#[derive(Debug, Clone, Serialize)]
pub struct Wordcloud<T> {
    pub terms: Vec<T>,
}

impl<T> Wordcloud<T> {
    pub fn new(terms: Vec<T>) -> Self {
        Self { terms }
    }
}

pub(crate) fn serialize_seconds<S: Serializer>(hundredths: &i64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(hundredths_to_seconds(*hundredths))
}
