//! Topic wordcloud merged with per-topic term info

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use sqlx::SqlitePool;
use zrviz_common::Result;

use super::stats::{fragment_ids_by_term, topic_term_stats};
use super::Wordcloud;
use crate::db::topics;

#[derive(Debug, Clone, Serialize)]
pub struct TopicTerm {
    pub label: String,
    pub zr_term_index: i64,
    /// One `term_info_category_<i> ` entry per attached term info row
    pub css_class: String,
    pub id: i64,
    pub term_id: i64,
    pub corpus_id: i64,
    pub audio_fragment_ids: Vec<i64>,
    pub total_audio_fragments: i64,
    pub total_documents: i64,
    /// `term_info_<category>` scores
    #[serde(flatten)]
    pub term_info: BTreeMap<String, f64>,
}

/// Key under which a category's score is serialised
pub fn term_info_key(category: &str) -> String {
    format!("term_info_{}", category)
}

/// Terms of the documents tagged with `topic_id`
///
/// Counts cover only the tagged documents. Fragment ids cover the whole
/// corpus.
pub async fn topic_wordcloud(
    pool: &SqlitePool,
    corpus_id: i64,
    topic_id: i64,
) -> Result<Wordcloud<TopicTerm>> {
    let stats = topic_term_stats(pool, corpus_id, topic_id).await?;
    let mut fragment_ids = fragment_ids_by_term(pool, corpus_id).await?;

    let category_index: HashMap<String, usize> = topics::term_info_categories(pool, topic_id)
        .await?
        .into_iter()
        .enumerate()
        .map(|(i, category)| (category, i))
        .collect();

    let mut info_by_term: HashMap<i64, Vec<(String, f64)>> = HashMap::new();
    for info in topics::term_info_for_topic(pool, topic_id).await? {
        info_by_term
            .entry(info.term_id)
            .or_default()
            .push((info.category, info.score));
    }

    let terms = stats
        .into_iter()
        .map(|s| {
            let mut css_class = String::new();
            let mut term_info = BTreeMap::new();
            for (category, score) in info_by_term.remove(&s.term_id).unwrap_or_default() {
                if let Some(index) = category_index.get(&category) {
                    css_class.push_str(&format!("term_info_category_{} ", index));
                }
                term_info.insert(term_info_key(&category), score);
            }

            TopicTerm {
                audio_fragment_ids: fragment_ids.remove(&s.term_id).unwrap_or_default(),
                label: s.label,
                zr_term_index: s.zr_term_index,
                css_class,
                id: s.term_id,
                term_id: s.term_id,
                corpus_id,
                total_audio_fragments: s.fragment_count,
                total_documents: s.document_count,
                term_info,
            }
        })
        .collect();

    Ok(Wordcloud::new(terms))
}
