//! Wordcloud parameter descriptors
//!
//! Tell the front end which numeric fields may drive term size and ordering.

use serde::Serialize;
use zrviz_common::config::TopicSortDefault;

use super::topic::term_info_key;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParamKey {
    pub key_name: String,
    pub key_description: String,
}

impl ParamKey {
    fn new(key_name: impl Into<String>, key_description: impl Into<String>) -> Self {
        Self {
            key_name: key_name.into(),
            key_description: key_description.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordcloudParams {
    pub default_size_key: String,
    pub size_keys: Vec<ParamKey>,
    pub default_sort_key: String,
    pub sort_keys: Vec<ParamKey>,
}

/// Sort key used by the topic view when the topic has no categories
pub const TOPIC_FALLBACK_SORT_KEY: &str = "total_audio_fragments";

pub fn corpus_params() -> WordcloudParams {
    WordcloudParams {
        default_size_key: "total_documents".to_string(),
        size_keys: vec![
            ParamKey::new("total_documents", "Documents appeared in"),
            ParamKey::new("total_audio_fragments", "Occurrences in corpus"),
        ],
        default_sort_key: "total_audio_fragments".to_string(),
        sort_keys: vec![
            ParamKey::new("total_documents", "Documents appeared in"),
            ParamKey::new("label", "Label"),
            ParamKey::new("total_audio_fragments", "Occurrences in corpus"),
        ],
    }
}

pub fn document_params() -> WordcloudParams {
    WordcloudParams {
        default_size_key: "total_documents".to_string(),
        size_keys: vec![
            ParamKey::new("total_documents", "Documents appeared in"),
            ParamKey::new("total_audio_fragments", "Occurrences in corpus"),
            ParamKey::new("total_audio_fragments_in_document", "Occurrences in document"),
            ParamKey::new("tf_idf", "TF-IDF"),
        ],
        default_sort_key: "first_start_offset_in_document".to_string(),
        sort_keys: vec![
            ParamKey::new("total_documents", "Documents appeared in"),
            ParamKey::new("first_start_offset_in_document", "First appearance"),
            ParamKey::new("label", "Label"),
            ParamKey::new("total_audio_fragments", "Occurrences in corpus"),
            ParamKey::new("total_audio_fragments_in_document", "Occurrences in document"),
            ParamKey::new("tf_idf", "TF-IDF"),
        ],
    }
}

/// Descriptors for a topic with the given alphabetically ordered categories
pub fn topic_params(categories: &[String], policy: TopicSortDefault) -> WordcloudParams {
    let mut sort_keys = vec![
        ParamKey::new("total_documents", "Topic Documents appeared in"),
        ParamKey::new("label", "Label"),
        ParamKey::new("total_audio_fragments", "Occurrences in Topic Documents"),
    ];
    sort_keys.extend(
        categories
            .iter()
            .map(|category| ParamKey::new(term_info_key(category), category.as_str())),
    );

    let default_category = match policy {
        TopicSortDefault::LastCategory => categories.last(),
        TopicSortDefault::FirstCategory => categories.first(),
    };
    let default_sort_key = default_category
        .map(|category| term_info_key(category))
        .unwrap_or_else(|| TOPIC_FALLBACK_SORT_KEY.to_string());

    WordcloudParams {
        default_size_key: "total_documents".to_string(),
        size_keys: vec![
            ParamKey::new("total_documents", "Topic Documents appeared in"),
            ParamKey::new("total_audio_fragments", "Occurrences in Topic Documents"),
        ],
        default_sort_key,
        sort_keys,
    }
}
