//! HTTP API handlers
//!
//! Every corpus-scoped handler resolves its corpus through
//! [`access::authorize_corpus`] before touching anything else.

pub mod access;
pub mod audio;
pub mod corpora;
pub mod documents;
pub mod health;
pub mod terms;
pub mod wordcloud;

pub use audio::audio_routes;
pub use corpora::corpus_routes;
pub use documents::document_routes;
pub use health::health_routes;
pub use terms::term_routes;
pub use wordcloud::wordcloud_routes;

use serde::Deserialize;

/// Attach or detach in the many-to-many toggles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleAction {
    Add,
    Remove,
}
