//! zrviz-web library
//!
//! Corpus import, wordcloud aggregation, audio rendering and the HTTP API
//! serving them. The binaries in this crate are thin wrappers around it.

pub mod aggregate;
pub mod api;
pub mod audio;
pub mod db;
pub mod error;
pub mod import;

pub use crate::error::{ApiError, ApiResult};

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use zrviz_common::config::{LoggingConfig, TomlConfig, ViewConfig};

use crate::audio::{AudioRenderer, NativeCodec};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub views: ViewConfig,
    /// Bearer token for protected corpora; `None` locks them entirely
    pub access_token: Option<String>,
    pub renderer: AudioRenderer,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(db: SqlitePool, config: &TomlConfig, scratch_dir: PathBuf) -> Self {
        Self {
            db,
            views: config.views.clone(),
            access_token: config
                .server
                .access_token
                .clone()
                .filter(|token| !token.is_empty()),
            renderer: AudioRenderer::new(Arc::new(NativeCodec), scratch_dir),
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::health_routes())
        .merge(api::corpus_routes())
        .merge(api::document_routes())
        .merge(api::term_routes())
        .merge(api::wordcloud_routes())
        .merge(api::audio_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Tracing filter for the binaries
///
/// `RUST_LOG` wins when set; otherwise the `[logging] level` directive applies.
pub fn log_filter(logging: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| configured_filter(logging))
}

/// Filter built from the configured level alone
pub fn configured_filter(logging: &LoggingConfig) -> EnvFilter {
    EnvFilter::new(&logging.level)
}
