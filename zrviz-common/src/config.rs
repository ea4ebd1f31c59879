//! Configuration loading and root folder resolution
//!
//! Bootstrap configuration is a small TOML file. Everything it does not set
//! falls back to compiled defaults, and a missing default config file is not
//! an error (the service starts with defaults and logs a warning).
//!
//! Root folder priority:
//! 1. Command-line argument (highest priority)
//! 2. `ZRVIZ_ROOT_FOLDER` environment variable
//! 3. `root_folder` key of the TOML config file
//! 4. OS-dependent compiled default (fallback)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "ZRVIZ_ROOT_FOLDER";

/// Database file name inside the root folder
pub const DATABASE_FILE_NAME: &str = "zrviz.db";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Root folder holding the database and scratch space
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub views: ViewConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Bearer token unlocking protected corpora. Without one, protected
    /// corpora are never served.
    #[serde(default)]
    pub access_token: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            access_token: None,
        }
    }
}

/// Which category supplies the topic wordcloud's default sort key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopicSortDefault {
    /// Last category in alphabetical order
    #[default]
    LastCategory,
    /// First category in alphabetical order
    FirstCategory,
}

/// Wordcloud and audio view configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewConfig {
    /// Maximum number of terms in the corpus wordcloud (0 = unbounded)
    #[serde(default = "default_wordcloud_term_limit")]
    pub wordcloud_term_limit: usize,

    /// Maximum number of fragments spliced into a term's audio clip
    #[serde(default = "default_term_clip_limit")]
    pub term_clip_limit: usize,

    #[serde(default)]
    pub topic_sort_default: TopicSortDefault,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            wordcloud_term_limit: default_wordcloud_term_limit(),
            term_clip_limit: default_term_clip_limit(),
            topic_sort_default: TopicSortDefault::default(),
        }
    }
}

impl ViewConfig {
    /// Corpus wordcloud limit, `None` when unbounded
    pub fn term_limit(&self) -> Option<usize> {
        match self.wordcloud_term_limit {
            0 => None,
            n => Some(n),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5780
}

fn default_wordcloud_term_limit() -> usize {
    100
}

fn default_term_clip_limit() -> usize {
    10
}

/// Compiled defaults for the current platform
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub root_folder: PathBuf,
    pub log_level: String,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        Self {
            root_folder: get_default_root_folder(),
            log_level: default_log_level(),
        }
    }
}

/// Get OS-dependent default root folder path
pub fn get_default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/zrviz (or /var/lib/zrviz for system-wide)
        dirs::data_local_dir()
            .map(|d| d.join("zrviz"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/zrviz"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("zrviz"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/zrviz"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("zrviz"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\zrviz"))
    } else {
        PathBuf::from("./zrviz_data")
    }
}

/// Default config file location (`~/.config/zrviz/config.toml` on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("zrviz").join("config.toml"))
}

/// Parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Failed to read config file {}: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Failed to parse TOML {}: {}", path.display(), e)))
}

/// Load the bootstrap config
///
/// An explicitly requested file must exist and parse. When no file is named,
/// the default location is tried and a missing file yields compiled defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<TomlConfig> {
    if let Some(path) = explicit {
        let config = load_toml_config(path)?;
        info!("Loaded configuration from {}", path.display());
        return Ok(config);
    }

    match default_config_path() {
        Some(path) if path.exists() => {
            let config = load_toml_config(&path)?;
            info!("Loaded configuration from {}", path.display());
            Ok(config)
        }
        _ => {
            warn!("No config file found, using compiled defaults");
            Ok(TomlConfig::default())
        }
    }
}

/// Resolves the root folder following the documented priority order
#[derive(Debug, Clone)]
pub struct RootFolderResolver {
    module_name: String,
    cli_arg: Option<PathBuf>,
    toml_root: Option<PathBuf>,
}

impl RootFolderResolver {
    pub fn new(module_name: &str) -> Self {
        Self {
            module_name: module_name.to_string(),
            cli_arg: None,
            toml_root: None,
        }
    }

    pub fn with_cli_arg(mut self, path: Option<PathBuf>) -> Self {
        self.cli_arg = path;
        self
    }

    pub fn with_toml_config(mut self, config: &TomlConfig) -> Self {
        self.toml_root = config.root_folder.clone();
        self
    }

    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.cli_arg {
            info!("[{}] Root folder: {} (command line)", self.module_name, path.display());
            return path.clone();
        }

        if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
            if !path.trim().is_empty() {
                info!("[{}] Root folder: {} ({})", self.module_name, path, ROOT_FOLDER_ENV);
                return PathBuf::from(path);
            }
        }

        if let Some(path) = &self.toml_root {
            info!("[{}] Root folder: {} (config file)", self.module_name, path.display());
            return path.clone();
        }

        let path = get_default_root_folder();
        info!("[{}] Root folder: {} (default)", self.module_name, path.display());
        path
    }
}

/// Creates the root folder layout on first run
#[derive(Debug, Clone)]
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    pub fn root_folder(&self) -> &Path {
        &self.root_folder
    }

    pub fn ensure_directory_exists(&self) -> Result<()> {
        if !self.root_folder.exists() {
            std::fs::create_dir_all(&self.root_folder)?;
            info!("Created root folder: {}", self.root_folder.display());
        }
        std::fs::create_dir_all(self.scratch_path())?;
        Ok(())
    }

    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(DATABASE_FILE_NAME)
    }

    /// Directory under which per-request render directories are created
    pub fn scratch_path(&self) -> PathBuf {
        self.root_folder.join("tmp")
    }
}
