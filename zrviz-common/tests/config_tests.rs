//! Tests for configuration loading and root folder resolution
//!
//! Tests that touch ZRVIZ_ROOT_FOLDER are marked #[serial] so they do not
//! race on the process environment.

use serial_test::serial;
use std::env;
use std::path::PathBuf;
use tempfile::TempDir;
use zrviz_common::config::{
    load_config, load_toml_config, CompiledDefaults, RootFolderInitializer, RootFolderResolver,
    TomlConfig, ROOT_FOLDER_ENV,
};
use zrviz_common::Error;

#[test]
fn test_compiled_defaults_for_current_platform() {
    let defaults = CompiledDefaults::for_current_platform();
    assert!(!defaults.root_folder.as_os_str().is_empty());
    assert_eq!(defaults.log_level, "info");
    assert!(defaults.root_folder.to_string_lossy().contains("zrviz"));
}

#[test]
#[serial]
fn test_resolver_with_no_overrides_uses_default() {
    env::remove_var(ROOT_FOLDER_ENV);

    let resolved = RootFolderResolver::new("test-module").resolve();
    assert_eq!(resolved, CompiledDefaults::for_current_platform().root_folder);
}

#[test]
#[serial]
fn test_resolver_env_beats_toml() {
    env::set_var(ROOT_FOLDER_ENV, "/tmp/zrviz-env-root");

    let config = TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/zrviz-toml-root")),
        ..Default::default()
    };
    let resolved = RootFolderResolver::new("test-module")
        .with_toml_config(&config)
        .resolve();

    env::remove_var(ROOT_FOLDER_ENV);
    assert_eq!(resolved, PathBuf::from("/tmp/zrviz-env-root"));
}

#[test]
#[serial]
fn test_resolver_cli_beats_env() {
    env::set_var(ROOT_FOLDER_ENV, "/tmp/zrviz-env-root");

    let resolved = RootFolderResolver::new("test-module")
        .with_cli_arg(Some(PathBuf::from("/tmp/zrviz-cli-root")))
        .resolve();

    env::remove_var(ROOT_FOLDER_ENV);
    assert_eq!(resolved, PathBuf::from("/tmp/zrviz-cli-root"));
}

#[test]
#[serial]
fn test_resolver_toml_used_without_env() {
    env::remove_var(ROOT_FOLDER_ENV);

    let config = TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/zrviz-toml-root")),
        ..Default::default()
    };
    let resolved = RootFolderResolver::new("test-module")
        .with_toml_config(&config)
        .resolve();

    assert_eq!(resolved, PathBuf::from("/tmp/zrviz-toml-root"));
}

#[test]
fn test_initializer_creates_directories() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("root");

    let init = RootFolderInitializer::new(root.clone());
    init.ensure_directory_exists().unwrap();

    assert!(root.is_dir());
    assert!(init.scratch_path().is_dir());
    assert_eq!(init.database_path(), root.join("zrviz.db"));
}

#[test]
fn test_load_explicit_config_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
root_folder = "/srv/zrviz"

[server]
port = 8123
access_token = "s3cret"

[views]
wordcloud_term_limit = 0
term_clip_limit = 4
"#,
    )
    .unwrap();

    let config = load_config(Some(&path)).unwrap();
    assert_eq!(config.root_folder, Some(PathBuf::from("/srv/zrviz")));
    assert_eq!(config.server.port, 8123);
    assert_eq!(config.server.access_token.as_deref(), Some("s3cret"));
    assert_eq!(config.views.term_limit(), None);
    assert_eq!(config.views.term_clip_limit, 4);
}

#[test]
fn test_missing_explicit_config_is_error() {
    let dir = TempDir::new().unwrap();
    let result = load_config(Some(&dir.path().join("absent.toml")));
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_malformed_config_is_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.toml");
    std::fs::write(&path, "[server\nport = ").unwrap();

    let result = load_toml_config(&path);
    assert!(matches!(result, Err(Error::Config(_))));
}
