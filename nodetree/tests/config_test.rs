//! Integration tests for Settings loading from a local TOML file.
//!
//! These tests run without a global config, so the local file layers directly
//! over the compiled defaults.

use std::fs;

use tempfile::TempDir;

use nodetree::config::Settings;
use nodetree::{Codec, Tree, TreeError};

// ============================================================
// Settings::load() local file tests
// ============================================================

#[test]
fn given_no_local_config_when_load_then_returns_defaults() {
    let settings = Settings::load(None).expect("load settings");

    assert_eq!(settings, Settings::default());
}

#[test]
fn given_local_config_with_scalars_when_load_then_overrides_defaults() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nodetree.toml");
    let local_config = r#"
[codec]
pretty = true
max_depth = 16
"#;
    fs::write(&path, local_config).unwrap();

    // Act
    let settings = Settings::load(Some(&path)).expect("load settings");

    // Assert
    assert!(settings.codec.pretty);
    assert_eq!(settings.codec.max_depth, Some(16));
}

#[test]
fn given_local_config_without_max_depth_when_load_then_inherits_default() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nodetree.toml");
    fs::write(&path, "[codec]\npretty = true\n").unwrap();

    let settings = Settings::load(Some(&path)).expect("load settings");

    assert!(settings.codec.pretty);
    assert_eq!(settings.codec.max_depth, None);
}

#[test]
fn given_missing_local_config_when_load_then_config_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("does-not-exist.toml");

    let result = Settings::load(Some(&path));

    assert!(matches!(result, Err(TreeError::Config(_))));
}

#[test]
fn given_malformed_local_config_when_load_then_config_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nodetree.toml");
    fs::write(&path, "[codec]\nmax_depth = \"deep\"\n").unwrap();

    let result = Settings::load(Some(&path));

    assert!(matches!(result, Err(TreeError::Config(_))));
}

#[test]
fn given_loaded_settings_when_building_codec_then_codec_honours_them() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nodetree.toml");
    fs::write(&path, "[codec]\nmax_depth = 1\n").unwrap();
    let settings = Settings::load(Some(&path)).expect("load settings");
    let codec = Codec::new(settings.codec);

    let mut tree = Tree::new();
    let flat = codec.decode(&mut tree, r#"{"name":"leaf","content":"x"}"#);
    let nested = codec.decode(&mut tree, r#"{"name":"r","content":[{"name":"l","content":"x"}]}"#);

    assert!(flat.is_ok());
    assert!(matches!(nested, Err(TreeError::DataCorruption(_))));
}
