//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/nodetree/nodetree.toml`
//! 3. Local config: a TOML file named by the caller
//! 4. Environment variables: `NODETREE__*` prefix (e.g. `NODETREE__CODEC__PRETTY=true`)

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::errors::{TreeError, TreeResult};

/// Encoding/decoding behaviour of [`crate::codec::Codec`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct CodecSettings {
    /// Indent encoded JSON
    pub pretty: bool,
    /// Reject documents nested deeper than this many levels (None = no limit)
    pub max_depth: Option<usize>,
}

/// Raw codec settings for intermediate parsing (Option to detect "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawCodecSettings {
    pub pretty: Option<bool>,
    pub max_depth: Option<usize>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub codec: RawCodecSettings,
}

impl CodecSettings {
    /// Overlay wins where it specifies a value.
    pub fn merge(&self, overlay: &RawCodecSettings) -> Self {
        Self {
            pretty: overlay.pretty.unwrap_or(self.pretty),
            max_depth: overlay.max_depth.or(self.max_depth),
        }
    }
}

/// Unified configuration for nodetree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Settings {
    pub codec: CodecSettings,
}

/// Get the XDG config directory for nodetree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "nodetree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("nodetree.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> TreeResult<RawSettings> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| TreeError::Config(format!("read {}: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| TreeError::Config(format!("parse {}: {}", path.display(), e)))
}

fn config_err(e: ConfigError) -> TreeError {
    TreeError::Config(e.to_string())
}

impl Settings {
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            codec: self.codec.merge(&overlay.codec),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local` - Optional TOML file layered over the global config. Must exist if given.
    #[instrument(level = "debug")]
    pub fn load(local: Option<&Path>) -> TreeResult<Self> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                debug!(path = %global_path.display(), "loading global config");
                current = current.merge_with(&load_raw_settings(&global_path)?);
            }
        }

        if let Some(local_path) = local {
            debug!(path = %local_path.display(), "loading local config");
            current = current.merge_with(&load_raw_settings(local_path)?);
        }

        Self::apply_env_overrides(current)
    }

    /// Parse settings from a TOML string on top of the defaults (no files, no env).
    pub fn from_toml_str(content: &str) -> TreeResult<Self> {
        let raw: RawSettings =
            toml::from_str(content).map_err(|e| TreeError::Config(e.to_string()))?;
        Ok(Self::default().merge_with(&raw))
    }

    /// Apply NODETREE__* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> TreeResult<Self> {
        let config = Config::builder()
            .add_source(Environment::with_prefix("NODETREE").separator("__"))
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_bool("codec.pretty") {
            settings.codec.pretty = val;
        }
        if let Ok(val) = config.get_int("codec.max_depth") {
            let depth = usize::try_from(val)
                .map_err(|_| TreeError::Config(format!("invalid codec.max_depth: {}", val)))?;
            settings.codec.max_depth = Some(depth);
        }

        Ok(settings)
    }
}
