//! Configuration loading and the live-mutable runtime knobs.
//!
//! Startup configuration is layered (later sources override earlier):
//! 1. Built-in defaults
//! 2. Default config file (~/.config/note-search/config.toml)
//! 3. CLI-specified config file
//! 4. Environment variables (NOTE_SEARCH_*)
//!
//! The `[runtime]` table holds the knobs that stay mutable while the daemon
//! runs: excluded directory names, the rebuild interval, and the snippet
//! context width. They are shared behind a lock and re-read at each point of
//! use, so a PATCH takes effect on the next rebuild cycle or query — never
//! retroactively on an in-flight job.

use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Live-mutable runtime knobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Top-level corpus directory names whose subtrees are skipped entirely.
    #[serde(default = "default_exclude_dirnames")]
    pub exclude_dirnames: Vec<String>,

    /// Seconds between periodic rebuild triggers, re-read each cycle.
    #[serde(default = "default_reindex_interval")]
    pub reindex_interval_secs: u64,

    /// Characters of snippet context on each side of a query-term match.
    #[serde(default = "default_snippet_width")]
    pub snippet_width: usize,
}

fn default_exclude_dirnames() -> Vec<String> {
    vec![".obsidian".to_string(), ".trash".to_string()]
}

fn default_reindex_interval() -> u64 {
    600
}

fn default_snippet_width() -> usize {
    100
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            exclude_dirnames: default_exclude_dirnames(),
            reindex_interval_secs: default_reindex_interval(),
            snippet_width: default_snippet_width(),
        }
    }
}

impl RuntimeConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reindex_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "reindex_interval_secs must be > 0".to_string(),
            ));
        }
        if self.snippet_width == 0 {
            return Err(ConfigError::Invalid(
                "snippet_width must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Merge a partial update into this config.
    ///
    /// Only the keys present in the patch are touched; the returned patch
    /// echoes exactly what was applied. Zero intervals/widths are rejected
    /// before anything is written.
    pub fn apply(&mut self, patch: &RuntimeConfigPatch) -> Result<RuntimeConfigPatch, ConfigError> {
        if let Some(interval) = patch.reindex_interval_secs {
            if interval == 0 {
                return Err(ConfigError::Invalid(
                    "reindex_interval_secs must be > 0".to_string(),
                ));
            }
        }
        if let Some(width) = patch.snippet_width {
            if width == 0 {
                return Err(ConfigError::Invalid(
                    "snippet_width must be > 0".to_string(),
                ));
            }
        }

        let mut applied = RuntimeConfigPatch::default();
        if let Some(dirnames) = &patch.exclude_dirnames {
            self.exclude_dirnames = dirnames.clone();
            applied.exclude_dirnames = Some(dirnames.clone());
        }
        if let Some(interval) = patch.reindex_interval_secs {
            self.reindex_interval_secs = interval;
            applied.reindex_interval_secs = Some(interval);
        }
        if let Some(width) = patch.snippet_width {
            self.snippet_width = width;
            applied.snippet_width = Some(width);
        }
        Ok(applied)
    }
}

/// Partial runtime config update. Unknown JSON keys are ignored on the way in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeConfigPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_dirnames: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reindex_interval_secs: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet_width: Option<usize>,
}

impl RuntimeConfigPatch {
    /// True when no recognized key is present.
    pub fn is_empty(&self) -> bool {
        self.exclude_dirnames.is_none()
            && self.reindex_interval_secs.is_none()
            && self.snippet_width.is_none()
    }
}

/// Runtime config shared between the lifecycle manager and the query service.
pub type SharedRuntimeConfig = Arc<RwLock<RuntimeConfig>>;

/// Wrap a runtime config for sharing.
pub fn shared_runtime(config: RuntimeConfig) -> SharedRuntimeConfig {
    Arc::new(RwLock::new(config))
}

/// Startup configuration for the daemon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Root of the note corpus.
    pub corpus_dir: PathBuf,

    /// Directory holding the active/backup/staging index generations.
    #[serde(default = "default_index_dir")]
    pub index_dir: PathBuf,

    /// Stopword list file, one token per line.
    pub stopwords_path: PathBuf,

    /// HTTP bind host.
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP bind port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Default log filter when RUST_LOG is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Live-mutable knobs, also patchable over the API.
    #[serde(default)]
    pub runtime: RuntimeConfig,
}

fn default_index_dir() -> PathBuf {
    ProjectDirs::from("", "", "note-search")
        .map(|p| p.data_dir().join("index"))
        .unwrap_or_else(|| PathBuf::from("./index"))
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AppConfig {
    /// Load the layered configuration.
    ///
    /// `cli_config_path` (from `--config`) overrides the default config file
    /// location; environment variables override both. Nested runtime keys use
    /// a double-underscore separator, e.g. `NOTE_SEARCH_RUNTIME__SNIPPET_WIDTH`.
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, ConfigError> {
        let config_dir = ProjectDirs::from("", "", "note-search")
            .map(|p| p.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));
        let default_config_path = config_dir.join("config");

        let mut builder = Config::builder()
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        if let Some(path) = cli_config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("NOTE_SEARCH")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| ConfigError::Load(e.to_string()))?;

        let app: AppConfig = config
            .try_deserialize()
            .map_err(|e| ConfigError::Load(e.to_string()))?;

        app.runtime.validate()?;
        Ok(app)
    }
}
