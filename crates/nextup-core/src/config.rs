// Configuration loading and parsing (nextup.toml).

use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::draw::scheduler::{MAX_SPIN_SECS, MIN_SPIN_SECS};
use crate::draw::SpinDuration;
use crate::source::{Source, CUSTOM_SOURCE};

/// Name of the config file under `config/` and `defaults/`.
pub const CONFIG_FILE: &str = "nextup.toml";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

/// Fully loaded and validated configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub spin: SpinConfig,
    pub sources: SourcesConfig,
    pub audio: AudioConfig,
    /// Directory the config was loaded from. Relative list locations
    /// resolve against it.
    pub base_dir: PathBuf,
}

/// Raw deserialization target for nextup.toml.
#[derive(Debug, Clone, Deserialize)]
struct ConfigFile {
    spin: SpinConfig,
    sources: SourcesConfig,
    #[serde(default)]
    audio: AudioConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpinConfig {
    pub duration_secs: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourcesConfig {
    /// Source loaded at startup: a list name or "custom".
    pub default: String,
    /// Directory (relative to the base dir) or http(s) base URL.
    pub location: String,
    /// Named lists in tab order.
    #[serde(rename = "list", default)]
    pub lists: Vec<ListConfig>,
    /// Seconds before a request to an HTTP location is abandoned.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ListConfig {
    pub name: String,
    pub file: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AudioConfig {
    /// Ring the terminal bell when a spin settles.
    #[serde(default = "default_true")]
    pub bell: bool,
    /// Ring the terminal bell on every suspense tick.
    #[serde(default)]
    pub tick: bool,
}

impl Default for AudioConfig {
    fn default() -> Self {
        AudioConfig {
            bell: true,
            tick: false,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    10
}

impl Config {
    /// The configured spin length. Always valid once `validate` passed.
    pub fn spin_duration(&self) -> SpinDuration {
        SpinDuration::new(self.spin.duration_secs).unwrap_or_default()
    }

    pub fn default_source(&self) -> Source {
        Source::parse(&self.sources.default)
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate `config/nextup.toml` relative to `base_dir`.
///
/// Does not copy defaults; `load_config()` handles that.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join(CONFIG_FILE);
    let text = read_file(&path)?;
    let file: ConfigFile = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        source: e,
    })?;

    let config = Config {
        spin: file.spin,
        sources: file.sources,
        audio: file.audio,
        base_dir: base_dir.to_path_buf(),
    };

    validate(&config)?;

    Ok(config)
}

/// Seed `config/nextup.toml` from `defaults/` if the user has none yet.
///
/// Returns the path written, or `None` when a config was already present.
/// An existing file is never overwritten.
pub fn ensure_config_file(base_dir: &Path) -> Result<Option<PathBuf>, ConfigError> {
    let target = base_dir.join("config").join(CONFIG_FILE);
    if target.is_file() {
        return Ok(None);
    }

    let shipped = base_dir.join("defaults").join(CONFIG_FILE);
    if !shipped.is_file() {
        return Err(ConfigError::DefaultsCopyError {
            message: format!(
                "no {CONFIG_FILE} under config/ or defaults/ in {}",
                base_dir.display()
            ),
        });
    }

    let seed_error = |e: std::io::Error| ConfigError::DefaultsCopyError {
        message: format!("failed to seed {} from defaults: {e}", target.display()),
    };
    std::fs::create_dir_all(base_dir.join("config")).map_err(seed_error)?;
    std::fs::copy(&shipped, &target).map_err(seed_error)?;

    Ok(Some(target))
}

/// Load config from the working directory, or from the per-user config
/// directory when the working directory has neither `defaults/` nor
/// `config/`. Missing files are copied from `defaults/` first.
pub fn load_config() -> Result<Config, ConfigError> {
    let base_dir = resolve_base_dir()?;
    if let Some(path) = ensure_config_file(&base_dir)? {
        info!("Initialized {} from defaults", path.display());
    }
    load_config_from(&base_dir)
}

fn resolve_base_dir() -> Result<PathBuf, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    if cwd.join("defaults").exists() || cwd.join("config").exists() {
        return Ok(cwd);
    }

    match directories::ProjectDirs::from("", "", "nextup") {
        Some(dirs) if dirs.config_dir().join("config").exists() => {
            Ok(dirs.config_dir().to_path_buf())
        }
        // Fall through with cwd so the error names the directory the user
        // actually ran from.
        _ => Ok(cwd),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.into(),
        message: message.into(),
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    let secs = config.spin.duration_secs;
    if SpinDuration::new(secs).is_none() {
        return Err(invalid(
            "spin.duration_secs",
            format!("must be between {MIN_SPIN_SECS} and {MAX_SPIN_SECS} inclusive, got {secs}"),
        ));
    }

    let sources = &config.sources;
    if sources.location.trim().is_empty() {
        return Err(invalid("sources.location", "must not be empty"));
    }
    if sources.lists.is_empty() {
        return Err(invalid("sources.list", "at least one list is required"));
    }
    if sources.timeout_secs == 0 {
        return Err(invalid("sources.timeout_secs", "must be at least 1"));
    }

    let mut seen = HashSet::new();
    for list in &sources.lists {
        let name = list.name.trim();
        if name.is_empty() {
            return Err(invalid("sources.list.name", "must not be empty"));
        }
        if name == CUSTOM_SOURCE {
            return Err(invalid(
                "sources.list.name",
                format!("`{CUSTOM_SOURCE}` is reserved"),
            ));
        }
        if !seen.insert(name) {
            return Err(invalid(
                "sources.list.name",
                format!("duplicate list name `{name}`"),
            ));
        }
        if list.file.trim().is_empty() {
            return Err(invalid(
                "sources.list.file",
                format!("list `{name}` has no file"),
            ));
        }
    }

    let default = sources.default.trim();
    if default != CUSTOM_SOURCE && !seen.contains(default) {
        return Err(invalid(
            "sources.default",
            format!("`{default}` is not a configured list or `{CUSTOM_SOURCE}`"),
        ));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
