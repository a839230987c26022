//! Client config load/save for `~/.rag-query/config.yaml`.
//! Sections: `api.*` (where the query service lives) and `display.*`.

use std::path::{Path, PathBuf};

/// Base URL used when the config does not name one.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// en-US style locale date, e.g. `1/15/2024`.
pub const DEFAULT_DATE_FORMAT: &str = "%-m/%-d/%Y";

/// Env var that overrides the config file location.
pub const CONFIG_ENV_VAR: &str = "RAG_QUERY_CONFIG";

/// API section (base_url).
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct ApiSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

/// Display section (date_format).
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct DisplaySection {
    /// chrono `strftime` pattern for the "Modified" date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_format: Option<String>,
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiSection,
    #[serde(default)]
    pub display: DisplaySection,
}

impl Config {
    pub fn base_url(&self) -> &str {
        self.api.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn date_format(&self) -> &str {
        self.display
            .date_format
            .as_deref()
            .unwrap_or(DEFAULT_DATE_FORMAT)
    }
}

/// Where the config came from. Only an explicitly named file is required to exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Explicit(PathBuf),
    Default(PathBuf),
}

impl ConfigSource {
    pub fn path(&self) -> &Path {
        match self {
            ConfigSource::Explicit(p) | ConfigSource::Default(p) => p,
        }
    }
}

/// Returns the default config file path: `~/.rag-query/config.yaml` (platform-specific).
pub fn default_config_path() -> Option<PathBuf> {
    let home = home_dir()?;
    Some(home.join(".rag-query").join("config.yaml"))
}

#[cfg(unix)]
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

#[cfg(windows)]
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("USERPROFILE").map(PathBuf::from)
}

#[cfg(not(any(unix, windows)))]
fn home_dir() -> Option<PathBuf> {
    None
}

/// Resolve the config location: `override_path`, then `RAG_QUERY_CONFIG`, then the default path.
pub fn resolve_config_path(override_path: Option<&Path>) -> Option<ConfigSource> {
    if let Some(p) = override_path {
        return Some(ConfigSource::Explicit(p.to_path_buf()));
    }
    if let Some(val) = std::env::var_os(CONFIG_ENV_VAR) {
        return Some(ConfigSource::Explicit(PathBuf::from(val)));
    }
    default_config_path().map(ConfigSource::Default)
}

/// Load config from a YAML file.
pub fn load(path: &Path) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&contents)?)
}

/// Load from `source`; a missing default file yields the built-in defaults.
pub fn load_from(source: &ConfigSource) -> Result<Config, ConfigError> {
    match source {
        ConfigSource::Default(p) if !p.exists() => {
            tracing::debug!(path = %p.display(), "no config file, using defaults");
            Ok(Config::default())
        }
        other => load(other.path()),
    }
}

/// Save config to a YAML file. Creates parent directory if missing.
pub fn save(path: &Path, config: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let contents = serde_yaml::to_string(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

/// Config load/save error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Parse(#[from] serde_yaml::Error),
}
