use crate::core::{MiniQueryError, Result};
use crate::table_listing::ListingStyle;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Statement timeout used when no settings file says otherwise.
pub const DEFAULT_TIMEOUT_SECS: u64 = 180;

/// Top-level settings parsed from an optional TOML file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub query: QuerySettings,
    pub render: ListingStyle,
    pub materialize: MaterializeSettings,
}

/// Statement execution settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct QuerySettings {
    /// Seconds before the driver aborts a statement; 0 disables the limit
    pub timeout_secs: u64,
}

impl Default for QuerySettings {
    fn default() -> Self {
        QuerySettings {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl QuerySettings {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

/// Result materialization settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MaterializeSettings {
    /// Copy results into a detached snapshot before rendering
    pub detach: bool,
}

impl Default for MaterializeSettings {
    fn default() -> Self {
        MaterializeSettings { detach: true }
    }
}

/// Parses settings from TOML text.
pub fn parse_settings(content: &str) -> Result<Settings> {
    toml::from_str(content).map_err(|e| MiniQueryError::Config(e.to_string()))
}

/// Loads settings from a TOML file at the given path.
///
/// # Example
///
/// ```no_run
/// let settings = miniquery::config::load_config("miniquery.toml").expect("Failed to load config");
/// println!("{:?}", settings);
/// ```
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .map_err(|e| MiniQueryError::Config(format!("{}: {}", path.display(), e)))?;
    parse_settings(&content)
}

/// `<config dir>/miniquery/config.toml`, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("miniquery").join("config.toml"))
}

/// Settings from `explicit` if given, else from the default location if that
/// file exists, else built-in defaults.
pub fn load_settings(explicit: Option<&Path>) -> Result<Settings> {
    if let Some(path) = explicit {
        debug!(path = %path.display(), "loading settings");
        return load_config(path);
    }
    match default_config_path() {
        Some(path) if path.is_file() => {
            debug!(path = %path.display(), "loading settings");
            load_config(path)
        }
        _ => Ok(Settings::default()),
    }
}
