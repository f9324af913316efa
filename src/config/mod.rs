use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

pub const CONFIG_FILE: &str = "depviz.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    ConfigNotFound(PathBuf),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config at {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DepvizConfig {
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub packages: PackagesConfig,
    #[serde(default)]
    pub prune: PruneConfig,
}

/// Defaults for the writer; each field is overridden by its CLI flag.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RenderConfig {
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub direction: Option<String>,
    #[serde(default)]
    pub include_versions: Option<bool>,
    #[serde(default)]
    pub show_ignored: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackagesConfig {
    /// Packages marked `Ignore` at graph construction.
    #[serde(default)]
    pub ignore: Vec<String>,
    /// Deploy-filter regex; only matching packages (plus roots) are graphed.
    #[serde(default)]
    pub only: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PruneConfig {
    #[serde(default)]
    pub restore_via_ignored: bool,
}

/// Loads an explicit config path, or a `depviz.toml` sitting next to the
/// manifest. No file means defaults; an explicit path that does not exist is
/// an error.
pub fn load_config(explicit: Option<&Path>, manifest: &Path) -> Result<DepvizConfig> {
    let path = match explicit {
        Some(path) => {
            if !path.is_file() {
                return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
            }
            path.to_path_buf()
        }
        None => {
            let candidate = manifest
                .parent()
                .unwrap_or_else(|| Path::new("."))
                .join(CONFIG_FILE);
            if !candidate.is_file() {
                return Ok(DepvizConfig::default());
            }
            candidate
        }
    };
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|source| ConfigError::Toml { path, source })
}
