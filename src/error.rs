use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum DepvizError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("failed to parse manifest {path}: {source}")]
    Manifest {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("package record '{0}' has no {1}")]
    MissingIdentity(String, &'static str),
    #[error("package '{name}' appears twice with versions '{first}' and '{second}'")]
    DuplicatePackage {
        name: String,
        first: String,
        second: String,
    },
    #[error(
        "package '{package}' depends on '{dependency}', which is not in the resolved package list"
    )]
    UnresolvedEdge { package: String, dependency: String },
    #[error("root package '{0}' is not in the resolved package list")]
    UnknownRoot(String),
    #[error("invalid render configuration: {0}")]
    Configuration(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, DepvizError>;
