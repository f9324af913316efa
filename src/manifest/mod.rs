use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{DepvizError, Result};
use crate::graph::PackageKind;

/// A resolved dependency manifest: the flat, already-version-resolved package
/// list produced by an external resolution step, plus the packages the
/// top-level subject requires directly.
#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    pub packages: Vec<PackageRecord>,
    #[serde(default)]
    pub roots: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PackageRecord {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub kind: RecordKind,
    #[serde(default)]
    pub dependencies: Vec<DependencyRecord>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Source,
    Project,
    #[default]
    Unknown,
}

impl From<RecordKind> for PackageKind {
    fn from(kind: RecordKind) -> Self {
        match kind {
            RecordKind::Source => PackageKind::Source,
            RecordKind::Project => PackageKind::Project,
            RecordKind::Unknown => PackageKind::Unknown,
        }
    }
}

/// One declared dependency edge. The range is what the package declared, not
/// the resolved version; it is only carried for display and never interpreted.
#[derive(Debug, Clone, Deserialize)]
pub struct DependencyRecord {
    pub name: String,
    #[serde(default, rename = "versionRange")]
    pub version_range: Option<String>,
}

impl Manifest {
    /// Declared roots, or, when the manifest does not name any, the packages
    /// nothing else depends on.
    pub fn effective_roots(&self) -> Vec<String> {
        if !self.roots.is_empty() {
            return self.roots.clone();
        }
        let depended_on: HashSet<String> = self
            .packages
            .iter()
            .flat_map(|package| package.dependencies.iter())
            .map(|dep| dep.name.to_lowercase())
            .collect();
        self.packages
            .iter()
            .filter(|package| !depended_on.contains(&package.name.to_lowercase()))
            .map(|package| package.name.clone())
            .collect()
    }
}

pub fn load_manifest(path: &Path) -> Result<Manifest> {
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|source| DepvizError::Manifest {
        path: path.to_path_buf(),
        source,
    })
}
