use std::collections::{HashMap, HashSet};

use regex::Regex;

use crate::error::{DepvizError, Result};
use crate::graph::{NodeState, PackageGraph, PackageNode};
use crate::manifest::PackageRecord;

#[derive(Debug, Default)]
pub struct BuildOptions {
    /// Fail on records without a version. Set when the rendering mode embeds
    /// versions in node identifiers.
    pub require_versions: bool,
    /// Packages to mark `Ignore` at construction time (case-insensitive).
    pub ignored: Vec<String>,
    /// Deploy filter: when present, only packages whose name matches (plus
    /// declared roots) become nodes. Edges into filtered-out packages are
    /// dropped rather than treated as dangling.
    pub only: Option<Regex>,
}

pub fn build_graph(
    records: &[PackageRecord],
    roots: &[String],
    options: &BuildOptions,
) -> Result<PackageGraph> {
    let root_keys: HashSet<String> = roots.iter().map(|name| name.to_lowercase()).collect();
    let ignored_keys: HashSet<String> = options
        .ignored
        .iter()
        .map(|name| name.to_lowercase())
        .collect();

    // Names present anywhere in the resolved list, before filtering. An edge
    // into one of these is never dangling, only filtered.
    let resolved_keys: HashSet<String> = records
        .iter()
        .map(|record| record.name.to_lowercase())
        .collect();

    // Original manifest positions survive the filter so diagnostics point at
    // the record the user can actually find.
    let selected: Vec<(usize, &PackageRecord)> = records
        .iter()
        .enumerate()
        .filter(|(_, record)| {
            let key = record.name.to_lowercase();
            root_keys.contains(&key)
                || options
                    .only
                    .as_ref()
                    .map(|filter| filter.is_match(&record.name))
                    .unwrap_or(true)
        })
        .collect();

    let mut graph = PackageGraph::default();
    let mut versions: HashMap<String, Option<String>> = HashMap::new();

    for (position, record) in &selected {
        if record.name.is_empty() {
            return Err(DepvizError::MissingIdentity(
                format!("#{position}"),
                "name",
            ));
        }
        if options.require_versions && record.version.is_none() {
            return Err(DepvizError::MissingIdentity(record.name.clone(), "version"));
        }

        let key = record.name.to_lowercase();
        if let Some(existing) = versions.get(&key) {
            if *existing != record.version {
                return Err(DepvizError::DuplicatePackage {
                    name: record.name.clone(),
                    first: existing.clone().unwrap_or_default(),
                    second: record.version.clone().unwrap_or_default(),
                });
            }
            // Same name, same version: a repeated record collapses into the
            // node already in the arena.
            continue;
        }
        versions.insert(key.clone(), record.version.clone());

        let state = if ignored_keys.contains(&key) {
            NodeState::Ignore
        } else {
            NodeState::Keep
        };
        graph.add_node(PackageNode {
            name: record.name.clone(),
            version: record.version.clone(),
            kind: record.kind.into(),
            state,
        });
    }

    for (_, record) in &selected {
        let from = match graph.lookup(&record.name) {
            Some(handle) => handle,
            None => continue,
        };
        let mut seen = HashSet::new();
        for dependency in &record.dependencies {
            let key = dependency.name.to_lowercase();
            if !seen.insert(key.clone()) {
                continue;
            }
            match graph.lookup(&dependency.name) {
                Some(to) => graph.add_edge(from, to),
                None if resolved_keys.contains(&key) => {
                    // Target was filtered out by the deploy filter.
                }
                None => {
                    return Err(DepvizError::UnresolvedEdge {
                        package: record.name.clone(),
                        dependency: dependency.name.clone(),
                    });
                }
            }
        }
    }

    for root in roots {
        match graph.lookup(root) {
            Some(handle) => graph.add_root(handle),
            None => return Err(DepvizError::UnknownRoot(root.clone())),
        }
    }

    Ok(graph)
}
