use std::collections::{HashMap, HashSet};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;

pub mod builder;
pub mod prune;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageKind {
    Source,
    Project,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    Keep,
    Remove,
    Ignore,
}

#[derive(Debug, Clone)]
pub struct PackageNode {
    pub name: String,
    pub version: Option<String>,
    pub kind: PackageKind,
    pub state: NodeState,
}

impl PackageNode {
    pub fn identifier(&self, include_version: bool) -> String {
        match (include_version, self.version.as_deref()) {
            (true, Some(version)) => format!("{}/{}", self.name, version),
            _ => self.name.clone(),
        }
    }
}

/// Arena of package nodes plus both adjacency directions. Node handles stay
/// stable for the lifetime of the graph; after construction only the per-node
/// `state` field is ever mutated.
#[derive(Debug, Default)]
pub struct PackageGraph {
    arena: DiGraph<PackageNode, ()>,
    index: HashMap<String, NodeIndex>,
    roots: HashSet<NodeIndex>,
}

impl PackageGraph {
    pub(crate) fn add_node(&mut self, node: PackageNode) -> NodeIndex {
        let key = node.name.to_lowercase();
        let handle = self.arena.add_node(node);
        self.index.insert(key, handle);
        handle
    }

    pub(crate) fn add_edge(&mut self, from: NodeIndex, to: NodeIndex) {
        self.arena.add_edge(from, to, ());
    }

    pub(crate) fn add_root(&mut self, root: NodeIndex) {
        self.roots.insert(root);
    }

    pub fn lookup(&self, name: &str) -> Option<NodeIndex> {
        self.index.get(&name.to_lowercase()).copied()
    }

    pub fn node(&self, handle: NodeIndex) -> &PackageNode {
        &self.arena[handle]
    }

    pub fn node_mut(&mut self, handle: NodeIndex) -> &mut PackageNode {
        &mut self.arena[handle]
    }

    pub fn is_root(&self, handle: NodeIndex) -> bool {
        self.roots.contains(&handle)
    }

    pub fn dependencies(&self, handle: NodeIndex) -> Vec<NodeIndex> {
        self.arena
            .neighbors_directed(handle, Direction::Outgoing)
            .collect()
    }

    pub fn dependents(&self, handle: NodeIndex) -> Vec<NodeIndex> {
        self.arena
            .neighbors_directed(handle, Direction::Incoming)
            .collect()
    }

    pub fn has_dependents(&self, handle: NodeIndex) -> bool {
        self.arena
            .neighbors_directed(handle, Direction::Incoming)
            .next()
            .is_some()
    }

    pub fn node_count(&self) -> usize {
        self.arena.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.arena.edge_count()
    }

    /// All node handles ordered by case-insensitive name, so that every
    /// traversal over the whole graph is deterministic.
    pub fn sorted_nodes(&self) -> Vec<NodeIndex> {
        let mut nodes: Vec<NodeIndex> = self.arena.node_indices().collect();
        nodes.sort_by(|a, b| {
            let left = self.arena[*a].name.to_lowercase();
            let right = self.arena[*b].name.to_lowercase();
            left.cmp(&right)
        });
        nodes
    }

    /// Dependencies of `handle` in the same deterministic order.
    pub fn sorted_dependencies(&self, handle: NodeIndex) -> Vec<NodeIndex> {
        let mut deps = self.dependencies(handle);
        deps.sort_by(|a, b| {
            let left = self.arena[*a].name.to_lowercase();
            let right = self.arena[*b].name.to_lowercase();
            left.cmp(&right)
        });
        deps
    }
}
