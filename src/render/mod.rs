use std::path::Path;

use petgraph::graph::NodeIndex;

use crate::error::{DepvizError, Result};
use crate::graph::{NodeState, PackageGraph, PackageKind, PackageNode};

pub mod dot;
pub mod mermaid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Notation {
    #[default]
    Mermaid,
    Dot,
}

impl Notation {
    pub fn parse(input: &str) -> Result<Self> {
        match input.to_ascii_lowercase().as_str() {
            "mermaid" | "mmd" => Ok(Notation::Mermaid),
            "dot" | "graphviz" => Ok(Notation::Dot),
            other => Err(DepvizError::Configuration(format!(
                "unknown notation '{other}' (expected 'mermaid' or 'dot')"
            ))),
        }
    }

    pub fn from_extension(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "mmd" | "mermaid" => Some(Notation::Mermaid),
            "dot" | "gv" => Some(Notation::Dot),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    LeftToRight,
    TopToBottom,
}

impl Direction {
    pub fn parse(input: &str) -> Result<Self> {
        match input.to_ascii_lowercase().as_str() {
            "lr" | "left-to-right" => Ok(Direction::LeftToRight),
            "tb" | "top-to-bottom" => Ok(Direction::TopToBottom),
            other => Err(DepvizError::Configuration(format!(
                "unknown direction '{other}' (expected 'lr' or 'tb')"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    pub notation: Notation,
    pub direction: Direction,
    pub include_versions: bool,
    pub show_ignored: bool,
}

/// Styling intent per node, shared between notations. Each renderer maps
/// these to its own syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeStyle {
    Removed,
    Ignored,
    Project,
    Unknown,
    Plain,
}

pub fn style_for(node: &PackageNode) -> NodeStyle {
    match (node.state, node.kind) {
        (NodeState::Remove, _) => NodeStyle::Removed,
        (NodeState::Ignore, _) => NodeStyle::Ignored,
        (NodeState::Keep, PackageKind::Project) => NodeStyle::Project,
        (NodeState::Keep, PackageKind::Unknown) => NodeStyle::Unknown,
        (NodeState::Keep, PackageKind::Source) => NodeStyle::Plain,
    }
}

/// The visible slice of a graph in deterministic order: nodes sorted by name,
/// edges in source order then target order. Ignored nodes and any edge
/// touching one are dropped unless `show_ignored` is set.
pub struct GraphView {
    pub nodes: Vec<NodeIndex>,
    pub edges: Vec<(NodeIndex, NodeIndex)>,
}

impl GraphView {
    pub fn new(graph: &PackageGraph, options: &RenderOptions) -> Self {
        let visible = |handle: NodeIndex| {
            options.show_ignored || graph.node(handle).state != NodeState::Ignore
        };
        let nodes: Vec<NodeIndex> = graph
            .sorted_nodes()
            .into_iter()
            .filter(|handle| visible(*handle))
            .collect();
        let mut edges = Vec::new();
        for from in &nodes {
            for to in graph.sorted_dependencies(*from) {
                if visible(to) {
                    edges.push((*from, to));
                }
            }
        }
        Self { nodes, edges }
    }
}

/// Renders one complete graph document. Options are validated up front so a
/// failure never leaves partial output behind.
pub fn render_graph(graph: &PackageGraph, options: &RenderOptions) -> Result<String> {
    let view = GraphView::new(graph, options);
    if options.include_versions {
        for handle in &view.nodes {
            let node = graph.node(*handle);
            if node.version.is_none() {
                return Err(DepvizError::Configuration(format!(
                    "cannot include versions: package '{}' has none",
                    node.name
                )));
            }
        }
    }
    Ok(match options.notation {
        Notation::Mermaid => mermaid::render(graph, &view, options),
        Notation::Dot => dot::render(graph, &view, options),
    })
}
