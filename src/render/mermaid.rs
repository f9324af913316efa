use std::collections::HashMap;

use petgraph::graph::NodeIndex;

use crate::graph::PackageGraph;
use crate::render::{style_for, Direction, GraphView, NodeStyle, RenderOptions};

pub fn render(graph: &PackageGraph, view: &GraphView, options: &RenderOptions) -> String {
    // Positional ids are stable because the view is already sorted, and they
    // sidestep every character mermaid refuses in identifiers.
    let ids: HashMap<NodeIndex, usize> = view
        .nodes
        .iter()
        .enumerate()
        .map(|(position, handle)| (*handle, position))
        .collect();

    let mut out = String::new();
    header(&mut out, options);
    for handle in &view.nodes {
        node(&mut out, graph, *handle, ids[handle], options);
    }
    for (from, to) in &view.edges {
        out.push_str(&format!("    p{} --> p{}\n", ids[from], ids[to]));
    }
    out
}

fn header(out: &mut String, options: &RenderOptions) {
    let direction = match options.direction {
        Direction::LeftToRight => "LR",
        Direction::TopToBottom => "TD",
    };
    out.push_str(&format!("flowchart {direction}\n"));
    out.push_str("    classDef removed fill:#fde2e2,stroke:#c0392b,color:#c0392b\n");
    out.push_str("    classDef ignored fill:#f0f0f0,stroke:#9e9e9e,color:#757575\n");
    out.push_str("    classDef project fill:#dbe9ff,stroke:#2f6fb7\n");
    out.push_str("    classDef unknown fill:#fdf3d7,stroke:#b7791f\n");
}

fn node(
    out: &mut String,
    graph: &PackageGraph,
    handle: NodeIndex,
    id: usize,
    options: &RenderOptions,
) {
    let package = graph.node(handle);
    let label = escape_label(&package.identifier(options.include_versions));
    // Roots get the stadium shape so the unconditionally-required packages
    // stand out from the prunable ones.
    let shape = if graph.is_root(handle) {
        format!("p{id}([\"{label}\"])")
    } else {
        format!("p{id}[\"{label}\"]")
    };
    let class = match style_for(package) {
        NodeStyle::Removed => ":::removed",
        NodeStyle::Ignored => ":::ignored",
        NodeStyle::Project => ":::project",
        NodeStyle::Unknown => ":::unknown",
        NodeStyle::Plain => "",
    };
    out.push_str(&format!("    {shape}{class}\n"));
}

fn escape_label(label: &str) -> String {
    label.replace('"', "#quot;")
}
