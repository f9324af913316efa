use petgraph::graph::NodeIndex;

use crate::graph::PackageGraph;
use crate::render::{style_for, Direction, GraphView, NodeStyle, RenderOptions};

pub fn render(graph: &PackageGraph, view: &GraphView, options: &RenderOptions) -> String {
    let mut out = String::new();
    header(&mut out, options);
    for handle in &view.nodes {
        node(&mut out, graph, *handle, options);
    }
    for (from, to) in &view.edges {
        let from_id = escape(&graph.node(*from).identifier(options.include_versions));
        let to_id = escape(&graph.node(*to).identifier(options.include_versions));
        out.push_str(&format!("  \"{from_id}\" -> \"{to_id}\";\n"));
    }
    out.push_str("}\n");
    out
}

fn header(out: &mut String, options: &RenderOptions) {
    let rankdir = match options.direction {
        Direction::LeftToRight => "LR",
        Direction::TopToBottom => "TB",
    };
    out.push_str("digraph dependencies {\n");
    out.push_str(&format!("  rankdir={rankdir};\n"));
    out.push_str("  node [shape=box, style=\"rounded,filled\", fillcolor=white];\n");
}

fn node(out: &mut String, graph: &PackageGraph, handle: NodeIndex, options: &RenderOptions) {
    let package = graph.node(handle);
    let id = escape(&package.identifier(options.include_versions));
    let mut attributes: Vec<&str> = match style_for(package) {
        NodeStyle::Removed => vec![
            "fillcolor=\"#fde2e2\"",
            "color=\"#c0392b\"",
            "fontcolor=\"#c0392b\"",
        ],
        NodeStyle::Ignored => vec![
            "fillcolor=\"#f0f0f0\"",
            "color=\"#9e9e9e\"",
            "fontcolor=\"#757575\"",
        ],
        NodeStyle::Project => vec!["fillcolor=\"#dbe9ff\"", "color=\"#2f6fb7\""],
        NodeStyle::Unknown => vec!["fillcolor=\"#fdf3d7\"", "color=\"#b7791f\""],
        NodeStyle::Plain => Vec::new(),
    };
    if graph.is_root(handle) {
        attributes.push("penwidth=2");
    }
    if attributes.is_empty() {
        out.push_str(&format!("  \"{id}\";\n"));
    } else {
        out.push_str(&format!("  \"{id}\" [{}];\n", attributes.join(", ")));
    }
}

fn escape(id: &str) -> String {
    id.replace('"', "\\\"")
}
