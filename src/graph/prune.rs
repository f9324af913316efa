use std::collections::HashSet;

use petgraph::graph::NodeIndex;
use serde::Serialize;

use crate::graph::{NodeState, PackageGraph};

#[derive(Debug, Clone, Copy, Default)]
pub struct PruneOptions {
    /// Whether an `Ignore`-state dependent counts as a kept dependent during
    /// restoration. Off by default: ignored packages are excluded from the
    /// rendered view, so they do not keep their dependencies alive either.
    pub restore_via_ignored: bool,
}

/// Three-way classification of one removal request. `not_found` and
/// `removed_roots` are expected outcomes, not errors.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemovalOutcome {
    pub removed: Vec<String>,
    pub not_found: Vec<String>,
    pub removed_roots: Vec<String>,
}

/// Simulates removing the requested packages, mutating node states in place.
///
/// Each target is processed in two phases: a cascade that marks the target's
/// whole forward-reachable subtree `Remove`, then a restore sweep over the
/// same subtree that re-marks `Keep` anything still held by a root or by a
/// kept dependent. A package therefore stays removed only when every path
/// from a kept ancestor to it runs through a requested package.
pub fn simulate_removal(
    graph: &mut PackageGraph,
    requested: &[String],
    options: &PruneOptions,
) -> RemovalOutcome {
    let mut outcome = RemovalOutcome::default();

    let mut seen = HashSet::new();
    let mut targets: Vec<NodeIndex> = Vec::new();
    for name in requested {
        if !seen.insert(name.to_lowercase()) {
            continue;
        }
        match graph.lookup(name) {
            Some(handle) if graph.has_dependents(handle) => targets.push(handle),
            Some(handle) if graph.is_root(handle) => {
                outcome.removed_roots.push(graph.node(handle).name.clone());
            }
            _ => outcome.not_found.push(name.clone()),
        }
    }

    let target_set: HashSet<NodeIndex> = targets.iter().copied().collect();
    for target in &targets {
        cascade_remove(graph, *target);
        cascade_restore(graph, *target, &target_set, options);
    }

    for handle in graph.sorted_nodes() {
        if graph.node(handle).state == NodeState::Remove {
            outcome.removed.push(graph.node(handle).name.clone());
        }
    }
    outcome.not_found.sort();
    outcome.removed_roots.sort();
    outcome
}

/// Phase A: mark the target and everything forward-reachable from it as
/// removed. Explicit worklist, so cycles and deep chains are safe.
fn cascade_remove(graph: &mut PackageGraph, target: NodeIndex) {
    let mut visited = HashSet::new();
    let mut stack = vec![target];
    while let Some(handle) = stack.pop() {
        if !visited.insert(handle) {
            continue;
        }
        if graph.node(handle).state != NodeState::Ignore {
            graph.node_mut(handle).state = NodeState::Remove;
        }
        stack.extend(graph.dependencies(handle));
    }
}

/// Phase B: walk the same subtree and restore anything that is a root or has
/// a surviving dependent outside the target set. The walk continues into a
/// node's dependencies whether or not the node itself was restored, so
/// restoration reaches shared subtrees.
///
/// A node already visited is re-examined when one of its dependents flips
/// back to `Keep` later in the walk, otherwise the verdict would depend on
/// pop order. Each node can flip at most once, so the repushes terminate
/// even on cycles.
fn cascade_restore(
    graph: &mut PackageGraph,
    target: NodeIndex,
    targets: &HashSet<NodeIndex>,
    options: &PruneOptions,
) {
    let mut visited = HashSet::new();
    let mut stack = vec![target];
    while let Some(handle) = stack.pop() {
        let first_visit = visited.insert(handle);
        let flipped = graph.node(handle).state == NodeState::Remove
            && should_restore(graph, handle, targets, options);
        if flipped {
            graph.node_mut(handle).state = NodeState::Keep;
        }
        if first_visit || flipped {
            stack.extend(graph.dependencies(handle));
        }
    }
}

fn should_restore(
    graph: &PackageGraph,
    handle: NodeIndex,
    targets: &HashSet<NodeIndex>,
    options: &PruneOptions,
) -> bool {
    if graph.is_root(handle) {
        return true;
    }
    if targets.contains(&handle) {
        return false;
    }
    graph.dependents(handle).into_iter().any(|dependent| {
        match graph.node(dependent).state {
            NodeState::Keep => true,
            NodeState::Ignore => options.restore_via_ignored,
            NodeState::Remove => false,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::builder::{build_graph, BuildOptions};
    use crate::manifest::{DependencyRecord, PackageRecord, RecordKind};

    fn record(name: &str, deps: &[&str]) -> PackageRecord {
        PackageRecord {
            name: name.to_string(),
            version: Some("1.0.0".to_string()),
            kind: RecordKind::Source,
            dependencies: deps
                .iter()
                .map(|dep| DependencyRecord {
                    name: dep.to_string(),
                    version_range: None,
                })
                .collect(),
        }
    }

    fn diamond() -> PackageGraph {
        let records = vec![
            record("root", &["a", "b"]),
            record("a", &["c"]),
            record("b", &["c"]),
            record("c", &[]),
        ];
        build_graph(&records, &["root".to_string()], &BuildOptions::default())
            .expect("build diamond graph")
    }

    fn state_of(graph: &PackageGraph, name: &str) -> NodeState {
        let handle = graph.lookup(name).expect("node present");
        graph.node(handle).state
    }

    #[test]
    fn diamond_restore_keeps_shared_dependency() {
        let mut graph = diamond();
        let outcome = simulate_removal(&mut graph, &["a".to_string()], &PruneOptions::default());

        assert_eq!(outcome.removed, vec!["a"]);
        assert!(outcome.not_found.is_empty());
        assert!(outcome.removed_roots.is_empty());
        assert_eq!(state_of(&graph, "c"), NodeState::Keep);
        assert_eq!(state_of(&graph, "b"), NodeState::Keep);
    }

    #[test]
    fn restore_reaches_nodes_visited_before_their_kept_dependent() {
        // root -> t, root -> p, t -> q, t -> p, p -> q. Removing t: p is
        // restored through root, so q must survive through p even when the
        // walk reaches q before p flips back to Keep.
        let records = vec![
            record("root", &["t", "p"]),
            record("t", &["q", "p"]),
            record("p", &["q"]),
            record("q", &[]),
        ];
        let mut graph = build_graph(&records, &["root".to_string()], &BuildOptions::default())
            .expect("build graph");

        let outcome = simulate_removal(&mut graph, &["t".to_string()], &PruneOptions::default());

        assert_eq!(outcome.removed, vec!["t"]);
        assert_eq!(state_of(&graph, "p"), NodeState::Keep);
        assert_eq!(state_of(&graph, "q"), NodeState::Keep);
    }

    #[test]
    fn diamond_removing_both_parents_removes_shared_dependency() {
        let mut graph = diamond();
        let outcome = simulate_removal(
            &mut graph,
            &["a".to_string(), "b".to_string()],
            &PruneOptions::default(),
        );

        assert_eq!(outcome.removed, vec!["a", "b", "c"]);
        assert_eq!(state_of(&graph, "root"), NodeState::Keep);
    }

    #[test]
    fn unknown_name_is_reported_and_states_stay_untouched() {
        let mut graph = diamond();
        let outcome =
            simulate_removal(&mut graph, &["ghost".to_string()], &PruneOptions::default());

        assert!(outcome.removed.is_empty());
        assert_eq!(outcome.not_found, vec!["ghost"]);
        for name in ["root", "a", "b", "c"] {
            assert_eq!(state_of(&graph, name), NodeState::Keep);
        }
    }

    #[test]
    fn root_removal_request_is_classified_not_executed() {
        let mut graph = diamond();
        let outcome =
            simulate_removal(&mut graph, &["root".to_string()], &PruneOptions::default());

        assert!(outcome.removed.is_empty());
        assert_eq!(outcome.removed_roots, vec!["root"]);
        for name in ["root", "a", "b", "c"] {
            assert_eq!(state_of(&graph, name), NodeState::Keep);
        }
    }

    #[test]
    fn roots_reachable_from_a_target_are_never_removed() {
        // app -> shared, app -> tool, tool -> shared; both app and tool are
        // roots, tool also has a dependent so it is a valid target.
        let records = vec![
            record("app", &["shared", "tool"]),
            record("tool", &["shared"]),
            record("shared", &[]),
        ];
        let mut graph = build_graph(
            &records,
            &["app".to_string(), "tool".to_string()],
            &BuildOptions::default(),
        )
        .expect("build graph");

        let outcome =
            simulate_removal(&mut graph, &["tool".to_string()], &PruneOptions::default());

        assert!(outcome.removed.is_empty());
        assert_eq!(state_of(&graph, "tool"), NodeState::Keep);
        assert_eq!(state_of(&graph, "shared"), NodeState::Keep);
    }

    #[test]
    fn exclusive_chain_is_removed_transitively() {
        let records = vec![
            record("root", &["a"]),
            record("a", &["b"]),
            record("b", &["c"]),
            record("c", &[]),
        ];
        let mut graph = build_graph(&records, &["root".to_string()], &BuildOptions::default())
            .expect("build graph");

        let outcome = simulate_removal(&mut graph, &["a".to_string()], &PruneOptions::default());
        assert_eq!(outcome.removed, vec!["a", "b", "c"]);
    }

    #[test]
    fn cyclic_dependencies_do_not_hang_the_cascade() {
        let records = vec![
            record("root", &["a"]),
            record("a", &["b"]),
            record("b", &["a", "c"]),
            record("c", &[]),
        ];
        let mut graph = build_graph(&records, &["root".to_string()], &BuildOptions::default())
            .expect("build graph");

        let outcome = simulate_removal(&mut graph, &["a".to_string()], &PruneOptions::default());
        assert_eq!(outcome.removed, vec!["a", "b", "c"]);
    }

    #[test]
    fn requested_names_deduplicate_case_insensitively() {
        let mut graph = diamond();
        let outcome = simulate_removal(
            &mut graph,
            &["a".to_string(), "A".to_string()],
            &PruneOptions::default(),
        );
        assert_eq!(outcome.removed, vec!["a"]);
    }

    #[test]
    fn simulation_is_idempotent() {
        let mut graph = diamond();
        let first = simulate_removal(&mut graph, &["a".to_string()], &PruneOptions::default());
        let second = simulate_removal(&mut graph, &["a".to_string()], &PruneOptions::default());
        assert_eq!(first.removed, second.removed);
        assert_eq!(state_of(&graph, "c"), NodeState::Keep);
    }

    #[test]
    fn ignored_nodes_are_never_touched() {
        let records = vec![record("root", &["a"]), record("a", &["muted"]), record("muted", &[])];
        let options = BuildOptions {
            ignored: vec!["muted".to_string()],
            ..BuildOptions::default()
        };
        let mut graph = build_graph(&records, &["root".to_string()], &options)
            .expect("build graph");

        let outcome = simulate_removal(&mut graph, &["a".to_string()], &PruneOptions::default());
        assert_eq!(outcome.removed, vec!["a"]);
        assert_eq!(state_of(&graph, "muted"), NodeState::Ignore);
    }

    #[test]
    fn ignored_dependent_keeps_nothing_alive_by_default() {
        // root -> a -> shared, muted -> shared; muted is ignored.
        let records = vec![
            record("root", &["a", "muted"]),
            record("a", &["shared"]),
            record("muted", &["shared"]),
            record("shared", &[]),
        ];
        let options = BuildOptions {
            ignored: vec!["muted".to_string()],
            ..BuildOptions::default()
        };
        let mut graph = build_graph(&records, &["root".to_string()], &options)
            .expect("build graph");

        let outcome = simulate_removal(&mut graph, &["a".to_string()], &PruneOptions::default());
        assert_eq!(outcome.removed, vec!["a", "shared"]);
    }

    #[test]
    fn ignored_dependent_restores_when_configured() {
        let records = vec![
            record("root", &["a", "muted"]),
            record("a", &["shared"]),
            record("muted", &["shared"]),
            record("shared", &[]),
        ];
        let build = BuildOptions {
            ignored: vec!["muted".to_string()],
            ..BuildOptions::default()
        };
        let mut graph =
            build_graph(&records, &["root".to_string()], &build).expect("build graph");

        let prune = PruneOptions {
            restore_via_ignored: true,
        };
        let outcome = simulate_removal(&mut graph, &["a".to_string()], &prune);
        assert_eq!(outcome.removed, vec!["a"]);
        assert_eq!(state_of(&graph, "shared"), NodeState::Keep);
    }

    #[test]
    fn package_without_dependents_or_root_status_is_unreachable() {
        let records = vec![record("root", &[]), record("orphan", &[])];
        let mut graph = build_graph(&records, &["root".to_string()], &BuildOptions::default())
            .expect("build graph");

        let outcome =
            simulate_removal(&mut graph, &["orphan".to_string()], &PruneOptions::default());
        assert!(outcome.removed.is_empty());
        assert_eq!(outcome.not_found, vec!["orphan"]);
    }
}
