use ahash::{AHashMap, AHashSet};
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use serde::Serialize;
use std::collections::{BTreeSet, VecDeque};

use super::builder::{OrgNode, Relation, ReportingEdge};

/// Advisory findings from a completed build. Neither kind blocks a chart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HierarchyDiagnostics {
    /// One edge list per strongly connected group of nodes, each a closed
    /// walk `a -> b -> ... -> a`.
    pub cycles: Vec<Vec<ReportingEdge>>,
    /// Manager ids that match no row, sorted.
    pub dangling_managers: Vec<String>,
    /// Ids whose row names themselves as manager, sorted. No edge is drawn
    /// for these.
    pub self_managed: Vec<String>,
}

/// Manager references seen row by row while building, before later rows
/// overwrite earlier ones for the same id.
#[derive(Debug, Clone, Default)]
pub struct ManagerReferences {
    referenced: AHashSet<String>,
    self_managed: BTreeSet<String>,
}

impl ManagerReferences {
    pub fn record(&mut self, id: Option<&str>, manager_id: &str) {
        self.referenced.insert(manager_id.to_string());
        if id == Some(manager_id) {
            self.self_managed.insert(manager_id.to_string());
        }
    }
}

impl HierarchyDiagnostics {
    pub fn is_clean(&self) -> bool {
        self.cycles.is_empty() && self.dangling_managers.is_empty() && self.self_managed.is_empty()
    }

    /// One line per cycle plus one for all dangling managers.
    pub fn warnings(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .cycles
            .iter()
            .map(|cycle| {
                let edges: Vec<String> = cycle
                    .iter()
                    .map(|e| format!("{} -> {}", e.source, e.target))
                    .collect();
                format!("Warning: reporting cycle detected: {}", edges.join(", "))
            })
            .collect();
        if !self.dangling_managers.is_empty() {
            lines.push(format!(
                "Warning: manager ids not found in data: {}",
                self.dangling_managers.join(", ")
            ));
        }
        if !self.self_managed.is_empty() {
            lines.push(format!(
                "Warning: ids listed as their own manager: {}",
                self.self_managed.join(", ")
            ));
        }
        lines
    }
}

/// Post-build pass over the finished graph and the references collected
/// while building it.
pub fn validate(
    graph: &DiGraph<OrgNode, Relation>,
    references: &ManagerReferences,
) -> HierarchyDiagnostics {
    HierarchyDiagnostics {
        cycles: find_cycles(graph),
        dangling_managers: find_dangling_managers(graph, &references.referenced),
        self_managed: references.self_managed.iter().cloned().collect(),
    }
}

/// Every manager id referenced by any row, minus the ids that have a row.
fn find_dangling_managers(
    graph: &DiGraph<OrgNode, Relation>,
    referenced: &AHashSet<String>,
) -> Vec<String> {
    let known: AHashSet<&str> = graph
        .node_weights()
        .filter(|n| n.record.is_some())
        .map(|n| n.id.as_str())
        .collect();

    let mut dangling: Vec<String> = referenced
        .iter()
        .filter(|m| !m.trim().is_empty() && !known.contains(m.as_str()))
        .cloned()
        .collect();
    dangling.sort();
    dangling
}

fn find_cycles(graph: &DiGraph<OrgNode, Relation>) -> Vec<Vec<ReportingEdge>> {
    let mut groups: Vec<Vec<NodeIndex>> = tarjan_scc(graph)
        .into_iter()
        .filter(|scc| scc.len() > 1)
        .map(|mut scc| {
            scc.sort();
            scc
        })
        .collect();
    groups.sort_by_key(|scc| scc[0]);

    groups
        .iter()
        .filter_map(|scc| cycle_through(graph, scc))
        .map(|path| {
            path.iter()
                .map(|&(a, b)| ReportingEdge {
                    source: graph[a].id.clone(),
                    target: graph[b].id.clone(),
                })
                .collect()
        })
        .collect()
}

/// Shortest cycle through the lowest-indexed member of a strongly
/// connected group, found by a breadth-first walk inside the group.
fn cycle_through(
    graph: &DiGraph<OrgNode, Relation>,
    scc: &[NodeIndex],
) -> Option<Vec<(NodeIndex, NodeIndex)>> {
    let start = *scc.first()?;
    let members: AHashSet<NodeIndex> = scc.iter().copied().collect();
    let mut parent: AHashMap<NodeIndex, NodeIndex> = AHashMap::new();
    let mut visited: AHashSet<NodeIndex> = AHashSet::new();
    let mut queue = VecDeque::from([start]);
    visited.insert(start);

    while let Some(node) = queue.pop_front() {
        let mut next: Vec<NodeIndex> = graph
            .neighbors_directed(node, Direction::Outgoing)
            .filter(|n| members.contains(n))
            .collect();
        next.sort();

        for succ in next {
            if succ == start {
                let mut path = vec![node];
                let mut cursor = node;
                while cursor != start {
                    cursor = *parent.get(&cursor)?;
                    path.push(cursor);
                }
                path.reverse();
                let mut edges: Vec<(NodeIndex, NodeIndex)> =
                    path.windows(2).map(|w| (w[0], w[1])).collect();
                edges.push((node, start));
                return Some(edges);
            }
            if visited.insert(succ) {
                parent.insert(succ, node);
                queue.push_back(succ);
            }
        }
    }
    None
}
