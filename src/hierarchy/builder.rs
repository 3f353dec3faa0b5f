use ahash::AHashMap;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::Serialize;
use tracing::{debug, warn};

use super::diagnostics::{self, HierarchyDiagnostics, ManagerReferences};
use crate::error::{Error, Result};
use crate::resolver::columns::ColumnMap;
use crate::table::Table;

/// Edge label. Edges always point from manager to report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Relation {
    #[serde(rename = "reports_to")]
    ReportsTo,
}

impl Relation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Relation::ReportsTo => "reports_to",
        }
    }
}

/// One table row: the canonical id and manager id plus every column as an
/// ordered attribute bag, headers as written in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowRecord {
    pub id: String,
    pub manager_id: Option<String>,
    pub attributes: Vec<(String, Option<String>)>,
}

impl RowRecord {
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, v)| v.as_deref())
    }
}

/// Graph node. `record` is `None` for a manager that is referenced by some
/// row but has no row of its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrgNode {
    pub id: String,
    pub record: Option<RowRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ReportingEdge {
    pub source: String,
    pub target: String,
}

#[derive(Debug)]
pub struct Hierarchy {
    graph: DiGraph<OrgNode, Relation>,
    index: AHashMap<String, NodeIndex>,
    diagnostics: HierarchyDiagnostics,
    skipped_rows: usize,
}

impl Hierarchy {
    pub fn graph(&self) -> &DiGraph<OrgNode, Relation> {
        &self.graph
    }

    pub fn diagnostics(&self) -> &HierarchyDiagnostics {
        &self.diagnostics
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Rows dropped because their identifier was missing.
    pub fn skipped_rows(&self) -> usize {
        self.skipped_rows
    }

    pub fn node(&self, id: &str) -> Option<&OrgNode> {
        self.index.get(id).map(|&ix| &self.graph[ix])
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &OrgNode> {
        self.graph.node_weights()
    }

    /// Edges as `(manager, report, relation)` in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str, Relation)> {
        self.graph.edge_references().map(move |e| {
            (
                self.graph[e.source()].id.as_str(),
                self.graph[e.target()].id.as_str(),
                *e.weight(),
            )
        })
    }

    pub fn has_edge(&self, source: &str, target: &str) -> bool {
        match (self.index.get(source), self.index.get(target)) {
            (Some(&a), Some(&b)) => self.graph.contains_edge(a, b),
            _ => false,
        }
    }
}

/// Build the reporting graph from `table`.
///
/// Each row creates or overwrites the node for its id. A row with a manager
/// id that is present, non-empty and not its own id adds a manager→report
/// edge; repeated edges collapse. Cycles, dangling managers and rows that
/// name themselves as manager are reported in the diagnostics, never removed.
pub fn build(table: &Table, columns: &ColumnMap) -> Result<Hierarchy> {
    let id_ix = column_position(table, &columns.id)?;
    let manager_ix = column_position(table, &columns.manager)?;

    let mut graph: DiGraph<OrgNode, Relation> = DiGraph::new();
    let mut index: AHashMap<String, NodeIndex> = AHashMap::new();
    let mut references = ManagerReferences::default();
    let mut skipped_rows = 0usize;

    for row in table.rows() {
        let id = non_empty(row[id_ix].as_deref());
        let manager_id = non_empty(row[manager_ix].as_deref());
        if let Some(manager_id) = manager_id {
            references.record(id, manager_id);
        }
        let Some(id) = id else {
            skipped_rows += 1;
            continue;
        };

        let mut attributes: Vec<(String, Option<String>)> = table
            .headers()
            .iter()
            .cloned()
            .zip(row.iter().cloned())
            .collect();
        let manager_ref = manager_id.map(str::to_string);
        match attributes
            .iter_mut()
            .find(|(k, _)| *k == columns.manager_canonical)
        {
            Some(slot) => slot.1 = manager_ref.clone(),
            None => attributes.push((columns.manager_canonical.clone(), manager_ref.clone())),
        }

        let record = RowRecord {
            id: id.to_string(),
            manager_id: manager_ref,
            attributes,
        };
        let node_ix = upsert_node(&mut graph, &mut index, id);
        graph[node_ix].record = Some(record);

        match manager_id {
            Some(manager_id) if manager_id == id => {
                debug!("Row {} names itself as manager, no edge added", id);
            }
            Some(manager_id) => {
                let manager_ix = upsert_node(&mut graph, &mut index, manager_id);
                graph.update_edge(manager_ix, node_ix, Relation::ReportsTo);
            }
            None => {}
        }
    }

    if skipped_rows > 0 {
        warn!("Skipped {} rows without an identifier", skipped_rows);
    }
    debug!(
        "Built hierarchy with {} nodes and {} edges",
        graph.node_count(),
        graph.edge_count()
    );

    let diagnostics = diagnostics::validate(&graph, &references);

    Ok(Hierarchy {
        graph,
        index,
        diagnostics,
        skipped_rows,
    })
}

fn column_position(table: &Table, header: &str) -> Result<usize> {
    table
        .column_index(header)
        .ok_or_else(|| Error::MissingColumns(vec![header.to_string()]))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn upsert_node(
    graph: &mut DiGraph<OrgNode, Relation>,
    index: &mut AHashMap<String, NodeIndex>,
    id: &str,
) -> NodeIndex {
    if let Some(&ix) = index.get(id) {
        return ix;
    }
    let ix = graph.add_node(OrgNode {
        id: id.to_string(),
        record: None,
    });
    index.insert(id.to_string(), ix);
    ix
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns() -> ColumnMap {
        ColumnMap {
            id: "Associate ID".into(),
            manager: "Reports To Manager ID".into(),
            manager_canonical: "reports to manager id".into(),
        }
    }

    fn table(rows: &[(&str, Option<&str>)]) -> Table {
        Table::new(
            vec!["Associate ID".into(), "Reports To Manager ID".into(), "Name".into()],
            rows.iter()
                .map(|(id, m)| {
                    vec![
                        Some(id.to_string()),
                        m.map(str::to_string),
                        Some(format!("Person {}", id)),
                    ]
                })
                .collect(),
        )
    }

    #[test]
    fn test_manager_reference_is_materialized() {
        let h = build(&table(&[("1", None), ("2", Some("1"))]), &columns()).unwrap();
        let record = h.node("2").unwrap().record.as_ref().unwrap();
        assert_eq!(record.attribute("reports to manager id"), Some("1"));
        assert_eq!(record.attribute("Reports To Manager ID"), Some("1"));
        assert_eq!(record.attribute("Name"), Some("Person 2"));
        let root = h.node("1").unwrap().record.as_ref().unwrap();
        assert_eq!(root.manager_id, None);
    }

    #[test]
    fn test_no_self_loops_or_empty_manager_edges() {
        let h = build(
            &table(&[("1", Some("1")), ("2", Some("")), ("3", Some("  ")), ("4", None)]),
            &columns(),
        )
        .unwrap();
        assert_eq!(h.node_count(), 4);
        assert_eq!(h.edge_count(), 0);
        assert!(h.diagnostics().cycles.is_empty());
        assert!(h.diagnostics().dangling_managers.is_empty());
        assert_eq!(h.diagnostics().self_managed, vec!["1".to_string()]);
    }

    #[test]
    fn test_duplicate_rows_collapse() {
        let h = build(&table(&[("2", Some("1")), ("2", Some("1")), ("1", None)]), &columns()).unwrap();
        assert_eq!(h.node_count(), 2);
        assert_eq!(h.edge_count(), 1);
        assert!(h.has_edge("1", "2"));
        assert!(!h.has_edge("2", "1"));
    }

    #[test]
    fn test_dangling_manager_gets_placeholder_node() {
        let h = build(&table(&[("2", Some("99"))]), &columns()).unwrap();
        let placeholder = h.node("99").unwrap();
        assert!(placeholder.record.is_none());
        assert!(h.has_edge("99", "2"));
        assert_eq!(h.diagnostics().dangling_managers, vec!["99".to_string()]);
    }

    #[test]
    fn test_overwritten_row_manager_still_counts_as_dangling() {
        let h = build(&table(&[("2", Some("99")), ("2", Some("1")), ("1", None)]), &columns()).unwrap();
        assert!(h.has_edge("99", "2"));
        assert!(h.node("99").unwrap().record.is_none());
        assert_eq!(h.diagnostics().dangling_managers, vec!["99".to_string()]);
    }

    #[test]
    fn test_rows_without_id_are_skipped() {
        let t = Table::new(
            vec!["Associate ID".into(), "Reports To Manager ID".into()],
            vec![vec![None, Some("1".into())], vec![Some("1".into()), None]],
        );
        let h = build(&t, &columns()).unwrap();
        assert_eq!(h.skipped_rows(), 1);
        assert_eq!(h.node_count(), 1);
    }

    #[test]
    fn test_unknown_column_is_schema_error() {
        let mut cols = columns();
        cols.manager = "Boss".into();
        let err = build(&table(&[("1", None)]), &cols).unwrap_err();
        assert!(err.is_schema_error());
    }
}
