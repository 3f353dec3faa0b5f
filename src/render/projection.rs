use serde::Serialize;

use crate::hierarchy::{Hierarchy, OrgNode};
use crate::resolver::columns::DisplayColumns;

const MANAGER_TITLE: &str = "Manager";
const MANAGER_COLOR: &str = "lightgreen";
const DEFAULT_COLOR: &str = "lightblue";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeFont {
    pub size: u32,
    pub color: &'static str,
}

impl Default for NodeFont {
    fn default() -> Self {
        Self {
            size: 18,
            color: "black",
        }
    }
}

/// What the renderer receives for one node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartNode {
    pub id: String,
    pub label: String,
    /// Tooltip, one `key: value` line per attribute.
    pub title: String,
    pub color: &'static str,
    pub shape: &'static str,
    pub font: NodeFont,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartEdge {
    pub from: String,
    pub to: String,
    pub label: &'static str,
    pub arrows: &'static str,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartProjection {
    pub nodes: Vec<ChartNode>,
    pub edges: Vec<ChartEdge>,
}

pub fn project(hierarchy: &Hierarchy, display: &DisplayColumns) -> ChartProjection {
    let nodes = hierarchy
        .nodes()
        .map(|node| project_node(node, display))
        .collect();
    let edges = hierarchy
        .edges()
        .map(|(from, to, relation)| ChartEdge {
            from: from.to_string(),
            to: to.to_string(),
            label: relation.as_str(),
            arrows: "to",
        })
        .collect();
    ChartProjection { nodes, edges }
}

fn project_node(node: &OrgNode, display: &DisplayColumns) -> ChartNode {
    let lookup = |column: &Option<String>| -> Option<String> {
        let record = node.record.as_ref()?;
        let value = record.attribute(column.as_deref()?)?.trim();
        (!value.is_empty()).then(|| value.to_string())
    };

    let first = lookup(&display.first_name).unwrap_or_default();
    let last = lookup(&display.last_name).unwrap_or_default();
    let name = format!("{} {}", first, last).trim().to_string();

    let mut lines = vec![if name.is_empty() { node.id.clone() } else { name }];
    let job_title = lookup(&display.job_title);
    if let Some(title) = &job_title {
        lines.push(title.clone());
    }
    if let Some(cost_center) = lookup(&display.cost_center) {
        lines.push(format!("Cost Center: {}", cost_center));
    }

    let title = match &node.record {
        Some(record) => record
            .attributes
            .iter()
            .map(|(k, v)| format!("{}: {}", k, v.as_deref().unwrap_or_default()))
            .collect::<Vec<_>>()
            .join("\n"),
        None => format!("No row found for manager id {}", node.id),
    };

    let is_manager = job_title.as_deref() == Some(MANAGER_TITLE);

    ChartNode {
        id: node.id.clone(),
        label: lines.join("\n"),
        title,
        color: if is_manager { MANAGER_COLOR } else { DEFAULT_COLOR },
        shape: "box",
        font: NodeFont::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::build;
    use crate::resolver::columns::ColumnMap;
    use crate::table::Table;

    fn headers() -> Vec<String> {
        ["Associate ID", "Reports To Manager ID", "Legal First Name", "Legal Last Name", "Job Title"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn cell(s: &str) -> Option<String> {
        (!s.is_empty()).then(|| s.to_string())
    }

    fn hierarchy(rows: &[[&str; 5]]) -> Hierarchy {
        let table = Table::new(
            headers(),
            rows.iter().map(|r| r.iter().map(|s| cell(s)).collect()).collect(),
        );
        let columns = ColumnMap {
            id: "Associate ID".into(),
            manager: "Reports To Manager ID".into(),
            manager_canonical: "reports to manager id".into(),
        };
        build(&table, &columns).unwrap()
    }

    #[test]
    fn test_label_uses_name_and_title() {
        let h = hierarchy(&[["1", "", "Ada", "Lovelace", "Manager"], ["2", "1", "Alan", "", "Engineer"]]);
        let projection = project(&h, &DisplayColumns::resolve(&headers(), "cost center name"));

        assert_eq!(projection.nodes[0].label, "Ada Lovelace\nManager");
        assert_eq!(projection.nodes[0].color, MANAGER_COLOR);
        assert_eq!(projection.nodes[1].label, "Alan\nEngineer");
        assert_eq!(projection.nodes[1].color, DEFAULT_COLOR);
        assert_eq!(
            projection.edges,
            vec![ChartEdge {
                from: "1".into(),
                to: "2".into(),
                label: "reports_to",
                arrows: "to",
            }]
        );
    }

    #[test]
    fn test_label_falls_back_to_id() {
        let h = hierarchy(&[["7", "42", "", "", ""]]);
        let projection = project(&h, &DisplayColumns::resolve(&headers(), "cost center name"));
        assert_eq!(projection.nodes[0].label, "7");
        assert_eq!(projection.nodes[1].label, "42");
        assert!(projection.nodes[1].title.contains("42"));
    }

    #[test]
    fn test_tooltip_lists_every_attribute() {
        let h = hierarchy(&[["1", "", "Ada", "Lovelace", "Manager"]]);
        let projection = project(&h, &DisplayColumns::default());
        assert_eq!(
            projection.nodes[0].title,
            "Associate ID: 1\nReports To Manager ID: \nLegal First Name: Ada\n\
             Legal Last Name: Lovelace\nJob Title: Manager\nreports to manager id: "
        );
    }
}
