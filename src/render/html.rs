use chrono::Local;
use serde::Serialize;
use serde_json::json;
use std::fs;
use std::path::Path;
use tracing::debug;

use super::projection::ChartProjection;
use crate::error::{Error, Result};

const VIS_NETWORK_JS: &str =
    "https://unpkg.com/vis-network@9.1.9/standalone/umd/vis-network.min.js";

/// Turns a chart projection into an artifact on disk. Layout, styling and
/// the output format belong to the implementation.
pub trait ChartRenderer: Send + Sync {
    /// Extension of the files this renderer writes, without the dot.
    fn extension(&self) -> &str;
    fn render(&self, projection: &ChartProjection, output_path: &Path) -> Result<()>;
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchicalLayout {
    pub enabled: bool,
    pub direction: String,
    pub sort_method: String,
    pub level_separation: u32,
    pub node_spacing: u32,
}

impl Default for HierarchicalLayout {
    fn default() -> Self {
        Self {
            enabled: true,
            direction: "UD".to_string(),
            sort_method: "directed".to_string(),
            level_separation: 250,
            node_spacing: 300,
        }
    }
}

/// Top-down tree chart rendered with vis-network in a standalone page.
#[derive(Debug, Clone, Default)]
pub struct HtmlRenderer {
    pub layout: HierarchicalLayout,
    pub physics: bool,
}

impl HtmlRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    fn options(&self) -> serde_json::Value {
        json!({
            "layout": { "hierarchical": self.layout },
            "physics": { "enabled": self.physics },
        })
    }

    pub fn to_html(&self, projection: &ChartProjection) -> Result<String> {
        let nodes = script_safe(serde_json::to_string(&projection.nodes)?);
        let edges = script_safe(serde_json::to_string(&projection.edges)?);
        let options = script_safe(serde_json::to_string(&self.options())?);

        Ok(format!(
            r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<!-- generated {generated} -->
<script src="{script}"></script>
<style>
  html, body {{ margin: 0; height: 100%; }}
  #org-chart {{ width: 100%; height: 100%; border: 1px solid lightgray; }}
</style>
</head>
<body>
<div id="org-chart"></div>
<script>
  var nodes = new vis.DataSet({nodes});
  var edges = new vis.DataSet({edges});
  var options = {options};
  var network = new vis.Network(
    document.getElementById("org-chart"),
    {{ nodes: nodes, edges: edges }},
    options
  );
</script>
</body>
</html>
"#,
            generated = Local::now().to_rfc3339(),
            script = VIS_NETWORK_JS,
            nodes = nodes,
            edges = edges,
            options = options,
        ))
    }
}

impl ChartRenderer for HtmlRenderer {
    fn extension(&self) -> &str {
        "html"
    }

    fn render(&self, projection: &ChartProjection, output_path: &Path) -> Result<()> {
        let html = self.to_html(projection)?;
        if let Some(parent) = output_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(output_path, html).map_err(|e| {
            Error::Render(format!("could not write {}: {}", output_path.display(), e))
        })?;
        debug!(
            "Wrote chart with {} nodes to {}",
            projection.nodes.len(),
            output_path.display()
        );
        Ok(())
    }
}

/// JSON embedded in a `<script>` block must not close the block early.
fn script_safe(json: String) -> String {
    json.replace("</", "<\\/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::projection::{ChartEdge, ChartNode, NodeFont};
    use tempfile::tempdir;

    fn projection() -> ChartProjection {
        ChartProjection {
            nodes: vec![
                ChartNode {
                    id: "1".into(),
                    label: "Ada Lovelace".into(),
                    title: "Note: </script>".into(),
                    color: "lightgreen",
                    shape: "box",
                    font: NodeFont::default(),
                },
                ChartNode {
                    id: "2".into(),
                    label: "2".into(),
                    title: String::new(),
                    color: "lightblue",
                    shape: "box",
                    font: NodeFont::default(),
                },
            ],
            edges: vec![ChartEdge {
                from: "1".into(),
                to: "2".into(),
                label: "reports_to",
                arrows: "to",
            }],
        }
    }

    #[test]
    fn test_html_embeds_data_and_layout() {
        let html = HtmlRenderer::new().to_html(&projection()).unwrap();
        assert!(html.contains("\"label\":\"Ada Lovelace\""));
        assert!(html.contains("\"label\":\"reports_to\""));
        assert!(html.contains("\"sortMethod\":\"directed\""));
        assert!(html.contains("\"levelSeparation\":250"));
        assert!(html.contains("\"physics\":{\"enabled\":false}"));
        assert!(!html.contains("Note: </script>"));
    }

    #[test]
    fn test_render_creates_output_dir() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("output").join("staff_org_chart.html");
        HtmlRenderer::new().render(&projection(), &path).unwrap();
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("<!DOCTYPE html>"));
    }
}
