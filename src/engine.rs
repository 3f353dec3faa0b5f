use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::error::Result;
use crate::filter::FilterExpression;
use crate::hierarchy::{self, HierarchyDiagnostics};
use crate::render::{self, ChartRenderer, HtmlRenderer};
use crate::resolver::columns::{self, ColumnIndex, DisplayColumns};
use crate::resolver::file::{list_candidates, FileResolution, FileResolver};
use crate::session::{InMemorySessionStore, SessionStore};
use crate::table::Table;

/// One tool invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChartRequest {
    pub file_reference: Option<String>,
    /// `"yes"` confirms the pending suggestion for the session.
    pub proceed: Option<String>,
    pub session_id: String,
    /// `key=value` pairs separated by commas.
    pub filter: Option<String>,
}

impl ChartRequest {
    pub fn new(file_reference: Option<&str>, session_id: &str) -> Self {
        Self {
            file_reference: file_reference.map(str::to_string),
            session_id: session_id.to_string(),
            ..Self::default()
        }
    }

    pub fn with_filter(mut self, filter: Option<&str>) -> Self {
        self.filter = filter.map(str::to_string);
        self
    }

    pub fn with_proceed(mut self, proceed: Option<&str>) -> Self {
        self.proceed = proceed.map(str::to_string);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChartOutcome {
    Created {
        path: PathBuf,
        nodes: usize,
        edges: usize,
        diagnostics: HierarchyDiagnostics,
    },
    /// The file reference needs confirmation or matched nothing.
    Unresolved(FileResolution),
    /// The filter was valid but no row passed it.
    NoResults { filter: String },
}

impl ChartOutcome {
    pub fn needs_confirmation(&self) -> bool {
        matches!(
            self,
            ChartOutcome::Unresolved(FileResolution::Suggestion { .. })
        )
    }
}

impl fmt::Display for ChartOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChartOutcome::Created {
                path, diagnostics, ..
            } => {
                write!(f, "Chart created: {}", path.display())?;
                for line in diagnostics.warnings() {
                    write!(f, "\n{}", line)?;
                }
                Ok(())
            }
            ChartOutcome::Unresolved(resolution) => write!(f, "{}", resolution),
            ChartOutcome::NoResults { filter } => write!(
                f,
                "No rows matched the filter '{}'. Try again with different filter criteria.",
                filter
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GroupsOutcome {
    Groups { column: String, values: Vec<String> },
    Unresolved(FileResolution),
    MissingColumn { column: String, available: Vec<String> },
    Empty,
}

impl GroupsOutcome {
    pub fn needs_confirmation(&self) -> bool {
        matches!(
            self,
            GroupsOutcome::Unresolved(FileResolution::Suggestion { .. })
        )
    }
}

impl fmt::Display for GroupsOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupsOutcome::Groups { column, values } => {
                write!(f, "Available groups ({}):", column)?;
                for value in values {
                    write!(f, "\n- {}", value)?;
                }
                Ok(())
            }
            GroupsOutcome::Unresolved(resolution) => write!(f, "{}", resolution),
            GroupsOutcome::MissingColumn { column, available } => write!(
                f,
                "Could not find '{}' column. Available columns: {:?}",
                column, available
            ),
            GroupsOutcome::Empty => write!(f, "No groups found in this file."),
        }
    }
}

/// The resolve → filter → columns → build → render pipeline.
pub struct OrgChartEngine<S: SessionStore = InMemorySessionStore, R: ChartRenderer = HtmlRenderer> {
    config: AppConfig,
    resolver: FileResolver<S>,
    renderer: R,
}

impl OrgChartEngine {
    pub fn new(config: AppConfig) -> Self {
        Self::with_parts(config, InMemorySessionStore::new(), HtmlRenderer::new())
    }
}

impl<S: SessionStore, R: ChartRenderer> OrgChartEngine<S, R> {
    pub fn with_parts(config: AppConfig, store: S, renderer: R) -> Self {
        let resolver = FileResolver::new(
            config.data_dir.clone(),
            config.similarity_threshold,
            store,
        );
        Self {
            config,
            resolver,
            renderer,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn resolver(&self) -> &FileResolver<S> {
        &self.resolver
    }

    /// Candidate files, recomputed on every call.
    pub fn candidates(&self) -> Result<Vec<String>> {
        Ok(list_candidates(
            &self.config.data_dir,
            &self.config.file_patterns,
        )?)
    }

    pub fn resolve_file(&self, request: &ChartRequest) -> Result<FileResolution> {
        let candidates = self.candidates()?;
        Ok(self.resolver.resolve(
            request.file_reference.as_deref(),
            &candidates,
            &request.session_id,
            request.proceed.as_deref(),
        ))
    }

    pub fn build_chart(&self, request: &ChartRequest) -> Result<ChartOutcome> {
        let source = match self.resolve_file(request)? {
            FileResolution::Resolved(path) => path,
            other => return Ok(ChartOutcome::Unresolved(other)),
        };

        let start = Instant::now();
        info!("Loading {}", source.display());
        let table = Table::from_path(&source)?;

        let expression = request
            .filter
            .as_deref()
            .map(FilterExpression::parse)
            .unwrap_or_default();
        let table = expression.apply(table)?;
        if !expression.is_empty() && table.is_empty() {
            info!("Filter left no rows in {}", source.display());
            return Ok(ChartOutcome::NoResults {
                filter: request.filter.clone().unwrap_or_default(),
            });
        }

        let column_map = columns::resolve_hierarchy_columns(
            table.headers(),
            &self.config.id_column,
            &self.config.manager_column,
        )?;
        debug!(
            "Identifier column '{}', manager column '{}'",
            column_map.id, column_map.manager
        );

        info!("Building hierarchy from {} rows...", table.len());
        let hierarchy = hierarchy::build(&table, &column_map)?;
        for line in hierarchy.diagnostics().warnings() {
            warn!("{}", line);
        }

        let display = DisplayColumns::resolve(table.headers(), &self.config.group_column);
        let projection = render::project(&hierarchy, &display);
        let path = self.output_path(&source, &expression);
        self.renderer.render(&projection, &path)?;

        info!(
            "Chart with {} nodes and {} edges written to {} in {:.2}s",
            hierarchy.node_count(),
            hierarchy.edge_count(),
            path.display(),
            start.elapsed().as_secs_f64()
        );

        Ok(ChartOutcome::Created {
            path,
            nodes: hierarchy.node_count(),
            edges: hierarchy.edge_count(),
            diagnostics: hierarchy.diagnostics().clone(),
        })
    }

    /// Sorted unique values of the grouping column, missing cells dropped.
    pub fn list_groups(&self, request: &ChartRequest) -> Result<GroupsOutcome> {
        let source = match self.resolve_file(request)? {
            FileResolution::Resolved(path) => path,
            other => return Ok(GroupsOutcome::Unresolved(other)),
        };

        let table = Table::from_path(&source)?;
        let index = ColumnIndex::new(table.headers());
        let Some(column) = index
            .find_compact(&self.config.group_column)
            .map(str::to_string)
        else {
            return Ok(GroupsOutcome::MissingColumn {
                column: self.config.group_column.clone(),
                available: table.headers().to_vec(),
            });
        };

        let Some(position) = table.column_index(&column) else {
            return Ok(GroupsOutcome::Empty);
        };
        let values: BTreeSet<String> = table
            .column_values(position)
            .flatten()
            .map(str::to_string)
            .collect();

        if values.is_empty() {
            return Ok(GroupsOutcome::Empty);
        }
        Ok(GroupsOutcome::Groups {
            column,
            values: values.into_iter().collect(),
        })
    }

    /// `<output_dir>/<source stem>_org_chart<filter suffix>.<ext>`
    fn output_path(&self, source: &Path, expression: &FilterExpression) -> PathBuf {
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "chart".to_string());
        self.config.output_dir.join(format!(
            "{}_org_chart{}.{}",
            stem,
            expression.file_suffix(),
            self.renderer.extension()
        ))
    }
}
