use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A canonical column and the header spellings accepted for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub canonical: String,
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl ColumnSpec {
    pub fn new(canonical: &str, aliases: &[&str]) -> Self {
        Self {
            canonical: canonical.to_string(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
        }
    }

    fn spellings(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.canonical.as_str()).chain(self.aliases.iter().map(String::as_str))
    }
}

/// Lowercase, trimmed header.
pub fn normalize_header(header: &str) -> String {
    header.trim().to_lowercase()
}

/// Lowercase header with every whitespace character removed.
pub fn compact_header(header: &str) -> String {
    header
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Lookup from normalized header to the header as written in the source.
///
/// When two headers normalize to the same key the later one wins; such
/// tables are ambiguous and are not rejected.
#[derive(Debug, Clone)]
pub struct ColumnIndex {
    normalized: AHashMap<String, String>,
    originals: Vec<String>,
}

impl ColumnIndex {
    pub fn new(headers: &[String]) -> Self {
        let normalized = headers
            .iter()
            .map(|h| (normalize_header(h), h.clone()))
            .collect();
        Self {
            normalized,
            originals: headers.to_vec(),
        }
    }

    /// Original header whose normalized form equals the normalized `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.normalized.get(&normalize_header(name)).map(String::as_str)
    }

    /// First header matching any spelling of `spec`.
    pub fn find_spec(&self, spec: &ColumnSpec) -> Option<&str> {
        spec.spellings().find_map(|s| self.get(s))
    }

    /// First header whose compact form equals the compact `target`, e.g.
    /// `"Cost Center Name"` for `"costcentername"`.
    pub fn find_compact(&self, target: &str) -> Option<&str> {
        let target = compact_header(target);
        self.originals
            .iter()
            .find(|h| compact_header(h) == target)
            .map(String::as_str)
    }

    pub fn originals(&self) -> &[String] {
        &self.originals
    }
}

/// The two columns the hierarchy is built from, as spelled in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    pub id: String,
    pub manager: String,
    /// Canonical name the manager reference is materialized under on every node.
    pub manager_canonical: String,
}

/// Resolve every required spec to a source header. On failure the error
/// names only the canonical columns that are still unmatched.
pub fn resolve_columns(headers: &[String], required: &[&ColumnSpec]) -> Result<Vec<String>> {
    let index = ColumnIndex::new(headers);
    let mut resolved = Vec::with_capacity(required.len());
    let mut missing = Vec::new();

    for spec in required {
        match index.find_spec(spec) {
            Some(actual) => resolved.push(actual.to_string()),
            None => missing.push(spec.canonical.clone()),
        }
    }

    if missing.is_empty() {
        Ok(resolved)
    } else {
        Err(Error::MissingColumns(missing))
    }
}

/// Resolve the identifier and manager-identifier columns.
pub fn resolve_hierarchy_columns(
    headers: &[String],
    id: &ColumnSpec,
    manager: &ColumnSpec,
) -> Result<ColumnMap> {
    let mut resolved = resolve_columns(headers, &[id, manager])?.into_iter();
    match (resolved.next(), resolved.next()) {
        (Some(id_col), Some(manager_col)) => Ok(ColumnMap {
            id: id_col,
            manager: manager_col,
            manager_canonical: manager.canonical.clone(),
        }),
        _ => Err(Error::MissingColumns(vec![
            id.canonical.clone(),
            manager.canonical.clone(),
        ])),
    }
}

/// Display fields looked up once per table to build node labels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayColumns {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub job_title: Option<String>,
    pub cost_center: Option<String>,
}

impl DisplayColumns {
    pub fn first_name_spec() -> ColumnSpec {
        ColumnSpec::new("legal first name", &["first name", "first_name", "given name"])
    }

    pub fn last_name_spec() -> ColumnSpec {
        ColumnSpec::new("legal last name", &["last name", "last_name", "surname"])
    }

    pub fn job_title_spec() -> ColumnSpec {
        ColumnSpec::new("job title", &["job_title", "title"])
    }

    pub fn resolve(headers: &[String], group_column: &str) -> Self {
        let index = ColumnIndex::new(headers);
        Self {
            first_name: index.find_spec(&Self::first_name_spec()).map(str::to_string),
            last_name: index.find_spec(&Self::last_name_spec()).map(str::to_string),
            job_title: index.find_spec(&Self::job_title_spec()).map(str::to_string),
            cost_center: index.find_compact(group_column).map(str::to_string),
        }
    }
}
