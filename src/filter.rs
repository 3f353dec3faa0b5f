use tracing::debug;

use crate::error::{Error, Result};
use crate::resolver::columns::ColumnIndex;
use crate::table::Table;

/// One `key=value` equality predicate. The key is lowercased and trimmed,
/// the value trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterPredicate {
    pub key: String,
    pub value: String,
}

/// Conjunction of equality predicates, applied left to right.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterExpression {
    predicates: Vec<FilterPredicate>,
}

impl FilterExpression {
    /// Parse `"key=value,key=value"`. Fragments without `=` are ignored.
    pub fn parse(expression: &str) -> Self {
        let predicates = expression
            .split(',')
            .filter_map(|fragment| fragment.split_once('='))
            .map(|(key, value)| FilterPredicate {
                key: key.trim().to_lowercase(),
                value: value.trim().to_string(),
            })
            .collect();
        Self { predicates }
    }

    pub fn predicates(&self) -> &[FilterPredicate] {
        &self.predicates
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Narrow `table` by each predicate in turn. Stops at the first key that
    /// matches no column.
    pub fn apply(&self, table: Table) -> Result<Table> {
        let index = ColumnIndex::new(table.headers());
        let mut table = table;

        for predicate in &self.predicates {
            let column = index
                .get(&predicate.key)
                .and_then(|header| table.column_index(header))
                .ok_or_else(|| Error::UnknownFilterColumn {
                    key: predicate.key.clone(),
                    available: index.originals().to_vec(),
                })?;

            let expected = predicate.value.to_lowercase();
            let before = table.len();
            table = table.retain_rows(|row| {
                row[column].as_deref().unwrap_or_default().to_lowercase() == expected
            });
            debug!(
                "Filter {}={} kept {} of {} rows",
                predicate.key,
                predicate.value,
                table.len(),
                before
            );
        }

        Ok(table)
    }

    /// Artifact name suffix: `_key_value` per predicate with whitespace
    /// removed and path separators replaced.
    pub fn file_suffix(&self) -> String {
        self.predicates
            .iter()
            .map(|p| format!("_{}_{}", suffix_part(&p.key), suffix_part(&p.value)))
            .collect()
    }
}

fn suffix_part(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == '/' || c == '\\' { '-' } else { c })
        .collect()
}
