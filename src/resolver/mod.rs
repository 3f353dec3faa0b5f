pub mod columns;
pub mod file;
pub mod fuzzy;

pub use columns::{resolve_columns, ColumnIndex, ColumnMap, ColumnSpec, DisplayColumns};
pub use file::{list_candidates, FileResolution, FileResolver};
