pub mod builder;
pub mod diagnostics;

pub use builder::{build, Hierarchy, OrgNode, Relation, ReportingEdge, RowRecord};
pub use diagnostics::HierarchyDiagnostics;
