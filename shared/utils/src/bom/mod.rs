//! BOM (Bill of Materials) Processing Module
//!
//! Pure functions over an mBOM item snapshot: hierarchy resolution and
//! layout, summary statistics, item-list validation and export tables.

pub mod export;
pub mod graph;
pub mod stats;
pub mod validator;

pub use export::{export_rows, print_rows, summary_rows, to_csv, ExportRow, PrintRow, SummaryRow};
pub use graph::{resolve, DependencyGraph, EdgeKind, GraphEdge, GraphNode, HierarchyResolver, Position};
pub use stats::{aggregate, BomStats};
pub use validator::{normalize_items, BomItemValidator, ValidationResult, ValidationSeverity};
