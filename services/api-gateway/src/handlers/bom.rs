//! BOM Analysis Handlers
//!
//! Stateless endpoints running the hierarchy resolver, aggregation engine,
//! item validator and export tables over a posted mBOM item list.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Json},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use bomforge_models::ManufacturingBomItem;
use bomforge_utils::bom::{
    aggregate, normalize_items, print_rows, summary_rows, to_csv, BomItemValidator, BomStats, DependencyGraph, PrintRow,
    SummaryRow, ValidationResult,
};
use bomforge_utils::bom::export::PRINT_COLUMNS;

use crate::middleware::ApiError;
use crate::AppState;

/// Request body shared by every BOM endpoint
#[derive(Debug, Deserialize)]
pub struct BomRequest {
    pub items: Vec<ManufacturingBomItem>,
    /// Run `normalize_items` before processing
    #[serde(default)]
    pub normalize: bool,
}

impl BomRequest {
    fn into_items(self) -> Vec<ManufacturingBomItem> {
        if self.normalize {
            normalize_items(&self.items)
        } else {
            self.items
        }
    }
}

/// POST /api/v1/bom/graph
pub async fn resolve_graph(State(state): State<AppState>, Json(request): Json<BomRequest>) -> Json<DependencyGraph> {
    let items = request.into_items();
    let graph = state.resolver.resolve(&items);
    state.metrics.graphs_resolved.inc();
    Json(graph)
}

/// POST /api/v1/bom/stats
pub async fn compute_stats(State(state): State<AppState>, Json(request): Json<BomRequest>) -> Json<BomStats> {
    let stats = aggregate(&request.into_items());
    state.metrics.stats_computed.inc();
    Json(stats)
}

/// POST /api/v1/bom/validate
pub async fn validate_items(
    State(state): State<AppState>,
    Json(request): Json<BomRequest>,
) -> Json<ValidationResult> {
    let result = BomItemValidator::new().validate(&request.into_items());
    state.metrics.validations_run.inc();
    Json(result)
}

/// POST /api/v1/bom/export/csv
pub async fn export_csv(
    State(state): State<AppState>,
    Json(request): Json<BomRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let csv = to_csv(&request.into_items())?;
    state.metrics.exports_produced.with_label_values(&["csv"]).inc();

    let disposition = format!("attachment; filename=\"{}\"", state.config.export.csv_file_name);
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    ))
}

#[derive(Debug, Serialize)]
pub struct PrintExport {
    pub columns: Vec<&'static str>,
    pub rows: Vec<PrintRow>,
    pub summary: Vec<SummaryRow>,
}

/// POST /api/v1/bom/export/print
pub async fn export_print(State(state): State<AppState>, Json(request): Json<BomRequest>) -> Json<PrintExport> {
    let items = request.into_items();
    let export = PrintExport {
        columns: PRINT_COLUMNS.to_vec(),
        rows: print_rows(&items, state.config.export.description_max_chars),
        summary: summary_rows(&items, Utc::now()),
    };
    state.metrics.exports_produced.with_label_values(&["print"]).inc();
    Json(export)
}
