use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers::*, AppState};

pub fn create_api_routes() -> Router<AppState> {
    Router::new()
        .route("/health/detailed", get(detailed_health_check))
        .nest("/bom", bom_routes())
}

fn bom_routes() -> Router<AppState> {
    Router::new()
        .route("/graph", post(resolve_graph))
        .route("/stats", post(compute_stats))
        .route("/validate", post(validate_items))
        .route("/export/csv", post(export_csv))
        .route("/export/print", post(export_print))
}
