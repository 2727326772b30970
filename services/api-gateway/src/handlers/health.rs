use axum::{extract::State, response::Json};
use serde_json::{json, Value};

use crate::AppState;

pub async fn detailed_health_check(State(state): State<AppState>) -> Json<Value> {
    let layout = state.resolver.layout();

    let mut health_status = json!({
        "status": "healthy",
        "service": "bomforge-api-gateway",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "checks": {
            "layout": {
                "horizontalSpacing": layout.horizontal_spacing,
                "verticalSpacing": layout.vertical_spacing,
            },
            "export": {
                "csvFileName": state.config.export.csv_file_name,
                "descriptionMaxChars": state.config.export.description_max_chars,
            }
        }
    });

    let metrics_status = match state.metrics.render() {
        Ok(_) => json!({"status": "healthy", "enabled": state.config.monitoring.metrics_enabled}),
        Err(e) => json!({"status": "unhealthy", "message": e.to_string()}),
    };
    health_status["checks"]["metrics"] = metrics_status;

    if health_status["checks"]["metrics"]["status"] != "healthy" {
        health_status["status"] = json!("degraded");
    }

    Json(health_status)
}
