//! BOM Export Tables
//!
//! Row layouts for the tabular export targets. The spreadsheet and
//! delimited-text targets share one column set; the print target uses a
//! reduced, width-limited set.

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Serialize;

use bomforge_models::ManufacturingBomItem;

use super::stats::aggregate;
use crate::error::{BomForgeError, BomForgeResult};

pub const EXPORT_COLUMNS: [&str; 8] = [
    "Part Number",
    "Description",
    "Quantity",
    "Level",
    "Work Center",
    "Material Spec",
    "Confidence",
    "Change Type",
];

pub const PRINT_COLUMNS: [&str; 5] = ["Part Number", "Description", "Qty", "Work Center", "Confidence"];

pub const DEFAULT_DESCRIPTION_LIMIT: usize = 40;

/// `NN%`, or empty when confidence is absent or zero
pub fn confidence_label(confidence: Option<f64>) -> String {
    match confidence {
        Some(c) if c != 0.0 && c.is_finite() => format!("{}%", (c * 100.0).round() as i64),
        _ => String::new(),
    }
}

/// Truncates to `max_chars` characters, appending `...` when anything was cut
pub fn truncate_description(description: &str, max_chars: usize) -> String {
    if description.chars().count() <= max_chars {
        return description.to_string();
    }
    let mut truncated: String = description.chars().take(max_chars).collect();
    truncated.push_str("...");
    truncated
}

/// One row of the spreadsheet / delimited-text export
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRow {
    #[serde(rename = "Part Number")]
    pub part_number: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Quantity")]
    pub quantity: u32,
    #[serde(rename = "Level")]
    pub level: u32,
    #[serde(rename = "Work Center")]
    pub work_center: String,
    #[serde(rename = "Material Spec")]
    pub material_spec: String,
    #[serde(rename = "Confidence")]
    pub confidence: String,
    #[serde(rename = "Change Type")]
    pub change_type: String,
}

impl ExportRow {
    pub fn from_item(item: &ManufacturingBomItem) -> Self {
        Self {
            part_number: item.base.part_number.clone(),
            description: item.base.description.clone(),
            quantity: item.base.quantity.max(1),
            level: item.base.level,
            work_center: item.work_center.clone().unwrap_or_default(),
            material_spec: item.base.material_spec.clone().unwrap_or_default(),
            confidence: confidence_label(item.confidence),
            change_type: item.change_type_or_default().to_string(),
        }
    }
}

pub fn export_rows(items: &[ManufacturingBomItem]) -> Vec<ExportRow> {
    items.iter().map(ExportRow::from_item).collect()
}

/// Delimited-text export with a header row
pub fn to_csv(items: &[ManufacturingBomItem]) -> BomForgeResult<String> {
    render_csv(items).map_err(|e| BomForgeError::export(format!("{:#}", e)))
}

fn render_csv(items: &[ManufacturingBomItem]) -> anyhow::Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    if items.is_empty() {
        // serde only writes headers alongside the first record
        writer.write_record(EXPORT_COLUMNS)?;
    }
    for row in export_rows(items) {
        writer.serialize(row).context("Failed to write export row")?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV writer: {}", e.error()))?;
    Ok(String::from_utf8(bytes)?)
}

/// Metric/value pair for the summary sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryRow {
    #[serde(rename = "Metric")]
    pub metric: String,
    #[serde(rename = "Value")]
    pub value: String,
}

impl SummaryRow {
    fn new(metric: &str, value: impl ToString) -> Self {
        Self {
            metric: metric.to_string(),
            value: value.to_string(),
        }
    }
}

pub fn summary_rows(items: &[ManufacturingBomItem], generated_at: DateTime<Utc>) -> Vec<SummaryRow> {
    let stats = aggregate(items);
    vec![
        SummaryRow::new("Total Assemblies", stats.total_parts),
        SummaryRow::new("Added Nodes", stats.added_parts),
        SummaryRow::new("Modified Nodes", stats.modified_parts),
        SummaryRow::new("Overall Neural Confidence", format!("{}%", stats.avg_confidence)),
        SummaryRow::new("Export Date", generated_at.format("%Y-%m-%d %H:%M:%S UTC")),
    ]
}

/// One row of the paginated print table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintRow {
    pub part_number: String,
    pub description: String,
    pub quantity: String,
    pub work_center: String,
    pub confidence: String,
}

impl PrintRow {
    pub fn cells(&self) -> [&str; 5] {
        [
            &self.part_number,
            &self.description,
            &self.quantity,
            &self.work_center,
            &self.confidence,
        ]
    }
}

pub fn print_rows(items: &[ManufacturingBomItem], description_limit: usize) -> Vec<PrintRow> {
    items
        .iter()
        .map(|item| PrintRow {
            part_number: item.base.part_number.clone(),
            description: truncate_description(&item.base.description, description_limit),
            quantity: item.base.quantity.max(1).to_string(),
            work_center: item.work_center_token().to_string(),
            confidence: confidence_label(item.confidence),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bomforge_models::ChangeType;
    use chrono::TimeZone;

    fn items() -> Vec<ManufacturingBomItem> {
        let mut bracket = ManufacturingBomItem::new("BRK-100", "Bracket, steel")
            .with_level(1)
            .with_quantity(4)
            .with_work_center("WC-WELD-02")
            .with_change_type(ChangeType::Modified)
            .with_confidence(0.874);
        bracket.base.material_spec = Some("S355".to_string());

        vec![
            ManufacturingBomItem::new("FRM-001", "Main frame")
                .with_change_type(ChangeType::Added)
                .with_confidence(0.9),
            bracket,
            ManufacturingBomItem::new("BLT-M8", "Bolt M8"),
        ]
    }

    #[test]
    fn test_export_row_defaults() {
        let rows = export_rows(&items());

        assert_eq!(rows[1].confidence, "87%");
        assert_eq!(rows[1].material_spec, "S355");
        assert_eq!(rows[2].confidence, "");
        assert_eq!(rows[2].change_type, "unchanged");
        assert_eq!(rows[2].quantity, 1);
        assert_eq!(rows[2].level, 0);
        assert_eq!(rows[2].work_center, "");
    }

    #[test]
    fn test_zero_confidence_renders_blank() {
        assert_eq!(confidence_label(Some(0.0)), "");
        assert_eq!(confidence_label(None), "");
        assert_eq!(confidence_label(Some(0.5)), "50%");
    }

    #[test]
    fn test_csv_header_and_rows() {
        let csv = to_csv(&items()).unwrap();
        let mut lines = csv.lines();

        assert_eq!(
            lines.next().unwrap(),
            "Part Number,Description,Quantity,Level,Work Center,Material Spec,Confidence,Change Type"
        );
        assert_eq!(lines.next().unwrap(), "FRM-001,Main frame,1,0,,,90%,added");
        assert_eq!(lines.next().unwrap(), "BRK-100,\"Bracket, steel\",4,1,WC-WELD-02,S355,87%,modified");
        assert_eq!(lines.next().unwrap(), "BLT-M8,Bolt M8,1,0,,,,unchanged");
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_csv_of_empty_list_still_has_header() {
        let csv = to_csv(&[]).unwrap();
        assert_eq!(csv.lines().count(), 1);
        assert!(csv.starts_with("Part Number,"));
    }

    #[test]
    fn test_summary_rows() {
        let generated_at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        let rows = summary_rows(&items(), generated_at);

        let values: Vec<(&str, &str)> = rows.iter().map(|r| (r.metric.as_str(), r.value.as_str())).collect();
        assert_eq!(
            values,
            vec![
                ("Total Assemblies", "3"),
                ("Added Nodes", "1"),
                ("Modified Nodes", "1"),
                ("Overall Neural Confidence", "59%"),
                ("Export Date", "2024-03-01 12:30:00 UTC"),
            ]
        );
    }

    #[test]
    fn test_print_rows() {
        let mut long = ManufacturingBomItem::new("LONG-1", "x".repeat(45));
        long.work_center = Some("WC-PAINT".to_string());
        let rows = print_rows(&[long], DEFAULT_DESCRIPTION_LIMIT);

        assert_eq!(rows[0].description, format!("{}...", "x".repeat(40)));
        assert_eq!(rows[0].work_center, "PAINT");
        assert_eq!(rows[0].quantity, "1");
        assert_eq!(rows[0].cells().len(), PRINT_COLUMNS.len());
    }

    #[test]
    fn test_truncate_counts_characters() {
        assert_eq!(truncate_description("Ventil ßü", 40), "Ventil ßü");
        assert_eq!(truncate_description("ßßßß", 2), "ßß...");
        assert_eq!(truncate_description(&"y".repeat(40), 40), "y".repeat(40));
    }
}
