//! mBOM Item Validator
//!
//! Checks an item list for problems before it is resolved, exported or saved
//! back to the backend, and normalizes lists received from the backend.
//! Neither step rejects a list: issues are reported, not raised.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use bomforge_models::ManufacturingBomItem;

/// Validation severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationSeverity {
    Error,
    Warning,
    Info,
}

/// Single validation issue
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    pub severity: ValidationSeverity,
    /// Zero-based position in the item list
    pub row: usize,
    pub part_number: String,
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub error_count: usize,
    pub warning_count: usize,
    pub issues: Vec<ValidationIssue>,
    pub summary: ValidationSummary,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationSummary {
    pub total_items: usize,
    pub duplicate_part_numbers: usize,
    pub dangling_references: usize,
    pub self_references: usize,
    pub out_of_range_confidence: usize,
    pub missing_change_types: usize,
}

pub struct BomItemValidator {
    check_references: bool,
    require_change_type: bool,
}

impl Default for BomItemValidator {
    fn default() -> Self {
        Self {
            check_references: true,
            require_change_type: true,
        }
    }
}

impl BomItemValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report dependency references to unknown or same part numbers
    pub fn with_reference_checks(mut self, enabled: bool) -> Self {
        self.check_references = enabled;
        self
    }

    /// Report items the backend left unclassified
    pub fn with_change_type_required(mut self, required: bool) -> Self {
        self.require_change_type = required;
        self
    }

    pub fn validate(&self, items: &[ManufacturingBomItem]) -> ValidationResult {
        let mut issues = Vec::new();
        let mut summary = ValidationSummary {
            total_items: items.len(),
            ..ValidationSummary::default()
        };

        let known: HashSet<&str> = items.iter().map(|i| i.part_number()).collect();
        let mut first_seen: HashMap<&str, usize> = HashMap::new();

        for (row, item) in items.iter().enumerate() {
            let part_number = item.part_number();
            let mut push = |severity, field: &str, message: String, suggestion: Option<&str>| {
                issues.push(ValidationIssue {
                    severity,
                    row,
                    part_number: part_number.to_string(),
                    field: field.to_string(),
                    message,
                    suggestion: suggestion.map(str::to_string),
                });
            };

            if part_number.trim().is_empty() {
                push(
                    ValidationSeverity::Error,
                    "partNumber",
                    "Missing part number".to_string(),
                    Some("Assign a part number to this item"),
                );
            } else if let Some(first_row) = first_seen.insert(part_number, row) {
                // Keep pointing at the first occurrence
                first_seen.insert(part_number, first_row);
                summary.duplicate_part_numbers += 1;
                push(
                    ValidationSeverity::Error,
                    "partNumber",
                    format!("Duplicate part number {} (first used at row {})", part_number, first_row),
                    Some("Part numbers must be unique within a BOM"),
                );
            }

            if item.base.quantity == 0 {
                push(
                    ValidationSeverity::Error,
                    "quantity",
                    "Quantity must be at least 1".to_string(),
                    None,
                );
            }

            if let Some(confidence) = item.confidence {
                if !confidence.is_finite() || !(0.0..=1.0).contains(&confidence) {
                    summary.out_of_range_confidence += 1;
                    push(
                        ValidationSeverity::Warning,
                        "confidence",
                        format!("Confidence {} is outside 0..=1", confidence),
                        Some("Confidence will be clamped when normalized"),
                    );
                }
            }

            if self.check_references {
                for dependency in &item.dependencies {
                    if dependency == part_number {
                        summary.self_references += 1;
                        push(
                            ValidationSeverity::Warning,
                            "dependencies",
                            format!("{} depends on itself", part_number),
                            Some("Remove the self reference"),
                        );
                    } else if !known.contains(dependency.as_str()) {
                        summary.dangling_references += 1;
                        push(
                            ValidationSeverity::Warning,
                            "dependencies",
                            format!("Dependency {} does not exist in this BOM", dependency),
                            Some("The graph will show an edge without a source node"),
                        );
                    }
                }
            }

            if self.require_change_type && item.change_type.is_none() {
                summary.missing_change_types += 1;
                push(
                    ValidationSeverity::Info,
                    "changeType",
                    "No change type assigned".to_string(),
                    Some("Exports will report this item as unchanged"),
                );
            }
        }

        let error_count = issues
            .iter()
            .filter(|i| i.severity == ValidationSeverity::Error)
            .count();
        let warning_count = issues
            .iter()
            .filter(|i| i.severity == ValidationSeverity::Warning)
            .count();

        ValidationResult {
            is_valid: error_count == 0,
            error_count,
            warning_count,
            issues,
            summary,
        }
    }
}

/// Cleans up an item list received from the backend.
///
/// Trims part numbers and dependency references, drops blank references,
/// raises zero quantities to 1 and clamps confidence into `0..=1`
/// (non-finite values become absent).
pub fn normalize_items(items: &[ManufacturingBomItem]) -> Vec<ManufacturingBomItem> {
    items
        .iter()
        .map(|item| {
            let mut item = item.clone();
            item.base.part_number = item.base.part_number.trim().to_string();
            item.dependencies = item
                .dependencies
                .iter()
                .map(|d| d.trim())
                .filter(|d| !d.is_empty())
                .map(str::to_string)
                .collect();
            if item.base.quantity == 0 {
                item.base.quantity = 1;
            }
            item.confidence = item
                .confidence
                .filter(|c| c.is_finite())
                .map(|c| c.clamp(0.0, 1.0));
            item
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bomforge_models::ChangeType;

    fn item(part_number: &str) -> ManufacturingBomItem {
        ManufacturingBomItem::new(part_number, "part").with_change_type(ChangeType::Unchanged)
    }

    #[test]
    fn test_clean_list_is_valid() {
        let items = vec![item("A"), item("B").with_dependencies(["A"]).with_confidence(0.8)];
        let result = BomItemValidator::new().validate(&items);

        assert!(result.is_valid);
        assert!(result.issues.is_empty());
        assert_eq!(result.summary.total_items, 2);
    }

    #[test]
    fn test_duplicate_part_numbers_are_errors() {
        let items = vec![item("A"), item("B"), item("A"), item("A")];
        let result = BomItemValidator::new().validate(&items);

        assert!(!result.is_valid);
        assert_eq!(result.error_count, 2);
        assert_eq!(result.summary.duplicate_part_numbers, 2);
        assert!(result.issues.iter().all(|i| i.message.contains("row 0")));
    }

    #[test]
    fn test_reference_warnings() {
        let items = vec![
            item("A").with_dependencies(["A"]),
            item("B").with_dependencies(["GHOST"]),
        ];
        let result = BomItemValidator::new().validate(&items);

        assert!(result.is_valid);
        assert_eq!(result.warning_count, 2);
        assert_eq!(result.summary.self_references, 1);
        assert_eq!(result.summary.dangling_references, 1);

        let relaxed = BomItemValidator::new()
            .with_reference_checks(false)
            .validate(&items);
        assert_eq!(relaxed.warning_count, 0);
    }

    #[test]
    fn test_confidence_and_quantity_checks() {
        let items = vec![
            item("A").with_confidence(1.4),
            item("B").with_confidence(f64::NAN),
            item("C").with_quantity(0),
        ];
        let result = BomItemValidator::new().validate(&items);

        assert_eq!(result.summary.out_of_range_confidence, 2);
        assert_eq!(result.error_count, 1);
        assert_eq!(result.issues.last().unwrap().field, "quantity");
    }

    #[test]
    fn test_missing_change_type_is_info() {
        let items = vec![ManufacturingBomItem::new("A", "part")];
        let result = BomItemValidator::new().validate(&items);

        assert!(result.is_valid);
        assert_eq!(result.warning_count, 0);
        assert_eq!(result.issues[0].severity, ValidationSeverity::Info);

        let relaxed = BomItemValidator::new()
            .with_change_type_required(false)
            .validate(&items);
        assert!(relaxed.issues.is_empty());
    }

    #[test]
    fn test_normalize_items() {
        let items = vec![
            item("  A ").with_quantity(0).with_confidence(1.7),
            item("B").with_dependencies([" A ", "", "  "]).with_confidence(-0.2),
            item("C").with_confidence(f64::INFINITY),
        ];
        let normalized = normalize_items(&items);

        assert_eq!(normalized[0].part_number(), "A");
        assert_eq!(normalized[0].base.quantity, 1);
        assert_eq!(normalized[0].confidence, Some(1.0));
        assert_eq!(normalized[1].dependencies, vec!["A"]);
        assert_eq!(normalized[1].confidence, Some(0.0));
        assert_eq!(normalized[2].confidence, None);
        // Source list untouched
        assert_eq!(items[0].part_number(), "  A ");
    }
}
