//! Aggregation Engine
//!
//! Summary statistics over an mBOM item list for dashboards and export
//! summaries.

use serde::{Deserialize, Serialize};

use bomforge_models::{ChangeType, ManufacturingBomItem};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BomStats {
    pub total_parts: usize,
    pub added_parts: usize,
    pub modified_parts: usize,
    pub grouped_parts: usize,
    pub unchanged_parts: usize,
    /// Mean confidence as a rounded percentage
    pub avg_confidence: u32,
}

impl BomStats {
    pub fn count_for(&self, change_type: ChangeType) -> usize {
        match change_type {
            ChangeType::Added => self.added_parts,
            ChangeType::Modified => self.modified_parts,
            ChangeType::Grouped => self.grouped_parts,
            ChangeType::Unchanged => self.unchanged_parts,
        }
    }

    /// `round(mean × 100)` with absent confidence read as 0; 0 for an empty list.
    pub fn mean_confidence_percent(items: &[ManufacturingBomItem]) -> u32 {
        if items.is_empty() {
            return 0;
        }
        let sum: f64 = items.iter().map(ManufacturingBomItem::confidence_or_zero).sum();
        let percent = (sum / items.len() as f64 * 100.0).round();
        if percent.is_finite() && percent > 0.0 {
            percent as u32
        } else {
            0
        }
    }
}

pub fn aggregate(items: &[ManufacturingBomItem]) -> BomStats {
    let mut stats = BomStats {
        total_parts: items.len(),
        avg_confidence: BomStats::mean_confidence_percent(items),
        ..BomStats::default()
    };

    for change_type in items.iter().filter_map(|i| i.change_type) {
        match change_type {
            ChangeType::Added => stats.added_parts += 1,
            ChangeType::Modified => stats.modified_parts += 1,
            ChangeType::Grouped => stats.grouped_parts += 1,
            ChangeType::Unchanged => stats.unchanged_parts += 1,
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(part_number: &str, change_type: Option<ChangeType>, confidence: Option<f64>) -> ManufacturingBomItem {
        let mut item = ManufacturingBomItem::new(part_number, "part");
        item.change_type = change_type;
        item.confidence = confidence;
        item
    }

    #[test]
    fn test_empty_list_is_all_zero() {
        let stats = aggregate(&[]);
        assert_eq!(stats, BomStats::default());
        assert_eq!(stats.avg_confidence, 0);
    }

    #[test]
    fn test_counts_and_mean() {
        let items = vec![
            item("A", Some(ChangeType::Added), Some(0.9)),
            item("B", Some(ChangeType::Modified), Some(0.7)),
        ];
        let stats = aggregate(&items);

        assert_eq!(stats.total_parts, 2);
        assert_eq!(stats.added_parts, 1);
        assert_eq!(stats.modified_parts, 1);
        assert_eq!(stats.grouped_parts, 0);
        assert_eq!(stats.unchanged_parts, 0);
        assert_eq!(stats.avg_confidence, 80);
    }

    #[test]
    fn test_absent_confidence_counts_as_zero() {
        let items = vec![
            item("A", Some(ChangeType::Grouped), Some(1.0)),
            item("B", Some(ChangeType::Unchanged), None),
        ];
        assert_eq!(aggregate(&items).avg_confidence, 50);
    }

    #[test]
    fn test_missing_change_type_lands_in_no_bucket() {
        let items = vec![item("A", None, Some(0.5)), item("B", Some(ChangeType::Grouped), Some(0.5))];
        let stats = aggregate(&items);

        assert_eq!(stats.total_parts, 2);
        let bucketed: usize = ChangeType::ALL.iter().map(|c| stats.count_for(*c)).sum();
        assert_eq!(bucketed, 1);
    }

    #[test]
    fn test_rounding() {
        let items = vec![item("A", None, Some(0.333)), item("B", None, Some(0.334))];
        // mean 0.3335 -> 33.35 -> 33
        assert_eq!(aggregate(&items).avg_confidence, 33);

        let items = vec![item("A", None, Some(0.996))];
        assert_eq!(aggregate(&items).avg_confidence, 100);
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(aggregate(&[])).unwrap();
        assert_eq!(json["totalParts"], 0);
        assert_eq!(json["avgConfidence"], 0);
    }
}
