//! Bill of Materials item models for the BOMForge conversion system.
//!
//! This module defines the engineering (eBOM) and manufacturing (mBOM) line
//! items exchanged with the conversion backend, the closed change
//! classification, and the immutable snapshot used for local editing.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

/// How an mBOM item relates to its eBOM origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Added,
    Modified,
    Unchanged,
    Grouped,
}

impl ChangeType {
    pub const ALL: [ChangeType; 4] = [
        ChangeType::Added,
        ChangeType::Modified,
        ChangeType::Unchanged,
        ChangeType::Grouped,
    ];

    /// Parse from the wire literal, ignoring case
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "added" => Some(Self::Added),
            "modified" => Some(Self::Modified),
            "unchanged" => Some(Self::Unchanged),
            "grouped" => Some(Self::Grouped),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Modified => "modified",
            Self::Unchanged => "unchanged",
            Self::Grouped => "grouped",
        }
    }
}

impl Default for ChangeType {
    fn default() -> Self {
        Self::Unchanged
    }
}

impl std::fmt::Display for ChangeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_quantity() -> u32 {
    1
}

/// Engineering-side BOM line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BomItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[validate(length(min = 1, max = 100, message = "Part number must be between 1 and 100 characters"))]
    pub part_number: String,
    #[serde(default)]
    pub description: String,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub level: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material_spec: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<String>,
}

impl BomItem {
    pub fn new(part_number: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: None,
            part_number: part_number.into(),
            description: description.into(),
            quantity: 1,
            level: 0,
            material_spec: None,
            notes: None,
            children: Vec::new(),
        }
    }
}

/// Alternative classification proposed by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alternative {
    pub description: String,
    pub confidence: f64,
}

/// Manufacturing-side BOM line item as produced by the conversion backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ManufacturingBomItem {
    #[serde(flatten)]
    #[validate]
    pub base: BomItem,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_center: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tooling: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub process_steps: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_type: Option<ChangeType>,
    #[validate(range(min = 0.0, max = 1.0, message = "Confidence must be between 0 and 1"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub reasoning: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternatives: Vec<Alternative>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence: Option<i64>,
}

impl ManufacturingBomItem {
    pub fn new(part_number: impl Into<String>, description: impl Into<String>) -> Self {
        Self::from_bom_item(BomItem::new(part_number, description))
    }

    /// Wraps an eBOM item with no manufacturing decisions attached
    pub fn from_bom_item(base: BomItem) -> Self {
        Self {
            base,
            work_center: None,
            tooling: Vec::new(),
            process_steps: Vec::new(),
            change_type: None,
            confidence: None,
            reasoning: String::new(),
            alternatives: Vec::new(),
            dependencies: Vec::new(),
            sequence: None,
        }
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.base.level = level;
        self
    }

    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.base.quantity = quantity;
        self
    }

    pub fn with_change_type(mut self, change_type: ChangeType) -> Self {
        self.change_type = Some(change_type);
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    pub fn with_work_center(mut self, work_center: impl Into<String>) -> Self {
        self.work_center = Some(work_center.into());
        self
    }

    pub fn with_dependencies<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = dependencies.into_iter().map(Into::into).collect();
        self
    }

    pub fn part_number(&self) -> &str {
        &self.base.part_number
    }

    pub fn level(&self) -> u32 {
        self.base.level
    }

    /// Confidence with absent values read as 0
    pub fn confidence_or_zero(&self) -> f64 {
        self.confidence.unwrap_or(0.0)
    }

    pub fn change_type_or_default(&self) -> ChangeType {
        self.change_type.unwrap_or_default()
    }

    pub fn has_dependencies(&self) -> bool {
        !self.dependencies.is_empty()
    }

    /// Short work-center token, e.g. `WC-ASSY-01` -> `ASSY`
    pub fn work_center_token(&self) -> &str {
        self.work_center
            .as_deref()
            .and_then(|wc| wc.split('-').nth(1))
            .unwrap_or("")
    }

    /// Identifier used when reporting feedback on this item
    pub fn feedback_id(&self) -> &str {
        self.base.id.as_deref().unwrap_or(&self.base.part_number)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("Part number {0} already exists in this BOM")]
    DuplicatePartNumber(String),

    #[error("Part number must not be empty")]
    EmptyPartNumber,
}

/// Immutable, ordered mBOM item list.
///
/// Every edit returns a new snapshot; the original is never touched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BomSnapshot {
    items: Vec<ManufacturingBomItem>,
}

impl BomSnapshot {
    pub fn new(items: Vec<ManufacturingBomItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[ManufacturingBomItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, part_number: &str) -> Option<&ManufacturingBomItem> {
        self.items.iter().find(|i| i.part_number() == part_number)
    }

    pub fn position(&self, part_number: &str) -> Option<usize> {
        self.items.iter().position(|i| i.part_number() == part_number)
    }

    /// Applies `edit` to the first item with `part_number`.
    pub fn with_updated<F>(&self, part_number: &str, edit: F) -> Self
    where
        F: FnOnce(&mut ManufacturingBomItem),
    {
        let mut items = self.items.clone();
        if let Some(item) = items.iter_mut().find(|i| i.part_number() == part_number) {
            edit(item);
        }
        Self { items }
    }

    pub fn without(&self, part_number: &str) -> Self {
        Self {
            items: self
                .items
                .iter()
                .filter(|i| i.part_number() != part_number)
                .cloned()
                .collect(),
        }
    }

    pub fn with_added(&self, item: ManufacturingBomItem) -> Result<Self, SnapshotError> {
        if item.part_number().trim().is_empty() {
            return Err(SnapshotError::EmptyPartNumber);
        }
        if self.get(item.part_number()).is_some() {
            return Err(SnapshotError::DuplicatePartNumber(item.base.part_number));
        }

        let mut items = self.items.clone();
        items.push(item);
        Ok(Self { items })
    }

    /// Moves the item at `from` so it ends up at index `to`.
    pub fn reordered(&self, from: usize, to: usize) -> Self {
        let mut items = self.items.clone();
        if from < items.len() && to < items.len() && from != to {
            let item = items.remove(from);
            items.insert(to, item);
        }
        Self { items }
    }

    pub fn into_items(self) -> Vec<ManufacturingBomItem> {
        self.items
    }
}

impl From<Vec<ManufacturingBomItem>> for BomSnapshot {
    fn from(items: Vec<ManufacturingBomItem>) -> Self {
        Self::new(items)
    }
}
