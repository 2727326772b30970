//! Conversion backend contract models.
//!
//! Request and response payloads exchanged with the eBOM to mBOM conversion
//! service: uploads, status polling, BOM data, history and feedback.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::bom::{BomItem, BomSnapshot, ManufacturingBomItem};

/// Envelope wrapping every backend response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            data: None,
            error: Some(error.into()),
        }
    }

    /// Unwraps the payload, or returns the backend's error text
    pub fn into_result(self) -> Result<T, String> {
        if !self.success {
            return Err(self
                .error
                .or(self.message)
                .unwrap_or_else(|| "Request was not successful".to_string()));
        }
        self.data
            .ok_or_else(|| "Response contained no data".to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadReceipt {
    pub upload_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionStarted {
    pub conversion_id: String,
}

/// Overall conversion state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversionState {
    Processing,
    Completed,
    Failed,
}

impl ConversionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl std::fmt::Display for ConversionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Processing => write!(f, "processing"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversionStage {
    Parsing,
    Analysis,
    Generation,
    Validation,
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageState {
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl Default for StageState {
    fn default() -> Self {
        Self::Pending
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageProgress {
    #[serde(default)]
    pub parsing: StageState,
    #[serde(default)]
    pub analysis: StageState,
    #[serde(default)]
    pub generation: StageState,
    #[serde(default)]
    pub validation: StageState,
}

impl StageProgress {
    /// Stages in pipeline order
    pub fn iter(&self) -> impl Iterator<Item = (ConversionStage, StageState)> {
        [
            (ConversionStage::Parsing, self.parsing),
            (ConversionStage::Analysis, self.analysis),
            (ConversionStage::Generation, self.generation),
            (ConversionStage::Validation, self.validation),
        ]
        .into_iter()
    }

    pub fn completed_count(&self) -> usize {
        self.iter()
            .filter(|(_, state)| *state == StageState::Completed)
            .count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionStatus {
    pub conversion_id: String,
    pub status: ConversionState,
    #[serde(default)]
    pub progress: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_stage: Option<ConversionStage>,
    #[serde(default)]
    pub stages: StageProgress,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_time_remaining: Option<f64>,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl ConversionStatus {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EbomData {
    #[serde(default)]
    pub items: Vec<BomItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MbomData {
    #[serde(default)]
    pub items: Vec<ManufacturingBomItem>,
}

/// Converted BOM pair for one conversion
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BomData {
    #[serde(default)]
    pub ebom_data: EbomData,
    #[serde(default)]
    pub mbom_data: MbomData,
}

impl BomData {
    pub fn ebom(&self) -> &[BomItem] {
        &self.ebom_data.items
    }

    pub fn mbom_snapshot(&self) -> BomSnapshot {
        BomSnapshot::new(self.mbom_data.items.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionHistory {
    pub conversion_id: String,
    pub file_name: String,
    pub status: String,
    #[serde(default)]
    pub ebom_part_count: u32,
    #[serde(default)]
    pub mbom_part_count: u32,
    #[serde(default)]
    pub confidence_score: f64,
    #[serde(default)]
    pub time_taken: f64,
    pub created_at: DateTime<Utc>,
}

impl ConversionHistory {
    /// Case-insensitive match on file name or conversion id
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        self.file_name.to_lowercase().contains(&term)
            || self.conversion_id.to_lowercase().contains(&term)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub total_pages: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryPage {
    #[serde(default)]
    pub conversions: Vec<ConversionHistory>,
    #[serde(default)]
    pub pagination: Pagination,
}

/// Fields a reviewer may correct through the feedback loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CorrectableField {
    WorkCenter,
    ChangeType,
    Description,
    Quantity,
    MaterialSpec,
}

impl CorrectableField {
    pub fn current_value(&self, item: &ManufacturingBomItem) -> serde_json::Value {
        match self {
            Self::WorkCenter => serde_json::json!(item.work_center),
            Self::ChangeType => serde_json::json!(item.change_type),
            Self::Description => serde_json::json!(item.base.description),
            Self::Quantity => serde_json::json!(item.base.quantity),
            Self::MaterialSpec => serde_json::json!(item.base.material_spec),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackCorrection {
    pub item_id: String,
    pub field: CorrectableField,
    pub original_value: serde_json::Value,
    pub corrected_value: serde_json::Value,
    #[serde(default)]
    pub reasoning: String,
}

impl FeedbackCorrection {
    pub fn for_item(
        item: &ManufacturingBomItem,
        field: CorrectableField,
        corrected_value: impl Into<serde_json::Value>,
        reasoning: impl Into<String>,
    ) -> Self {
        Self {
            item_id: item.feedback_id().to_string(),
            field,
            original_value: field.current_value(item),
            corrected_value: corrected_value.into(),
            reasoning: reasoning.into(),
        }
    }
}

fn default_should_learn() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRequest {
    pub conversion_id: String,
    pub corrections: Vec<FeedbackCorrection>,
    #[serde(default = "default_should_learn")]
    pub should_learn: bool,
}

impl FeedbackRequest {
    pub fn new(conversion_id: impl Into<String>, corrections: Vec<FeedbackCorrection>) -> Self {
        Self {
            conversion_id: conversion_id.into(),
            corrections,
            should_learn: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveEditsRequest {
    pub changes: Vec<ManufacturingBomItem>,
}

impl From<&BomSnapshot> for SaveEditsRequest {
    fn from(snapshot: &BomSnapshot) -> Self {
        Self {
            changes: snapshot.items().to_vec(),
        }
    }
}
