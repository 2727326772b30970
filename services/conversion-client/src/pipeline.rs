//! Upload -> convert -> poll -> fetch, then resolve and aggregate locally.

use serde::Serialize;
use tracing::info;

use bomforge_models::{BomData, ConversionStatus, ManufacturingBomItem};
use bomforge_utils::bom::{aggregate, normalize_items, BomItemValidator, BomStats, DependencyGraph, HierarchyResolver, ValidationResult};
use bomforge_utils::BomForgeResult;

use crate::client::ConversionClient;
use crate::poller::StatusPoller;

/// Everything a finished conversion produces
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionOutcome {
    pub conversion_id: String,
    pub status: ConversionStatus,
    pub bom: BomData,
    pub graph: DependencyGraph,
    pub stats: BomStats,
    pub validation: ValidationResult,
}

impl ConversionOutcome {
    pub fn mbom_items(&self) -> &[ManufacturingBomItem] {
        &self.bom.mbom_data.items
    }
}

pub struct ConversionPipeline {
    client: ConversionClient,
    poller: StatusPoller,
    resolver: HierarchyResolver,
}

impl ConversionPipeline {
    pub fn new(client: ConversionClient, poller: StatusPoller, resolver: HierarchyResolver) -> Self {
        Self {
            client,
            poller,
            resolver,
        }
    }

    pub async fn run<F>(&self, file_name: &str, bytes: Vec<u8>, on_progress: F) -> BomForgeResult<ConversionOutcome>
    where
        F: FnMut(&ConversionStatus),
    {
        let receipt = self.client.upload_bom_file(file_name, bytes).await?;
        let started = self.client.start_conversion(&receipt.upload_id).await?;
        let conversion_id = started.conversion_id;
        info!(upload_id = %receipt.upload_id, conversion_id = %conversion_id, "Conversion started");

        let status = self.poller.wait_with_progress(&conversion_id, on_progress).await?;
        let mut bom = self.client.get_bom_data(&conversion_id).await?;
        bom.mbom_data.items = normalize_items(&bom.mbom_data.items);

        let outcome = analyze(&self.resolver, conversion_id, status, bom);
        info!(
            conversion_id = %outcome.conversion_id,
            parts = outcome.stats.total_parts,
            avg_confidence = outcome.stats.avg_confidence,
            "Conversion analyzed"
        );
        Ok(outcome)
    }
}

fn analyze(resolver: &HierarchyResolver, conversion_id: String, status: ConversionStatus, bom: BomData) -> ConversionOutcome {
    let items = &bom.mbom_data.items;
    let graph = resolver.resolve(items);
    let stats = aggregate(items);
    let validation = BomItemValidator::new().validate(items);

    ConversionOutcome {
        conversion_id,
        status,
        graph,
        stats,
        validation,
        bom,
    }
}
