//! Property-based tests for BOMForge domain models
//!
//! Validates snapshot editing guarantees and validation rules of the item
//! models.

use proptest::option;
use proptest::prelude::*;
use validator::Validate;

use crate::{BomSnapshot, ChangeType, ManufacturingBomItem};

prop_compose! {
    fn arb_change_type()(idx in 0usize..4) -> ChangeType {
        ChangeType::ALL[idx]
    }
}

prop_compose! {
    fn arb_item()(
        part_number in "[A-Z]{2}-[0-9]{3}",
        description in "[A-Za-z ]{0,30}",
        quantity in 1u32..50,
        level in 0u32..5,
        change_type in option::of(arb_change_type()),
        confidence in option::of(0.0..=1.0f64),
        work_center in option::of("WC-[A-Z]{3,5}-[0-9]{2}"),
    ) -> ManufacturingBomItem {
        let mut item = ManufacturingBomItem::new(part_number, description)
            .with_quantity(quantity)
            .with_level(level);
        item.change_type = change_type;
        item.confidence = confidence;
        item.work_center = work_center;
        item
    }
}

fn unique_items(items: Vec<ManufacturingBomItem>) -> Vec<ManufacturingBomItem> {
    let mut seen = std::collections::HashSet::new();
    items
        .into_iter()
        .filter(|i| seen.insert(i.part_number().to_string()))
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Well-formed items always pass model validation
    #[test]
    fn prop_generated_items_validate(item in arb_item()) {
        prop_assert!(item.validate().is_ok());
        prop_assert!(item.confidence_or_zero() >= 0.0);
    }

    /// Editing a snapshot never mutates the source snapshot
    #[test]
    fn prop_snapshot_edits_are_copy_on_write(
        items in prop::collection::vec(arb_item(), 1..20),
        from in 0usize..20,
        to in 0usize..20,
    ) {
        let original = BomSnapshot::new(unique_items(items));
        let before = original.clone();

        let target = original.items()[0].part_number().to_string();
        let _ = original.with_updated(&target, |i| i.base.quantity += 1);
        let _ = original.without(&target);
        let _ = original.reordered(from, to);

        prop_assert_eq!(original, before);
    }

    /// Reordering is a permutation of the same items
    #[test]
    fn prop_reorder_preserves_items(
        items in prop::collection::vec(arb_item(), 0..20),
        from in 0usize..20,
        to in 0usize..20,
    ) {
        let snapshot = BomSnapshot::new(unique_items(items));
        let moved = snapshot.reordered(from, to);

        prop_assert_eq!(moved.len(), snapshot.len());
        for item in snapshot.items() {
            prop_assert!(moved.get(item.part_number()).is_some());
        }
    }
}
