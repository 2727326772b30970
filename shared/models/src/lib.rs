//! # BOMForge Core Domain Models
//!
//! This module contains the domain models shared by the BOMForge eBOM to mBOM
//! conversion tooling. All models serialize with serde using the camelCase
//! field names of the conversion backend, and item models carry `validator`
//! rules.
//!
//! ## Key Models
//!
//! - **BomItem**: engineering-side line item (part number, quantity, level)
//! - **ManufacturingBomItem**: mBOM line item with work center, change type,
//!   confidence and explicit dependencies
//! - **BomSnapshot**: immutable item list; edits produce new snapshots
//! - **ConversionStatus**: polled progress of a backend conversion
//! - **FeedbackRequest**: field-level corrections sent to the learning loop

pub mod bom;
pub mod conversion;

#[cfg(test)]
pub mod property_tests;

pub use bom::*;
pub use conversion::*;
