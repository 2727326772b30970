//! BOMForge Conversion Client
//!
//! Talks to the external conversion backend: uploads eBOM spreadsheets,
//! starts and polls conversions, fetches and edits the resulting mBOM, and
//! submits reviewer feedback.

pub mod client;
pub mod pipeline;
pub mod poller;

pub use client::{ConversionClient, UPLOAD_FIELD};
pub use pipeline::{ConversionOutcome, ConversionPipeline};
pub use poller::StatusPoller;
