//! # lens-core: Pure Label Logic for Lens Label
//!
//! This crate is the **heart** of Lens Label. It turns lens requests into
//! serialized, parameter-resolved records and encodes their scannable
//! payloads, as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Lens Label Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    lens-label (CLI)                             │   │
//! │  │    config ──► catalog file ──► requests / grid ──► JSON lines  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ lens-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  catalog  │  │  builder  │  │  serial   │  │  payload  │  │   │
//! │  │   │  Product  │  │  Request  │  │  Batch    │  │  Encoder  │  │   │
//! │  │   │  rules    │  │  → Record │  │  Context  │  │  2 styles │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO FILES • NO ENV • NO NETWORK • NO RENDERING                │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ LabelJob { record, payload }           │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 LabelRenderer (external)                        │   │
//! │  │          QR / barcode drawing, layout, print dialog             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`diopter`] - Optical power type with integer hundredths
//! - [`types`] - Domain types (ProductSpec, LensRecord, Resolution, etc.)
//! - [`catalog`] - Product catalog and its JSON document form
//! - [`resolver`] - First-match parameter lookup
//! - [`serial`] - Batch-scoped serial numbers
//! - [`builder`] - Requests to records
//! - [`grid`] - Sparse batch grid input
//! - [`payload`] - Scan payload and target URL encoding
//! - [`codes`] - Product short codes for compact payloads
//! - [`render`] - Renderer hand-off
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: only `BatchContext::new` reads the clock
//! 2. **Exact Powers**: diopters are hundredths (i32), never floats
//! 3. **Explicit Context**: the serial counter is a value passed by `&mut`
//! 4. **Unresolved Is Data**: a missing rule is `Resolution::Unresolved`, not an error
//!
//! ## Example Usage
//!
//! ```rust
//! use lens_core::builder::{LensRecordBuilder, LensRequest};
//! use lens_core::catalog::ProductCatalog;
//! use lens_core::codes::ProductCodeTable;
//! use lens_core::payload::{EncoderSettings, PayloadEncoder};
//! use lens_core::render::encode_batch;
//! use lens_core::serial::BatchContext;
//!
//! let catalog = ProductCatalog::from_json_str(r#"{
//!     "groups": {
//!         "group1": {
//!             "products": {
//!                 "P1": {
//!                     "opticalIndex": "1.60",
//!                     "abbeNumber": "42",
//!                     "diameterRules": [
//!                         { "sphericalRange": { "min": -6, "max": 0 }, "value": "65mm" }
//!                     ]
//!                 }
//!             }
//!         }
//!     }
//! }"#).unwrap();
//!
//! let mut batch = BatchContext::new();
//! let records = LensRecordBuilder::new(&catalog)
//!     .build(&LensRequest::new("P1", "-3.00", "0.00", 2), &mut batch)
//!     .unwrap();
//!
//! let encoder = PayloadEncoder::new(EncoderSettings::default(), ProductCodeTable::builtin()).unwrap();
//! let jobs = encode_batch(&encoder, &records);
//!
//! assert_eq!(jobs.len(), 2);
//! assert_eq!(records[0].diameter.as_option().map(String::as_str), Some("65mm"));
//! assert!(jobs[1].payload.target_reference.ends_with(&format!("{}-2", batch.prefix())));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod builder;
pub mod catalog;
pub mod codes;
pub mod diopter;
pub mod error;
pub mod grid;
pub mod payload;
pub mod render;
pub mod resolver;
pub mod serial;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use lens_core::Diopter` instead of
// `use lens_core::diopter::Diopter`

pub use builder::{LensRecordBuilder, LensRequest, PowerInput};
pub use catalog::ProductCatalog;
pub use diopter::Diopter;
pub use error::{CoreError, CoreResult, ValidationError};
pub use grid::BatchGrid;
pub use payload::{EncodedPayload, EncoderSettings, PayloadEncoder};
pub use render::{LabelJob, LabelRenderer};
pub use serial::BatchContext;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Step of the batch grid in hundredths of a diopter (0.25 D).
pub const GRID_STEP_HUNDREDTHS: i32 = 25;

/// Largest accepted power magnitude in hundredths (99.99 D).
pub const MAX_ABS_POWER_HUNDREDTHS: i32 = 9_999;

/// Maximum units of a single request entry
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10)
pub const MAX_UNITS_PER_ENTRY: u32 = 999;

/// Maximum product name length in characters.
pub const MAX_PRODUCT_NAME_LEN: usize = 200;
