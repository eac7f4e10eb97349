//! # Renderer Hand-off
//!
//! Pairs each record with its payload and feeds them to a renderer in order.
//!
//! ```text
//! records ──► encode_batch ──► Vec<LabelJob> ──► render_all ──► artifacts
//!                 (pure)          (complete)        (in order)
//! ```
//!
//! Rendering only starts once the whole job list exists, so a renderer never
//! sees a partial batch.

use serde::Serialize;
use ts_rs::TS;

use crate::payload::{EncodedPayload, PayloadEncoder};
use crate::types::LensRecord;

/// Turns one label's data into some printable artifact.
pub trait LabelRenderer {
    type Artifact;
    type Error;

    fn render(&mut self, job: &LabelJob) -> Result<Self::Artifact, Self::Error>;
}

/// A record with its encoded payload. Serializes as
/// `{ "record": …, "payload": … }`.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct LabelJob {
    pub record: LensRecord,
    pub payload: EncodedPayload,
}

/// Encodes every record in its group's style, keeping record order.
pub fn encode_batch(encoder: &PayloadEncoder, records: &[LensRecord]) -> Vec<LabelJob> {
    records
        .iter()
        .map(|record| LabelJob {
            payload: encoder.encode_record(record),
            record: record.clone(),
        })
        .collect()
}

/// Renders every job in order, stopping at the first failure.
pub fn render_all<R: LabelRenderer>(
    jobs: &[LabelJob],
    renderer: &mut R,
) -> Result<Vec<R::Artifact>, R::Error> {
    jobs.iter()
        .map(|job| renderer.render(job))
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
