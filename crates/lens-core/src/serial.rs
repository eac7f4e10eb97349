//! # Serial Numbers
//!
//! Batch-scoped serial number issuing.
//!
//! ## Serial Format
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │   20261016083015-7                                                      │
//! │   └──────┬─────┘ └┬┘                                                    │
//! │          │        └── index: 1, 2, 3 … once per emitted unit           │
//! │          └── batch prefix: creation instant, UTC, whole seconds        │
//! │                                                                         │
//! │   One BatchContext per generation call. Indices run 1..=N across       │
//! │   every entry/cell of that call with no gaps or repeats.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Two batches created within the same second share a prefix; callers that
//! generate batches back-to-back must keep them apart themselves.

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

/// `chrono` format of the batch prefix.
pub const BATCH_PREFIX_FORMAT: &str = "%Y%m%d%H%M%S";

/// Per-call serial state, threaded explicitly through one batch.
#[derive(Debug, Clone)]
pub struct BatchContext {
    batch_id: Uuid,
    created_at: DateTime<Utc>,
    prefix: String,
    next_index: u32,
}

impl BatchContext {
    /// Starts a batch at the current instant.
    pub fn new() -> Self {
        Self::at(Utc::now())
    }

    /// Starts a batch at a given instant.
    ///
    /// ## Example
    /// ```rust
    /// use chrono::{TimeZone, Utc};
    /// use lens_core::serial::BatchContext;
    ///
    /// let instant = Utc.with_ymd_and_hms(2026, 10, 16, 8, 30, 15).unwrap();
    /// let mut batch = BatchContext::at(instant);
    ///
    /// assert_eq!(batch.next_serial(), "20261016083015-1");
    /// assert_eq!(batch.next_serial(), "20261016083015-2");
    /// ```
    pub fn at(created_at: DateTime<Utc>) -> Self {
        BatchContext {
            batch_id: Uuid::new_v4(),
            created_at,
            prefix: created_at.format(BATCH_PREFIX_FORMAT).to_string(),
            next_index: 1,
        }
    }

    /// Issues the next serial and advances the index.
    pub fn next_serial(&mut self) -> String {
        let serial = format!("{}-{}", self.prefix, self.next_index);
        self.next_index += 1;
        serial
    }

    /// Correlation id for logs.
    pub fn batch_id(&self) -> Uuid {
        self.batch_id
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// UTC calendar date stamped on every record of the batch.
    pub fn production_date(&self) -> NaiveDate {
        self.created_at.date_naive()
    }

    /// Index the next serial will carry.
    pub fn next_index(&self) -> u32 {
        self.next_index
    }

    /// Number of serials issued so far.
    pub fn issued(&self) -> u32 {
        self.next_index - 1
    }
}

impl Default for BatchContext {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
