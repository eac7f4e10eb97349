//! # Error Types
//!
//! Domain-specific error types for lens-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  lens-core errors (this file)                                          │
//! │  ├── CoreError        - Request/catalog failures (fatal for the call)  │
//! │  └── ValidationError  - Field-level input failures                     │
//! │                                                                         │
//! │  lens-label errors (app crate)                                         │
//! │  └── AppError         - Config, file and output failures               │
//! │                                                                         │
//! │  NOT an error: an unresolved diameter/thickness. That is a value       │
//! │  (`Resolution::Unresolved`) carried on the emitted record.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product name, field, input)
//! 3. Errors are enum variants, never String
//! 4. Nothing here is retried automatically; retries belong to the caller

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core label-generation errors.
///
/// Any of these aborts the call that produced it before a single serial
/// number is issued.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product name is not present in the catalog.
    ///
    /// ## When This Occurs
    /// - Typo or stale product selection in the requesting UI
    /// - Catalog restricted to groups that do not include the product
    ///
    /// ## User Workflow
    /// ```text
    /// Request "Ghost" × 3
    ///      │
    ///      ▼
    /// Catalog lookup fails
    ///      │
    ///      ▼
    /// CatalogMiss("Ghost"), zero serials issued, zero records
    /// ```
    #[error("Product not found in catalog: {0}")]
    CatalogMiss(String),

    /// A power value could not be read as a finite number.
    #[error("{field} is not a valid power: '{input}'")]
    InvalidNumericInput { field: String, input: String },

    /// One entry of a batch failed validation; the whole batch is rejected.
    #[error("Batch entry {index} rejected: {source}")]
    InvalidEntry {
        index: usize,
        #[source]
        source: Box<CoreError>,
    },

    /// The catalog document is structurally valid JSON but breaks a rule.
    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    /// A configured target URL cannot be parsed.
    #[error("Invalid target URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Catalog document is not valid JSON for the expected shape.
    #[error("Catalog document could not be parsed: {0}")]
    CatalogParse(#[from] serde_json::Error),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Returns true if this error (or the batch entry it wraps) is a catalog miss.
    pub fn is_catalog_miss(&self) -> bool {
        match self {
            CoreError::CatalogMiss(_) => true,
            CoreError::InvalidEntry { source, .. } => source.is_catalog_miss(),
            _ => false,
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Used for early validation before any rule matching runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g., malformed compact payload).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Power does not sit on the 0.25 D batch grid.
    #[error("{field} {value} is not a multiple of 0.25")]
    NotOnGrid { field: String, value: String },

    /// Duplicate value (e.g., product listed in two groups).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::CatalogMiss("Ghost".to_string());
        assert_eq!(err.to_string(), "Product not found in catalog: Ghost");

        let err = CoreError::InvalidNumericInput {
            field: "spherical".to_string(),
            input: "abc".to_string(),
        };
        assert_eq!(err.to_string(), "spherical is not a valid power: 'abc'");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::NotOnGrid {
            field: "cylinder".to_string(),
            value: "-0.10".to_string(),
        };
        assert_eq!(err.to_string(), "cylinder -0.10 is not a multiple of 0.25");

        let err = ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 0,
            max: 999,
        };
        assert_eq!(err.to_string(), "quantity must be between 0 and 999");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "product_name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }

    #[test]
    fn test_catalog_miss_seen_through_batch_entry() {
        let err = CoreError::InvalidEntry {
            index: 2,
            source: Box::new(CoreError::CatalogMiss("Ghost".to_string())),
        };
        assert!(err.is_catalog_miss());
        assert_eq!(
            err.to_string(),
            "Batch entry 2 rejected: Product not found in catalog: Ghost"
        );
    }
}
