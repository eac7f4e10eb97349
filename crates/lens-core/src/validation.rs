//! # Validation Module
//!
//! Input validation utilities for Lens Label.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Catalog load                                                 │
//! │  ├── Range bounds ordered (min <= max)                                 │
//! │  └── Thickness rules carry centre or edge                              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Request intake (builder)                                     │
//! │  ├── Powers parse to finite numbers                                    │
//! │  ├── Quantity within limits                                            │
//! │  ├── Grid cells on the 0.25 D step                                     │
//! │  └── Grid cells inside the order form                                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Rule matching                                                │
//! │  └── Works on already-valid Diopter values only                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use lens_core::validation::{validate_product_name, validate_quantity};
//!
//! validate_product_name("Clear 1.60 Aspheric").unwrap();
//! validate_quantity(5).unwrap();
//! ```

use crate::diopter::Diopter;
use crate::error::ValidationError;
use crate::types::PowerRange;
use crate::{MAX_PRODUCT_NAME_LEN, MAX_UNITS_PER_ENTRY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 200 characters
///
/// ## Example
/// ```rust
/// use lens_core::validation::validate_product_name;
///
/// assert!(validate_product_name("Clear 1.60 Aspheric").is_ok());
/// assert!(validate_product_name("   ").is_err());
/// ```
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "product_name".to_string(),
        });
    }

    if name.chars().count() > MAX_PRODUCT_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "product_name".to_string(),
            max: MAX_PRODUCT_NAME_LEN,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates the number of units requested for one entry.
///
/// ## Rules
/// - Zero is allowed (an empty grid cell / nothing to print)
/// - Must not exceed MAX_UNITS_PER_ENTRY (999)
pub fn validate_quantity(qty: u32) -> ValidationResult<()> {
    if qty > MAX_UNITS_PER_ENTRY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 0,
            max: MAX_UNITS_PER_ENTRY as i64,
        });
    }

    Ok(())
}

/// Validates that a power sits on the 0.25 D batch grid.
///
/// ## Example
/// ```rust
/// use lens_core::diopter::Diopter;
/// use lens_core::validation::validate_grid_power;
///
/// assert!(validate_grid_power("spherical", Diopter::from_hundredths(-325)).is_ok());
/// assert!(validate_grid_power("spherical", Diopter::from_hundredths(-310)).is_err());
/// ```
pub fn validate_grid_power(field: &str, power: Diopter) -> ValidationResult<()> {
    if !power.is_on_grid() {
        return Err(ValidationError::NotOnGrid {
            field: field.to_string(),
            value: power.to_string(),
        });
    }

    Ok(())
}

/// Validates that a rule range is well-formed.
pub fn validate_range(field: &str, range: &PowerRange) -> ValidationResult<()> {
    if !range.is_well_formed() {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: format!("min {} is greater than max {}", range.min, range.max),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
