//! # Batch Grid
//!
//! Sparse (spherical × cylinder) quantity matrix for one product.
//!
//! ## Layout
//! ```text
//!            C  0.00   -0.25   -0.50   …   -5.00
//!   S  0.00  [  2  ]  [     ]  [  1  ]      [     ]   ← traversal starts here
//!     -0.25  [     ]  [  4  ]  [     ]      [     ]
//!       …
//!    -11.00  [     ]  [     ]  [     ]      [  1  ]   ← …and ends here
//!
//!   Row-major: spherical descending, then cylinder descending.
//!   Empty cells are absent from the map; setting a cell to 0 clears it.
//!   Cells outside the 45 × 21 form are rejected.
//! ```

use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::BTreeMap;

use crate::builder::LensRequest;
use crate::diopter::Diopter;
use crate::error::{CoreResult, ValidationError};
use crate::validation::{
    validate_grid_power, validate_product_name, validate_quantity, ValidationResult,
};

/// Strongest spherical row of the standard order form (-11.00 D).
pub const STANDARD_MIN_SPHERICAL: Diopter = Diopter::from_hundredths(-1100);

/// Strongest cylinder column of the standard order form (-5.00 D).
pub const STANDARD_MIN_CYLINDER: Diopter = Diopter::from_hundredths(-500);

type CellKey = (Reverse<Diopter>, Reverse<Diopter>);

/// One non-empty grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridCell {
    pub spherical: Diopter,
    pub cylinder: Diopter,
    pub quantity: u32,
}

/// Grid input as read from a JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridDocument {
    pub product_name: String,
    #[serde(default)]
    pub cells: Vec<GridCell>,
}

impl GridDocument {
    /// Validates every cell into a grid. Later cells overwrite earlier ones.
    pub fn into_grid(self) -> CoreResult<BatchGrid> {
        validate_product_name(&self.product_name)?;
        let mut grid = BatchGrid::new(self.product_name);
        for cell in self.cells {
            grid.set(cell.spherical, cell.cylinder, cell.quantity)?;
        }
        Ok(grid)
    }
}

/// Quantities per power pair for a single product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchGrid {
    product_name: String,
    cells: BTreeMap<CellKey, u32>,
}

impl BatchGrid {
    pub fn new(product_name: impl Into<String>) -> Self {
        BatchGrid {
            product_name: product_name.into(),
            cells: BTreeMap::new(),
        }
    }

    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    /// Sets the quantity of a cell; 0 clears it.
    ///
    /// ## Errors
    /// - `NotOnGrid` if either power is off the 0.25 D step
    /// - `InvalidFormat` if the cell lies outside the order form
    /// - `OutOfRange` if the quantity exceeds the per-entry limit
    ///
    /// ## Example
    /// ```rust
    /// use lens_core::diopter::Diopter;
    /// use lens_core::grid::BatchGrid;
    ///
    /// let mut grid = BatchGrid::new("P1");
    /// grid.set(Diopter::from_hundredths(-300), Diopter::ZERO, 4).unwrap();
    /// assert_eq!(grid.total_units(), 4);
    ///
    /// assert!(grid.set(Diopter::from_hundredths(-310), Diopter::ZERO, 1).is_err());
    /// ```
    pub fn set(&mut self, spherical: Diopter, cylinder: Diopter, quantity: u32) -> CoreResult<()> {
        validate_grid_power("spherical", spherical)?;
        validate_grid_power("cylinder", cylinder)?;
        within_form("spherical", spherical, STANDARD_MIN_SPHERICAL)?;
        within_form("cylinder", cylinder, STANDARD_MIN_CYLINDER)?;
        validate_quantity(quantity)?;

        let key = (Reverse(spherical), Reverse(cylinder));
        if quantity == 0 {
            self.cells.remove(&key);
        } else {
            self.cells.insert(key, quantity);
        }
        Ok(())
    }

    /// Quantity of a cell (0 when empty).
    pub fn get(&self, spherical: Diopter, cylinder: Diopter) -> u32 {
        self.cells
            .get(&(Reverse(spherical), Reverse(cylinder)))
            .copied()
            .unwrap_or(0)
    }

    /// Non-empty cells in traversal order.
    pub fn cells(&self) -> impl Iterator<Item = GridCell> + '_ {
        self.cells
            .iter()
            .map(|(&(Reverse(spherical), Reverse(cylinder)), &quantity)| GridCell {
                spherical,
                cylinder,
                quantity,
            })
    }

    /// Sum of every cell's quantity.
    pub fn total_units(&self) -> u64 {
        self.cells.values().map(|&q| u64::from(q)).sum()
    }

    /// Number of non-empty cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// One request per non-empty cell, in traversal order.
    pub fn entries(&self) -> Vec<LensRequest> {
        self.cells()
            .map(|cell| {
                LensRequest::new(
                    self.product_name.clone(),
                    cell.spherical,
                    cell.cylinder,
                    cell.quantity,
                )
            })
            .collect()
    }
}

/// Rows and columns of the form run from plano down to `strongest`.
fn within_form(field: &str, power: Diopter, strongest: Diopter) -> ValidationResult<()> {
    if !(strongest..=Diopter::ZERO).contains(&power) {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: format!("{power} is outside the order form ({strongest}..=0.00)"),
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::PowerInput;
    use crate::error::{CoreError, ValidationError};

    fn d(hundredths: i32) -> Diopter {
        Diopter::from_hundredths(hundredths)
    }

    #[test]
    fn test_traversal_is_spherical_then_cylinder_descending() {
        let mut grid = BatchGrid::new("P1");
        grid.set(d(-500), d(-25), 1).unwrap();
        grid.set(d(0), d(-100), 2).unwrap();
        grid.set(d(-500), d(0), 3).unwrap();
        grid.set(d(0), d(0), 4).unwrap();

        let order: Vec<(i32, i32, u32)> = grid
            .cells()
            .map(|c| (c.spherical.hundredths(), c.cylinder.hundredths(), c.quantity))
            .collect();
        assert_eq!(
            order,
            vec![(0, 0, 4), (0, -100, 2), (-500, 0, 3), (-500, -25, 1)]
        );
    }

    #[test]
    fn test_zero_clears_cell() {
        let mut grid = BatchGrid::new("P1");
        grid.set(d(-100), d(0), 5).unwrap();
        assert_eq!(grid.get(d(-100), d(0)), 5);

        grid.set(d(-100), d(0), 0).unwrap();
        assert_eq!(grid.get(d(-100), d(0)), 0);
        assert!(grid.is_empty());
    }

    #[test]
    fn test_off_grid_power_rejected() {
        let mut grid = BatchGrid::new("P1");
        let err = grid.set(d(-100), d(-10), 1).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::NotOnGrid { ref field, .. }) if field == "cylinder"
        ));
        assert!(grid.is_empty());
    }

    #[test]
    fn test_total_units_and_entries() {
        let mut grid = BatchGrid::new("P1");
        grid.set(d(-200), d(-50), 999).unwrap();
        grid.set(d(-200), d(0), 1).unwrap();

        assert_eq!(grid.total_units(), 1000);
        assert_eq!(grid.len(), 2);

        let entries = grid.entries();
        assert_eq!(entries[0].product_name, "P1");
        assert_eq!(entries[0].cylinder, PowerInput::Text("0.00".to_string()));
        assert_eq!(entries[1].spherical, PowerInput::Text("-2.00".to_string()));
        assert_eq!(entries[1].quantity, 999);
    }

    #[test]
    fn test_grid_document_loads_with_validation() {
        let json = r#"{
            "productName": "P1",
            "cells": [
                { "spherical": "-1.00", "cylinder": -0.5, "quantity": 2 },
                { "spherical": 0, "cylinder": "0.00", "quantity": 1 },
                { "spherical": "-1.00", "cylinder": "-0.50", "quantity": 0 }
            ]
        }"#;
        let doc: GridDocument = serde_json::from_str(json).unwrap();
        let grid = doc.into_grid().unwrap();
        assert_eq!(grid.len(), 1);
        assert_eq!(grid.get(Diopter::ZERO, Diopter::ZERO), 1);

        let bad = GridDocument {
            product_name: "P1".to_string(),
            cells: vec![GridCell {
                spherical: d(-110),
                cylinder: d(0),
                quantity: 1,
            }],
        };
        assert!(bad.into_grid().is_err());
    }

    #[test]
    fn test_cells_limited_to_order_form() {
        let mut grid = BatchGrid::new("P1");
        grid.set(d(0), d(0), 1).unwrap();
        grid.set(d(-1100), d(-500), 1).unwrap();

        for (sph, cyl, field) in [(25, 0, "spherical"), (-1125, 0, "spherical"), (0, -525, "cylinder")] {
            let err = grid.set(d(sph), d(cyl), 1).unwrap_err();
            assert!(matches!(
                err,
                CoreError::Validation(ValidationError::InvalidFormat { field: ref f, .. }) if f == field
            ));
        }
        assert_eq!(grid.len(), 2);

        let doc: GridDocument = serde_json::from_str(
            r#"{ "productName": "P1", "cells": [ { "spherical": "+1.00", "cylinder": 0, "quantity": 1 } ] }"#,
        )
        .unwrap();
        assert!(doc.into_grid().is_err());
    }
}
