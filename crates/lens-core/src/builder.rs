//! # Lens Record Builder
//!
//! Turns requests into ordered, fully resolved lens records.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  LensRequest[]                                                          │
//! │      │                                                                  │
//! │      ▼  PHASE 1: prepare every entry (nothing issued yet)              │
//! │  catalog lookup ─► CatalogMiss?            ──► Err, zero serials       │
//! │  parse powers   ─► InvalidNumericInput?    ──► Err, zero serials       │
//! │  check quantity ─► OutOfRange?             ──► Err, zero serials       │
//! │      │                                                                  │
//! │      ▼  PHASE 2: emit (cannot fail)                                    │
//! │  resolve diameter / thickness (Unresolved is kept, not fatal)          │
//! │  one serial per unit from the shared BatchContext                      │
//! │  stamp production date + product attributes                            │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  Vec<LensRecord> in request order                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//! ```rust
//! use lens_core::builder::{LensRecordBuilder, LensRequest};
//! use lens_core::catalog::{CatalogGroup, ProductCatalog};
//! use lens_core::serial::BatchContext;
//! use lens_core::types::{LabelStyle, PowerRange, ProductSpec, RangeRule};
//!
//! let mut catalog = ProductCatalog::new();
//! catalog.insert(
//!     CatalogGroup::new("group1", LabelStyle::FullReference),
//!     ProductSpec::new("P1", "1.60", "42")
//!         .diameter_rule(RangeRule::new(PowerRange::hundredths(-600, 0), "65mm".to_string())),
//! ).unwrap();
//!
//! let builder = LensRecordBuilder::new(&catalog);
//! let mut batch = BatchContext::new();
//! let records = builder
//!     .build(&LensRequest::new("P1", "-3.00", "0.00", 2), &mut batch)
//!     .unwrap();
//!
//! assert_eq!(records.len(), 2);
//! assert_eq!(records[1].serial_number, format!("{}-2", batch.prefix()));
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::catalog::{ProductCatalog, ProductEntry};
use crate::diopter::Diopter;
use crate::error::{CoreError, CoreResult};
use crate::grid::BatchGrid;
use crate::resolver::{resolve_diameter, resolve_thickness};
use crate::serial::BatchContext;
use crate::types::LensRecord;
use crate::validation::validate_quantity;

// =============================================================================
// Requests
// =============================================================================

/// A power as it arrives from a form, a spreadsheet cell or JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PowerInput {
    Number(f64),
    Text(String),
}

impl PowerInput {
    /// Validates and converts to a two-decimal power.
    pub fn to_diopter(&self, field: &str) -> CoreResult<Diopter> {
        match self {
            PowerInput::Number(value) => Diopter::from_f64(field, *value),
            PowerInput::Text(text) => Diopter::parse(field, text),
        }
    }
}

impl From<f64> for PowerInput {
    fn from(value: f64) -> Self {
        PowerInput::Number(value)
    }
}

impl From<&str> for PowerInput {
    fn from(value: &str) -> Self {
        PowerInput::Text(value.to_string())
    }
}

impl From<String> for PowerInput {
    fn from(value: String) -> Self {
        PowerInput::Text(value)
    }
}

impl From<Diopter> for PowerInput {
    fn from(value: Diopter) -> Self {
        PowerInput::Text(value.to_string())
    }
}

/// One (product, spherical, cylinder, quantity) request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LensRequest {
    pub product_name: String,
    pub spherical: PowerInput,
    pub cylinder: PowerInput,
    pub quantity: u32,
}

impl LensRequest {
    pub fn new(
        product_name: impl Into<String>,
        spherical: impl Into<PowerInput>,
        cylinder: impl Into<PowerInput>,
        quantity: u32,
    ) -> Self {
        LensRequest {
            product_name: product_name.into(),
            spherical: spherical.into(),
            cylinder: cylinder.into(),
            quantity,
        }
    }
}

/// A request that passed every check.
struct PreparedEntry<'a> {
    product: &'a ProductEntry,
    spherical: Diopter,
    cylinder: Diopter,
    quantity: u32,
}

// =============================================================================
// Builder
// =============================================================================

/// Builds lens records against a borrowed catalog.
#[derive(Debug, Clone, Copy)]
pub struct LensRecordBuilder<'a> {
    catalog: &'a ProductCatalog,
}

impl<'a> LensRecordBuilder<'a> {
    pub fn new(catalog: &'a ProductCatalog) -> Self {
        LensRecordBuilder { catalog }
    }

    /// Builds `request.quantity` records, issuing serials from `context`.
    ///
    /// ## Errors
    /// - `CatalogMiss` for an unknown product
    /// - `InvalidNumericInput` / `Validation` for bad powers or quantity
    ///
    /// On error no serial has been taken from `context`.
    pub fn build(
        &self,
        request: &LensRequest,
        context: &mut BatchContext,
    ) -> CoreResult<Vec<LensRecord>> {
        let prepared = self.prepare(request)?;
        let mut records = Vec::with_capacity(prepared.quantity as usize);
        emit(&prepared, context, &mut records);
        Ok(records)
    }

    /// Builds every entry under one fresh batch.
    pub fn build_batch(&self, entries: &[LensRequest]) -> CoreResult<Vec<LensRecord>> {
        let mut context = BatchContext::new();
        self.build_batch_in(entries, &mut context)
    }

    /// Builds every entry, threading one shared `context` through all of them.
    ///
    /// The batch is atomic: if any entry is invalid, the error names its
    /// index and nothing is issued.
    pub fn build_batch_in(
        &self,
        entries: &[LensRequest],
        context: &mut BatchContext,
    ) -> CoreResult<Vec<LensRecord>> {
        let prepared = entries
            .iter()
            .enumerate()
            .map(|(index, request)| {
                self.prepare(request).map_err(|source| CoreError::InvalidEntry {
                    index,
                    source: Box::new(source),
                })
            })
            .collect::<CoreResult<Vec<_>>>()?;

        let units: usize = prepared.iter().map(|entry| entry.quantity as usize).sum();
        info!(
            batch_id = %context.batch_id(),
            prefix = context.prefix(),
            entries = prepared.len(),
            units,
            "Building lens batch"
        );

        let mut records = Vec::with_capacity(units);
        for entry in &prepared {
            emit(entry, context, &mut records);
        }

        let needs_review = records.iter().filter(|r| r.needs_review()).count();
        info!(
            batch_id = %context.batch_id(),
            records = records.len(),
            needs_review,
            "Lens batch built"
        );
        Ok(records)
    }

    /// Builds every non-empty cell of a grid under one fresh batch.
    pub fn build_grid(&self, grid: &BatchGrid) -> CoreResult<Vec<LensRecord>> {
        self.build_batch(&grid.entries())
    }

    /// Builds every non-empty cell of a grid in traversal order.
    pub fn build_grid_in(
        &self,
        grid: &BatchGrid,
        context: &mut BatchContext,
    ) -> CoreResult<Vec<LensRecord>> {
        self.build_batch_in(&grid.entries(), context)
    }

    fn prepare(&self, request: &LensRequest) -> CoreResult<PreparedEntry<'a>> {
        let product = self.catalog.get(&request.product_name)?;
        let spherical = request.spherical.to_diopter("spherical")?;
        let cylinder = request.cylinder.to_diopter("cylinder")?;
        validate_quantity(request.quantity)?;

        Ok(PreparedEntry {
            product,
            spherical,
            cylinder,
            quantity: request.quantity,
        })
    }
}

/// Appends one record per unit. Cannot fail.
fn emit(entry: &PreparedEntry<'_>, context: &mut BatchContext, out: &mut Vec<LensRecord>) {
    let spec = &entry.product.spec;
    let diameter = resolve_diameter(spec, entry.spherical, entry.cylinder);
    let thickness = resolve_thickness(spec, entry.spherical, entry.cylinder);

    debug!(
        product = %spec.name,
        spherical = %entry.spherical,
        cylinder = %entry.cylinder,
        quantity = entry.quantity,
        "Emitting entry"
    );
    if !diameter.is_resolved() {
        warn!(
            product = %spec.name,
            spherical = %entry.spherical,
            cylinder = %entry.cylinder,
            "No diameter rule matched"
        );
    }
    if !thickness.is_resolved() {
        warn!(
            product = %spec.name,
            spherical = %entry.spherical,
            cylinder = %entry.cylinder,
            "No thickness rule matched"
        );
    }

    let production_date = context.production_date();
    for _ in 0..entry.quantity {
        out.push(LensRecord {
            serial_number: context.next_serial(),
            product_name: spec.name.clone(),
            spherical: entry.spherical,
            cylinder: entry.cylinder,
            diameter: diameter.clone(),
            thickness: thickness.clone(),
            optical_index: spec.optical_index.clone(),
            abbe_number: spec.abbe_number.clone(),
            transmittance: spec.transmittance.clone(),
            coating: spec.coating.clone(),
            standard: spec.standard.clone(),
            brand: spec.brand.clone(),
            series: spec.series.clone(),
            grade: spec.grade.clone(),
            production_date,
            group_id: entry.product.group.id.clone(),
            style: entry.product.group.style,
        });
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogGroup;
    use crate::error::ValidationError;
    use crate::types::{
        LabelStyle, Parameter, PowerRange, ProductSpec, RangeRule, Resolution, Thickness,
        ThicknessSpec,
    };
    use chrono::{TimeZone, Utc};
    use std::collections::HashSet;

    fn catalog() -> ProductCatalog {
        let mut catalog = ProductCatalog::new();
        catalog
            .insert(
                CatalogGroup::new("group1", LabelStyle::FullReference),
                ProductSpec {
                    grade: Some("A".to_string()),
                    coating: Some("HMC".to_string()),
                    ..ProductSpec::new("P1", "1.60", "42")
                }
                .diameter_rule(RangeRule::new(PowerRange::hundredths(-600, 0), "65mm".to_string()))
                .diameter_rule(RangeRule::new(
                    PowerRange::hundredths(-2000, -600),
                    "70mm".to_string(),
                ))
                .thickness_rule(RangeRule::new(
                    PowerRange::hundredths(-600, 0),
                    ThicknessSpec::centre("1.2mm"),
                )),
            )
            .unwrap();
        catalog
            .insert(
                CatalogGroup::new("group2", LabelStyle::Compact),
                ProductSpec::new("P2", "1.56", "38").diameter_rule(
                    RangeRule::new(PowerRange::hundredths(-1000, 0), "72mm".to_string())
                        .with_cylinder(PowerRange::hundredths(-200, 0)),
                ),
            )
            .unwrap();
        catalog
    }

    fn batch() -> BatchContext {
        BatchContext::at(Utc.with_ymd_and_hms(2026, 10, 16, 8, 30, 15).unwrap())
    }

    #[test]
    fn test_end_to_end_two_units() {
        let catalog = catalog();
        let builder = LensRecordBuilder::new(&catalog);
        let mut ctx = batch();

        let records = builder
            .build(&LensRequest::new("P1", -3.0, 0.0, 2), &mut ctx)
            .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].serial_number, "20261016083015-1");
        assert_eq!(records[1].serial_number, "20261016083015-2");
        for r in &records {
            assert_eq!(r.diameter, Resolution::Resolved("65mm".to_string()));
            assert_eq!(r.thickness, Resolution::Resolved(Thickness::Centre("1.2mm".to_string())));
            assert_eq!(r.spherical.to_string(), "-3.00");
            assert_eq!(r.cylinder.to_string(), "0.00");
            assert_eq!(r.group_id, "group1");
            assert_eq!(r.style, LabelStyle::FullReference);
            assert_eq!(r.grade.as_deref(), Some("A"));
            assert_eq!(r.coating.as_deref(), Some("HMC"));
            assert_eq!(r.production_date_compact(), "20261016");
        }
    }

    #[test]
    fn test_unknown_product_issues_nothing() {
        let catalog = catalog();
        let builder = LensRecordBuilder::new(&catalog);
        let mut ctx = batch();

        let err = builder
            .build(&LensRequest::new("Ghost", "-1.00", "0.00", 3), &mut ctx)
            .unwrap_err();
        assert!(matches!(err, CoreError::CatalogMiss(ref name) if name == "Ghost"));
        assert_eq!(ctx.issued(), 0);
    }

    #[test]
    fn test_invalid_power_is_rejected_before_resolution() {
        let catalog = catalog();
        let builder = LensRecordBuilder::new(&catalog);
        let mut ctx = batch();

        let err = builder
            .build(&LensRequest::new("P1", "-3.00", "abc", 1), &mut ctx)
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::InvalidNumericInput { ref field, .. } if field == "cylinder"
        ));
        assert_eq!(ctx.issued(), 0);
    }

    #[test]
    fn test_quantity_limits() {
        let catalog = catalog();
        let builder = LensRecordBuilder::new(&catalog);
        let mut ctx = batch();

        let none = builder
            .build(&LensRequest::new("P1", "-3.00", "0", 0), &mut ctx)
            .unwrap();
        assert!(none.is_empty());
        assert_eq!(ctx.issued(), 0);

        let err = builder
            .build(&LensRequest::new("P1", "-3.00", "0", 1000), &mut ctx)
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_unresolved_parameters_do_not_abort() {
        let catalog = catalog();
        let builder = LensRecordBuilder::new(&catalog);
        let mut ctx = batch();

        let records = builder
            .build(&LensRequest::new("P1", "-25.00", "0.00", 1), &mut ctx)
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].diameter, Resolution::Unresolved);
        assert_eq!(records[0].thickness, Resolution::Unresolved);
        assert!(records[0].needs_review());
        assert_eq!(
            records[0].unresolved_parameters(),
            vec![Parameter::Diameter, Parameter::Thickness]
        );

        let records = builder
            .build(&LensRequest::new("P1", "-8.00", "0.00", 1), &mut ctx)
            .unwrap();
        assert_eq!(records[0].diameter, Resolution::Resolved("70mm".to_string()));
        assert_eq!(records[0].unresolved_parameters(), vec![Parameter::Thickness]);
    }

    #[test]
    fn test_shared_context_across_calls() {
        let catalog = catalog();
        let builder = LensRecordBuilder::new(&catalog);
        let mut ctx = batch();

        let first = builder
            .build(&LensRequest::new("P1", "-1.00", "0", 2), &mut ctx)
            .unwrap();
        let second = builder
            .build(&LensRequest::new("P2", "-1.00", "-0.50", 1), &mut ctx)
            .unwrap();

        assert_eq!(first[1].serial_number, "20261016083015-2");
        assert_eq!(second[0].serial_number, "20261016083015-3");
        assert_eq!(second[0].style, LabelStyle::Compact);
    }

    #[test]
    fn test_batch_indices_run_one_to_n() {
        let catalog = catalog();
        let builder = LensRecordBuilder::new(&catalog);
        let mut ctx = batch();

        let entries = vec![
            LensRequest::new("P1", "-1.00", "0.00", 3),
            LensRequest::new("P2", "-2.00", "-0.25", 0),
            LensRequest::new("P2", "-2.00", "-0.50", 4),
            LensRequest::new("P1", "-7.00", "0.00", 2),
        ];
        let records = builder.build_batch_in(&entries, &mut ctx).unwrap();

        assert_eq!(records.len(), 9);
        let serials: HashSet<&str> = records.iter().map(|r| r.serial_number.as_str()).collect();
        assert_eq!(serials.len(), 9);
        for (i, r) in records.iter().enumerate() {
            assert_eq!(r.serial_number, format!("20261016083015-{}", i + 1));
        }
        assert_eq!(records[3].product_name, "P2");
        assert_eq!(records[3].cylinder.to_string(), "-0.50");
        assert_eq!(records[8].diameter, Resolution::Resolved("70mm".to_string()));
    }

    #[test]
    fn test_batch_is_atomic() {
        let catalog = catalog();
        let builder = LensRecordBuilder::new(&catalog);
        let mut ctx = batch();

        let entries = vec![
            LensRequest::new("P1", "-1.00", "0.00", 3),
            LensRequest::new("Ghost", "-1.00", "0.00", 1),
        ];
        let err = builder.build_batch_in(&entries, &mut ctx).unwrap_err();

        assert!(matches!(err, CoreError::InvalidEntry { index: 1, .. }));
        assert!(err.is_catalog_miss());
        assert_eq!(ctx.issued(), 0);
    }

    #[test]
    fn test_build_batch_uses_fresh_context() {
        let catalog = catalog();
        let builder = LensRecordBuilder::new(&catalog);

        let records = builder
            .build_batch(&[LensRequest::new("P1", "-1.00", "0.00", 2)])
            .unwrap();
        assert!(records[0].serial_number.ends_with("-1"));
        assert!(records[1].serial_number.ends_with("-2"));
    }

    #[test]
    fn test_build_grid_in_traversal_order() {
        let catalog = catalog();
        let builder = LensRecordBuilder::new(&catalog);
        let mut ctx = batch();

        let mut grid = BatchGrid::new("P2");
        grid.set(Diopter::from_hundredths(-100), Diopter::from_hundredths(-50), 1).unwrap();
        grid.set(Diopter::ZERO, Diopter::from_hundredths(-25), 2).unwrap();
        grid.set(Diopter::ZERO, Diopter::ZERO, 1).unwrap();

        let records = builder.build_grid_in(&grid, &mut ctx).unwrap();
        let cells: Vec<(String, String, &str)> = records
            .iter()
            .map(|r| (r.spherical.to_string(), r.cylinder.to_string(), r.serial_number.as_str()))
            .collect();

        assert_eq!(
            cells,
            vec![
                ("0.00".to_string(), "0.00".to_string(), "20261016083015-1"),
                ("0.00".to_string(), "-0.25".to_string(), "20261016083015-2"),
                ("0.00".to_string(), "-0.25".to_string(), "20261016083015-3"),
                ("-1.00".to_string(), "-0.50".to_string(), "20261016083015-4"),
            ]
        );
    }

    #[test]
    fn test_request_deserializes_numbers_and_strings() {
        let json = r#"[
            { "product_name": "P1", "spherical": -3, "cylinder": "0.00", "quantity": 1 },
            { "product_name": "P1", "spherical": "-3.00", "cylinder": 0, "quantity": 1 }
        ]"#;
        let requests: Vec<LensRequest> = serde_json::from_str(json).unwrap();
        let catalog = catalog();
        let records = LensRecordBuilder::new(&catalog)
            .build_batch_in(&requests, &mut batch())
            .unwrap();
        assert_eq!(records[0].spherical, records[1].spherical);
        assert_eq!(records[0].cylinder, records[1].cylinder);
    }
}
