//! # Product Catalog
//!
//! The product table every request is resolved against.
//!
//! ## Document Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CatalogDocument                                                        │
//! │  ├── groups                                                            │
//! │  │   └── "<group id>"                                                  │
//! │  │       ├── name   (optional display name)                            │
//! │  │       ├── style  full_reference | compact                           │
//! │  │       └── products                                                  │
//! │  │           └── "<product name>" → ProductSpec                        │
//! │  └── productCodes   (optional, extends the built-in code table)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The catalog is validated once at load and is immutable afterwards; a
//! batch borrows it for its whole lifetime.
//!
//! ## Example
//! ```rust
//! use lens_core::catalog::ProductCatalog;
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
//! assert!(catalog.get("P1").is_ok());
//! assert!(catalog.get("Ghost").is_err());
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use crate::codes::ProductCodeTable;
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{LabelStyle, ProductSpec};
use crate::validation::{validate_product_name, validate_range};

// =============================================================================
// Catalog Document (input shape)
// =============================================================================

/// Catalog as it arrives from the outside world.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogDocument {
    #[serde(default)]
    pub groups: BTreeMap<String, GroupDocument>,

    #[serde(default)]
    pub product_codes: ProductCodeTable,
}

/// One product group in a catalog document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupDocument {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub style: LabelStyle,

    #[serde(default)]
    pub products: BTreeMap<String, ProductSpec>,
}

// =============================================================================
// Catalog Entries
// =============================================================================

/// Group-level facts shared by every product in the group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogGroup {
    pub id: String,
    pub name: Option<String>,
    pub style: LabelStyle,
}

impl CatalogGroup {
    pub fn new(id: impl Into<String>, style: LabelStyle) -> Self {
        CatalogGroup {
            id: id.into(),
            name: None,
            style,
        }
    }
}

/// A product together with the group it belongs to.
#[derive(Debug, Clone)]
pub struct ProductEntry {
    pub group: CatalogGroup,
    pub spec: ProductSpec,
}

// =============================================================================
// Product Catalog
// =============================================================================

/// Validated, read-only product table keyed by product name.
#[derive(Debug, Clone, Default)]
pub struct ProductCatalog {
    products: HashMap<String, ProductEntry>,
    codes: ProductCodeTable,
}

impl ProductCatalog {
    /// Creates an empty catalog with an empty code table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses and validates a JSON catalog document.
    pub fn from_json_str(json: &str) -> CoreResult<Self> {
        let document: CatalogDocument = serde_json::from_str(json)?;
        Self::from_document(document)
    }

    /// Validates an already-parsed document.
    ///
    /// ## Errors
    /// - `Validation(Duplicate)` if a product name appears in two groups
    /// - `InvalidCatalog` if a product's `name` disagrees with its key, or a
    ///   thickness rule carries no value
    /// - `Validation(..)` for bad names or inverted ranges
    pub fn from_document(document: CatalogDocument) -> CoreResult<Self> {
        let mut catalog = ProductCatalog {
            products: HashMap::new(),
            codes: document.product_codes,
        };

        for (group_id, group_doc) in document.groups {
            let group = CatalogGroup {
                id: group_id,
                name: group_doc.name,
                style: group_doc.style,
            };

            for (key, mut spec) in group_doc.products {
                if spec.name.is_empty() {
                    spec.name = key;
                } else if spec.name != key {
                    return Err(CoreError::InvalidCatalog(format!(
                        "product keyed '{}' declares name '{}'",
                        key, spec.name
                    )));
                }
                catalog.insert(group.clone(), spec)?;
            }
        }

        debug!(
            products = catalog.products.len(),
            codes = catalog.codes.len(),
            "Catalog loaded"
        );
        Ok(catalog)
    }

    /// Adds one product after validating it.
    pub fn insert(&mut self, group: CatalogGroup, spec: ProductSpec) -> CoreResult<()> {
        validate_spec(&spec)?;

        if let Some(existing) = self.products.get(&spec.name) {
            debug!(
                product = %spec.name,
                group = %existing.group.id,
                "Product already registered"
            );
            return Err(ValidationError::Duplicate {
                field: "product_name".to_string(),
                value: spec.name,
            }
            .into());
        }

        self.products
            .insert(spec.name.clone(), ProductEntry { group, spec });
        Ok(())
    }

    /// Looks up a product by its full name.
    ///
    /// ## Errors
    /// [`CoreError::CatalogMiss`] if the name is unknown.
    pub fn get(&self, product_name: &str) -> CoreResult<&ProductEntry> {
        self.products
            .get(product_name)
            .ok_or_else(|| CoreError::CatalogMiss(product_name.to_string()))
    }

    pub fn contains(&self, product_name: &str) -> bool {
        self.products.contains_key(product_name)
    }

    /// Product names, sorted.
    pub fn product_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.products.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Group ids present in the catalog, sorted and de-duplicated.
    pub fn group_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .products
            .values()
            .map(|entry| entry.group.id.as_str())
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// Product codes declared by the catalog document.
    pub fn codes(&self) -> &ProductCodeTable {
        &self.codes
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// A copy holding only products from the given groups.
    ///
    /// Used to limit an organization to the product lines it may label.
    pub fn restricted_to<S: AsRef<str>>(&self, group_ids: &[S]) -> ProductCatalog {
        let products = self
            .products
            .iter()
            .filter(|(_, entry)| {
                group_ids
                    .iter()
                    .any(|id| id.as_ref() == entry.group.id)
            })
            .map(|(name, entry)| (name.clone(), entry.clone()))
            .collect();

        ProductCatalog {
            products,
            codes: self.codes.clone(),
        }
    }
}

/// Load-time checks for one product.
fn validate_spec(spec: &ProductSpec) -> CoreResult<()> {
    validate_product_name(&spec.name)?;

    for rule in &spec.diameter_rules {
        validate_range("sphericalRange", &rule.spherical_range)?;
        if let Some(range) = &rule.cylinder_range {
            validate_range("cylinderRange", range)?;
        }
    }

    for (index, rule) in spec.thickness_rules.iter().enumerate() {
        validate_range("sphericalRange", &rule.spherical_range)?;
        if let Some(range) = &rule.cylinder_range {
            validate_range("cylinderRange", range)?;
        }
        if rule.value.to_thickness().is_none() {
            return Err(CoreError::InvalidCatalog(format!(
                "{}: thickness rule {} has neither centre nor edge value",
                spec.name, index
            )));
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diopter::Diopter;
    use crate::resolver::resolve_diameter;
    use crate::types::Resolution;

    const DOCUMENT: &str = r#"{
        "groups": {
            "group1": {
                "name": "Classic",
                "products": {
                    "P1": {
                        "opticalIndex": "1.60",
                        "abbeNumber": "42",
                        "grade": "A",
                        "diameterRules": [
                            { "sphericalRange": { "min": -6, "max": 0 }, "value": "65mm" },
                            { "sphericalRange": { "min": -20, "max": -6 }, "value": "70mm" }
                        ],
                        "thicknessRules": [
                            { "sphericalRange": { "min": -20, "max": 0 }, "value": { "ct": "1.2mm" } }
                        ]
                    }
                }
            },
            "group2": {
                "style": "compact",
                "products": {
                    "P2": { "refraction": 1.56, "abbeNumber": 38 }
                }
            }
        },
        "productCodes": { "P2": "C2" }
    }"#;

    #[test]
    fn test_load_document() {
        let catalog = ProductCatalog::from_json_str(DOCUMENT).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.product_names(), vec!["P1", "P2"]);
        assert_eq!(catalog.group_ids(), vec!["group1", "group2"]);

        let p1 = catalog.get("P1").unwrap();
        assert_eq!(p1.group.id, "group1");
        assert_eq!(p1.group.name.as_deref(), Some("Classic"));
        assert_eq!(p1.group.style, LabelStyle::FullReference);
        assert_eq!(p1.spec.name, "P1");
        assert_eq!(p1.spec.diameter_rules.len(), 2);
        assert_eq!(p1.spec.diameter_rules[0].value, "65mm");

        let p2 = catalog.get("P2").unwrap();
        assert_eq!(p2.group.style, LabelStyle::Compact);
        assert_eq!(p2.spec.optical_index, "1.56");
        assert_eq!(catalog.codes().code_for("P2"), "C2");
    }

    #[test]
    fn test_unknown_product_is_catalog_miss() {
        let catalog = ProductCatalog::from_json_str(DOCUMENT).unwrap();
        let err = catalog.get("Ghost").unwrap_err();
        assert!(matches!(err, CoreError::CatalogMiss(ref name) if name == "Ghost"));
    }

    #[test]
    fn test_duplicate_product_across_groups() {
        let json = r#"{ "groups": {
            "a": { "products": { "P1": { "opticalIndex": "1.5", "abbeNumber": "58" } } },
            "b": { "products": { "P1": { "opticalIndex": "1.6", "abbeNumber": "42" } } }
        } }"#;
        let err = ProductCatalog::from_json_str(json).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::Duplicate { .. })
        ));
    }

    #[test]
    fn test_inverted_range_rejected() {
        let json = r#"{ "groups": { "a": { "products": { "P1": {
            "opticalIndex": "1.5", "abbeNumber": "58",
            "diameterRules": [ { "sphericalRange": { "min": 0, "max": -6 }, "value": "65mm" } ]
        } } } } }"#;
        let err = ProductCatalog::from_json_str(json).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_sentinel_and_fractional_bounds_load() {
        let json = r#"{ "groups": { "a": { "products": { "P1": {
            "opticalIndex": "1.5", "abbeNumber": "58",
            "diameterRules": [
                { "sphericalRange": { "min": -6, "max": -0.001 }, "value": "65mm" },
                { "sphericalRange": { "min": -100, "max": 0 }, "value": "70mm" }
            ]
        } } } } }"#;
        let catalog = ProductCatalog::from_json_str(json).unwrap();
        let spec = &catalog.get("P1").unwrap().spec;

        assert_eq!(spec.diameter_rules[1].spherical_range.min, -100.0);
        assert_eq!(
            resolve_diameter(spec, Diopter::ZERO, Diopter::ZERO),
            Resolution::Resolved("70mm".to_string())
        );
        assert_eq!(
            resolve_diameter(spec, Diopter::from_hundredths(-25), Diopter::ZERO),
            Resolution::Resolved("65mm".to_string())
        );
    }

    #[test]
    fn test_empty_thickness_value_rejected() {
        let json = r#"{ "groups": { "a": { "products": { "P1": {
            "opticalIndex": "1.5", "abbeNumber": "58",
            "thicknessRules": [ { "sphericalRange": { "min": -6, "max": 0 }, "value": {} } ]
        } } } } }"#;
        let err = ProductCatalog::from_json_str(json).unwrap_err();
        assert!(matches!(err, CoreError::InvalidCatalog(_)));
    }

    #[test]
    fn test_name_must_match_key() {
        let json = r#"{ "groups": { "a": { "products": { "P1": {
            "name": "P9", "opticalIndex": "1.5", "abbeNumber": "58"
        } } } } }"#;
        let err = ProductCatalog::from_json_str(json).unwrap_err();
        assert!(matches!(err, CoreError::InvalidCatalog(_)));
    }

    #[test]
    fn test_malformed_json() {
        let err = ProductCatalog::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, CoreError::CatalogParse(_)));
    }

    #[test]
    fn test_restricted_to_groups() {
        let catalog = ProductCatalog::from_json_str(DOCUMENT).unwrap();
        let restricted = catalog.restricted_to(&["group2"]);
        assert_eq!(restricted.product_names(), vec!["P2"]);
        assert!(restricted.get("P1").unwrap_err().is_catalog_miss());
        assert_eq!(restricted.codes().code_for("P2"), "C2");
    }

    #[test]
    fn test_insert_programmatically() {
        let mut catalog = ProductCatalog::new();
        catalog
            .insert(
                CatalogGroup::new("group1", LabelStyle::FullReference),
                ProductSpec::new("P1", "1.60", "42"),
            )
            .unwrap();
        assert!(catalog.contains("P1"));
        assert!(catalog
            .insert(
                CatalogGroup::new("group2", LabelStyle::Compact),
                ProductSpec::new("P1", "1.67", "32"),
            )
            .is_err());
    }
}
