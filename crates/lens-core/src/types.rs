//! # Domain Types
//!
//! Core domain types used throughout Lens Label.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  ProductSpec    │   │  RangeRule<V>   │   │   LensRecord    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  name           │──►│  sphericalRange │   │  serial_number  │       │
//! │  │  optical_index  │   │  cylinderRange? │   │  spherical      │       │
//! │  │  diameter_rules │   │  value: V       │   │  diameter       │       │
//! │  │  thickness_rules│   └─────────────────┘   │  thickness      │       │
//! │  └─────────────────┘                         └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  Resolution<T>  │   │   Thickness     │   │   LabelStyle    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  Resolved(T)    │   │  Centre(v)      │   │  FullReference  │       │
//! │  │  Unresolved     │   │  Edge(v)        │   │  Compact        │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rule lists are `Vec`s: their order is the matching precedence.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use ts_rs::TS;

use crate::diopter::Diopter;

// =============================================================================
// Power Range
// =============================================================================

/// Inclusive power interval `[min, max]`.
///
/// Bounds hold the catalog's values exactly as written. They are neither
/// capped at the request limit nor rounded to hundredths, so a sentinel such
/// as `-100` loads and a bound of `-0.001` still excludes plano.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PowerRange {
    pub min: f64,
    pub max: f64,
}

impl PowerRange {
    /// Creates a range from two powers.
    #[inline]
    pub fn new(min: Diopter, max: Diopter) -> Self {
        PowerRange {
            min: min.as_f64(),
            max: max.as_f64(),
        }
    }

    /// Shorthand for ranges written in hundredths (used heavily in tests).
    #[inline]
    pub fn hundredths(min: i32, max: i32) -> Self {
        PowerRange::new(Diopter::from_hundredths(min), Diopter::from_hundredths(max))
    }

    /// Inclusive on both ends.
    #[inline]
    pub fn contains(&self, power: Diopter) -> bool {
        let power = power.as_f64();
        self.min <= power && power <= self.max
    }

    /// A range is well-formed when `min <= max`.
    #[inline]
    pub fn is_well_formed(&self) -> bool {
        self.min <= self.max
    }
}

/// Accepts numbers or numeric strings for either bound; any finite value.
impl<'de> Deserialize<'de> for PowerRange {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Bound {
            Number(f64),
            Text(String),
        }

        #[derive(Deserialize)]
        struct Raw {
            min: Bound,
            max: Bound,
        }

        fn finite<E: serde::de::Error>(name: &str, bound: Bound) -> Result<f64, E> {
            let value = match bound {
                Bound::Number(value) => value,
                Bound::Text(text) => text
                    .trim()
                    .parse()
                    .map_err(|_| E::custom(format!("range {name} {text:?} is not a number")))?,
            };
            if !value.is_finite() {
                return Err(E::custom(format!("range {name} must be finite")));
            }
            Ok(value)
        }

        let raw = Raw::deserialize(deserializer)?;
        Ok(PowerRange {
            min: finite("min", raw.min)?,
            max: finite("max", raw.max)?,
        })
    }
}

// =============================================================================
// Range Rule
// =============================================================================

/// One row of a product's diameter or thickness table.
///
/// ## Document Shape
/// ```json
/// { "sphericalRange": { "min": -6, "max": 0 },
///   "cylinderRange": { "min": -2, "max": 0 },
///   "value": "65mm" }
/// ```
/// `cylinderRange` is optional; without it the rule matches on spherical alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeRule<V> {
    #[serde(alias = "powerRange")]
    pub spherical_range: PowerRange,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cylinder_range: Option<PowerRange>,

    pub value: V,
}

impl<V> RangeRule<V> {
    /// Creates a spherical-only rule.
    pub fn new(spherical_range: PowerRange, value: V) -> Self {
        RangeRule {
            spherical_range,
            cylinder_range: None,
            value,
        }
    }

    /// Restricts the rule to a cylinder range.
    pub fn with_cylinder(mut self, cylinder_range: PowerRange) -> Self {
        self.cylinder_range = Some(cylinder_range);
        self
    }

    /// True when the power pair falls inside this rule.
    pub fn matches(&self, spherical: Diopter, cylinder: Diopter) -> bool {
        self.spherical_range.contains(spherical)
            && self
                .cylinder_range
                .map_or(true, |range| range.contains(cylinder))
    }
}

// =============================================================================
// Thickness
// =============================================================================

/// Thickness value as written in a catalog rule.
///
/// The document may nominally carry both; resolution keeps centre only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThicknessSpec {
    #[serde(default, alias = "ct", alias = "center", skip_serializing_if = "Option::is_none")]
    pub centre: Option<String>,

    #[serde(default, alias = "et", skip_serializing_if = "Option::is_none")]
    pub edge: Option<String>,
}

impl ThicknessSpec {
    /// A centre-thickness rule value.
    pub fn centre(value: impl Into<String>) -> Self {
        ThicknessSpec {
            centre: Some(value.into()),
            edge: None,
        }
    }

    /// An edge-thickness rule value.
    pub fn edge(value: impl Into<String>) -> Self {
        ThicknessSpec {
            centre: None,
            edge: Some(value.into()),
        }
    }

    /// Collapses to exactly one variant, centre first. Blank values count
    /// as absent.
    pub fn to_thickness(&self) -> Option<Thickness> {
        let present = |value: &Option<String>| {
            value
                .as_deref()
                .filter(|v| !v.trim().is_empty())
                .map(str::to_string)
        };

        match (present(&self.centre), present(&self.edge)) {
            (Some(centre), _) => Some(Thickness::Centre(centre)),
            (None, Some(edge)) => Some(Thickness::Edge(edge)),
            (None, None) => None,
        }
    }
}

/// Resolved thickness of one lens: centre or edge, never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Thickness {
    /// Centre thickness (CT).
    Centre(String),
    /// Edge thickness (ET).
    Edge(String),
}

impl Thickness {
    /// The raw value, e.g. `"2.0±0.3mm"`.
    pub fn value(&self) -> &str {
        match self {
            Thickness::Centre(value) | Thickness::Edge(value) => value,
        }
    }

    /// Label text: `CT: <value>` or `ET: <value>`.
    pub fn label(&self) -> String {
        match self {
            Thickness::Centre(value) => format!("CT: {value}"),
            Thickness::Edge(value) => format!("ET: {value}"),
        }
    }
}

// =============================================================================
// Resolution
// =============================================================================

/// Outcome of a rule lookup.
///
/// `Unresolved` is a value, not an error: it travels on the record so the
/// caller can flag it for manual review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Resolution<T> {
    Resolved(T),
    Unresolved,
}

impl<T> Resolution<T> {
    /// Checks if a rule matched.
    #[inline]
    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Resolved(_))
    }

    /// Borrows the resolved value, if any.
    pub fn as_option(&self) -> Option<&T> {
        match self {
            Resolution::Resolved(value) => Some(value),
            Resolution::Unresolved => None,
        }
    }

    /// Maps the resolved value.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Resolution<U> {
        match self {
            Resolution::Resolved(value) => Resolution::Resolved(f(value)),
            Resolution::Unresolved => Resolution::Unresolved,
        }
    }
}

impl<T> From<Option<T>> for Resolution<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Resolution::Unresolved, Resolution::Resolved)
    }
}

/// A physical parameter looked up from the rule tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Parameter {
    Diameter,
    Thickness,
}

// =============================================================================
// Label Style
// =============================================================================

/// How a record's printed code is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum LabelStyle {
    /// URL carrying only the serial number; the remote store knows the rest.
    #[default]
    FullReference,
    /// Self-describing `code|sph|cyl|serial` payload on a fixed URL.
    Compact,
}

// =============================================================================
// Product Specification
// =============================================================================

/// Fixed attributes and rule tables for one product.
///
/// Attribute values are display text; the catalog document may give them as
/// numbers (`"opticalIndex": 1.6`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSpec {
    /// Full product name; filled from the catalog key when omitted.
    #[serde(default)]
    pub name: String,

    #[serde(default, deserialize_with = "text::optional")]
    pub brand: Option<String>,

    #[serde(default, deserialize_with = "text::optional")]
    pub series: Option<String>,

    #[serde(alias = "refraction", deserialize_with = "text::required")]
    pub optical_index: String,

    #[serde(deserialize_with = "text::required")]
    pub abbe_number: String,

    #[serde(default, deserialize_with = "text::optional")]
    pub transmittance: Option<String>,

    #[serde(default, deserialize_with = "text::optional")]
    pub coating: Option<String>,

    #[serde(default, deserialize_with = "text::optional")]
    pub standard: Option<String>,

    /// Quality grade printed on full-reference labels.
    #[serde(default, deserialize_with = "text::optional")]
    pub grade: Option<String>,

    #[serde(default)]
    pub diameter_rules: Vec<RangeRule<String>>,

    #[serde(default)]
    pub thickness_rules: Vec<RangeRule<ThicknessSpec>>,
}

impl ProductSpec {
    /// Creates a spec with no optional attributes and empty rule tables.
    pub fn new(
        name: impl Into<String>,
        optical_index: impl Into<String>,
        abbe_number: impl Into<String>,
    ) -> Self {
        ProductSpec {
            name: name.into(),
            brand: None,
            series: None,
            optical_index: optical_index.into(),
            abbe_number: abbe_number.into(),
            transmittance: None,
            coating: None,
            standard: None,
            grade: None,
            diameter_rules: Vec::new(),
            thickness_rules: Vec::new(),
        }
    }

    /// Appends a diameter rule (lowest precedence so far).
    pub fn diameter_rule(mut self, rule: RangeRule<String>) -> Self {
        self.diameter_rules.push(rule);
        self
    }

    /// Appends a thickness rule (lowest precedence so far).
    pub fn thickness_rule(mut self, rule: RangeRule<ThicknessSpec>) -> Self {
        self.thickness_rules.push(rule);
        self
    }
}

/// Accepts strings or numbers for display attributes.
mod text {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TextOrNumber {
        Text(String),
        Number(serde_json::Number),
    }

    impl From<TextOrNumber> for String {
        fn from(value: TextOrNumber) -> Self {
            match value {
                TextOrNumber::Text(text) => text,
                TextOrNumber::Number(number) => number.to_string(),
            }
        }
    }

    pub fn required<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        TextOrNumber::deserialize(deserializer).map(String::from)
    }

    pub fn optional<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<String>, D::Error> {
        Option::<TextOrNumber>::deserialize(deserializer).map(|value| value.map(String::from))
    }
}

// =============================================================================
// Lens Record
// =============================================================================

/// One fully resolved lens unit, ready for labelling.
///
/// Snapshot pattern: product attributes are copied in at build time and the
/// record is never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LensRecord {
    /// `{batch prefix}-{index}`, unique within its batch.
    pub serial_number: String,
    pub product_name: String,
    #[ts(as = "String")]
    pub spherical: Diopter,
    #[ts(as = "String")]
    pub cylinder: Diopter,
    pub diameter: Resolution<String>,
    pub thickness: Resolution<Thickness>,
    pub optical_index: String,
    pub abbe_number: String,
    pub transmittance: Option<String>,
    pub coating: Option<String>,
    pub standard: Option<String>,
    pub brand: Option<String>,
    pub series: Option<String>,
    pub grade: Option<String>,
    #[ts(as = "String")]
    pub production_date: NaiveDate,
    /// Catalog group the product came from.
    pub group_id: String,
    pub style: LabelStyle,
}

impl LensRecord {
    /// Parameters no rule matched, in table order.
    pub fn unresolved_parameters(&self) -> Vec<Parameter> {
        let mut missing = Vec::new();
        if !self.diameter.is_resolved() {
            missing.push(Parameter::Diameter);
        }
        if !self.thickness.is_resolved() {
            missing.push(Parameter::Thickness);
        }
        missing
    }

    /// True when the record must be checked by hand before printing.
    pub fn needs_review(&self) -> bool {
        !self.diameter.is_resolved() || !self.thickness.is_resolved()
    }

    /// Production date as printed on the label (`YYYYMMDD`).
    pub fn production_date_compact(&self) -> String {
        self.production_date.format("%Y%m%d").to_string()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_is_inclusive() {
        let range = PowerRange::hundredths(-600, 0);
        assert!(range.contains(Diopter::from_hundredths(-600)));
        assert!(range.contains(Diopter::from_hundredths(0)));
        assert!(!range.contains(Diopter::from_hundredths(25)));
        assert!(!range.contains(Diopter::from_hundredths(-625)));
    }

    #[test]
    fn test_range_bounds_are_not_rounded() {
        let range: PowerRange = serde_json::from_str(r#"{ "min": -6, "max": -0.001 }"#).unwrap();
        assert!(!range.contains(Diopter::ZERO));
        assert!(range.contains(Diopter::from_hundredths(-1)));
        assert!(range.contains(Diopter::from_hundredths(-600)));

        let range: PowerRange = serde_json::from_str(r#"{ "min": "-0.29", "max": "0" }"#).unwrap();
        assert!(range.contains(Diopter::from_hundredths(-29)));
        assert!(!range.contains(Diopter::from_hundredths(-30)));
    }

    #[test]
    fn test_range_bounds_accept_wide_sentinels() {
        let range: PowerRange = serde_json::from_str(r#"{ "min": -100, "max": 0 }"#).unwrap();
        assert_eq!(range.min, -100.0);
        assert!(range.contains(Diopter::from_hundredths(-9_999)));

        assert!(serde_json::from_str::<PowerRange>(r#"{ "min": "abc", "max": 0 }"#).is_err());
        assert!(serde_json::from_str::<PowerRange>(r#"{ "min": "-inf", "max": 0 }"#).is_err());
    }

    #[test]
    fn test_rule_without_cylinder_ignores_cylinder() {
        let rule = RangeRule::new(PowerRange::hundredths(-600, 0), "65mm");
        assert!(rule.matches(Diopter::from_hundredths(-300), Diopter::from_hundredths(-600)));

        let rule = rule.with_cylinder(PowerRange::hundredths(-200, 0));
        assert!(!rule.matches(Diopter::from_hundredths(-300), Diopter::from_hundredths(-600)));
        assert!(rule.matches(Diopter::from_hundredths(-300), Diopter::from_hundredths(-200)));
    }

    #[test]
    fn test_thickness_centre_priority() {
        let both = ThicknessSpec {
            centre: Some("1.2mm".to_string()),
            edge: Some("5.0mm".to_string()),
        };
        assert_eq!(both.to_thickness(), Some(Thickness::Centre("1.2mm".to_string())));
        assert_eq!(
            ThicknessSpec::edge("5.0mm").to_thickness(),
            Some(Thickness::Edge("5.0mm".to_string()))
        );
        assert_eq!(ThicknessSpec::default().to_thickness(), None);
    }

    #[test]
    fn test_blank_centre_falls_through_to_edge() {
        let spec: ThicknessSpec = serde_json::from_str(r#"{"ct": "", "et": "4.5mm"}"#).unwrap();
        assert_eq!(spec.to_thickness(), Some(Thickness::Edge("4.5mm".to_string())));

        let blank = ThicknessSpec {
            centre: Some(" ".to_string()),
            edge: Some(String::new()),
        };
        assert_eq!(blank.to_thickness(), None);
    }

    #[test]
    fn test_thickness_spec_accepts_short_keys() {
        let spec: ThicknessSpec = serde_json::from_str(r#"{"et": "4.5mm"}"#).unwrap();
        assert_eq!(spec, ThicknessSpec::edge("4.5mm"));
    }

    #[test]
    fn test_rule_document_shape() {
        let json = r#"{
            "powerRange": { "min": -6, "max": 0 },
            "cylinderRange": { "min": -2, "max": 0 },
            "value": "65mm"
        }"#;
        let rule: RangeRule<String> = serde_json::from_str(json).unwrap();
        assert_eq!(rule.spherical_range, PowerRange::hundredths(-600, 0));
        assert_eq!(rule.cylinder_range, Some(PowerRange::hundredths(-200, 0)));
        assert_eq!(rule.value, "65mm");
    }

    #[test]
    fn test_product_spec_numeric_attributes() {
        let json = r#"{ "refraction": 1.6, "abbeNumber": 42, "coating": "HMC" }"#;
        let spec: ProductSpec = serde_json::from_str(json).unwrap();
        assert_eq!(spec.optical_index, "1.6");
        assert_eq!(spec.abbe_number, "42");
        assert_eq!(spec.coating.as_deref(), Some("HMC"));
        assert!(spec.diameter_rules.is_empty());
    }

    #[test]
    fn test_resolution_serializes_explicit_marker() {
        let resolved: Resolution<String> = Resolution::Resolved("65mm".to_string());
        let unresolved: Resolution<String> = Resolution::Unresolved;
        assert_eq!(
            serde_json::to_string(&resolved).unwrap(),
            r#"{"status":"resolved","value":"65mm"}"#
        );
        assert_eq!(
            serde_json::to_string(&unresolved).unwrap(),
            r#"{"status":"unresolved"}"#
        );
    }

    #[test]
    fn test_label_style_default() {
        assert_eq!(LabelStyle::default(), LabelStyle::FullReference);
    }
}
