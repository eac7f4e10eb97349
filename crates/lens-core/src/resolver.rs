//! # Parameter Resolver
//!
//! First-match lookup of physical parameters in a product's rule tables.
//!
//! ## Matching Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  rules (declaration order)          request: S -3.00 / C -1.00          │
//! │                                                                         │
//! │  [0] S -6.00..0.00                  ✅ matches → "65mm" returned        │
//! │  [1] S -6.00..0.00, C -2.00..0.00   (never consulted)                   │
//! │  [2] S -20.00..-6.00                                                    │
//! │                                                                         │
//! │  A rule without a cylinder range matches on spherical alone, so it     │
//! │  shadows any later, tighter rule. Table order IS precedence.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! No match is [`Resolution::Unresolved`], never an error or panic.

use crate::diopter::Diopter;
use crate::types::{ProductSpec, RangeRule, Resolution, Thickness};

/// Returns the value of the first rule containing the power pair.
///
/// Both bounds of every range are inclusive.
///
/// ## Example
/// ```rust
/// use lens_core::diopter::Diopter;
/// use lens_core::resolver::resolve;
/// use lens_core::types::{PowerRange, RangeRule, Resolution};
///
/// let rules = vec![
///     RangeRule::new(PowerRange::hundredths(-600, 0), "65mm"),
///     RangeRule::new(PowerRange::hundredths(-2000, -600), "70mm"),
/// ];
///
/// let sph = Diopter::from_hundredths(-300);
/// assert_eq!(resolve(&rules, sph, Diopter::ZERO), Resolution::Resolved(&"65mm"));
///
/// let far = Diopter::from_hundredths(-2500);
/// assert_eq!(resolve(&rules, far, Diopter::ZERO), Resolution::Unresolved);
/// ```
pub fn resolve<V>(rules: &[RangeRule<V>], spherical: Diopter, cylinder: Diopter) -> Resolution<&V> {
    rules
        .iter()
        .find(|rule| rule.matches(spherical, cylinder))
        .map(|rule| &rule.value)
        .into()
}

/// Diameter for a power pair, e.g. `"65mm"`.
pub fn resolve_diameter(spec: &ProductSpec, spherical: Diopter, cylinder: Diopter) -> Resolution<String> {
    resolve(&spec.diameter_rules, spherical, cylinder).map(String::clone)
}

/// Thickness for a power pair, tagged centre or edge.
///
/// The first matching rule decides; if it names both values, centre wins.
pub fn resolve_thickness(
    spec: &ProductSpec,
    spherical: Diopter,
    cylinder: Diopter,
) -> Resolution<Thickness> {
    match resolve(&spec.thickness_rules, spherical, cylinder) {
        Resolution::Resolved(value) => value.to_thickness().into(),
        Resolution::Unresolved => Resolution::Unresolved,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
