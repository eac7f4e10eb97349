//! # Product Codes
//!
//! Hand-maintained mapping from full product name to the short code used in
//! compact payloads. Only the compact label style consults it.
//!
//! Names without an entry fall back to the full product name, which keeps
//! the payload decodable at the cost of its compactness.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Built-in codes for the compact-style product line.
const BUILTIN_CODES: &[(&str, &str)] = &[
    ("优点星1.60点矩阵管理镜片", "1"),
    ("优点星1.60 MR-8PMDT点矩阵管理镜片", "2"),
    ("优点星1.67 PMDT点矩阵管理镜片", "3"),
    ("优点星1.56多效点矩阵管理镜片", "4"),
    ("优点星1.60多效点矩阵管理镜片", "5"),
    ("优赞1.60点矩阵管理镜片", "6"),
    ("优赞1.60 MR-8PMDT点矩阵管理镜片", "7"),
    ("优赞1.67 PMDT点矩阵管理镜片", "8"),
    ("优赞1.56多效点矩阵管理镜片", "9"),
    ("优赞1.60多效点矩阵管理镜片", "10"),
];

/// Product name → short code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductCodeTable(BTreeMap<String, String>);

impl ProductCodeTable {
    /// An empty table (every name falls back to itself).
    pub fn new() -> Self {
        Self::default()
    }

    /// The house table shipped with the crate.
    pub fn builtin() -> Self {
        ProductCodeTable(
            BUILTIN_CODES
                .iter()
                .map(|(name, code)| (name.to_string(), code.to_string()))
                .collect(),
        )
    }

    /// Adds or replaces one code.
    pub fn insert(&mut self, product_name: impl Into<String>, code: impl Into<String>) {
        self.0.insert(product_name.into(), code.into());
    }

    /// Adds or replaces every code from `other`.
    pub fn extend(&mut self, other: impl IntoIterator<Item = (String, String)>) {
        self.0.extend(other);
    }

    /// Code for a product, or the product name itself when unmapped.
    ///
    /// ## Example
    /// ```rust
    /// use lens_core::codes::ProductCodeTable;
    ///
    /// let table = ProductCodeTable::builtin();
    /// assert_eq!(table.code_for("优赞1.60点矩阵管理镜片"), "6");
    /// assert_eq!(table.code_for("Unlisted Lens"), "Unlisted Lens");
    /// ```
    pub fn code_for<'a>(&'a self, product_name: &'a str) -> &'a str {
        self.0
            .get(product_name)
            .map_or(product_name, String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String)> for ProductCodeTable {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        ProductCodeTable(iter.into_iter().collect())
    }
}

impl IntoIterator for ProductCodeTable {
    type Item = (String, String);
    type IntoIter = std::collections::btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
