//! # Label Configuration
//!
//! Where labels point to, which catalog to load and which groups an
//! organization may label.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     LENS_CATALOG_PATH=/srv/labels/catalog.json                         │
//! │     LENS_ALLOWED_GROUPS=group1,group2                                  │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/lens-label/label.toml (Linux)                            │
//! │     ~/Library/Application Support/com.lenslabel.lens-label/label.toml  │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     house URLs, no catalog path, every group allowed                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # label.toml
//! [encoder]
//! full_reference_url = "http://plmsys.aiforoptometry.com/detail"
//! full_reference_param = "serial_number"
//! compact_url = "https://lucasyxc.github.io/jingzhiguanwang/"
//! compact_param = "d"
//!
//! [catalog]
//! path = "/srv/labels/catalog.json"
//! allowed_groups = ["group1"]
//!
//! [product_codes]
//! "Clear 1.60 Aspheric" = "11"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use lens_core::codes::ProductCodeTable;
use lens_core::payload::{
    EncoderSettings, PayloadEncoder, COMPACT_SEPARATOR, DEFAULT_COMPACT_PARAM, DEFAULT_COMPACT_URL,
    DEFAULT_FULL_REFERENCE_PARAM, DEFAULT_FULL_REFERENCE_URL,
};

use crate::error::{AppError, AppResult};

// =============================================================================
// Encoder Section
// =============================================================================

/// Target URLs and query parameter names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncoderSection {
    #[serde(default = "default_full_reference_url")]
    pub full_reference_url: String,

    #[serde(default = "default_full_reference_param")]
    pub full_reference_param: String,

    #[serde(default = "default_compact_url")]
    pub compact_url: String,

    #[serde(default = "default_compact_param")]
    pub compact_param: String,
}

fn default_full_reference_url() -> String {
    DEFAULT_FULL_REFERENCE_URL.to_string()
}

fn default_full_reference_param() -> String {
    DEFAULT_FULL_REFERENCE_PARAM.to_string()
}

fn default_compact_url() -> String {
    DEFAULT_COMPACT_URL.to_string()
}

fn default_compact_param() -> String {
    DEFAULT_COMPACT_PARAM.to_string()
}

impl Default for EncoderSection {
    fn default() -> Self {
        EncoderSection {
            full_reference_url: default_full_reference_url(),
            full_reference_param: default_full_reference_param(),
            compact_url: default_compact_url(),
            compact_param: default_compact_param(),
        }
    }
}

impl From<&EncoderSection> for EncoderSettings {
    fn from(section: &EncoderSection) -> Self {
        EncoderSettings {
            full_reference_url: section.full_reference_url.clone(),
            full_reference_param: section.full_reference_param.clone(),
            compact_url: section.compact_url.clone(),
            compact_param: section.compact_param.clone(),
        }
    }
}

// =============================================================================
// Catalog Section
// =============================================================================

/// Catalog file location and organization-level group filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSection {
    /// Catalog JSON file; `--catalog` on the command line wins.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Group ids this organization may label. Empty means all groups.
    #[serde(default)]
    pub allowed_groups: Vec<String>,
}

// =============================================================================
// Main Label Configuration
// =============================================================================

/// Complete CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelConfig {
    #[serde(default)]
    pub encoder: EncoderSection,

    #[serde(default)]
    pub catalog: CatalogSection,

    /// Extra short codes; these override catalog and built-in codes.
    #[serde(default)]
    pub product_codes: BTreeMap<String, String>,
}

impl LabelConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (label.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> AppResult<Self> {
        Self::load_with_env(config_path, |key| std::env::var(key).ok())
    }

    /// Same as [`LabelConfig::load`] with an explicit environment lookup.
    pub fn load_with_env<F>(config_path: Option<PathBuf>, env: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading label config from file");
                let contents = std::fs::read_to_string(&path)
                    .map_err(|source| AppError::ReadFile { path: path.clone(), source })?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides(env);
        config.validate()?;

        Ok(config)
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> AppResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| AppError::InvalidConfig("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Label config saved");
        Ok(())
    }

    /// Validates the configuration.
    ///
    /// URLs and parameter names are checked by building a throwaway encoder,
    /// so the CLI and the core agree on what is acceptable.
    pub fn validate(&self) -> AppResult<()> {
        PayloadEncoder::new(self.encoder_settings(), ProductCodeTable::new())?;

        for (product, code) in &self.product_codes {
            if code.trim().is_empty() {
                return Err(AppError::InvalidConfig(format!(
                    "product code for '{}' is empty",
                    product
                )));
            }
            if code.contains(COMPACT_SEPARATOR) {
                return Err(AppError::InvalidConfig(format!(
                    "product code '{}' for '{}' contains '{}'",
                    code, product, COMPACT_SEPARATOR
                )));
            }
        }

        if self.catalog.allowed_groups.iter().any(|g| g.trim().is_empty()) {
            return Err(AppError::InvalidConfig(
                "allowed_groups must not contain empty ids".into(),
            ));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides<F>(&mut self, env: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = env("LENS_CATALOG_PATH") {
            debug!(path = %path, "Overriding catalog path from environment");
            self.catalog.path = Some(PathBuf::from(path));
        }

        if let Some(url) = env("LENS_FULL_REFERENCE_URL") {
            debug!(url = %url, "Overriding full-reference URL from environment");
            self.encoder.full_reference_url = url;
        }

        if let Some(url) = env("LENS_COMPACT_URL") {
            debug!(url = %url, "Overriding compact URL from environment");
            self.encoder.compact_url = url;
        }

        if let Some(groups) = env("LENS_ALLOWED_GROUPS") {
            let parsed: Vec<String> = groups
                .split(',')
                .map(str::trim)
                .filter(|g| !g.is_empty())
                .map(String::from)
                .collect();
            if parsed.is_empty() {
                warn!(value = %groups, "LENS_ALLOWED_GROUPS names no groups, ignoring");
            } else {
                self.catalog.allowed_groups = parsed;
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "lenslabel", "lens-label")
            .map(|dirs| dirs.config_dir().join("label.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    pub fn encoder_settings(&self) -> EncoderSettings {
        EncoderSettings::from(&self.encoder)
    }

    /// Built-in codes, then `catalog_codes`, then this config's codes.
    pub fn code_table(&self, catalog_codes: &ProductCodeTable) -> ProductCodeTable {
        let mut table = ProductCodeTable::builtin();
        table.extend(catalog_codes.clone());
        table.extend(
            self.product_codes
                .iter()
                .map(|(name, code)| (name.clone(), code.clone())),
        );
        table
    }
}
