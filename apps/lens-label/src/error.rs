//! # CLI Error Types
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       App Error Categories                              │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │     Input       │  │      Core / Output      │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Io             │  │  Core (CoreError)       │ │
//! │  │  ConfigLoad     │  │  ReadFile, Json │  │                         │ │
//! │  │  ConfigSave     │  │  Missing*       │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use thiserror::Error;

use lens_core::CoreError;

/// Result type alias for CLI operations.
pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to parse config: {0}")]
    ConfigLoad(#[from] toml::de::Error),

    #[error("Failed to write config: {0}")]
    ConfigSave(#[from] toml::ser::Error),

    // =========================================================================
    // Input Errors
    // =========================================================================
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No catalog given; pass --catalog or set catalog.path in the config")]
    MissingCatalog,

    #[error("No requests given; pass --requests, --grid or --product")]
    MissingInput,

    // =========================================================================
    // Core / Output Errors
    // =========================================================================
    #[error(transparent)]
    Core(#[from] CoreError),
}
