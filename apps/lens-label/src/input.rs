//! File inputs: catalog, request lists and grid documents.

use std::path::{Path, PathBuf};
use tracing::info;

use lens_core::builder::LensRequest;
use lens_core::catalog::ProductCatalog;
use lens_core::grid::{BatchGrid, GridDocument};

use crate::error::{AppError, AppResult};

fn read(path: &Path) -> AppResult<String> {
    std::fs::read_to_string(path).map_err(|source| AppError::ReadFile {
        path: PathBuf::from(path),
        source,
    })
}

/// Loads a catalog JSON file, keeping only `allowed_groups` when non-empty.
pub fn load_catalog(path: &Path, allowed_groups: &[String]) -> AppResult<ProductCatalog> {
    let catalog = ProductCatalog::from_json_str(&read(path)?)?;

    let catalog = if allowed_groups.is_empty() {
        catalog
    } else {
        catalog.restricted_to(allowed_groups)
    };

    info!(
        ?path,
        products = catalog.len(),
        groups = ?catalog.group_ids(),
        "Catalog loaded"
    );
    Ok(catalog)
}

/// Loads a JSON array of requests.
pub fn load_requests(path: &Path) -> AppResult<Vec<LensRequest>> {
    let requests: Vec<LensRequest> = serde_json::from_str(&read(path)?)?;
    info!(?path, entries = requests.len(), "Requests loaded");
    Ok(requests)
}

/// Loads a grid document and validates its cells.
pub fn load_grid(path: &Path) -> AppResult<BatchGrid> {
    let document: GridDocument = serde_json::from_str(&read(path)?)?;
    let grid = document.into_grid()?;
    info!(
        ?path,
        product = grid.product_name(),
        cells = grid.len(),
        units = grid.total_units(),
        "Grid loaded"
    );
    Ok(grid)
}
