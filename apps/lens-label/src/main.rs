//! # lens-label
//!
//! Generates serialized, parameter-resolved lens labels from a catalog and
//! a set of requests, and prints one JSON object per label.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  label.toml + env ──► LabelConfig                                      │
//! │  --catalog ─────────► ProductCatalog (filtered by allowed groups)      │
//! │  --requests │ --grid │ --product … ──► Vec<LensRequest>                │
//! │                                │                                        │
//! │                                ▼                                        │
//! │                 LensRecordBuilder::build_batch (one BatchContext)       │
//! │                                │                                        │
//! │                                ▼                                        │
//! │        PayloadEncoder ──► encode_batch ──► JsonLinesRenderer ──► stdout │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Examples
//! ```text
//! lens-label --catalog catalog.json --product P1 --spherical -3.00 --quantity 2
//! lens-label --catalog catalog.json --grid order.json --pretty
//! RUST_LOG=debug lens-label --requests batch.json
//! ```

mod config;
mod error;
mod input;
mod render;

use clap::Parser;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use lens_core::builder::{LensRecordBuilder, LensRequest};
use lens_core::payload::PayloadEncoder;
use lens_core::render::{encode_batch, render_all};

use crate::config::LabelConfig;
use crate::error::{AppError, AppResult};
use crate::render::JsonLinesRenderer;

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "lens-label", version, about = "Generate serialized lens labels")]
struct Args {
    /// Catalog JSON file (overrides catalog.path from the config)
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Config file (defaults to the platform config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON array of requests
    #[arg(long, conflicts_with_all = ["grid", "product"])]
    requests: Option<PathBuf>,

    /// JSON grid document for one product
    #[arg(long, conflicts_with = "product")]
    grid: Option<PathBuf>,

    /// Product name for a single request
    #[arg(long, requires_all = ["spherical", "quantity"])]
    product: Option<String>,

    /// Spherical power, e.g. -3.00
    #[arg(long, allow_hyphen_values = true)]
    spherical: Option<String>,

    /// Cylinder power, e.g. -0.50
    #[arg(long, allow_hyphen_values = true, default_value = "0.00")]
    cylinder: String,

    /// Number of units
    #[arg(long)]
    quantity: Option<u32>,

    /// Indent the JSON output
    #[arg(long)]
    pretty: bool,

    /// Write the effective config to --config (or the default path) and exit
    #[arg(long)]
    init_config: bool,
}

impl Args {
    /// Collects the requests named by whichever input flag was given.
    fn requests(&self) -> AppResult<Vec<LensRequest>> {
        if let Some(path) = &self.requests {
            return input::load_requests(path);
        }
        if let Some(path) = &self.grid {
            return Ok(input::load_grid(path)?.entries());
        }
        match (&self.product, &self.spherical, self.quantity) {
            (Some(product), Some(spherical), Some(quantity)) => Ok(vec![LensRequest::new(
                product.as_str(),
                spherical.as_str(),
                self.cylinder.as_str(),
                quantity,
            )]),
            _ => Err(AppError::MissingInput),
        }
    }
}

fn main() -> ExitCode {
    init_tracing();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "lens-label failed");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> AppResult<()> {
    let config = LabelConfig::load(args.config.clone())?;
    if args.init_config {
        return config.save(args.config);
    }

    let catalog_path = args
        .catalog
        .clone()
        .or_else(|| config.catalog.path.clone())
        .ok_or(AppError::MissingCatalog)?;
    let catalog = input::load_catalog(&catalog_path, &config.catalog.allowed_groups)?;

    let requests = args.requests()?;
    let records = LensRecordBuilder::new(&catalog).build_batch(&requests)?;

    let encoder = PayloadEncoder::new(config.encoder_settings(), config.code_table(catalog.codes()))?;
    let jobs = encode_batch(&encoder, &records);

    let stdout = io::stdout();
    let mut renderer = JsonLinesRenderer::new(stdout.lock(), args.pretty);
    render_all(&jobs, &mut renderer)?;
    let written = renderer.written();
    renderer.finish()?;

    let needs_review = records.iter().filter(|r| r.needs_review()).count();
    info!(labels = written, needs_review, "Labels written");
    Ok(())
}

/// Initializes the tracing subscriber on stderr.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show each entry as it is emitted
/// - `RUST_LOG=lens_core=warn` - Only unresolved-parameter warnings
/// - Default: INFO level
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}
