//! Model export utility for Healix.
//!
//! Writes the default logistic parameters as `{diabetes,heart,kidney}_model.json`
//! together with a `manifest.json` carrying the SHA-256 of each file, which
//! the server verifies at startup.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin export_models -- [model_dir]
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use healix::adapters::RiskModels;

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let model_dir = std::env::args()
        .nth(1)
        .map_or_else(|| PathBuf::from("models"), PathBuf::from);

    let models = RiskModels::builtin()?;
    models
        .export(&model_dir)
        .with_context(|| format!("Failed to export models to {model_dir:?}"))?;

    // Verify the export loads.
    RiskModels::load(&model_dir)?;

    tracing::info!("Exported risk models and manifest to {:?}", model_dir);
    Ok(())
}
