// Runs the full Iris pipeline once. Configuration comes from the JSON file
// named by IRIS_MLP_CONFIG when set; log verbosity follows RUST_LOG.
use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use iris_mlp::config::{PipelineConfig, CONFIG_ENV};

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("iris_mlp=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = PipelineConfig::from_env()
        .with_context(|| format!("loading configuration (from ${} if set)", CONFIG_ENV))?;

    let outcome = iris_mlp::run(&config).context("pipeline run failed")?;

    info!(
        "Final test accuracy: {:.2}% on {} samples",
        outcome.evaluation.accuracy * 100.0,
        outcome.split.test.len()
    );
    Ok(())
}
