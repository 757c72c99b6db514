//! CLI entry-point for running the insight pipeline end to end.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use tracing::{info, instrument, warn};

use crate::{
    cli::{KindArg, ModeArg},
    config::Settings,
    pipeline::{Pipeline, ThemeSelection},
};

#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Theme columns to process.
    #[arg(long, value_enum, default_value_t = KindArg::All)]
    pub kind: KindArg,
    /// Process only the first N themes of each kind.
    #[arg(long)]
    pub limit: Option<usize>,
    /// Process a single theme by name.
    #[arg(long)]
    pub theme: Option<String>,
    /// Output path, defaults to `<OUTPUTS_DIR>/theme_insights.json`.
    #[arg(long)]
    pub output: Option<PathBuf>,
    /// Themes processed at once; overrides PIPELINE_CONCURRENCY.
    #[arg(long)]
    pub concurrency: Option<usize>,
    /// Synthesis mode; overrides PIPELINE_MODE.
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, mut settings: Settings) -> Result<()> {
    if let Some(concurrency) = args.concurrency {
        settings.pipeline.concurrency = concurrency.max(1);
    }
    if let Some(mode) = args.mode {
        settings.pipeline.mode = mode.into();
    }
    let pipeline = Pipeline::from_settings(&settings).context("configuring pipeline")?;
    let selection = ThemeSelection {
        kinds: args.kind.kinds(),
        limit: args.limit,
        theme: args.theme,
    };

    let outcome = pipeline.run(&selection).await.context("listing themes")?;
    let output = args.output.unwrap_or_else(|| settings.insights_path());
    outcome
        .table
        .write(&output)
        .with_context(|| format!("writing {}", output.display()))?;

    let degraded = outcome
        .reports
        .iter()
        .filter(|r| r.fetch_error.is_some() || r.positive.fallback.is_some() || r.negative.fallback.is_some())
        .count();
    let empty = outcome.reports.iter().filter(|r| r.insight.is_empty()).count();
    if degraded > 0 {
        warn!(degraded, "some themes ran with a clustering or fetch fallback");
    }
    info!(
        mode = ?settings.pipeline.mode,
        themes = outcome.reports.len(),
        empty,
        path = %output.display(),
        "generation complete"
    );
    Ok(())
}
