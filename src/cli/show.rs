//! Prints a stored insight as JSON.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args as ClapArgs;

use crate::{
    config::Settings,
    data::{
        comments::{ThemeKey, ThemeKind},
        store::InsightTable,
    },
};

#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// `base` or `sub` (also accepts `base_theme` / `sub_theme`).
    #[arg(long)]
    pub kind: ThemeKind,
    #[arg(long)]
    pub name: String,
    /// Table to read, defaults to `<OUTPUTS_DIR>/theme_insights.json`.
    #[arg(long)]
    pub input: Option<PathBuf>,
}

pub fn run(args: Args, settings: Settings) -> Result<()> {
    let path = args.input.unwrap_or_else(|| settings.insights_path());
    let table = InsightTable::load(&path)?;
    let insight = table.lookup(&ThemeKey::new(args.kind, args.name));
    println!("{}", serde_json::to_string_pretty(&insight)?);
    Ok(())
}
