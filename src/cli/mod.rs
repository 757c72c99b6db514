//! Command-line interface wiring for theme-insights.

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};

use crate::{
    config::{PipelineMode, Settings},
    data::comments::ThemeKind,
};

pub mod generate;
pub mod serve;
pub mod show;
pub mod themes;

/// Top-level CLI definition.
#[derive(Debug, Parser)]
#[command(author, version, about = "Themed employee feedback insights", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Parse CLI arguments from the environment.
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Dispatch the selected sub-command.
    pub async fn dispatch(self, settings: Settings) -> Result<()> {
        match self.command {
            Commands::Generate(args) => generate::run(args, settings).await,
            Commands::Themes(args) => themes::run(args, settings).await,
            Commands::Show(args) => show::run(args, settings),
            Commands::Serve(args) => serve::run(args, settings).await,
        }
    }
}

/// Supported sub-commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the pipeline and write the insight table.
    Generate(generate::Args),
    /// List the theme keys a run would process.
    Themes(themes::Args),
    /// Print one stored insight.
    Show(show::Args),
    /// Serve stored insights over HTTP.
    Serve(serve::Args),
}

/// Which theme columns to cover.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Base,
    Sub,
    #[default]
    All,
}

impl KindArg {
    pub fn kinds(self) -> Vec<ThemeKind> {
        match self {
            Self::Base => vec![ThemeKind::Base],
            Self::Sub => vec![ThemeKind::Sub],
            Self::All => ThemeKind::ALL.to_vec(),
        }
    }
}

/// How each batch is synthesised.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Clustered,
    Direct,
}

impl From<ModeArg> for PipelineMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Clustered => Self::Clustered,
            ModeArg::Direct => Self::Direct,
        }
    }
}
