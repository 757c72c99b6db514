//! Lists theme keys without calling any generation endpoint.

use anyhow::Result;
use clap::Args as ClapArgs;
use tracing::instrument;

use crate::{
    cli::KindArg,
    config::Settings,
    data::{self, source::list_theme_keys},
};

#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    #[arg(long, value_enum, default_value_t = KindArg::All)]
    pub kind: KindArg,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let source = data::open_source(&settings)?;
    let keys = list_theme_keys(
        source.as_ref(),
        &args.kind.kinds(),
        &settings.pipeline.excluded_themes,
    )
    .await?;
    for key in keys {
        println!("{}", key.table_key());
    }
    Ok(())
}
