//! Comment ingestion and insight persistence layer.

pub mod comments;
pub mod file;
pub mod postgrest;
pub mod source;
pub mod store;

use std::sync::Arc;

use tracing::info;

use crate::{
    config::Settings,
    data::{file::FileSource, postgrest::PostgrestSource, source::CommentSource},
    error::Result,
};

/// Pick the comment source: a local export wins over the remote store.
pub fn open_source(settings: &Settings) -> Result<Arc<dyn CommentSource>> {
    if let Some(path) = &settings.comments_file {
        info!(path = %path.display(), "using local comment export");
        return Ok(Arc::new(FileSource::open(path)?));
    }
    let source = PostgrestSource::from_settings(settings)?;
    info!(table = %settings.comments_table, "using postgrest comment store");
    Ok(Arc::new(source))
}
