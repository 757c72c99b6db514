//! Error types shared by the pipeline and its capability adapters.

use thiserror::Error;

/// Failures surfaced by capability boundaries and the output store.
///
/// Only [`InsightError::MissingConfig`] is fatal for a run; every other
/// variant is caught by the stage that owns the matching fallback.
#[derive(Debug, Error)]
pub enum InsightError {
    #[error("missing configuration: {0}")]
    MissingConfig(&'static str),
    #[error("text generation failed: {0}")]
    Generation(String),
    #[error("embedding request failed: {0}")]
    Embedding(String),
    #[error("comment source error: {0}")]
    Source(String),
    #[error("clustering failed: {0}")]
    Clustering(String),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

pub type Result<T, E = InsightError> = std::result::Result<T, E>;
