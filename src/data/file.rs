//! Comment source reading a local JSONL or CSV export of the comment table.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use csv::ReaderBuilder;
use tracing::info;

use crate::{
    data::{
        comments::{Comment, ThemeKind},
        source::{CommentQuery, CommentRow, CommentSource},
    },
    error::{InsightError, Result},
};

/// In-memory snapshot of exported rows; predicates are evaluated locally.
#[derive(Debug, Clone, Default)]
pub struct FileSource {
    rows: Vec<CommentRow>,
    origin: Option<PathBuf>,
}

impl FileSource {
    pub fn from_rows(rows: Vec<CommentRow>) -> Self {
        Self { rows, origin: None }
    }

    /// Load `.jsonl` (one JSON object per line) or `.csv` (header row) exports.
    pub fn open(path: &Path) -> Result<Self> {
        let rows = match path.extension().and_then(|s| s.to_str()) {
            Some("csv") => read_csv(path)?,
            Some("jsonl") | Some("ndjson") => read_jsonl(path)?,
            _ => {
                return Err(InsightError::Source(format!(
                    "unsupported comment export {}",
                    path.display()
                )))
            }
        };
        info!(path = %path.display(), rows = rows.len(), "loaded comment export");
        Ok(Self {
            rows,
            origin: Some(path.to_path_buf()),
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn origin(&self) -> Option<&Path> {
        self.origin.as_deref()
    }
}

fn read_jsonl(path: &Path) -> Result<Vec<CommentRow>> {
    let text = std::fs::read_to_string(path)?;
    let mut rows = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        rows.push(serde_json::from_str(line)?);
    }
    Ok(rows)
}

fn read_csv(path: &Path) -> Result<Vec<CommentRow>> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut rows = Vec::new();
    for result in reader.deserialize::<CommentRow>() {
        rows.push(result?);
    }
    Ok(rows)
}

#[async_trait]
impl CommentSource for FileSource {
    async fn fetch(&self, query: &CommentQuery) -> Result<Vec<Comment>> {
        Ok(self
            .rows
            .iter()
            .filter(|row| query.matches(row))
            .take(query.limit)
            .cloned()
            .map(Comment::from)
            .collect())
    }

    async fn theme_values(&self, kind: ThemeKind) -> Result<Vec<Option<String>>> {
        Ok(self
            .rows
            .iter()
            .map(|row| row.theme(kind).map(str::to_string))
            .collect())
    }
}
