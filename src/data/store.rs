//! Persisted insight table and the read-through cache used by lookups.

use std::{
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    data::comments::{Sentiment, ThemeKey},
    error::Result,
};

/// Narrative output for one theme; the table's value type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
    #[serde(default)]
    pub positive_summary: String,
    #[serde(default)]
    pub negative_summary: String,
    #[serde(default)]
    pub positive_recommendations: Vec<String>,
    #[serde(default)]
    pub negative_recommendations: Vec<String>,
}

impl Insight {
    pub fn set(&mut self, sentiment: Sentiment, summary: String, recommendations: Vec<String>) {
        match sentiment {
            Sentiment::Positive => {
                self.positive_summary = summary;
                self.positive_recommendations = recommendations;
            }
            Sentiment::Negative => {
                self.negative_summary = summary;
                self.negative_recommendations = recommendations;
            }
        }
    }

    pub fn summary(&self, sentiment: Sentiment) -> &str {
        match sentiment {
            Sentiment::Positive => &self.positive_summary,
            Sentiment::Negative => &self.negative_summary,
        }
    }

    pub fn recommendations(&self, sentiment: Sentiment) -> &[String] {
        match sentiment {
            Sentiment::Positive => &self.positive_recommendations,
            Sentiment::Negative => &self.negative_recommendations,
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// `"{kind}_{name}"` to [`Insight`], in processing order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InsightTable {
    entries: IndexMap<String, Insight>,
}

impl InsightTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the record for `key`.
    pub fn insert(&mut self, key: &ThemeKey, insight: Insight) {
        self.entries.insert(key.table_key(), insight);
    }

    pub fn get(&self, table_key: &str) -> Option<&Insight> {
        self.entries.get(table_key)
    }

    /// Exact key lookup defaulting to an all-empty record.
    pub fn lookup(&self, key: &ThemeKey) -> Insight {
        self.get(&key.table_key()).cloned().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Replace the file at `path` wholesale via a sibling temp file.
    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, self.to_json()?)?;
        std::fs::rename(&tmp, path)?;
        info!(path = %path.display(), entries = self.len(), "wrote insight table");
        Ok(())
    }

    /// A missing file yields an empty table.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!(path = %path.display(), "insight table missing; run generate first");
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// Lazily loaded, process-scoped view of the persisted table.
#[derive(Debug)]
pub struct InsightCache {
    path: PathBuf,
    table: RwLock<Option<Arc<InsightTable>>>,
}

impl InsightCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            table: RwLock::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current table, reading the file on first use after creation or
    /// [`InsightCache::invalidate`]. A load error serves an empty table
    /// without caching it, so the next call reads the file again.
    pub fn table(&self) -> Arc<InsightTable> {
        if let Some(table) = self.table.read().ok().and_then(|guard| guard.clone()) {
            return table;
        }
        let loaded = match InsightTable::load(&self.path) {
            Ok(table) => Arc::new(table),
            Err(err) => {
                warn!(%err, path = %self.path.display(), "failed to load insight table");
                return Arc::new(InsightTable::default());
            }
        };
        if let Ok(mut guard) = self.table.write() {
            *guard = Some(Arc::clone(&loaded));
        }
        loaded
    }

    pub fn lookup(&self, key: &ThemeKey) -> Insight {
        self.table().lookup(key)
    }

    /// Drop the cached table so the next lookup re-reads the file.
    pub fn invalidate(&self) {
        if let Ok(mut guard) = self.table.write() {
            *guard = None;
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.table.read().map(|guard| guard.is_some()).unwrap_or(false)
    }
}
