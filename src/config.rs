//! Runtime configuration utilities for theme-insights.

use std::{
    env,
    path::{Path, PathBuf},
    str::FromStr,
};

use anyhow::Context;
use serde::Deserialize;

use crate::{
    data::comments::SentimentPolicy,
    error::{InsightError, Result},
};

const DEFAULT_OPENAI_BASE: &str = "https://api.openai.com/v1";

/// Application configuration resolved from `.env` and defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// API key for the generation and embedding endpoints.
    pub openai_api_key: Option<String>,
    /// Base URL of an OpenAI-compatible API.
    pub openai_base_url: String,
    /// Model used for claim and insight generation.
    pub generation_model: String,
    /// Model used for claim embeddings.
    pub embedding_model: String,
    /// PostgREST endpoint of the comment store.
    pub supabase_url: Option<String>,
    /// Key sent as `apikey` and bearer token to PostgREST.
    pub supabase_key: Option<String>,
    /// Table holding themed comments.
    pub comments_table: String,
    /// Local JSONL/CSV export used instead of the remote store.
    pub comments_file: Option<PathBuf>,
    /// Root folder for generated insight tables.
    pub outputs_dir: PathBuf,
    /// Tunables for the sampling/clustering pipeline.
    pub pipeline: PipelineConfig,
}

/// How a (theme, sentiment) batch becomes an insight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineMode {
    /// Claims, embeddings and clusters feed one synthesis call.
    #[default]
    Clustered,
    /// Keyword counts and a spread sample feed one call directly.
    Direct,
}

impl FromStr for PipelineMode {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "clustered" => Ok(Self::Clustered),
            "direct" => Ok(Self::Direct),
            other => Err(format!("unknown pipeline mode `{other}`")),
        }
    }
}

/// Knobs for the summarise/cluster/synthesise pipeline.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Clustered (default) or direct digest synthesis.
    pub mode: PipelineMode,
    /// Rows fetched per theme before the sentiment split.
    pub max_comments_per_theme: usize,
    /// Comments summarised per (theme, sentiment) batch.
    pub max_summaries_per_theme: usize,
    /// Below this many claims the batch stays a single cluster.
    pub min_cluster_summaries: usize,
    /// Target claims per cluster when choosing K.
    pub min_points_per_cluster: usize,
    /// Upper bound on K.
    pub max_clusters: usize,
    /// Example claims kept per cluster.
    pub examples_per_cluster: usize,
    /// Keywords extracted per cluster.
    pub keywords_per_cluster: usize,
    /// Seed for k-means initialisation.
    pub kmeans_seed: u64,
    /// Themes processed at once; 1 keeps the run strictly sequential.
    pub concurrency: usize,
    /// Theme values never analysed.
    pub excluded_themes: Vec<String>,
    /// Extra tokens ignored by keyword extraction.
    pub keyword_exclusions: Vec<String>,
    /// Engagement fallback for unlabeled comments.
    pub sentiment: SentimentPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            mode: PipelineMode::default(),
            max_comments_per_theme: 600,
            max_summaries_per_theme: 300,
            min_cluster_summaries: 12,
            min_points_per_cluster: 18,
            max_clusters: 5,
            examples_per_cluster: 5,
            keywords_per_cluster: 8,
            kmeans_seed: 42,
            concurrency: 1,
            excluded_themes: vec!["others".to_string(), "stock_market".to_string()],
            keyword_exclusions: Vec::new(),
            sentiment: SentimentPolicy::default(),
        }
    }
}

impl Settings {
    /// Load configuration from environment with reasonable defaults.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = PipelineConfig::default();
        let sentiment = SentimentPolicy {
            positive_above: env_parse("SENTIMENT_POSITIVE_ABOVE", defaults.sentiment.positive_above),
            negative_below: env_parse("SENTIMENT_NEGATIVE_BELOW", defaults.sentiment.negative_below),
        };
        let pipeline = PipelineConfig {
            mode: env_parse("PIPELINE_MODE", defaults.mode),
            max_comments_per_theme: env_parse("MAX_COMMENTS_PER_THEME", defaults.max_comments_per_theme),
            max_summaries_per_theme: env_parse("MAX_SUMMARIES_PER_THEME", defaults.max_summaries_per_theme),
            min_cluster_summaries: env_parse("MIN_CLUSTER_SUMMARIES", defaults.min_cluster_summaries),
            min_points_per_cluster: env_parse("MIN_POINTS_PER_CLUSTER", defaults.min_points_per_cluster),
            max_clusters: env_parse("MAX_CLUSTERS", defaults.max_clusters),
            kmeans_seed: env_parse("KMEANS_SEED", defaults.kmeans_seed),
            concurrency: env_parse("PIPELINE_CONCURRENCY", defaults.concurrency).max(1),
            excluded_themes: env_list("EXCLUDED_THEMES").unwrap_or(defaults.excluded_themes),
            keyword_exclusions: env_list("KEYWORD_EXCLUSIONS").unwrap_or_default(),
            sentiment,
            ..defaults
        };

        let outputs_dir = env::var("OUTPUTS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./outputs"));
        std::fs::create_dir_all(&outputs_dir).context("creating outputs dir")?;

        Ok(Self {
            openai_api_key: env_nonempty("OPENAI_API_KEY"),
            openai_base_url: env_nonempty("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE.to_string()),
            generation_model: env_nonempty("OPENAI_MODEL").unwrap_or_else(|| "gpt-4".to_string()),
            embedding_model: env_nonempty("OPENAI_EMBEDDING_MODEL")
                .unwrap_or_else(|| "text-embedding-3-small".to_string()),
            supabase_url: env_nonempty("SUPABASE_URL"),
            supabase_key: env_nonempty("SUPABASE_KEY"),
            comments_table: env_nonempty("COMMENTS_TABLE").unwrap_or_else(|| "cb".to_string()),
            comments_file: env_nonempty("COMMENTS_FILE").map(PathBuf::from),
            outputs_dir,
            pipeline,
        })
    }

    /// API key for generation/embedding calls; its absence aborts a run.
    pub fn require_openai_key(&self) -> Result<&str> {
        self.openai_api_key
            .as_deref()
            .ok_or(InsightError::MissingConfig("OPENAI_API_KEY"))
    }

    /// PostgREST endpoint and key, both required together.
    pub fn require_supabase(&self) -> Result<(&str, &str)> {
        let url = self
            .supabase_url
            .as_deref()
            .ok_or(InsightError::MissingConfig("SUPABASE_URL"))?;
        let key = self
            .supabase_key
            .as_deref()
            .ok_or(InsightError::MissingConfig("SUPABASE_KEY"))?;
        Ok((url, key))
    }

    /// Default location of the persisted insight table.
    pub fn insights_path(&self) -> PathBuf {
        self.join_output("theme_insights.json")
    }

    /// Convenience helper for derived output path segments.
    pub fn join_output<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        self.outputs_dir.join(path)
    }
}

fn env_nonempty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn env_list(key: &str) -> Option<Vec<String>> {
    env_nonempty(key).map(|raw| {
        raw.split(',')
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect()
    })
}
