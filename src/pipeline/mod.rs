//! Orchestrates sample -> summarise -> embed -> cluster -> synthesise per theme,
//! or sample -> synthesise from a keyword digest in direct mode.

pub mod stage;

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{info, instrument, warn};

use crate::{
    config::{PipelineConfig, PipelineMode, Settings},
    data::{
        self,
        comments::{split_by_sentiment, Sentiment, ThemeKey, ThemeKind},
        source::{list_theme_keys, CommentQuery, CommentSource},
        store::{Insight, InsightTable},
    },
    error::Result,
    llm::{openai::OpenAiClient, Embedder, TextGenerator},
    nlp::{
        sampler::evenly_sample, ClaimSettings, ClaimSummarizer, ClusterEngine, ClusterSettings,
        DigestSettings, DigestSynthesizer, EmbeddingClient, InsightSynthesizer, KeywordExtractor,
        SynthesisSettings,
    },
};

pub use stage::{BatchReport, Stage};

/// Which theme keys a run covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeSelection {
    pub kinds: Vec<ThemeKind>,
    /// Keep only the first N themes of each kind.
    pub limit: Option<usize>,
    /// Process only this theme name (under each selected kind).
    pub theme: Option<String>,
}

impl Default for ThemeSelection {
    fn default() -> Self {
        Self {
            kinds: ThemeKind::ALL.to_vec(),
            limit: None,
            theme: None,
        }
    }
}

impl ThemeSelection {
    /// Narrow the available keys, preserving their order.
    pub fn apply(&self, available: Vec<ThemeKey>) -> Vec<ThemeKey> {
        let mut selected = Vec::new();
        for &kind in &self.kinds {
            let mut of_kind = available.iter().filter(|key| key.kind == kind);
            match &self.theme {
                Some(name) => match of_kind.find(|key| &key.name == name) {
                    Some(key) => selected.push(key.clone()),
                    None => warn!(theme = %name, %kind, "theme not found"),
                },
                None => selected.extend(of_kind.take(self.limit.unwrap_or(usize::MAX)).cloned()),
            }
        }
        selected
    }
}

/// Outcome for one theme key.
#[derive(Debug, Clone, PartialEq)]
pub struct ThemeReport {
    pub key: ThemeKey,
    pub insight: Insight,
    pub positive: BatchReport,
    pub negative: BatchReport,
    pub fetch_error: Option<String>,
}

impl ThemeReport {
    pub fn batch(&self, sentiment: Sentiment) -> &BatchReport {
        match sentiment {
            Sentiment::Positive => &self.positive,
            Sentiment::Negative => &self.negative,
        }
    }
}

/// Result of a full run: the table to persist plus per-theme reports.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub table: InsightTable,
    pub reports: Vec<ThemeReport>,
}

/// Model identifiers passed to the capabilities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelNames {
    pub generation: String,
    pub embedding: String,
}

/// The insight pipeline bound to its external capabilities.
pub struct Pipeline {
    source: Arc<dyn CommentSource>,
    generator: Arc<dyn TextGenerator>,
    embedder: Arc<dyn Embedder>,
    engine: ClusterEngine,
    keywords: KeywordExtractor,
    config: PipelineConfig,
    claims: ClaimSettings,
    synthesis: SynthesisSettings,
    digest: DigestSettings,
    embedding_model: String,
}

impl Pipeline {
    pub fn new(
        source: Arc<dyn CommentSource>,
        generator: Arc<dyn TextGenerator>,
        embedder: Arc<dyn Embedder>,
        config: PipelineConfig,
        models: ModelNames,
    ) -> Self {
        let keywords = KeywordExtractor::with_exclusions(&config.keyword_exclusions);
        let engine = ClusterEngine::new(ClusterSettings::from(&config), keywords.clone());
        Self {
            source,
            generator,
            embedder,
            engine,
            keywords,
            config,
            claims: ClaimSettings::new(&models.generation),
            synthesis: SynthesisSettings::new(&models.generation),
            digest: DigestSettings::new(&models.generation),
            embedding_model: models.embedding,
        }
    }

    /// Wire the OpenAI client and configured comment source.
    ///
    /// Missing credentials fail here, before any theme is touched.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let client = Arc::new(OpenAiClient::from_settings(settings)?);
        let source = data::open_source(settings)?;
        Ok(Self::new(
            source,
            client.clone(),
            client,
            settings.pipeline.clone(),
            ModelNames {
                generation: settings.generation_model.clone(),
                embedding: settings.embedding_model.clone(),
            },
        ))
    }

    pub fn with_engine(mut self, engine: ClusterEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Theme keys from the source, narrowed by `selection`.
    pub async fn themes(&self, selection: &ThemeSelection) -> Result<Vec<ThemeKey>> {
        let available =
            list_theme_keys(self.source.as_ref(), &selection.kinds, &self.config.excluded_themes)
                .await?;
        Ok(selection.apply(available))
    }

    /// Process every selected theme and assemble the insight table.
    #[instrument(skip(self))]
    pub async fn run(&self, selection: &ThemeSelection) -> Result<RunOutcome> {
        let keys = self.themes(selection).await?;
        info!(themes = keys.len(), "processing themes");
        let reports = self.process_all(&keys).await;
        let mut table = InsightTable::new();
        for report in &reports {
            table.insert(&report.key, report.insight.clone());
        }
        Ok(RunOutcome { table, reports })
    }

    /// Themes share no state, so up to `concurrency` run at once; results
    /// keep input order.
    pub async fn process_all(&self, keys: &[ThemeKey]) -> Vec<ThemeReport> {
        let total = keys.len();
        stream::iter(keys.iter().enumerate())
            .map(|(idx, key)| async move {
                info!(theme = %key, progress = idx + 1, total, "processing theme");
                self.process_theme(key).await
            })
            .buffered(self.config.concurrency.max(1))
            .collect()
            .await
    }

    /// Fetch one theme's comments and run both sentiments independently.
    pub async fn process_theme(&self, key: &ThemeKey) -> ThemeReport {
        let query = CommentQuery::for_theme(
            key,
            &self.config.excluded_themes,
            self.config.max_comments_per_theme,
        );
        let mut report = ThemeReport {
            key: key.clone(),
            insight: Insight::default(),
            positive: BatchReport::default(),
            negative: BatchReport::default(),
            fetch_error: None,
        };
        let rows = match self.source.fetch(&query).await {
            Ok(rows) => rows,
            Err(err) => {
                warn!(%err, theme = %key, stage = "fetch", "comment fetch failed; writing empty insight");
                report.fetch_error = Some(err.to_string());
                return report;
            }
        };
        let split = split_by_sentiment(&rows, &self.config.sentiment);
        info!(
            theme = %key,
            positive = split.positive.len(),
            negative = split.negative.len(),
            "split comments by sentiment"
        );

        for sentiment in Sentiment::ALL {
            let batch = self.process_batch(key, sentiment, split.get(sentiment)).await;
            report.insight.set(
                sentiment,
                batch.insight.summary.clone(),
                batch.insight.recommendations.clone(),
            );
            match sentiment {
                Sentiment::Positive => report.positive = batch,
                Sentiment::Negative => report.negative = batch,
            }
        }
        report
    }

    /// Run one (theme, sentiment) batch to completion. Never fails: each
    /// stage owns the fallback for its capability.
    pub async fn process_batch(
        &self,
        key: &ThemeKey,
        sentiment: Sentiment,
        comments: &[String],
    ) -> BatchReport {
        let mut report = BatchReport {
            comments: comments.len(),
            ..BatchReport::default()
        };
        if comments.is_empty() {
            report.enter(Stage::NoComments);
            report.enter(Stage::Done);
            return report;
        }
        match self.config.mode {
            PipelineMode::Clustered => self.clustered_batch(key, sentiment, comments, report).await,
            PipelineMode::Direct => self.direct_batch(key, sentiment, comments, report).await,
        }
    }

    /// Keyword digest over every comment, one synthesis call.
    async fn direct_batch(
        &self,
        key: &ThemeKey,
        sentiment: Sentiment,
        comments: &[String],
        mut report: BatchReport,
    ) -> BatchReport {
        report.sampled = comments.len().min(self.digest.samples);
        report.enter(Stage::Sampled);

        let synthesizer =
            DigestSynthesizer::new(self.generator.as_ref(), &self.keywords, self.digest.clone());
        report.insight = synthesizer.synthesize(key, sentiment, comments).await;
        report.enter(Stage::Synthesized);
        report.enter(Stage::Done);
        report
    }

    async fn clustered_batch(
        &self,
        key: &ThemeKey,
        sentiment: Sentiment,
        comments: &[String],
        mut report: BatchReport,
    ) -> BatchReport {
        let sampled = evenly_sample(comments, self.config.max_summaries_per_theme);
        report.sampled = sampled.len();
        report.enter(Stage::Sampled);

        let summarizer = ClaimSummarizer::new(self.generator.as_ref(), self.claims.clone());
        let claims = summarizer.summarize_all(&sampled, sentiment, key).await;
        report.claims = claims.len();
        report.enter(Stage::Summarized);

        let embeddings = EmbeddingClient::new(self.embedder.as_ref(), &self.embedding_model)
            .embed_all(&claims)
            .await;
        match &embeddings {
            Ok(_) => report.enter(Stage::Embedded),
            Err(err) => {
                warn!(%err, theme = %key, %sentiment, stage = "embed", "embedding failed; clustering degrades");
                report.embedding_error = Some(err.to_string());
            }
        }

        let clustered = self.engine.cluster(&claims, embeddings);
        report.cluster_sizes = clustered.clusters().iter().map(|c| c.size()).collect();
        report.fallback = clustered.fallback_reason().cloned();
        report.enter(Stage::Clustered);

        let synthesizer = InsightSynthesizer::new(self.generator.as_ref(), self.synthesis.clone());
        report.insight = synthesizer
            .synthesize(key, sentiment, clustered.clusters(), comments.len())
            .await;
        report.enter(Stage::Synthesized);
        report.enter(Stage::Done);
        report
    }
}
