//! Final narrative insight from the cluster structure of a claim batch.

use tracing::{info, warn};

use crate::{
    data::comments::{Sentiment, ThemeKey},
    llm::{GenerationRequest, TextGenerator},
    nlp::{
        clusters::ClusterRecord,
        structured::{parse_insight, SentimentInsight},
    },
};

const SYSTEM_PROMPT: &str = "You are a senior workplace culture analyst. \
     Always respond with valid JSON only. Be concrete and avoid meta-commentary.";

/// Sampling parameters and output bounds for synthesis.
#[derive(Debug, Clone)]
pub struct SynthesisSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub max_recommendations: usize,
    pub examples_per_block: usize,
    pub fallback_chars: usize,
}

impl SynthesisSettings {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: 0.4,
            max_tokens: 400,
            max_recommendations: 3,
            examples_per_block: 3,
            fallback_chars: 300,
        }
    }
}

/// Text block describing one cluster to the generator.
pub fn render_cluster(cluster: &ClusterRecord, examples: usize) -> String {
    let keywords = if cluster.keywords.is_empty() {
        "N/A".to_string()
    } else {
        cluster.keywords.join(", ")
    };
    let mut lines = vec![
        format!("Sub-topic {} (approx. {} comments)", cluster.id, cluster.size()),
        format!("  Keywords: {keywords}"),
        "  Example summaries:".to_string(),
    ];
    lines.extend(cluster.examples.iter().take(examples).map(|ex| format!("    {ex}")));
    lines.join("\n")
}

/// All cluster blocks in the engine's order, separated by blank lines.
pub fn render_clusters(clusters: &[ClusterRecord], examples: usize) -> String {
    clusters
        .iter()
        .map(|c| render_cluster(c, examples))
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub struct InsightSynthesizer<'a> {
    generator: &'a dyn TextGenerator,
    settings: SynthesisSettings,
}

impl<'a> InsightSynthesizer<'a> {
    pub fn new(generator: &'a dyn TextGenerator, settings: SynthesisSettings) -> Self {
        Self {
            generator,
            settings,
        }
    }

    pub fn prompt(
        &self,
        theme: &ThemeKey,
        sentiment: Sentiment,
        clusters: &[ClusterRecord],
        total_comments: usize,
    ) -> String {
        let block = render_clusters(clusters, self.settings.examples_per_block);
        let max = self.settings.max_recommendations;
        format!(
            r#"You are analyzing {sentiment} employee feedback for the theme "{name}" (theme type: {kind}).

There are approximately {total_comments} {sentiment} comments in total.
They have been clustered into sub-topics, largest first. Each sub-topic lists its rough size, top keywords, and example bullet-point summaries:

{block}

Requirements:
1. Summary:
   - Directly state specific examples of {sentiment} patterns.
   - Do NOT use meta phrases like "the comments reflect" or "people say".
   - Write 2-3 concise sentences with concrete, stakeholder-friendly descriptions.
   - Include specific numbers, timeframes, or concrete examples when the sub-topics mention them.
2. Recommendations:
   - Provide 1-{max} actionable recommendations that are SPECIFIC and MEASURABLE.
   - Each recommendation addresses a distinct issue or opportunity from a different sub-topic.
   - Make each one implementable, e.g. "Reduce hiring process from 3-6 months to 4-6 weeks" instead of "Improve hiring".
   - Include a target outcome or metric where possible, e.g. "Increase manager feedback frequency to monthly" instead of "More feedback".
   - Avoid vague verbs like "improve", "enhance", "better" without specifics.
   - Bad examples: "Improve communication", "Better training", "More support".

Output JSON in this exact format:
{{
  "summary": "Direct, concrete description of the main {sentiment} patterns",
  "recommendations": ["short phrase 1", "short phrase 2"]
}}"#,
            name = theme.name,
            kind = theme.kind,
        )
    }

    /// Structured insight for one (theme, sentiment) pair.
    ///
    /// No clusters or no comments returns the empty insight without a call;
    /// a failed call also returns it.
    pub async fn synthesize(
        &self,
        theme: &ThemeKey,
        sentiment: Sentiment,
        clusters: &[ClusterRecord],
        total_comments: usize,
    ) -> SentimentInsight {
        if clusters.is_empty() || total_comments == 0 {
            return SentimentInsight::default();
        }
        let request = GenerationRequest {
            model: self.settings.model.clone(),
            system: SYSTEM_PROMPT.to_string(),
            prompt: self.prompt(theme, sentiment, clusters, total_comments),
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        };
        match self.generator.generate(&request).await {
            Ok(raw) => {
                let insight = parse_insight(
                    &raw,
                    self.settings.max_recommendations,
                    self.settings.fallback_chars,
                );
                info!(
                    theme = %theme,
                    %sentiment,
                    clusters = clusters.len(),
                    recommendations = insight.recommendations.len(),
                    "synthesised insight"
                );
                insight
            }
            Err(err) => {
                warn!(%err, theme = %theme, %sentiment, stage = "synthesize", "insight generation failed; leaving fields empty");
                SentimentInsight::default()
            }
        }
    }
}
