//! Single-call insights from a statistical digest of a comment batch.
//!
//! The direct mode skips claims and clustering: keyword counts over every
//! comment plus an evenly spread sample go to the generator in one prompt.

use tracing::{info, warn};

use crate::{
    data::comments::{Sentiment, ThemeKey},
    llm::{GenerationRequest, TextGenerator},
    nlp::{
        claims::truncate_chars,
        keywords::KeywordExtractor,
        sampler::evenly_sample,
        structured::{parse_insight, SentimentInsight},
    },
};

const SYSTEM_PROMPT: &str = "You are a data analyst. Always respond in valid JSON format. \
     Be direct and concise. Avoid generic introductory phrases.";

/// Digest shape and sampling parameters for the direct mode.
#[derive(Debug, Clone)]
pub struct DigestSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub max_recommendations: usize,
    pub samples: usize,
    pub sample_chars: usize,
    pub keywords: usize,
    pub fallback_chars: usize,
}

impl DigestSettings {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: 0.5,
            max_tokens: 450,
            max_recommendations: 2,
            samples: 40,
            sample_chars: 300,
            keywords: 12,
            fallback_chars: 200,
        }
    }
}

/// Totals, top keyword counts and a spread sample for one batch.
pub fn render_digest(
    comments: &[String],
    sentiment: Sentiment,
    keywords: &KeywordExtractor,
    settings: &DigestSettings,
) -> String {
    let label = title_case(sentiment.label());
    let total = comments.len();
    if total == 0 {
        return format!("{label} Comments: None");
    }

    let top: Vec<String> = keywords
        .counts(comments)
        .into_iter()
        .take(settings.keywords)
        .map(|(word, count)| format!("{word}({count})"))
        .collect();
    let top = if top.is_empty() {
        "N/A".to_string()
    } else {
        top.join(", ")
    };

    let words: usize = comments.iter().map(|c| c.split_whitespace().count()).sum();
    let average = words as f64 / total as f64;

    let samples = evenly_sample(comments, settings.samples)
        .iter()
        .map(|comment| {
            let trimmed = comment.trim();
            let excerpt = truncate_chars(trimmed, settings.sample_chars);
            let ellipsis = if excerpt.len() < trimmed.len() { "..." } else { "" };
            format!("- {excerpt}{ellipsis}")
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "{label} Comments Summary Input:\n\
         Total Comments: {total}\n\
         Average Comment Length (words): {average:.1}\n\
         Top Keywords (covering entire dataset): {top}\n\
         Diverse Sample (evenly spaced across all comments):\n\
         {samples}"
    )
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub struct DigestSynthesizer<'a> {
    generator: &'a dyn TextGenerator,
    keywords: &'a KeywordExtractor,
    settings: DigestSettings,
}

impl<'a> DigestSynthesizer<'a> {
    pub fn new(
        generator: &'a dyn TextGenerator,
        keywords: &'a KeywordExtractor,
        settings: DigestSettings,
    ) -> Self {
        Self {
            generator,
            keywords,
            settings,
        }
    }

    pub fn prompt(&self, theme: &ThemeKey, sentiment: Sentiment, comments: &[String]) -> String {
        let digest = render_digest(comments, sentiment, self.keywords, &self.settings);
        let (focus, direction, example_summary, example_recs) = match sentiment {
            Sentiment::Positive => (
                "advantages",
                "to maintain or enhance these positive aspects",
                "Employees value flexible FIFO schedules allowing more leisure time. They appreciate competitive compensation packages and union protections.",
                r#"["Maintain flexible work arrangements", "Continue competitive benefits"]"#,
            ),
            Sentiment::Negative => (
                "problems or concerns",
                "to address these concerns",
                "Hiring processes take 3-6 months with unclear timelines. Job descriptions require 5+ years experience for graduate positions.",
                r#"["Streamline hiring timeline", "Align job requirements with role level"]"#,
            ),
        };
        format!(
            r#"Analyze the aggregated {sentiment} feedback about "{name}" (theme type: {kind}).

{digest}

Requirements:
1. Summary: Directly state specific examples of {focus} mentioned in the comments. Do NOT use phrases like "The comments reflect..." or "The comments highlight...". Keep it concise, 2-3 sentences maximum.
2. Recommendations: Provide 1-{max} short phrases (not full sentences) summarizing improvement directions {direction}.

Output JSON in this format:
{{
  "summary": "Direct examples of {focus} from comments",
  "recommendations": ["short phrase 1", "short phrase 2"]
}}

Example:
{{
  "summary": "{example_summary}",
  "recommendations": {example_recs}
}}"#,
            name = theme.name,
            kind = theme.kind,
            max = self.settings.max_recommendations,
        )
    }

    /// One generation call for the whole batch.
    ///
    /// No comments returns the empty insight without a call; a failed call
    /// also returns it.
    pub async fn synthesize(
        &self,
        theme: &ThemeKey,
        sentiment: Sentiment,
        comments: &[String],
    ) -> SentimentInsight {
        if comments.is_empty() {
            return SentimentInsight::default();
        }
        let request = GenerationRequest {
            model: self.settings.model.clone(),
            system: SYSTEM_PROMPT.to_string(),
            prompt: self.prompt(theme, sentiment, comments),
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
                    comments = comments.len(),
                    recommendations = insight.recommendations.len(),
                    "synthesised digest insight"
                );
                insight
            }
            Err(err) => {
                warn!(%err, theme = %theme, %sentiment, stage = "synthesize", "digest generation failed; leaving fields empty");
                SentimentInsight::default()
            }
        }
    }
}
