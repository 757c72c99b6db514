//! Per-comment abstraction into one or two short bullet claims.

use tracing::{info, warn};

use crate::{
    data::comments::{Sentiment, ThemeKey},
    llm::{GenerationRequest, TextGenerator},
};

const SYSTEM_PROMPT: &str = "You are a concise workplace culture analyst.";
const BULLET_MARKERS: &[char] = &['-', '*', '•'];

/// Character budgets and sampling parameters for claim generation.
#[derive(Debug, Clone)]
pub struct ClaimSettings {
    pub model: String,
    pub comment_chars: usize,
    pub fallback_chars: usize,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl ClaimSettings {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            comment_chars: 1000,
            fallback_chars: 150,
            temperature: 0.3,
            max_tokens: 120,
        }
    }
}

/// Turns raw comments into bullet claims; never fails.
pub struct ClaimSummarizer<'a> {
    generator: &'a dyn TextGenerator,
    settings: ClaimSettings,
}

impl<'a> ClaimSummarizer<'a> {
    pub fn new(generator: &'a dyn TextGenerator, settings: ClaimSettings) -> Self {
        Self {
            generator,
            settings,
        }
    }

    pub fn prompt(&self, comment: &str, sentiment: Sentiment, theme: &ThemeKey) -> String {
        let excerpt = truncate_chars(comment, self.settings.comment_chars);
        format!(
            "Summarise the following {sentiment} employee feedback about \"{name}\" ({kind}) into 1–2 bullet points.\n\
             Focus on concrete issues, situations, or positive aspects. Avoid generic phrases.\n\n\
             Feedback:\n\"\"\"{excerpt}\"\"\"\n\n\
             Output format:\n- bullet point 1\n- bullet point 2 (optional)\n",
            name = theme.name,
            kind = theme.kind,
        )
    }

    /// One to two claims for `comment`; degrades to a truncated copy of the
    /// comment when generation fails or returns no bullets.
    pub async fn summarize(&self, comment: &str, sentiment: Sentiment, theme: &ThemeKey) -> Vec<String> {
        let request = GenerationRequest {
            model: self.settings.model.clone(),
            system: SYSTEM_PROMPT.to_string(),
            prompt: self.prompt(comment, sentiment, theme),
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        };
        match self.generator.generate(&request).await {
            Ok(text) => {
                let claims = parse_bullets(&text);
                if claims.is_empty() {
                    vec![fallback_claim(comment, self.settings.fallback_chars)]
                } else {
                    claims
                }
            }
            Err(err) => {
                warn!(%err, theme = %theme, %sentiment, stage = "summarize", "claim generation failed; truncating comment");
                vec![fallback_claim(comment, self.settings.fallback_chars)]
            }
        }
    }

    /// Summarise every comment in order, one call at a time.
    pub async fn summarize_all(
        &self,
        comments: &[String],
        sentiment: Sentiment,
        theme: &ThemeKey,
    ) -> Vec<String> {
        info!(theme = %theme, %sentiment, comments = comments.len(), "summarising comments");
        let mut claims = Vec::with_capacity(comments.len());
        for (idx, comment) in comments.iter().enumerate() {
            claims.extend(self.summarize(comment, sentiment, theme).await);
            if (idx + 1) % 20 == 0 {
                info!(theme = %theme, %sentiment, done = idx + 1, total = comments.len(), "summarising progress");
            }
        }
        claims
    }
}

/// Trimmed lines that start with a bullet marker, capped at two.
pub fn parse_bullets(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| line.starts_with(BULLET_MARKERS))
        .filter(|line| !line.trim_start_matches(BULLET_MARKERS).trim().is_empty())
        .take(2)
        .map(str::to_string)
        .collect()
}

/// `- ` followed by the first `max_chars` characters of the comment.
pub fn fallback_claim(comment: &str, max_chars: usize) -> String {
    format!("- {}", truncate_chars(comment.trim(), max_chars))
}

pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_only_bullet_lines() {
        let text = "Here you go:\n- Rosters change weekly\n  * Overtime unpaid\nThanks";
        assert_eq!(
            parse_bullets(text),
            vec!["- Rosters change weekly", "* Overtime unpaid"]
        );
    }

    #[test]
    fn bare_markers_are_ignored() {
        assert!(parse_bullets("-\n- \nnone").is_empty());
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(fallback_claim("  short ", 150), "- short");
    }
}
