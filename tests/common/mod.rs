//! Deterministic stand-ins for the generation and embedding endpoints.
#![allow(dead_code)]

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Mutex,
};

use async_trait::async_trait;
use theme_insights::{
    data::source::CommentRow,
    error::{InsightError, Result},
    llm::{Embedder, GenerationRequest, TextGenerator},
};

pub const INSIGHT_JSON: &str = r#"Here you go:
{"summary": "Pay bands lag the market by two cycles.", "recommendations": ["Publish pay bands by Q3", "Run an annual market benchmark", "Cap review cycles at 6 weeks", "Extra"]}"#;

/// Echoes each comment back as a single bullet; answers insight prompts
/// with a fixed JSON payload.
#[derive(Default)]
pub struct StubGenerator {
    pub requests: Mutex<Vec<GenerationRequest>>,
    pub fail_claims: bool,
    pub fail_insights: bool,
    pub insight_reply: Option<String>,
    pub claim_reply: Option<String>,
}

impl StubGenerator {
    pub fn failing_claims() -> Self {
        Self {
            fail_claims: true,
            ..Self::default()
        }
    }

    pub fn failing_insights() -> Self {
        Self {
            fail_insights: true,
            ..Self::default()
        }
    }

    pub fn replying(reply: &str) -> Self {
        Self {
            insight_reply: Some(reply.to_string()),
            ..Self::default()
        }
    }

    pub fn claim_replying(reply: &str) -> Self {
        Self {
            claim_reply: Some(reply.to_string()),
            ..Self::default()
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.prompt.clone())
            .collect()
    }

    pub fn insight_prompts(&self) -> Vec<String> {
        self.prompts()
            .into_iter()
            .filter(|p| is_insight_prompt(p))
            .collect()
    }

    pub fn claim_calls(&self) -> usize {
        self.prompts().iter().filter(|p| !is_insight_prompt(p)).count()
    }
}

pub fn is_insight_prompt(prompt: &str) -> bool {
    prompt.contains("Output JSON")
}

/// Text between the first pair of triple quotes.
pub fn quoted_feedback(prompt: &str) -> Option<&str> {
    let start = prompt.find("\"\"\"")? + 3;
    let len = prompt[start..].find("\"\"\"")?;
    Some(&prompt[start..start + len])
}

#[async_trait]
impl TextGenerator for StubGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        self.requests.lock().unwrap().push(request.clone());
        if is_insight_prompt(&request.prompt) {
            if self.fail_insights {
                return Err(InsightError::Generation("stub insight outage".into()));
            }
            return Ok(self
                .insight_reply
                .clone()
                .unwrap_or_else(|| INSIGHT_JSON.to_string()));
        }
        if self.fail_claims {
            return Err(InsightError::Generation("stub claim outage".into()));
        }
        if let Some(reply) = &self.claim_reply {
            return Ok(reply.clone());
        }
        let feedback = quoted_feedback(&request.prompt).unwrap_or_default();
        Ok(format!("- {feedback}"))
    }
}

/// Two well-separated directions: texts mentioning pay vs everything else.
#[derive(Default)]
pub struct StubEmbedder {
    pub calls: AtomicUsize,
    pub fail: bool,
}

impl StubEmbedder {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

pub fn stub_vector(text: &str) -> Vec<f32> {
    let jitter = (text.len() % 7) as f32 * 0.01;
    if text.to_lowercase().contains("pay") {
        vec![1.0, jitter, 0.0]
    } else {
        vec![jitter, 1.0, 0.0]
    }
}

#[async_trait]
impl Embedder for StubEmbedder {
    async fn embed(&self, _model: &str, inputs: &[String]) -> Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(InsightError::Embedding("stub embedding outage".into()));
        }
        Ok(inputs.iter().map(|text| stub_vector(text)).collect())
    }
}

pub fn row(content: &str, sentiment: Option<&str>, likes: Option<i64>, base: &str, sub: &str) -> CommentRow {
    CommentRow {
        content: content.to_string(),
        sentiment: sentiment.map(str::to_string),
        likes,
        base_theme: Some(base.to_string()),
        sub_theme: Some(sub.to_string()),
    }
}

/// `count` labelled comments alternating between pay and workload topics.
pub fn mixed_rows(count: usize, sentiment: &str, base: &str, sub: &str) -> Vec<CommentRow> {
    (0..count)
        .map(|i| {
            let text = if i % 2 == 0 {
                format!("Pay raise number {i} was delayed again")
            } else {
                format!("Workload in sprint {i} kept growing with deadlines")
            };
            row(&text, Some(sentiment), None, base, sub)
        })
        .collect()
}
