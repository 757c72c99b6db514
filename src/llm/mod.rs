//! Text-generation and embedding capabilities consumed by the pipeline.

pub mod openai;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::Result;

/// One instruction sent to the text-generation capability.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationRequest {
    pub model: String,
    pub system: String,
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Accepts a prompt and returns free text. May fail or time out.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<String>;
}

/// Returns one fixed-length vector per input string, in input order.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, model: &str, inputs: &[String]) -> Result<Vec<Vec<f32>>>;
}
