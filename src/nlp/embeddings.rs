//! Batched claim embeddings via the embedding capability.

use tracing::info;

use crate::{
    error::{InsightError, Result},
    llm::Embedder,
};

/// Sends a claim set to the embedding capability in one call.
pub struct EmbeddingClient<'a> {
    embedder: &'a dyn Embedder,
    model: String,
}

impl<'a> EmbeddingClient<'a> {
    pub fn new(embedder: &'a dyn Embedder, model: impl Into<String>) -> Self {
        Self {
            embedder,
            model: model.into(),
        }
    }

    /// One vector per text, in order. Empty input makes no call.
    ///
    /// Count or dimension mismatches are errors; vectors are never invented.
    pub async fn embed_all(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let vectors = self.embedder.embed(&self.model, texts).await?;
        if vectors.len() != texts.len() {
            return Err(InsightError::Embedding(format!(
                "expected {} vectors, received {}",
                texts.len(),
                vectors.len()
            )));
        }
        let dim = vectors[0].len();
        if dim == 0 || vectors.iter().any(|v| v.len() != dim) {
            return Err(InsightError::Embedding(
                "vectors have inconsistent or zero dimension".into(),
            ));
        }
        info!(model = %self.model, count = vectors.len(), dim, "embedded claims");
        Ok(vectors)
    }
}
