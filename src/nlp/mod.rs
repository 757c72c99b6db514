//! Text processing stages: sampling, claims, embeddings, clusters, synthesis.
//! `digest` is the single-call alternative to the clustered stages.

pub mod claims;
pub mod clusters;
pub mod digest;
pub mod embeddings;
pub mod keywords;
pub mod sampler;
pub mod structured;
pub mod synthesis;

pub use claims::{ClaimSettings, ClaimSummarizer};
pub use clusters::{ClusterEngine, ClusterRecord, ClusterSettings, ClusteredResult, FallbackReason};
pub use digest::{DigestSettings, DigestSynthesizer};
pub use embeddings::EmbeddingClient;
pub use keywords::KeywordExtractor;
pub use structured::SentimentInsight;
pub use synthesis::{InsightSynthesizer, SynthesisSettings};
