//! Sub-topic clustering of claim embeddings with adaptive K.

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{info, warn};

use crate::{
    config::PipelineConfig,
    error::{InsightError, Result},
    nlp::keywords::KeywordExtractor,
};

/// One sub-topic: its member claims plus presentation extracts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterRecord {
    /// Label assigned by the partitioner; not stable across runs.
    pub id: usize,
    pub members: Vec<String>,
    pub examples: Vec<String>,
    pub keywords: Vec<String>,
}

impl ClusterRecord {
    pub fn size(&self) -> usize {
        self.members.len()
    }
}

/// Why the engine kept the whole batch as one cluster.
#[derive(Debug, Clone, PartialEq)]
pub enum FallbackReason {
    TooFewItems { count: usize, minimum: usize },
    CapabilityUnavailable,
    EmbeddingFailed(String),
    ClusteringFailed(String),
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooFewItems { count, minimum } => {
                write!(f, "{count} claims is below the clustering minimum of {minimum}")
            }
            Self::CapabilityUnavailable => f.write_str("no clustering backend available"),
            Self::EmbeddingFailed(err) => write!(f, "embedding failed: {err}"),
            Self::ClusteringFailed(err) => write!(f, "clustering failed: {err}"),
        }
    }
}

/// Outcome of [`ClusterEngine::cluster`].
#[derive(Debug, Clone, PartialEq)]
pub enum ClusteredResult {
    /// Clusters sorted by descending size; empty when there were no claims.
    Partitioned(Vec<ClusterRecord>),
    /// Every claim in one cluster.
    SingleFallback {
        cluster: ClusterRecord,
        reason: FallbackReason,
    },
}

impl ClusteredResult {
    pub fn clusters(&self) -> &[ClusterRecord] {
        match self {
            Self::Partitioned(clusters) => clusters,
            Self::SingleFallback { cluster, .. } => std::slice::from_ref(cluster),
        }
    }

    pub fn into_clusters(self) -> Vec<ClusterRecord> {
        match self {
            Self::Partitioned(clusters) => clusters,
            Self::SingleFallback { cluster, .. } => vec![cluster],
        }
    }

    pub fn fallback_reason(&self) -> Option<&FallbackReason> {
        match self {
            Self::Partitioned(_) => None,
            Self::SingleFallback { reason, .. } => Some(reason),
        }
    }
}

/// Assigns each vector a label in `0..k`.
pub trait Partitioner: Send + Sync {
    fn assign(&self, vectors: &[Vec<f32>], k: usize, seed: u64) -> Result<Vec<usize>>;
}

/// K-means with k-means++ initialisation from `linfa-clustering`.
#[cfg(feature = "clustering")]
#[derive(Debug, Clone)]
pub struct KMeansPartitioner {
    pub max_iterations: u64,
    pub tolerance: f64,
    pub n_runs: usize,
}

#[cfg(feature = "clustering")]
impl Default for KMeansPartitioner {
    fn default() -> Self {
        Self {
            max_iterations: 300,
            tolerance: 1e-4,
            n_runs: 10,
        }
    }
}

#[cfg(feature = "clustering")]
impl Partitioner for KMeansPartitioner {
    fn assign(&self, vectors: &[Vec<f32>], k: usize, seed: u64) -> Result<Vec<usize>> {
        use linfa::{dataset::AsTargets, traits::Fit, traits::Predict, DatasetBase};
        use linfa_clustering::KMeans;
        use ndarray::Array2;
        use rand::{rngs::StdRng, SeedableRng};

        let rows = vectors.len();
        let dim = vectors.first().map(Vec::len).unwrap_or(0);
        let flat: Vec<f64> = vectors
            .iter()
            .flat_map(|v| v.iter().map(|&x| x as f64))
            .collect();
        if flat.iter().any(|x| !x.is_finite()) {
            return Err(InsightError::Clustering("non-finite embedding value".into()));
        }
        let data = Array2::from_shape_vec((rows, dim), flat)
            .map_err(|e| InsightError::Clustering(e.to_string()))?;
        let dataset = DatasetBase::from(data);

        let model = KMeans::params_with_rng(k, StdRng::seed_from_u64(seed))
            .max_n_iterations(self.max_iterations)
            .tolerance(self.tolerance)
            .n_runs(self.n_runs)
            .fit(&dataset)
            .map_err(|e| InsightError::Clustering(format!("k-means fit failed: {e}")))?;
        let predictions = model.predict(&dataset);
        Ok(predictions.as_targets().iter().copied().collect())
    }
}

/// Thresholds and extract sizes for clustering.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterSettings {
    pub min_items: usize,
    pub points_per_cluster: usize,
    pub max_clusters: usize,
    pub examples: usize,
    pub keywords: usize,
    pub seed: u64,
}

impl Default for ClusterSettings {
    fn default() -> Self {
        Self::from(&PipelineConfig::default())
    }
}

impl From<&PipelineConfig> for ClusterSettings {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            min_items: config.min_cluster_summaries,
            points_per_cluster: config.min_points_per_cluster,
            max_clusters: config.max_clusters,
            examples: config.examples_per_cluster,
            keywords: config.keywords_per_cluster,
            seed: config.kmeans_seed,
        }
    }
}

/// K for `n` items: `n / points_per_cluster` bounded to `[2, max_clusters]`,
/// then never more than `n`.
pub fn choose_k(n: usize, settings: &ClusterSettings) -> usize {
    let proposed = n / settings.points_per_cluster.max(1);
    let mut k = proposed.min(settings.max_clusters).max(2);
    if k > n {
        k = n;
    }
    k
}

/// Partitions claims into sub-topics, degrading to a single cluster.
pub struct ClusterEngine {
    partitioner: Option<Box<dyn Partitioner>>,
    settings: ClusterSettings,
    keywords: KeywordExtractor,
}

impl ClusterEngine {
    /// Engine backed by the compiled-in partitioner, if any.
    pub fn new(settings: ClusterSettings, keywords: KeywordExtractor) -> Self {
        #[cfg(feature = "clustering")]
        let partitioner: Option<Box<dyn Partitioner>> = Some(Box::new(KMeansPartitioner::default()));
        #[cfg(not(feature = "clustering"))]
        let partitioner: Option<Box<dyn Partitioner>> = None;
        Self {
            partitioner,
            settings,
            keywords,
        }
    }

    pub fn with_partitioner(mut self, partitioner: Box<dyn Partitioner>) -> Self {
        self.partitioner = Some(partitioner);
        self
    }

    /// Engine that always takes the single-cluster path above the threshold.
    pub fn without_partitioner(mut self) -> Self {
        self.partitioner = None;
        self
    }

    pub fn settings(&self) -> &ClusterSettings {
        &self.settings
    }

    /// Cluster `claims` using `embeddings` from the embedding client.
    ///
    /// An embedding error is not fatal: it is recorded as the fallback reason.
    pub fn cluster(&self, claims: &[String], embeddings: Result<Vec<Vec<f32>>>) -> ClusteredResult {
        let n = claims.len();
        if n == 0 {
            return ClusteredResult::Partitioned(Vec::new());
        }
        if n < self.settings.min_items {
            return self.single(
                claims,
                FallbackReason::TooFewItems {
                    count: n,
                    minimum: self.settings.min_items,
                },
            );
        }
        let vectors = match embeddings {
            Ok(vectors) if vectors.len() == n => vectors,
            Ok(vectors) => {
                let reason = format!("{} vectors for {n} claims", vectors.len());
                return self.single(claims, FallbackReason::EmbeddingFailed(reason));
            }
            Err(err) => return self.single(claims, FallbackReason::EmbeddingFailed(err.to_string())),
        };
        let Some(partitioner) = self.partitioner.as_deref() else {
            return self.single(claims, FallbackReason::CapabilityUnavailable);
        };

        let k = choose_k(n, &self.settings);
        let labels = match partitioner.assign(&vectors, k, self.settings.seed) {
            Ok(labels) if labels.len() == n => labels,
            Ok(labels) => {
                let reason = format!("{} labels for {n} claims", labels.len());
                return self.single(claims, FallbackReason::ClusteringFailed(reason));
            }
            Err(err) => return self.single(claims, FallbackReason::ClusteringFailed(err.to_string())),
        };

        let mut grouped: IndexMap<usize, Vec<String>> = IndexMap::new();
        for (claim, label) in claims.iter().zip(labels) {
            grouped.entry(label).or_default().push(claim.clone());
        }
        let mut clusters: Vec<ClusterRecord> = grouped
            .into_iter()
            .map(|(id, members)| self.record(id, members))
            .collect();
        clusters.sort_by(|a, b| b.size().cmp(&a.size()));
        info!(claims = n, k, clusters = clusters.len(), "partitioned claims");
        ClusteredResult::Partitioned(clusters)
    }

    fn single(&self, claims: &[String], reason: FallbackReason) -> ClusteredResult {
        match &reason {
            FallbackReason::TooFewItems { .. } | FallbackReason::CapabilityUnavailable => {
                info!(claims = claims.len(), %reason, "keeping a single cluster")
            }
            _ => warn!(claims = claims.len(), %reason, stage = "cluster", "falling back to a single cluster"),
        }
        ClusteredResult::SingleFallback {
            cluster: self.record(0, claims.to_vec()),
            reason,
        }
    }

    fn record(&self, id: usize, members: Vec<String>) -> ClusterRecord {
        ClusterRecord {
            id,
            examples: members.iter().take(self.settings.examples).cloned().collect(),
            keywords: self.keywords.top(members.as_slice(), self.settings.keywords),
            members,
        }
    }
}
