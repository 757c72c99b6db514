use theme_insights::{
    error::{InsightError, Result},
    nlp::{
        clusters::{choose_k, Partitioner},
        ClusterEngine, ClusterSettings, ClusteredResult, FallbackReason, KeywordExtractor,
    },
};

/// Labels by the dominant axis so tests do not depend on k-means.
struct AxisPartitioner;

impl Partitioner for AxisPartitioner {
    fn assign(&self, vectors: &[Vec<f32>], _k: usize, _seed: u64) -> Result<Vec<usize>> {
        Ok(vectors
            .iter()
            .map(|v| usize::from(v[1] > v[0]))
            .collect())
    }
}

struct BrokenPartitioner;

impl Partitioner for BrokenPartitioner {
    fn assign(&self, _vectors: &[Vec<f32>], _k: usize, _seed: u64) -> Result<Vec<usize>> {
        Err(InsightError::Clustering("singular matrix".into()))
    }
}

fn engine() -> ClusterEngine {
    ClusterEngine::new(ClusterSettings::default(), KeywordExtractor::default())
}

fn claims(pay: usize, other: usize) -> (Vec<String>, Vec<Vec<f32>>) {
    let mut texts = Vec::new();
    let mut vectors = Vec::new();
    for i in 0..other {
        texts.push(format!("- Workload spikes in sprint {i}"));
        vectors.push(vec![0.0, 1.0]);
    }
    for i in 0..pay {
        texts.push(format!("- Pay freeze hurts morale {i}"));
        vectors.push(vec![1.0, 0.0]);
    }
    (texts, vectors)
}

#[test]
fn k_is_bounded_by_thresholds() {
    let settings = ClusterSettings::default();
    assert_eq!(choose_k(12, &settings), 2);
    assert_eq!(choose_k(40, &settings), 2);
    assert_eq!(choose_k(60, &settings), 3);
    assert_eq!(choose_k(300, &settings), 5);
    let tiny = ClusterSettings {
        points_per_cluster: 1,
        max_clusters: 10,
        ..settings
    };
    assert_eq!(choose_k(1, &tiny), 1);
}

#[test]
fn partitions_are_sorted_largest_first() {
    let (texts, vectors) = claims(15, 5);
    let result = engine()
        .with_partitioner(Box::new(AxisPartitioner))
        .cluster(&texts, Ok(vectors));

    let ClusteredResult::Partitioned(clusters) = result else {
        panic!("expected a partition");
    };
    assert_eq!(clusters.iter().map(|c| c.size()).collect::<Vec<_>>(), vec![15, 5]);
    assert_eq!(clusters[0].keywords[..3], ["pay", "freeze", "hurts"]);
    assert_eq!(clusters[0].examples.len(), 5);
    assert_eq!(clusters[0].examples[0], "- Pay freeze hurts morale 0");
}

#[test]
fn below_threshold_keeps_single_cluster() {
    let (texts, vectors) = claims(3, 3);
    let result = engine().cluster(&texts, Ok(vectors));
    assert_eq!(
        result.fallback_reason(),
        Some(&FallbackReason::TooFewItems { count: 6, minimum: 12 })
    );
    assert_eq!(result.clusters().len(), 1);
    assert_eq!(result.clusters()[0].members, texts);
}

#[test]
fn missing_partitioner_is_not_fatal() {
    let (texts, vectors) = claims(10, 10);
    let result = engine().without_partitioner().cluster(&texts, Ok(vectors));
    assert_eq!(result.fallback_reason(), Some(&FallbackReason::CapabilityUnavailable));
    assert_eq!(result.clusters()[0].size(), 20);
}

#[test]
fn runtime_failures_degrade_to_single_cluster() {
    let (texts, vectors) = claims(10, 10);
    let broken = engine()
        .with_partitioner(Box::new(BrokenPartitioner))
        .cluster(&texts, Ok(vectors.clone()));
    assert!(matches!(
        broken.fallback_reason(),
        Some(FallbackReason::ClusteringFailed(_))
    ));

    let short = engine().cluster(&texts, Ok(vectors[..5].to_vec()));
    assert!(matches!(
        short.fallback_reason(),
        Some(FallbackReason::EmbeddingFailed(_))
    ));

    let failed = engine().cluster(&texts, Err(InsightError::Embedding("timeout".into())));
    assert_eq!(failed.into_clusters()[0].size(), 20);
}

#[test]
fn empty_batch_has_no_clusters() {
    let result = engine().cluster(&[], Ok(Vec::new()));
    assert!(result.clusters().is_empty());
    assert!(result.fallback_reason().is_none());
}

#[cfg(feature = "clustering")]
#[test]
fn kmeans_separates_distinct_topics() {
    let (texts, vectors) = claims(20, 20);
    let result = engine().cluster(&texts, Ok(vectors));
    let ClusteredResult::Partitioned(clusters) = result else {
        panic!("expected k-means partition");
    };
    assert_eq!(clusters.len(), 2);
    assert_eq!(clusters.iter().map(|c| c.size()).sum::<usize>(), 40);
    for cluster in &clusters {
        let pay = cluster.members.iter().filter(|m| m.contains("Pay")).count();
        assert!(pay == 0 || pay == cluster.size());
    }
}
