mod common;

use common::StubGenerator;
use theme_insights::{
    data::comments::{Sentiment, ThemeKey, ThemeKind},
    nlp::{
        synthesis::{render_cluster, render_clusters},
        ClusterRecord, InsightSynthesizer, SynthesisSettings,
    },
};

fn cluster(id: usize, members: &[&str], keywords: &[&str]) -> ClusterRecord {
    ClusterRecord {
        id,
        members: members.iter().map(|m| m.to_string()).collect(),
        examples: members.iter().take(5).map(|m| m.to_string()).collect(),
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
    }
}

fn theme() -> ThemeKey {
    ThemeKey::new(ThemeKind::Base, "Compensation")
}

#[test]
fn cluster_block_lists_size_keywords_and_examples() {
    let record = cluster(2, &["- a", "- b", "- c", "- d"], &["pay", "bonus"]);
    assert_eq!(
        render_cluster(&record, 3),
        "Sub-topic 2 (approx. 4 comments)\n  Keywords: pay, bonus\n  Example summaries:\n    - a\n    - b\n    - c"
    );
}

#[test]
fn empty_keywords_render_placeholder_and_blocks_are_separated() {
    let blocks = render_clusters(&[cluster(0, &["- a"], &[]), cluster(1, &["- b"], &["x"])], 3);
    assert!(blocks.contains("  Keywords: N/A"));
    assert_eq!(blocks.matches("\n\nSub-topic ").count(), 1);
}

#[tokio::test]
async fn no_clusters_or_comments_skip_the_call() {
    let generator = StubGenerator::default();
    let synthesizer = InsightSynthesizer::new(&generator, SynthesisSettings::new("stub-chat"));

    let none = synthesizer.synthesize(&theme(), Sentiment::Positive, &[], 10).await;
    let zero = synthesizer
        .synthesize(&theme(), Sentiment::Positive, &[cluster(0, &["- a"], &[])], 0)
        .await;

    assert!(none.is_empty());
    assert!(zero.is_empty());
    assert!(generator.prompts().is_empty());
}

#[tokio::test]
async fn parses_wrapped_json_and_caps_recommendations() {
    let generator = StubGenerator::default();
    let synthesizer = InsightSynthesizer::new(&generator, SynthesisSettings::new("stub-chat"));
    let clusters = [cluster(0, &["- big"; 6], &["pay"]), cluster(1, &["- small"], &[])];

    let insight = synthesizer
        .synthesize(&theme(), Sentiment::Negative, &clusters, 42)
        .await;

    assert_eq!(insight.summary, "Pay bands lag the market by two cycles.");
    assert_eq!(
        insight.recommendations,
        vec![
            "Publish pay bands by Q3",
            "Run an annual market benchmark",
            "Cap review cycles at 6 weeks"
        ]
    );
    let prompt = &generator.prompts()[0];
    assert!(prompt.contains("approximately 42 negative comments"));
    assert!(prompt.find("Sub-topic 0").unwrap() < prompt.find("Sub-topic 1").unwrap());
    assert_eq!(prompt.matches("    - big").count(), 3);
}

#[tokio::test]
async fn prose_reply_becomes_summary() {
    let generator = StubGenerator::replying("Staff value the bonus scheme.");
    let synthesizer = InsightSynthesizer::new(&generator, SynthesisSettings::new("stub-chat"));

    let insight = synthesizer
        .synthesize(&theme(), Sentiment::Positive, &[cluster(0, &["- a"], &[])], 1)
        .await;

    assert_eq!(insight.summary, "Staff value the bonus scheme.");
    assert!(insight.recommendations.is_empty());
}

#[tokio::test]
async fn failed_call_returns_empty_insight() {
    let generator = StubGenerator::failing_insights();
    let synthesizer = InsightSynthesizer::new(&generator, SynthesisSettings::new("stub-chat"));

    let insight = synthesizer
        .synthesize(&theme(), Sentiment::Positive, &[cluster(0, &["- a"], &[])], 1)
        .await;

    assert!(insight.is_empty());
}
