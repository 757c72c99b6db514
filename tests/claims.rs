mod common;

use common::StubGenerator;
use theme_insights::{
    data::comments::{Sentiment, ThemeKey, ThemeKind},
    nlp::{claims::parse_bullets, ClaimSettings, ClaimSummarizer},
};

fn theme() -> ThemeKey {
    ThemeKey::new(ThemeKind::Sub, "fifo_roster")
}

#[tokio::test]
async fn echoes_feedback_as_single_claim() {
    let generator = StubGenerator::default();
    let summarizer = ClaimSummarizer::new(&generator, ClaimSettings::new("stub-chat"));

    let claims = summarizer
        .summarize("Two weeks on, one off is brutal", Sentiment::Negative, &theme())
        .await;

    assert_eq!(claims, vec!["- Two weeks on, one off is brutal"]);
    let requests = generator.requests.lock().unwrap();
    assert_eq!(requests[0].model, "stub-chat");
    assert_eq!(requests[0].max_tokens, 120);
    assert!(requests[0].prompt.contains("negative employee feedback about \"fifo_roster\" (sub_theme)"));
}

#[tokio::test]
async fn long_comments_are_cut_before_prompting() {
    let generator = StubGenerator::default();
    let summarizer = ClaimSummarizer::new(&generator, ClaimSettings::new("stub-chat"));
    let comment = "é".repeat(1500);

    let claims = summarizer.summarize(&comment, Sentiment::Positive, &theme()).await;

    assert_eq!(claims[0].chars().count(), 1002);
}

#[tokio::test]
async fn failed_call_yields_truncated_comment() {
    let generator = StubGenerator::failing_claims();
    let summarizer = ClaimSummarizer::new(&generator, ClaimSettings::new("stub-chat"));
    let comment = "x".repeat(400);

    let claims = summarizer.summarize(&comment, Sentiment::Positive, &theme()).await;

    assert_eq!(claims, vec![format!("- {}", "x".repeat(150))]);
}

#[tokio::test]
async fn prose_reply_without_bullets_yields_truncated_comment() {
    let generator =
        StubGenerator::claim_replying("The employee feels rosters change too often and overtime goes unpaid.");
    let summarizer = ClaimSummarizer::new(&generator, ClaimSettings::new("stub-chat"));
    let comment = format!("  {}  ", "Rosters shift every week ".repeat(10));

    let claims = summarizer.summarize(&comment, Sentiment::Negative, &theme()).await;

    let expected: String = comment.trim().chars().take(150).collect();
    assert_eq!(claims, vec![format!("- {expected}")]);
    assert_eq!(generator.claim_calls(), 1);
}

#[tokio::test]
async fn summarize_all_keeps_comment_order() {
    let generator = StubGenerator::default();
    let summarizer = ClaimSummarizer::new(&generator, ClaimSettings::new("stub-chat"));
    let comments: Vec<String> = (0..25).map(|i| format!("comment {i}")).collect();

    let claims = summarizer.summarize_all(&comments, Sentiment::Positive, &theme()).await;

    assert_eq!(claims.len(), 25);
    assert_eq!(claims[24], "- comment 24");
}

#[test]
fn at_most_two_bullets_survive() {
    let text = "- one\n- two\n- three";
    assert_eq!(parse_bullets(text), vec!["- one", "- two"]);
}
