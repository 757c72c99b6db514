use std::collections::HashSet;

use proptest::prelude::*;
use theme_insights::nlp::KeywordExtractor;

#[test]
fn ranks_by_frequency_with_first_seen_ties() {
    let texts = [
        "Roster changes ruin sleep",
        "Sleep debt from roster swaps",
        "Overtime and roster pressure",
    ];
    let top = KeywordExtractor::default().top(&texts, 3);
    assert_eq!(top, vec!["roster", "sleep", "changes"]);
}

#[test]
fn drops_stop_words_short_tokens_and_digits() {
    let texts = ["The manager at Rio Tinto said we go 24x7 on site, OK?"];
    let top = KeywordExtractor::default().top(&texts, 10);
    assert_eq!(top, vec!["said"]);
}

#[test]
fn extra_exclusions_are_case_insensitive() {
    let extractor = KeywordExtractor::with_exclusions(["  Roster "]);
    assert!(extractor.is_stop_word("roster"));
    let top = extractor.top(&["roster fatigue"], 5);
    assert_eq!(top, vec!["fatigue"]);
}

#[test]
fn small_vocabulary_returns_fewer_than_k() {
    let empty: [&str; 0] = [];
    assert!(KeywordExtractor::default().top(&empty, 8).is_empty());
    assert_eq!(KeywordExtractor::default().top(&["bonus"], 8), vec!["bonus"]);
}

fn assert_clean(top: &[String], k: usize) -> Result<(), TestCaseError> {
    let extractor = KeywordExtractor::default();
    prop_assert!(top.len() <= k);
    for token in top {
        prop_assert!(token.len() >= 3, "short token {token:?}");
        prop_assert!(token.chars().all(|c| c.is_ascii_lowercase()), "token {token:?}");
        prop_assert!(!extractor.is_stop_word(token), "stop word {token:?}");
    }
    let unique: HashSet<&String> = top.iter().collect();
    prop_assert_eq!(unique.len(), top.len());
    Ok(())
}

proptest! {
    #[test]
    fn arbitrary_text_yields_only_clean_keywords(
        texts in prop::collection::vec(any::<String>(), 0..8),
        k in 0usize..20,
    ) {
        let top = KeywordExtractor::default().top(texts.as_slice(), k);
        assert_clean(&top, k)?;
    }

    #[test]
    fn stop_word_heavy_text_yields_only_clean_keywords(
        words in prop::collection::vec(
            prop::sample::select(vec![
                "The", "and", "COMPANY", "work", "roster", "we", "Pay", "a1b2", "it's",
                "fatigue", "Manager", "x", "ok", "camp", "site", "overtime",
            ]),
            0..60,
        ),
        k in 0usize..20,
    ) {
        let text = words.join(" ");
        let top = KeywordExtractor::default().top(&[text], k);
        assert_clean(&top, k)?;
    }
}
