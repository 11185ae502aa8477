//! Phrase enrichment via frequent n-grams
//!
//! Appends the most frequent multi-word token sequences back onto the
//! normalized text so the weighting step assigns recurring concepts an
//! importance proportional to their repeated presence. A cheap proxy for
//! phrase detection without a separate phrase model.

use crate::text::TextNormalizer;
use std::collections::HashMap;

/// Normalize `text` and append its most frequent n-grams.
///
/// Generates contiguous `n`-grams over the normalized token sequence, counts
/// them, and appends up to `top` of the most frequent (ties broken by first
/// appearance) space-joined to the normalized text. Empty input yields an
/// empty string.
pub fn enrich(normalizer: &TextNormalizer, text: &str, n: usize, top: usize) -> String {
    let tokens = normalizer.tokens(text);
    if tokens.is_empty() {
        return String::new();
    }

    let normalized = tokens.join(" ");
    if n < 2 || top == 0 || tokens.len() < n {
        return normalized;
    }

    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
    for (pos, window) in tokens.windows(n).enumerate() {
        let gram = window.join(" ");
        let entry = counts.entry(gram).or_insert((0, pos));
        entry.0 += 1;
    }

    let mut grams: Vec<(String, usize, usize)> = counts
        .into_iter()
        .map(|(gram, (count, first_seen))| (gram, count, first_seen))
        .collect();
    grams.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.2.cmp(&b.2)));
    grams.truncate(top);

    let mut enriched = normalized;
    for (gram, _, _) in grams {
        enriched.push(' ');
        enriched.push_str(&gram);
    }
    enriched
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> TextNormalizer {
        TextNormalizer::new(false)
    }

    #[test]
    fn test_enrich_empty_input() {
        assert_eq!(enrich(&normalizer(), "", 2, 10), "");
        assert_eq!(enrich(&normalizer(), "the and of", 2, 10), "");
    }

    #[test]
    fn test_enrich_appends_most_frequent_bigram() {
        let text = "machine learning systems machine learning pipelines machine learning";
        let enriched = enrich(&normalizer(), text, 2, 1);
        assert!(enriched.ends_with(" machine learning"));
        assert!(enriched.starts_with("machine learning systems"));
    }

    #[test]
    fn test_enrich_ties_broken_by_first_seen() {
        // every bigram occurs exactly once; ties resolve in order of appearance
        let enriched = enrich(&normalizer(), "alpha beta gamma delta", 2, 2);
        assert_eq!(enriched, "alpha beta gamma delta alpha beta beta gamma");
    }

    #[test]
    fn test_enrich_short_text_returns_normalized() {
        let enriched = enrich(&normalizer(), "python", 2, 10);
        assert_eq!(enriched, "python");
    }

    #[test]
    fn test_enrich_caps_phrase_count() {
        let text = "one two three four five six seven eight nine ten eleven twelve \
                    thirteen fourteen fifteen sixteen";
        let enriched = enrich(&normalizer(), text, 2, 10);
        let normalized = normalizer().normalize(text);
        let appended = enriched.strip_prefix(normalized.as_str()).unwrap();
        // 10 bigrams of 2 tokens each appended after the normalized text
        assert_eq!(appended.split_whitespace().count(), 20);
    }
}
