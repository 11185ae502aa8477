//! Aggregate statistics and top-N selection over a ranked result

use crate::rank::{MatchLevel, ScoredJobPosting};
use serde::Serialize;

/// Aggregate match statistics for one ranking result
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MatchStatistics {
    pub total: usize,
    pub average_score: f64,
    pub top_score: f64,
    pub excellent: usize,
    pub good: usize,
    pub fair: usize,
    pub low: usize,
}

/// Derive aggregate statistics from a ranked list; all fields are zero for
/// an empty input.
pub fn statistics(ranked: &[ScoredJobPosting]) -> MatchStatistics {
    if ranked.is_empty() {
        return MatchStatistics::default();
    }

    let mut stats = MatchStatistics {
        total: ranked.len(),
        ..MatchStatistics::default()
    };
    for scored in ranked {
        stats.average_score += scored.similarity_score;
        stats.top_score = stats.top_score.max(scored.similarity_score);
        match scored.match_level {
            MatchLevel::Excellent => stats.excellent += 1,
            MatchLevel::Good => stats.good += 1,
            MatchLevel::Fair => stats.fair += 1,
            MatchLevel::Low => stats.low += 1,
        }
    }
    stats.average_score /= ranked.len() as f64;
    stats
}

/// Select up to `top_n` postings scoring at least `min_score`.
///
/// Assumes `ranked` is already sorted descending by score; no re-sort is
/// performed.
pub fn top_recommendations(
    ranked: &[ScoredJobPosting],
    top_n: usize,
    min_score: f64,
) -> Vec<ScoredJobPosting> {
    ranked
        .iter()
        .filter(|scored| scored.similarity_score >= min_score)
        .take(top_n)
        .cloned()
        .collect()
}
