//! TF-IDF vector space over a resume and a batch of job postings
//!
//! The weighting model is fitted over the resume plus all job texts of a
//! request (row 0 is always the resume), with sub-linear term-frequency
//! scaling, smoothed inverse document frequency, document-frequency bounds,
//! unigram+bigram features and a hard vocabulary cap. A previously fitted
//! model is reused opportunistically through an injectable [`cache::ModelCache`].

pub mod cache;
pub mod reduce;

use crate::config::RankerConfig;
use crate::error::Result;
use cache::ModelCache;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, warn};

/// Minimum share of the current corpus vocabulary a cached model must cover
/// to be reused; below this the vocabulary has drifted too far and a fresh
/// fit runs instead.
const MIN_CACHE_COVERAGE: f64 = 0.5;

/// Weighting-model hyperparameters.
///
/// The fingerprint over these fields guards cache reuse: a cached model
/// fitted under different parameters is treated as a miss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfConfig {
    /// Ignore terms present in fewer than this fraction of documents
    pub min_df: f64,
    /// Ignore terms present in more than this fraction of documents
    pub max_df: f64,
    /// Smallest n-gram length used as a feature
    pub ngram_min: usize,
    /// Largest n-gram length used as a feature
    pub ngram_max: usize,
    /// Hard cap on vocabulary size
    pub max_features: usize,
    /// Scale term frequency as `1 + ln(tf)`
    pub sublinear_tf: bool,
}

impl Default for TfidfConfig {
    fn default() -> Self {
        TfidfConfig {
            min_df: 0.01,
            max_df: 0.95,
            ngram_min: 1,
            ngram_max: 2,
            max_features: 5000,
            sublinear_tf: true,
        }
    }
}

impl TfidfConfig {
    pub fn from_ranker(config: &RankerConfig) -> Self {
        TfidfConfig {
            min_df: config.min_df,
            max_df: config.max_df,
            ngram_min: 1,
            ngram_max: config.ngram_max,
            max_features: config.max_features,
            sublinear_tf: true,
        }
    }

    /// Stable hex fingerprint of the hyperparameters
    pub fn fingerprint(&self) -> String {
        let serialized = serde_json::to_vec(self).unwrap_or_default();
        hex::encode(Sha256::digest(&serialized))
    }
}

/// A fitted TF-IDF weighting model: vocabulary, per-term inverse document
/// frequencies, and the config fingerprint it was fitted under.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfModel {
    pub fingerprint: String,
    /// Term to column index; columns are assigned in lexicographic term order
    pub vocabulary: BTreeMap<String, usize>,
    /// Column index to inverse document frequency
    pub idf: Vec<f64>,
    pub fitted_at: DateTime<Utc>,
}

impl TfidfModel {
    /// Fit a weighting model over whitespace-tokenized documents
    pub fn fit(config: &TfidfConfig, documents: &[String]) -> Self {
        let n_docs = documents.len();
        let mut doc_freq: HashMap<String, usize> = HashMap::new();
        let mut total_freq: HashMap<String, u64> = HashMap::new();

        for doc in documents {
            let counts = ngram_counts(doc, config.ngram_min, config.ngram_max);
            for (term, count) in counts {
                *doc_freq.entry(term.clone()).or_insert(0) += 1;
                *total_freq.entry(term).or_insert(0) += count;
            }
        }

        let min_count = ((config.min_df * n_docs as f64).ceil() as usize).max(1);
        let max_count = config.max_df * n_docs as f64;

        let mut candidates: Vec<(String, u64)> = doc_freq
            .iter()
            .filter(|(_, &df)| df >= min_count && df as f64 <= max_count)
            .map(|(term, _)| (term.clone(), total_freq[term]))
            .collect();

        if candidates.len() > config.max_features {
            // keep the most frequent terms; lexicographic order on ties for
            // deterministic vocabularies
            candidates.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
            candidates.truncate(config.max_features);
        }

        let mut terms: Vec<String> = candidates.into_iter().map(|(term, _)| term).collect();
        terms.sort();

        let mut vocabulary = BTreeMap::new();
        let mut idf = Vec::with_capacity(terms.len());
        for (column, term) in terms.into_iter().enumerate() {
            let df = doc_freq[&term] as f64;
            idf.push(((1.0 + n_docs as f64) / (1.0 + df)).ln() + 1.0);
            vocabulary.insert(term, column);
        }

        TfidfModel {
            fingerprint: config.fingerprint(),
            vocabulary,
            idf,
            fitted_at: Utc::now(),
        }
    }

    /// Transform one document into an L2-normalized weight vector
    pub fn transform(&self, document: &str, config: &TfidfConfig) -> Vec<f64> {
        let mut vector = vec![0.0; self.vocabulary.len()];
        if vector.is_empty() {
            return vector;
        }

        for (term, count) in ngram_counts(document, config.ngram_min, config.ngram_max) {
            if let Some(&column) = self.vocabulary.get(&term) {
                let tf = if config.sublinear_tf {
                    1.0 + (count as f64).ln()
                } else {
                    count as f64
                };
                vector[column] = tf * self.idf[column];
            }
        }

        let norm = vector.iter().map(|w| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for w in &mut vector {
                *w /= norm;
            }
        }
        vector
    }

    /// Fraction of the corpus's distinct candidate terms present in this
    /// model's vocabulary
    pub fn coverage(&self, documents: &[String], config: &TfidfConfig) -> f64 {
        let mut distinct: HashSet<String> = HashSet::new();
        for doc in documents {
            distinct.extend(ngram_counts(doc, config.ngram_min, config.ngram_max).into_keys());
        }
        if distinct.is_empty() {
            return 1.0;
        }
        let covered = distinct
            .iter()
            .filter(|term| self.vocabulary.contains_key(*term))
            .count();
        covered as f64 / distinct.len() as f64
    }
}

/// Count n-gram occurrences over a whitespace-tokenized document
fn ngram_counts(document: &str, ngram_min: usize, ngram_max: usize) -> HashMap<String, u64> {
    let tokens: Vec<&str> = document.split_whitespace().collect();
    let mut counts = HashMap::new();
    for n in ngram_min..=ngram_max {
        if n == 0 || tokens.len() < n {
            continue;
        }
        for window in tokens.windows(n) {
            *counts.entry(window.join(" ")).or_insert(0) += 1;
        }
    }
    counts
}

/// Cosine similarity between two weight vectors; zero when either is empty
/// or zero-magnitude
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    if a.is_empty() || b.is_empty() || a.len() != b.len() {
        return 0.0;
    }
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Builds the weighted (and optionally reduced) document matrix for one
/// ranking request, reusing a cached weighting model when compatible.
pub struct VectorSpaceBuilder<'a> {
    config: TfidfConfig,
    cache: &'a dyn ModelCache,
    cache_key: &'a str,
    reduce_dims: bool,
    max_components: usize,
}

impl<'a> VectorSpaceBuilder<'a> {
    pub fn new(
        config: TfidfConfig,
        cache: &'a dyn ModelCache,
        cache_key: &'a str,
        reduce_dims: bool,
        max_components: usize,
    ) -> Self {
        VectorSpaceBuilder {
            config,
            cache,
            cache_key,
            reduce_dims,
            max_components,
        }
    }

    /// Build one weight vector per document, in input order.
    ///
    /// Row 0 is expected to be the resume. When reduction is enabled the
    /// matrix is projected onto a reduced orthogonal basis; any failure in
    /// that step falls back to the unreduced matrix.
    #[tracing::instrument(skip(self, documents), fields(n_docs = documents.len()))]
    pub fn build(&self, documents: &[String]) -> Result<Vec<Vec<f64>>> {
        if documents.is_empty() {
            return Ok(Vec::new());
        }

        let model = self.fit_or_reuse(documents);
        let matrix: Vec<Vec<f64>> = documents
            .iter()
            .map(|doc| model.transform(doc, &self.config))
            .collect();

        if model.vocabulary.is_empty() {
            debug!("empty vocabulary after document-frequency bounds; scores will be zero");
            return Ok(matrix);
        }

        if !self.reduce_dims || documents.len() < 2 {
            return Ok(matrix);
        }

        let components = self.max_components.min(documents.len());
        match reduce::project(&matrix, components) {
            Ok(reduced) => Ok(reduced),
            Err(e) => {
                warn!(error = %e, "dimensionality reduction failed; using unreduced vectors");
                Ok(matrix)
            }
        }
    }

    fn fit_or_reuse(&self, documents: &[String]) -> TfidfModel {
        let fingerprint = self.config.fingerprint();
        if let Some(cached) = self.cache.get(self.cache_key) {
            if cached.fingerprint == fingerprint
                && cached.coverage(documents, &self.config) >= MIN_CACHE_COVERAGE
            {
                debug!(key = self.cache_key, "reusing cached weighting model");
                return cached;
            }
            debug!(
                key = self.cache_key,
                "cached weighting model incompatible; fitting fresh"
            );
        }

        let model = TfidfModel::fit(&self.config, documents);
        self.cache.put(self.cache_key, &model);
        model
    }
}

#[cfg(test)]
mod tests {
    use super::cache::NoopModelCache;
    use super::*;

    fn docs(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_fit_applies_df_bounds() {
        // "shared" appears in every document and crosses the 95% ceiling;
        // the others appear in exactly one document each
        let documents = docs(&[
            "shared python backend",
            "shared rust systems",
            "shared design figma",
        ]);
        let model = TfidfModel::fit(&TfidfConfig::default(), &documents);
        assert!(!model.vocabulary.contains_key("shared"));
        assert!(model.vocabulary.contains_key("python"));
        assert!(model.vocabulary.contains_key("figma"));
    }

    #[test]
    fn test_fit_caps_vocabulary_size() {
        let config = TfidfConfig {
            max_features: 3,
            ngram_max: 1,
            ..TfidfConfig::default()
        };
        let documents = docs(&[
            "alpha alpha alpha beta beta gamma delta",
            "epsilon zeta eta",
        ]);
        let model = TfidfModel::fit(&config, &documents);
        assert_eq!(model.vocabulary.len(), 3);
        // "alpha" and "beta" are the most frequent; third slot resolves
        // lexicographically among the count-1 terms
        assert!(model.vocabulary.contains_key("alpha"));
        assert!(model.vocabulary.contains_key("beta"));
        assert!(model.vocabulary.contains_key("delta"));
    }

    #[test]
    fn test_transform_rows_are_l2_normalized() {
        let documents = docs(&["python machine learning", "rust systems programming"]);
        let config = TfidfConfig::default();
        let model = TfidfModel::fit(&config, &documents);
        let row = model.transform(&documents[0], &config);
        let norm: f64 = row.iter().map(|w| w * w).sum::<f64>().sqrt();
        assert!((norm - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_transform_unknown_terms_zero_vector() {
        let documents = docs(&["python backend", "rust systems"]);
        let config = TfidfConfig::default();
        let model = TfidfModel::fit(&config, &documents);
        let row = model.transform("completely unrelated words", &config);
        assert!(row.iter().all(|w| *w == 0.0));
    }

    #[test]
    fn test_bigrams_enter_vocabulary() {
        let documents = docs(&["machine learning models", "statistical learning theory"]);
        let model = TfidfModel::fit(&TfidfConfig::default(), &documents);
        assert!(model.vocabulary.contains_key("machine learning"));
        assert!(model.vocabulary.contains_key("statistical learning"));
    }

    #[test]
    fn test_cosine_similarity_bounds() {
        let a = vec![1.0, 0.0, 1.0];
        let b = vec![1.0, 0.0, 1.0];
        let c = vec![0.0, 1.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 1e-12);
        assert_eq!(cosine_similarity(&a, &c), 0.0);
        assert_eq!(cosine_similarity(&a, &[]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[0.0, 0.0]), 0.0);
    }

    #[test]
    fn test_fingerprint_changes_with_config() {
        let base = TfidfConfig::default();
        let other = TfidfConfig {
            max_features: 100,
            ..TfidfConfig::default()
        };
        assert_ne!(base.fingerprint(), other.fingerprint());
        assert_eq!(base.fingerprint(), TfidfConfig::default().fingerprint());
    }

    #[test]
    fn test_coverage_reflects_vocabulary_drift() {
        let config = TfidfConfig::default();
        let fitted_on = docs(&["python backend services", "python data pipelines"]);
        let model = TfidfModel::fit(&config, &fitted_on);
        assert!(model.coverage(&fitted_on, &config) > 0.0);

        let unrelated = docs(&["graphic design portfolio", "typography layout branding"]);
        assert_eq!(model.coverage(&unrelated, &config), 0.0);
    }

    #[test]
    fn test_builder_empty_documents() {
        let cache = NoopModelCache;
        let builder =
            VectorSpaceBuilder::new(TfidfConfig::default(), &cache, "test", true, 100);
        assert!(builder.build(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_builder_row_order_matches_input() {
        let cache = NoopModelCache;
        let builder =
            VectorSpaceBuilder::new(TfidfConfig::default(), &cache, "test", false, 100);
        let documents = docs(&[
            "python machine learning cloud",
            "python cloud infrastructure",
            "graphic design photoshop",
        ]);
        let matrix = builder.build(&documents).unwrap();
        assert_eq!(matrix.len(), 3);
        // the python/cloud job is closer to the resume row than the design job
        let sim_first = cosine_similarity(&matrix[0], &matrix[1]);
        let sim_second = cosine_similarity(&matrix[0], &matrix[2]);
        assert!(sim_first > sim_second);
    }
}
