//! Configuration for the ranking engine
//!
//! All knobs carry the defaults the scoring pipeline was calibrated with;
//! deployments override individual fields via TOML.

use crate::error::{RankError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Ranking engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankerConfig {
    /// Enable Porter stemming during normalization (optional; default false)
    #[serde(default)]
    pub stemming: bool,

    /// Weight of the cosine-similarity component in the final score
    #[serde(default = "default_cosine_weight")]
    pub cosine_weight: f64,

    /// Weight of the skill-overlap component in the final score
    #[serde(default = "default_skill_weight")]
    pub skill_weight: f64,

    /// Project vectors onto a reduced orthogonal basis before scoring
    #[serde(default = "default_reduce_dims")]
    pub reduce_dims: bool,

    /// Upper bound on the reduced basis size
    #[serde(default = "default_max_components")]
    pub max_components: usize,

    /// Hard cap on vocabulary size
    #[serde(default = "default_max_features")]
    pub max_features: usize,

    /// Ignore terms present in fewer than this fraction of documents
    #[serde(default = "default_min_df")]
    pub min_df: f64,

    /// Ignore terms present in more than this fraction of documents
    #[serde(default = "default_max_df")]
    pub max_df: f64,

    /// Largest n-gram length used as a vocabulary feature
    #[serde(default = "default_ngram_max")]
    pub ngram_max: usize,

    /// N-gram length used by the phrase enricher
    #[serde(default = "default_phrase_ngram")]
    pub phrase_ngram: usize,

    /// Number of frequent phrases appended by the enricher
    #[serde(default = "default_top_phrases")]
    pub top_phrases: usize,

    /// Upper bound on the enrichment worker pool size
    #[serde(default = "default_worker_cap")]
    pub worker_cap: usize,

    /// Cache key for the fitted weighting model
    #[serde(default = "default_cache_key")]
    pub cache_key: String,
}

fn default_cosine_weight() -> f64 {
    0.7
}

fn default_skill_weight() -> f64 {
    0.3
}

fn default_reduce_dims() -> bool {
    true
}

fn default_max_components() -> usize {
    100
}

fn default_max_features() -> usize {
    5000
}

fn default_min_df() -> f64 {
    0.01
}

fn default_max_df() -> f64 {
    0.95
}

fn default_ngram_max() -> usize {
    2
}

fn default_phrase_ngram() -> usize {
    2
}

fn default_top_phrases() -> usize {
    10
}

fn default_worker_cap() -> usize {
    8
}

fn default_cache_key() -> String {
    "vector-model".to_string()
}

impl Default for RankerConfig {
    fn default() -> Self {
        RankerConfig {
            stemming: false,
            cosine_weight: default_cosine_weight(),
            skill_weight: default_skill_weight(),
            reduce_dims: default_reduce_dims(),
            max_components: default_max_components(),
            max_features: default_max_features(),
            min_df: default_min_df(),
            max_df: default_max_df(),
            ngram_max: default_ngram_max(),
            phrase_ngram: default_phrase_ngram(),
            top_phrases: default_top_phrases(),
            worker_cap: default_worker_cap(),
            cache_key: default_cache_key(),
        }
    }
}

impl RankerConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: RankerConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that all fields form a usable configuration
    pub fn validate(&self) -> Result<()> {
        if !self.cosine_weight.is_finite() || self.cosine_weight < 0.0 {
            return Err(RankError::invalid_config(format!(
                "cosine_weight must be a non-negative number, got {}",
                self.cosine_weight
            )));
        }
        if !self.skill_weight.is_finite() || self.skill_weight < 0.0 {
            return Err(RankError::invalid_config(format!(
                "skill_weight must be a non-negative number, got {}",
                self.skill_weight
            )));
        }
        if self.cosine_weight + self.skill_weight <= 0.0 {
            return Err(RankError::invalid_config(
                "cosine_weight and skill_weight must not both be zero",
            ));
        }
        if self.min_df < 0.0 || self.min_df > 1.0 {
            return Err(RankError::invalid_config(format!(
                "min_df must be within [0, 1], got {}",
                self.min_df
            )));
        }
        if self.max_df <= 0.0 || self.max_df > 1.0 {
            return Err(RankError::invalid_config(format!(
                "max_df must be within (0, 1], got {}",
                self.max_df
            )));
        }
        if self.min_df >= self.max_df {
            return Err(RankError::invalid_config(format!(
                "min_df ({}) must be below max_df ({})",
                self.min_df, self.max_df
            )));
        }
        if self.ngram_max == 0 || self.phrase_ngram == 0 {
            return Err(RankError::invalid_config(
                "ngram_max and phrase_ngram must be at least 1",
            ));
        }
        if self.max_features == 0 {
            return Err(RankError::invalid_config("max_features must be at least 1"));
        }
        if self.max_components < 2 {
            return Err(RankError::invalid_config(
                "max_components must be at least 2",
            ));
        }
        if self.worker_cap == 0 {
            return Err(RankError::invalid_config("worker_cap must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = RankerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.cosine_weight, 0.7);
        assert_eq!(config.skill_weight, 0.3);
        assert_eq!(config.max_features, 5000);
        assert!(!config.stemming);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: RankerConfig = toml::from_str("stemming = true\nworker_cap = 4\n").unwrap();
        assert!(config.stemming);
        assert_eq!(config.worker_cap, 4);
        assert_eq!(config.cosine_weight, 0.7);
        assert_eq!(config.cache_key, "vector-model");
    }

    #[test]
    fn test_negative_weight_rejected() {
        let config = RankerConfig {
            cosine_weight: -0.5,
            ..RankerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_inverted_df_bounds_rejected() {
        let config = RankerConfig {
            min_df: 0.9,
            max_df: 0.5,
            ..RankerConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
