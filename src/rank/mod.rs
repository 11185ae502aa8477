//! Ranking engine for matching a resume against a batch of job postings
//!
//! Orchestrates normalization, phrase enrichment, vectorization and scoring,
//! then attaches a qualitative match label and sorts descending by score.
//! Ranking is a best-effort enhancement: any internal failure is caught at
//! this boundary and the caller gets the original postings back unranked.

use crate::config::RankerConfig;
use crate::error::{RankError, Result};
use crate::skills::{match_skills, ResumeProfile, SkillSet};
use crate::text::{phrases, TextNormalizer};
use crate::vector::cache::{FsModelCache, ModelCache, NoopModelCache};
use crate::vector::{cosine_similarity, TfidfConfig, VectorSpaceBuilder};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{error, warn};

/// Score threshold for an "Excellent" match
pub const EXCELLENT_THRESHOLD: f64 = 0.8;

/// Score threshold for a "Good" match
pub const GOOD_THRESHOLD: f64 = 0.6;

/// Score threshold for a "Fair" match
pub const FAIR_THRESHOLD: f64 = 0.4;

/// Qualitative label derived from the final normalized score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchLevel {
    Excellent,
    Good,
    Fair,
    Low,
}

impl MatchLevel {
    /// Label for a final normalized score
    pub fn from_score(score: f64) -> Self {
        if score >= EXCELLENT_THRESHOLD {
            MatchLevel::Excellent
        } else if score >= GOOD_THRESHOLD {
            MatchLevel::Good
        } else if score >= FAIR_THRESHOLD {
            MatchLevel::Fair
        } else {
            MatchLevel::Low
        }
    }
}

impl fmt::Display for MatchLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MatchLevel::Excellent => "Excellent",
            MatchLevel::Good => "Good",
            MatchLevel::Fair => "Fair",
            MatchLevel::Low => "Low",
        };
        write!(f, "{label}")
    }
}

/// A job posting as supplied by the listing-acquisition collaborator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl JobPosting {
    /// Text the posting contributes to the vector space: the description, or
    /// title/company/location concatenated when no description is available,
    /// so postings are never silently dropped.
    pub fn corpus_text(&self) -> String {
        if let Some(description) = &self.description {
            if !description.trim().is_empty() {
                return description.clone();
            }
        }
        [&self.title, &self.company, &self.location]
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A job posting augmented with its relevance score and match annotations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredJobPosting {
    #[serde(flatten)]
    pub posting: JobPosting,
    /// Final normalized score in [0, 1], relative to the request batch
    pub similarity_score: f64,
    pub match_level: MatchLevel,
    /// Resume skills found in this posting's description, original casing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matching_skills: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skill_match_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skill_match_ratio: Option<f64>,
}

/// Result of a ranking call.
///
/// Degradation is an explicit branch rather than an exception path: when the
/// pipeline fails internally the caller receives clones of the original
/// postings, unranked and unscored, together with the reason.
#[derive(Debug)]
pub enum RankOutcome {
    /// Postings scored, labeled, and sorted descending by score
    Ranked(Vec<ScoredJobPosting>),
    /// The pipeline failed; postings are passed through in input order
    Unranked {
        postings: Vec<JobPosting>,
        reason: RankError,
    },
}

impl RankOutcome {
    /// The ranked postings, if ranking succeeded
    pub fn ranked(self) -> Option<Vec<ScoredJobPosting>> {
        match self {
            RankOutcome::Ranked(postings) => Some(postings),
            RankOutcome::Unranked { .. } => None,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, RankOutcome::Unranked { .. })
    }
}

/// Relevance-ranking engine
pub struct JobRanker {
    config: RankerConfig,
    normalizer: TextNormalizer,
    cache: Box<dyn ModelCache>,
}

impl JobRanker {
    /// Create a ranker with the platform cache location, or no caching when
    /// the platform has no cache directory
    pub fn new(config: RankerConfig) -> Self {
        let cache: Box<dyn ModelCache> = match FsModelCache::default_location() {
            Some(cache) => Box::new(cache),
            None => Box::new(NoopModelCache),
        };
        Self::with_cache(config, cache)
    }

    /// Create a ranker with an injected model cache
    pub fn with_cache(config: RankerConfig, cache: Box<dyn ModelCache>) -> Self {
        let normalizer = TextNormalizer::new(config.stemming);
        JobRanker {
            config,
            normalizer,
            cache,
        }
    }

    pub fn config(&self) -> &RankerConfig {
        &self.config
    }

    /// Rank `job_listings` by relevance to `resume_text`.
    ///
    /// The input postings are never mutated; scored results are clones.
    /// Empty input yields an empty ranked result immediately. Internal
    /// failures degrade to [`RankOutcome::Unranked`] with the original
    /// postings, never an error to the caller.
    #[tracing::instrument(skip_all, fields(n_jobs = job_listings.len()))]
    pub fn rank(
        &self,
        resume_text: &str,
        job_listings: &[JobPosting],
        resume_skills: Option<&SkillSet>,
    ) -> RankOutcome {
        if job_listings.is_empty() {
            return RankOutcome::Ranked(Vec::new());
        }

        match self.try_rank(resume_text, job_listings, resume_skills) {
            Ok(ranked) => RankOutcome::Ranked(ranked),
            Err(reason) => {
                error!(error = %reason, "ranking failed; returning unranked postings");
                RankOutcome::Unranked {
                    postings: job_listings.to_vec(),
                    reason,
                }
            }
        }
    }

    /// Rank against a resume profile, using its skill set when non-empty
    pub fn rank_profile(&self, profile: &ResumeProfile, job_listings: &[JobPosting]) -> RankOutcome {
        let skills = if profile.skills.is_empty() {
            None
        } else {
            Some(&profile.skills)
        };
        self.rank(&profile.raw_text, job_listings, skills)
    }

    fn try_rank(
        &self,
        resume_text: &str,
        job_listings: &[JobPosting],
        resume_skills: Option<&SkillSet>,
    ) -> Result<Vec<ScoredJobPosting>> {
        self.config.validate()?;

        let skills = resume_skills.filter(|s| !s.is_empty());

        let mut texts: Vec<String> = Vec::with_capacity(job_listings.len() + 1);
        texts.push(resume_text.to_string());
        texts.extend(job_listings.iter().map(JobPosting::corpus_text));

        let enriched = self.enrich_all(&texts);

        let builder = VectorSpaceBuilder::new(
            TfidfConfig::from_ranker(&self.config),
            self.cache.as_ref(),
            &self.config.cache_key,
            self.config.reduce_dims,
            self.config.max_components,
        );
        let matrix = builder.build(&enriched)?;
        if matrix.len() != job_listings.len() + 1 {
            return Err(RankError::vectorization(format!(
                "expected {} rows, got {}",
                job_listings.len() + 1,
                matrix.len()
            )));
        }

        let scores = self.score_batch(&matrix, &texts[1..], skills);

        let mut ranked: Vec<ScoredJobPosting> = job_listings
            .iter()
            .zip(&scores)
            .map(|(posting, &score)| self.annotate(posting, score, skills))
            .collect();

        // stable sort keeps input order for equal scores
        ranked.sort_by(|a, b| {
            b.similarity_score
                .partial_cmp(&a.similarity_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        Ok(ranked)
    }

    /// Enrich every text through a bounded worker pool, merging results back
    /// by index so output order equals input order regardless of worker
    /// scheduling.
    fn enrich_all(&self, texts: &[String]) -> Vec<String> {
        let workers = self.config.worker_cap.min(texts.len()).max(1);
        let enrich_one = |text: &String| {
            phrases::enrich(
                &self.normalizer,
                text,
                self.config.phrase_ngram,
                self.config.top_phrases,
            )
        };

        let indexed: Vec<(usize, String)> = match rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()
        {
            Ok(pool) => pool.install(|| {
                texts
                    .par_iter()
                    .enumerate()
                    .map(|(index, text)| (index, enrich_one(text)))
                    .collect()
            }),
            Err(e) => {
                warn!(error = %e, "worker pool unavailable; enriching sequentially");
                texts
                    .iter()
                    .enumerate()
                    .map(|(index, text)| (index, enrich_one(text)))
                    .collect()
            }
        };

        let mut enriched = vec![String::new(); texts.len()];
        for (index, text) in indexed {
            enriched[index] = text;
        }
        enriched
    }

    /// Cosine scores against row 0, blended with skill overlap when skills
    /// are available, normalized so the batch maximum is 1.0 whenever any
    /// raw score is positive.
    fn score_batch(
        &self,
        matrix: &[Vec<f64>],
        job_texts: &[String],
        skills: Option<&SkillSet>,
    ) -> Vec<f64> {
        let resume_row = &matrix[0];
        let mut scores: Vec<f64> = matrix[1..]
            .iter()
            .enumerate()
            .map(|(i, job_row)| {
                let cosine = cosine_similarity(resume_row, job_row).max(0.0);
                match skills {
                    Some(skills) => {
                        let ratio =
                            match_skills(&job_texts[i], skills).len() as f64 / skills.len() as f64;
                        self.config.cosine_weight * cosine + self.config.skill_weight * ratio
                    }
                    None => cosine,
                }
            })
            .collect();

        let max = scores.iter().cloned().fold(0.0, f64::max);
        if max > 0.0 {
            for score in &mut scores {
                *score /= max;
            }
        }
        scores
    }

    fn annotate(
        &self,
        posting: &JobPosting,
        score: f64,
        skills: Option<&SkillSet>,
    ) -> ScoredJobPosting {
        let (matching_skills, skill_match_count, skill_match_ratio) = match skills {
            Some(skills) => {
                // annotations reflect the raw description, not the fallback text
                let description = posting.description.as_deref().unwrap_or("");
                let matched = match_skills(description, skills);
                let count = matched.len();
                let ratio = count as f64 / skills.len() as f64;
                (Some(matched), Some(count), Some(ratio))
            }
            None => (None, None, None),
        };

        ScoredJobPosting {
            posting: posting.clone(),
            similarity_score: score,
            match_level: MatchLevel::from_score(score),
            matching_skills,
            skill_match_count,
            skill_match_ratio,
        }
    }
}
