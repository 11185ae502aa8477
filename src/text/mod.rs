//! Text normalization for similarity matching
//!
//! Turns raw resume and job-posting text into a cleaned, space-joined token
//! stream: lowercased, noise stripped (URLs, emails, phone numbers),
//! punctuation removed, stopwords and single-character tokens dropped, and
//! each surviving token passed through the configured [`TokenReducer`].

pub mod phrases;

use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::HashSet;
use std::sync::OnceLock;
use tracing::warn;

/// Common English stop words to filter out during tokenization
static STOP_WORDS: OnceLock<HashSet<&'static str>> = OnceLock::new();

/// Job-posting boilerplate terms that carry no matching signal
static DOMAIN_STOP_WORDS: OnceLock<HashSet<&'static str>> = OnceLock::new();

static URL_RE: OnceLock<Option<Regex>> = OnceLock::new();
static EMAIL_RE: OnceLock<Option<Regex>> = OnceLock::new();
static PHONE_RE: OnceLock<Option<Regex>> = OnceLock::new();

fn get_stop_words() -> &'static HashSet<&'static str> {
    STOP_WORDS.get_or_init(|| {
        [
            "a", "about", "above", "after", "again", "all", "am", "an", "and", "any", "are",
            "as", "at", "be", "because", "been", "before", "being", "below", "between", "both",
            "but", "by", "can", "did", "do", "does", "doing", "down", "during", "each", "few",
            "for", "from", "further", "had", "has", "have", "having", "he", "her", "here",
            "hers", "him", "his", "how", "i", "if", "in", "into", "is", "it", "its", "just",
            "me", "more", "most", "my", "no", "nor", "not", "now", "of", "off", "on", "once",
            "only", "or", "other", "our", "ours", "out", "over", "own", "same", "she", "so",
            "some", "such", "than", "that", "the", "their", "theirs", "them", "then", "there",
            "these", "they", "this", "those", "through", "to", "too", "under", "until", "up",
            "very", "was", "we", "were", "what", "when", "where", "which", "while", "who",
            "whom", "why", "will", "with", "you", "your", "yours",
        ]
        .iter()
        .copied()
        .collect()
    })
}

fn get_domain_stop_words() -> &'static HashSet<&'static str> {
    DOMAIN_STOP_WORDS.get_or_init(|| {
        [
            "job", "jobs", "apply", "applicant", "application", "candidate", "candidates",
            "resume", "cv", "position", "positions", "role", "roles", "hiring", "hire",
            "opportunity", "opportunities", "description", "requirement", "requirements",
            "required", "qualification", "qualifications", "responsibilities", "salary",
            "benefits", "please", "click", "submit", "com", "www",
        ]
        .iter()
        .copied()
        .collect()
    })
}

/// Compile a noise-stripping regex once; on failure the corresponding strip
/// is skipped and normalization continues with the remaining steps.
fn noise_regex(cell: &'static OnceLock<Option<Regex>>, pattern: &str, name: &str) -> Option<&'static Regex> {
    cell.get_or_init(|| match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            warn!(error = %e, pattern = name, "failed to compile noise regex; stripping skipped");
            None
        }
    })
    .as_ref()
}

fn url_re() -> Option<&'static Regex> {
    noise_regex(&URL_RE, r"https?://\S+|www\.\S+", "url")
}

fn email_re() -> Option<&'static Regex> {
    noise_regex(&EMAIL_RE, r"[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9-.]+", "email")
}

fn phone_re() -> Option<&'static Regex> {
    noise_regex(
        &PHONE_RE,
        r"\(?\+?\d{1,3}\)?[-.\s]?\d{2,4}[-.\s]?\d{3,4}[-.\s]?\d{4}",
        "phone",
    )
}

/// Per-token reduction applied after stopword filtering.
///
/// Selected once when the normalizer is constructed, so the per-token path
/// never has to re-check which linguistic tools are available.
pub trait TokenReducer: Send + Sync {
    fn reduce(&self, token: &str) -> String;
}

/// Porter stemming via the English snowball stemmer
pub struct StemReducer {
    stemmer: Stemmer,
}

impl StemReducer {
    pub fn new() -> Self {
        StemReducer {
            stemmer: Stemmer::create(Algorithm::English),
        }
    }
}

impl Default for StemReducer {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenReducer for StemReducer {
    fn reduce(&self, token: &str) -> String {
        self.stemmer.stem(token).to_string()
    }
}

/// Pass-through reduction for deployments without stemming
pub struct PassthroughReducer;

impl TokenReducer for PassthroughReducer {
    fn reduce(&self, token: &str) -> String {
        token.to_string()
    }
}

/// Text normalizer with a fixed reduction strategy
pub struct TextNormalizer {
    reducer: Box<dyn TokenReducer>,
}

impl TextNormalizer {
    /// Create a normalizer; `stemming` selects the full reduction strategy
    pub fn new(stemming: bool) -> Self {
        let reducer: Box<dyn TokenReducer> = if stemming {
            Box::new(StemReducer::new())
        } else {
            Box::new(PassthroughReducer)
        };
        TextNormalizer { reducer }
    }

    /// Create a normalizer with an injected reduction strategy
    pub fn with_reducer(reducer: Box<dyn TokenReducer>) -> Self {
        TextNormalizer { reducer }
    }

    /// Normalize raw text into a space-joined token stream.
    ///
    /// Empty or blank input yields an empty string; this function never fails.
    pub fn normalize(&self, text: &str) -> String {
        self.tokens(text).join(" ")
    }

    /// Normalize raw text into the surviving tokens, order preserved
    pub fn tokens(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let mut text = text.to_lowercase();
        for re in [url_re(), email_re(), phone_re()].into_iter().flatten() {
            text = re.replace_all(&text, " ").into_owned();
        }

        // Strip punctuation; hyphenated compounds split into separate tokens
        let cleaned: String = text
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || c.is_whitespace() {
                    c
                } else {
                    ' '
                }
            })
            .collect();

        let stop_words = get_stop_words();
        let domain_stop_words = get_domain_stop_words();

        cleaned
            .split(|c: char| !c.is_alphanumeric())
            .filter(|s| s.chars().count() > 1)
            .filter(|s| !stop_words.contains(s) && !domain_stop_words.contains(s))
            .map(|s| self.reducer.reduce(s))
            .collect()
    }
}
