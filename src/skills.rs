//! Skill sets and whole-word skill matching
//!
//! Skills are matched against raw (not normalized) text so that multi-word
//! phrases survive intact, with boundary checks so "Java" never matches
//! inside "JavaScript". Matched skills are returned in the caller's original
//! casing for display.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tracing::warn;

static RESUME_EMAIL_RE: OnceLock<Option<Regex>> = OnceLock::new();
static RESUME_PHONE_RE: OnceLock<Option<Regex>> = OnceLock::new();

/// A deduplicated, case-insensitive set of skill terms.
///
/// Original casing is preserved for display; lookups and deduplication are
/// case-insensitive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkillSet {
    skills: Vec<String>,
}

impl SkillSet {
    pub fn new() -> Self {
        SkillSet { skills: Vec::new() }
    }

    /// Built-in skill vocabulary for callers without an external extractor
    pub fn builtin() -> Self {
        SkillSet::from_iter([
            "Python",
            "Java",
            "C++",
            "SQL",
            "Machine Learning",
            "Deep Learning",
            "NLP",
            "Computer Vision",
            "Data Science",
            "TensorFlow",
            "PyTorch",
            "Keras",
            "Docker",
            "Kubernetes",
            "Cloud Computing",
            "React",
            "Node.js",
        ])
    }

    /// Add a skill unless an equivalent (case-insensitive) entry exists
    pub fn insert(&mut self, skill: impl Into<String>) {
        let skill = skill.into();
        let trimmed = skill.trim();
        if trimmed.is_empty() {
            return;
        }
        if !self.contains(trimmed) {
            self.skills.push(trimmed.to_string());
        }
    }

    /// Case-insensitive membership test
    pub fn contains(&self, skill: &str) -> bool {
        self.skills.iter().any(|s| s.eq_ignore_ascii_case(skill))
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.skills.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for SkillSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = SkillSet::new();
        for skill in iter {
            set.insert(skill);
        }
        set
    }
}

/// Return the subset of `skills` that occur in `text` as whole words or
/// phrases, in the skill set's original casing.
///
/// A match is accepted only when the neighbouring characters are not
/// alphanumeric, so terms like "C++" still match while "Java" is rejected
/// inside "JavaScript". Empty text or an empty skill set yields an empty
/// result.
pub fn match_skills(text: &str, skills: &SkillSet) -> Vec<String> {
    if text.trim().is_empty() || skills.is_empty() {
        return Vec::new();
    }

    let haystack = text.to_lowercase();
    skills
        .iter()
        .filter(|skill| contains_bounded(&haystack, &skill.to_lowercase()))
        .map(|skill| skill.to_string())
        .collect()
}

/// Whole-word/phrase containment check on lowercased text
fn contains_bounded(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    for (start, matched) in haystack.match_indices(needle) {
        let before_ok = haystack[..start]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        let after_ok = haystack[start + matched.len()..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_alphanumeric());
        if before_ok && after_ok {
            return true;
        }
    }
    false
}

/// Resume facts produced by the (external) document extractor.
///
/// Carried as a convenience input type: `raw_text` feeds the vector space,
/// `skills` feeds the overlap boost.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResumeProfile {
    pub raw_text: String,
    pub skills: SkillSet,
}

impl ResumeProfile {
    pub fn new(raw_text: impl Into<String>, skills: SkillSet) -> Self {
        ResumeProfile {
            raw_text: raw_text.into(),
            skills,
        }
    }

    /// Build a profile from raw text alone, detecting skills against the
    /// built-in vocabulary
    pub fn detect(raw_text: impl Into<String>) -> Self {
        let raw_text = raw_text.into();
        let skills = SkillSet::from_iter(match_skills(&raw_text, &SkillSet::builtin()));
        ResumeProfile { raw_text, skills }
    }
}

fn fact_regex(
    cell: &'static OnceLock<Option<Regex>>,
    pattern: &str,
    name: &str,
) -> Option<&'static Regex> {
    cell.get_or_init(|| match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            warn!(error = %e, pattern = name, "failed to compile fact regex");
            None
        }
    })
    .as_ref()
}

/// Extract the first email address from resume text, if any
pub fn extract_email(text: &str) -> Option<String> {
    fact_regex(
        &RESUME_EMAIL_RE,
        r"[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9-.]+",
        "email",
    )
    .and_then(|re| re.find(text))
    .map(|m| m.as_str().to_string())
}

/// Extract the first phone number from resume text, if any
pub fn extract_phone(text: &str) -> Option<String> {
    fact_regex(
        &RESUME_PHONE_RE,
        r"\(?\+?\d{1,3}\)?[-.\s]?\d{2,4}[-.\s]?\d{3,4}[-.\s]?\d{4}",
        "phone",
    )
    .and_then(|re| re.find(text))
    .map(|m| m.as_str().to_string())
}
