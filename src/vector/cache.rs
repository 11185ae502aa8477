//! Injectable cache for fitted weighting models
//!
//! The cache is a performance hint, never a correctness guarantee: the
//! default key is fixed rather than per-corpus, so a later fit can overwrite
//! an unrelated one, and every read is re-validated against the current
//! request (config fingerprint + vocabulary coverage) before reuse. All
//! implementations are best-effort and never raise; a failed read or write
//! degrades to a cache miss.

use super::TfidfModel;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::RwLock;
use tracing::{debug, warn};

/// Get/put storage for fitted weighting models, keyed by a caller-supplied
/// cache key.
pub trait ModelCache: Send + Sync {
    fn get(&self, key: &str) -> Option<TfidfModel>;
    fn put(&self, key: &str, model: &TfidfModel);
}

/// Cache that stores nothing; every lookup is a miss
pub struct NoopModelCache;

impl ModelCache for NoopModelCache {
    fn get(&self, _key: &str) -> Option<TfidfModel> {
        None
    }

    fn put(&self, _key: &str, _model: &TfidfModel) {}
}

/// Process-local in-memory cache
#[derive(Default)]
pub struct MemoryModelCache {
    models: RwLock<HashMap<String, TfidfModel>>,
}

impl MemoryModelCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ModelCache for MemoryModelCache {
    fn get(&self, key: &str) -> Option<TfidfModel> {
        match self.models.read() {
            Ok(models) => models.get(key).cloned(),
            Err(_) => None,
        }
    }

    fn put(&self, key: &str, model: &TfidfModel) {
        if let Ok(mut models) = self.models.write() {
            models.insert(key.to_string(), model.clone());
        }
    }
}

/// Filesystem cache persisting models as JSON under a cache directory
pub struct FsModelCache {
    dir: PathBuf,
}

impl FsModelCache {
    pub fn new(dir: PathBuf) -> Self {
        FsModelCache { dir }
    }

    /// Cache under the platform cache directory, when one exists
    pub fn default_location() -> Option<Self> {
        dirs::cache_dir().map(|base| FsModelCache::new(base.join("jobrank")))
    }

    fn model_path(&self, key: &str) -> PathBuf {
        let sanitized: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '-'
                }
            })
            .collect();
        self.dir.join(format!("{sanitized}.json"))
    }
}

impl ModelCache for FsModelCache {
    fn get(&self, key: &str) -> Option<TfidfModel> {
        let path = self.model_path(key);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "model cache miss");
                return None;
            }
        };
        match serde_json::from_str(&content) {
            Ok(model) => Some(model),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "discarding unreadable cached model");
                None
            }
        }
    }

    fn put(&self, key: &str, model: &TfidfModel) {
        if let Err(e) = fs::create_dir_all(&self.dir) {
            warn!(dir = %self.dir.display(), error = %e, "failed to create model cache dir");
            return;
        }
        let path = self.model_path(key);
        let serialized = match serde_json::to_string(model) {
            Ok(serialized) => serialized,
            Err(e) => {
                warn!(error = %e, "failed to serialize weighting model");
                return;
            }
        };
        if let Err(e) = fs::write(&path, serialized) {
            warn!(path = %path.display(), error = %e, "failed to persist weighting model");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::TfidfConfig;

    fn sample_model() -> TfidfModel {
        TfidfModel::fit(
            &TfidfConfig::default(),
            &[
                "python machine learning".to_string(),
                "rust systems programming".to_string(),
            ],
        )
    }

    #[test]
    fn test_noop_cache_never_hits() {
        let cache = NoopModelCache;
        cache.put("key", &sample_model());
        assert!(cache.get("key").is_none());
    }

    #[test]
    fn test_memory_cache_round_trip() {
        let cache = MemoryModelCache::new();
        let model = sample_model();
        cache.put("key", &model);
        let loaded = cache.get("key").unwrap();
        assert_eq!(loaded.vocabulary, model.vocabulary);
        assert_eq!(loaded.fingerprint, model.fingerprint);
        assert!(cache.get("other").is_none());
    }

    #[test]
    fn test_fs_cache_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FsModelCache::new(dir.path().join("models"));
        let model = sample_model();
        cache.put("vector-model", &model);
        let loaded = cache.get("vector-model").unwrap();
        assert_eq!(loaded.vocabulary, model.vocabulary);
        assert_eq!(loaded.idf, model.idf);
    }

    #[test]
    fn test_fs_cache_corrupt_file_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FsModelCache::new(dir.path().to_path_buf());
        fs::write(dir.path().join("vector-model.json"), "not json").unwrap();
        assert!(cache.get("vector-model").is_none());
    }

    #[test]
    fn test_fs_cache_sanitizes_keys() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FsModelCache::new(dir.path().to_path_buf());
        let model = sample_model();
        cache.put("../escape/attempt", &model);
        assert!(cache.get("../escape/attempt").is_some());
        // nothing written outside the cache dir
        assert!(dir.path().join("---escape-attempt.json").exists());
    }

    #[test]
    fn test_fs_cache_missing_dir_is_a_miss() {
        let cache = FsModelCache::new(PathBuf::from("/nonexistent/jobrank-cache"));
        assert!(cache.get("vector-model").is_none());
    }
}
