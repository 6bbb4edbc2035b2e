//! Similarity pass configuration
//!
//! Configuration is read from an optional `feedsim.toml`; every key has a
//! default, and CLI flags override whatever the file sets.

pub mod types;

use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::{FeedsimError, Result};
use crate::similarity::Vectorizer;
use crate::text::{StemmingTokenizer, StopWords, Tokenizer, WhitespaceTokenizer};

pub use types::{
    IdfWeighting, Scope, SimilarityConfig, TermFrequency, DEFAULT_QUEUE_CAPACITY,
    DEFAULT_THRESHOLD, DEFAULT_WORKERS, MAX_WORKERS,
};

impl SimilarityConfig {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| FeedsimError::io_operation("read config", path.display(), e))?;
        let config: SimilarityConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` when given, otherwise fall back to defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Reject values the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.threshold) {
            crate::bail_invalid!("threshold (expected 0.0..=1.0)", self.threshold);
        }
        if self.workers == 0 || self.workers > MAX_WORKERS {
            crate::bail_invalid!(
                &format!("workers (expected 1..={})", MAX_WORKERS),
                self.workers
            );
        }
        if self.queue_capacity == 0 {
            crate::bail_invalid!("queue_capacity (expected > 0)", self.queue_capacity);
        }
        if self.max_document_bytes == 0 {
            crate::bail_invalid!(
                "max_document_bytes (expected > 0)",
                self.max_document_bytes
            );
        }
        if self.task_timeout_ms == Some(0) {
            crate::bail_invalid!("task_timeout_ms (expected > 0)", 0);
        }
        Ok(())
    }

    pub fn task_timeout(&self) -> Option<Duration> {
        self.task_timeout_ms.map(Duration::from_millis)
    }

    pub fn stop_words(&self) -> StopWords {
        StopWords::english().with_extra(&self.extra_stop_words)
    }

    /// Build the tokenizer selected by `stemming`
    pub fn tokenizer(&self) -> Box<dyn Tokenizer> {
        if self.stemming {
            Box::new(StemmingTokenizer::new(
                self.stop_words(),
                self.max_document_bytes,
            ))
        } else {
            Box::new(WhitespaceTokenizer::new(
                self.stop_words(),
                self.max_document_bytes,
            ))
        }
    }

    pub fn vectorizer(&self) -> Vectorizer {
        Vectorizer::new(self.tokenizer(), self.term_frequency, self.idf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = SimilarityConfig::default();
        assert_eq!(config.threshold, DEFAULT_THRESHOLD);
        assert_eq!(config.workers, DEFAULT_WORKERS);
        assert_eq!(config.queue_capacity, DEFAULT_QUEUE_CAPACITY);
        assert_eq!(config.scope, Scope::User);
        assert_eq!(config.term_frequency, TermFrequency::Raw);
        assert_eq!(config.idf, IdfWeighting::Smoothed);
        assert!(config.task_timeout().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("feedsim.toml");
        fs::write(
            &path,
            "threshold = 0.5\nscope = \"feed\"\nidf = \"plain\"\nextra_stop_words = [\"via\"]\n",
        )
        .unwrap();

        let config = SimilarityConfig::load(&path).unwrap();
        assert_eq!(config.threshold, 0.5);
        assert_eq!(config.scope, Scope::Feed);
        assert_eq!(config.idf, IdfWeighting::Plain);
        assert_eq!(config.workers, DEFAULT_WORKERS);
        assert!(config.stop_words().contains("via"));
    }

    #[test]
    fn test_load_full_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("feedsim.toml");
        fs::write(
            &path,
            "threshold = 0.75\nworkers = 8\nterm_frequency = \"length_normalized\"\nstemming = true\ntask_timeout_ms = 2000\n",
        )
        .unwrap();

        let expected = SimilarityConfig {
            threshold: 0.75,
            workers: 8,
            term_frequency: TermFrequency::LengthNormalized,
            stemming: true,
            task_timeout_ms: Some(2_000),
            ..SimilarityConfig::default()
        };
        let loaded = SimilarityConfig::load(&path).unwrap();
        assert_eq!(loaded, expected);
        assert_eq!(loaded.task_timeout(), Some(Duration::from_secs(2)));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("feedsim.toml");
        fs::write(&path, "treshold = 0.5\n").unwrap();

        assert!(matches!(
            SimilarityConfig::load(&path),
            Err(FeedsimError::Toml(_))
        ));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let bad = [
            SimilarityConfig {
                threshold: 1.5,
                ..SimilarityConfig::default()
            },
            SimilarityConfig {
                threshold: -0.1,
                ..SimilarityConfig::default()
            },
            SimilarityConfig {
                workers: 0,
                ..SimilarityConfig::default()
            },
            SimilarityConfig {
                workers: MAX_WORKERS + 1,
                ..SimilarityConfig::default()
            },
            SimilarityConfig {
                queue_capacity: 0,
                ..SimilarityConfig::default()
            },
            SimilarityConfig {
                task_timeout_ms: Some(0),
                ..SimilarityConfig::default()
            },
        ];
        for config in bad {
            assert!(
                matches!(config.validate(), Err(FeedsimError::InvalidValue { .. })),
                "expected rejection for {:?}",
                config
            );
        }
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let err = SimilarityConfig::load(&dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, FeedsimError::FailedOperationWithTarget { .. }));
    }
}
