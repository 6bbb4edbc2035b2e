//! Configuration type definitions

use serde::{Deserialize, Serialize};

/// Default minimum score for a pair to become an edge
pub const DEFAULT_THRESHOLD: f64 = 0.2;

/// Default number of comparison workers
pub const DEFAULT_WORKERS: usize = 5;

/// Default capacity of the task, result and error queues
pub const DEFAULT_QUEUE_CAPACITY: usize = 200;

/// Upper bound on configured workers
pub const MAX_WORKERS: usize = 64;

/// Default size limit for a single normalized document (1 MiB)
pub const DEFAULT_MAX_DOCUMENT_BYTES: usize = 1024 * 1024;

/// Similarity pass configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimilarityConfig {
    /// Minimum cosine similarity for a pair to be stored
    #[serde(default = "default_threshold")]
    pub threshold: f64,

    /// Number of worker threads comparing documents
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Bounded capacity of the pool's task, result and error queues
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Whether a corpus spans all of a user's entries or one feed at a time
    #[serde(default)]
    pub scope: Scope,

    /// Term frequency variant, applied to every document of a run
    #[serde(default)]
    pub term_frequency: TermFrequency,

    /// Inverse document frequency variant
    #[serde(default)]
    pub idf: IdfWeighting,

    /// Apply English stemming after stopword removal
    #[serde(default)]
    pub stemming: bool,

    /// Words dropped in addition to the built-in English stopwords
    #[serde(default)]
    pub extra_stop_words: Vec<String>,

    /// Normalized documents larger than this are scored as empty
    #[serde(default = "default_max_document_bytes")]
    pub max_document_bytes: usize,

    /// Per-task deadline in milliseconds (unbounded when absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_timeout_ms: Option<u64>,
}

/// Corpus boundary for IDF and pairwise comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// One corpus per user
    #[default]
    User,
    /// One corpus per (user, feed)
    Feed,
}

/// How raw term counts become term frequencies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TermFrequency {
    /// Raw occurrence count
    #[default]
    Raw,
    /// Occurrence count divided by the document's token count
    LengthNormalized,
}

/// How document frequency becomes an inverse document frequency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdfWeighting {
    /// `ln(N / df)`; zero for terms present in every document
    Plain,
    /// `ln((N + 1) / (df + 1)) + 1`; never zero
    #[default]
    Smoothed,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            workers: default_workers(),
            queue_capacity: default_queue_capacity(),
            scope: Scope::default(),
            term_frequency: TermFrequency::default(),
            idf: IdfWeighting::default(),
            stemming: false,
            extra_stop_words: Vec::new(),
            max_document_bytes: default_max_document_bytes(),
            task_timeout_ms: None,
        }
    }
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

fn default_workers() -> usize {
    DEFAULT_WORKERS
}

fn default_queue_capacity() -> usize {
    DEFAULT_QUEUE_CAPACITY
}

fn default_max_document_bytes() -> usize {
    DEFAULT_MAX_DOCUMENT_BYTES
}
