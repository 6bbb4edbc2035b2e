//! Similarity engine for finding near-duplicate entries
//!
//! Entries are projected into [`Document`]s, vectorized with TF-IDF against
//! their own [`Corpus`], and compared pairwise with cosine similarity. Each
//! document is compared only with the documents after it in ascending id
//! order, so every pair is scored once and each edge points from the lower
//! position to the higher one.

mod calculation;

mod pairs;

mod pass;

mod tfidf;

pub use calculation::cosine_similarity;
pub use pairs::{compare_from, find_similar_pairs, find_similar_pairs_parallel, ScanOptions};
pub use pass::{run_similarity_pass, CancelFlag, PassReport, UserReport, MIN_CORPUS_SIZE};
pub use tfidf::{inverse_document_frequency, Corpus, TermVector, Vectorizer};

use serde::Serialize;

use crate::store::{Entry, SimilarityEdge};
use crate::text;

/// The comparable projection of one entry, valid for a single run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub id: i64,
    pub title: String,
    pub link: String,
    pub content: String,
    normalized: String,
}

impl Document {
    pub fn new(id: i64, title: &str, link: &str, content: &str) -> Self {
        Document {
            id,
            title: title.to_string(),
            link: link.to_string(),
            content: content.to_string(),
            normalized: text::normalize(title, content),
        }
    }

    pub fn from_entry(entry: &Entry) -> Self {
        Self::new(entry.id, &entry.title, &entry.url, &entry.content)
    }

    /// Title and content with markup, punctuation and case removed
    pub fn normalized(&self) -> &str {
        &self.normalized
    }
}

/// A qualifying comparison: `source` precedes `target` in the corpus
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimilarPair {
    pub source: i64,
    pub target: i64,
    /// Cosine similarity (0.0 to 1.0)
    pub score: f64,
}

impl SimilarPair {
    pub fn to_edge(&self) -> SimilarityEdge {
        SimilarityEdge::new(self.source, self.target, self.score)
    }
}
