use std::collections::BTreeMap;

use crate::config::{IdfWeighting, TermFrequency};
use crate::similarity::Document;
use crate::text::Tokenizer;

/// Sparse TF-IDF vector; terms are kept sorted so two vectors can be
/// aligned by a single merge pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TermVector {
    weights: BTreeMap<String, f64>,
    norm_sq: f64,
}

impl TermVector {
    /// Build from `(term, weight)` pairs; zero weights are not stored
    pub fn from_weights(weights: impl IntoIterator<Item = (String, f64)>) -> Self {
        let weights: BTreeMap<String, f64> = weights
            .into_iter()
            .filter(|(_, w)| w.is_finite() && *w > 0.0)
            .collect();
        let norm_sq = weights.values().map(|w| w * w).sum();
        TermVector { weights, norm_sq }
    }

    pub fn weight(&self, term: &str) -> f64 {
        self.weights.get(term).copied().unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.weights.iter().map(|(t, w)| (t.as_str(), *w))
    }

    pub(crate) fn norm_sq(&self) -> f64 {
        self.norm_sq
    }

    pub fn magnitude(&self) -> f64 {
        self.norm_sq.sqrt()
    }

    pub fn is_zero(&self) -> bool {
        self.norm_sq == 0.0
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

/// IDF of a term found in `df` of `corpus_size` documents
pub fn inverse_document_frequency(weighting: IdfWeighting, corpus_size: usize, df: usize) -> f64 {
    let n = corpus_size as f64;
    let df = df as f64;
    match weighting {
        IdfWeighting::Plain => (n / df).ln(),
        IdfWeighting::Smoothed => ((n + 1.0) / (df + 1.0)).ln() + 1.0,
    }
}

/// Turns documents into term frequencies using one tokenizer and one
/// weighting scheme for a whole run
pub struct Vectorizer {
    tokenizer: Box<dyn Tokenizer>,
    term_frequency: TermFrequency,
    idf: IdfWeighting,
}

impl Vectorizer {
    pub fn new(tokenizer: Box<dyn Tokenizer>, term_frequency: TermFrequency, idf: IdfWeighting) -> Self {
        Vectorizer {
            tokenizer,
            term_frequency,
            idf,
        }
    }

    /// Term frequencies for one document.
    ///
    /// A document the tokenizer rejects counts as empty and the flag is
    /// `false`.
    fn term_frequencies(&self, doc: &Document) -> (BTreeMap<String, f64>, bool) {
        let tokens = match self.tokenizer.tokenize(doc.normalized()) {
            Ok(tokens) => tokens,
            Err(e) => {
                tracing::warn!(entry_id = doc.id, error = %e, "treating document as empty");
                return (BTreeMap::new(), false);
            }
        };

        let mut counts: BTreeMap<String, f64> = BTreeMap::new();
        for token in &tokens {
            *counts.entry(token.clone()).or_insert(0.0) += 1.0;
        }

        if self.term_frequency == TermFrequency::LengthNormalized && !tokens.is_empty() {
            let total = tokens.len() as f64;
            for count in counts.values_mut() {
                *count /= total;
            }
        }
        (counts, true)
    }
}

/// Documents of one user (or one feed) with vectors weighted against this
/// corpus alone
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    documents: Vec<Document>,
    vectors: Vec<TermVector>,
    vocabulary: Vec<String>,
    document_frequency: BTreeMap<String, usize>,
    idf: BTreeMap<String, f64>,
    invalid_documents: usize,
}

impl Corpus {
    /// Order documents by ascending id (link breaks ties) and vectorize them
    pub fn build(mut documents: Vec<Document>, vectorizer: &Vectorizer) -> Self {
        documents.sort_by(|a, b| a.id.cmp(&b.id).then_with(|| a.link.cmp(&b.link)));

        let mut invalid_documents = 0;
        let frequencies: Vec<BTreeMap<String, f64>> = documents
            .iter()
            .map(|doc| {
                let (tf, valid) = vectorizer.term_frequencies(doc);
                if !valid {
                    invalid_documents += 1;
                }
                tf
            })
            .collect();

        let mut document_frequency: BTreeMap<String, usize> = BTreeMap::new();
        for tf in &frequencies {
            for term in tf.keys() {
                *document_frequency.entry(term.clone()).or_insert(0) += 1;
            }
        }

        let corpus_size = documents.len();
        let idf: BTreeMap<String, f64> = document_frequency
            .iter()
            .map(|(term, &df)| {
                (
                    term.clone(),
                    inverse_document_frequency(vectorizer.idf, corpus_size, df),
                )
            })
            .collect();

        let vectors = frequencies
            .into_iter()
            .map(|tf| {
                TermVector::from_weights(tf.into_iter().map(|(term, freq)| {
                    let weight = freq * idf.get(&term).copied().unwrap_or(0.0);
                    (term, weight)
                }))
            })
            .collect();

        let vocabulary = document_frequency.keys().cloned().collect();

        Corpus {
            documents,
            vectors,
            vocabulary,
            document_frequency,
            idf,
            invalid_documents,
        }
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn document(&self, position: usize) -> Option<&Document> {
        self.documents.get(position)
    }

    pub fn vector(&self, position: usize) -> Option<&TermVector> {
        self.vectors.get(position)
    }

    /// Every term seen in at least one document, sorted
    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    pub fn document_frequency(&self, term: &str) -> usize {
        self.document_frequency.get(term).copied().unwrap_or(0)
    }

    pub fn idf(&self, term: &str) -> Option<f64> {
        self.idf.get(term).copied()
    }

    /// Documents the tokenizer rejected and that were treated as empty
    pub fn invalid_documents(&self) -> usize {
        self.invalid_documents
    }
}
