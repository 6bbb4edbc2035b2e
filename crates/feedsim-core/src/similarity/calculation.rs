use std::cmp::Ordering;

use crate::similarity::TermVector;

/// Cosine similarity of two TF-IDF vectors, clamped to `[0, 1]`.
///
/// Returns 0 when either vector has no weight. Terms are visited in sorted
/// order whichever argument comes first, so the result is exactly symmetric.
pub fn cosine_similarity(a: &TermVector, b: &TermVector) -> f64 {
    if a.is_zero() || b.is_zero() {
        return 0.0;
    }

    let dot = dot_product(a, b);
    let score = dot / (a.norm_sq() * b.norm_sq()).sqrt();
    if score.is_nan() {
        return 0.0;
    }
    score.clamp(0.0, 1.0)
}

fn dot_product(a: &TermVector, b: &TermVector) -> f64 {
    let mut left = a.iter().peekable();
    let mut right = b.iter().peekable();
    let mut dot = 0.0;

    while let (Some((ta, wa)), Some((tb, wb))) = (left.peek(), right.peek()) {
        match ta.cmp(tb) {
            Ordering::Less => {
                left.next();
            }
            Ordering::Greater => {
                right.next();
            }
            Ordering::Equal => {
                dot += wa * wb;
                left.next();
                right.next();
            }
        }
    }
    dot
}
