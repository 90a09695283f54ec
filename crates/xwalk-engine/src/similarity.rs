//! # Cosine Similarity
//!
//! `cos(A, B) = (A · B) / (|A| × |B|)` over raw term counts. Counts are
//! non-negative, so the result lies in `[0, 1]`; it is clamped to absorb
//! floating-point drift above 1.
//!
//! A zero-magnitude vector yields `0.0` instead of a division fault.

use crate::tokenizer::TermVector;

/// Cosine similarity of two term-frequency vectors.
pub fn cosine_similarity(a: &TermVector, b: &TermVector) -> f64 {
    let magnitude = a.magnitude() * b.magnitude();
    if magnitude == 0.0 {
        return 0.0;
    }

    // Walk the smaller vector, probe the larger.
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let dot: f64 = small
        .iter()
        .map(|(term, count)| f64::from(count) * f64::from(large.get(term)))
        .sum();

    (dot / magnitude).clamp(0.0, 1.0)
}
