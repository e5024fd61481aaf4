//! Cosine similarity over profile vectors.

use std::cmp::Ordering;

/// Cosine similarity of two vectors
///
/// Returns 0.0 when either vector has zero norm. Vectors of different
/// length are compared over their common prefix.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (x, y) in a.iter().zip(b.iter()) {
        let (x, y) = (*x as f64, *y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(-1.0, 1.0)
}

/// Keeps the `k` highest scoring entries, best first
///
/// The sort is stable, so equal scores keep their input order.
pub fn top_k<T>(mut scored: Vec<(T, f64)>, k: usize) -> Vec<(T, f64)> {
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    scored.truncate(k);
    scored
}
