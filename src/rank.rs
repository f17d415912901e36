//! Cosine-similarity top-K ranking.
//!
//! Pure function of its inputs: no model, no I/O. Scores are accumulated and
//! reported as f64 even though embeddings are stored as f32, so rank order
//! never shifts from truncated comparisons.

/// A candidate position with its similarity score.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranked {
    /// Index into the candidate slice passed to [`rank`]
    pub index: usize,
    /// Cosine similarity (-1.0 to 1.0, higher is more similar)
    pub score: f64,
}

/// Errors that can occur during ranking.
#[derive(Debug, thiserror::Error)]
pub enum RankError {
    /// Query and candidate widths differ. A configuration bug (mixed model
    /// versions), not a per-request condition; never silently truncated.
    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("Cannot rank against a zero-norm query vector")]
    ZeroNormQuery,

    #[error("Limit must be at least 1")]
    InvalidLimit,
}

/// Rank candidates by cosine similarity to the query, highest first.
///
/// Returns the top `limit` candidates as (index, score) pairs. Equal scores
/// keep their input order (stable sort). A `limit` larger than the candidate
/// count returns all candidates.
pub fn rank(
    query: &[f32],
    candidates: &[Vec<f32>],
    limit: usize,
) -> Result<Vec<Ranked>, RankError> {
    if limit == 0 {
        return Err(RankError::InvalidLimit);
    }

    for candidate in candidates {
        if candidate.len() != query.len() {
            return Err(RankError::DimensionMismatch {
                expected: query.len(),
                got: candidate.len(),
            });
        }
    }

    let query_norm = l2_norm(query);
    if query_norm < f64::EPSILON {
        return Err(RankError::ZeroNormQuery);
    }

    let mut results: Vec<Ranked> = candidates
        .iter()
        .enumerate()
        .map(|(index, candidate)| Ranked {
            index,
            score: cosine_similarity(query, candidate, query_norm),
        })
        .collect();

    // Stable sort by score descending; ties keep catalog order
    results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

    results.truncate(limit);

    Ok(results)
}

/// Compute L2 norm of a vector in f64.
fn l2_norm(v: &[f32]) -> f64 {
    v.iter().map(|x| f64::from(*x) * f64::from(*x)).sum::<f64>().sqrt()
}

/// Compute cosine similarity between two vectors.
/// Assumes query_norm is precomputed for efficiency.
fn cosine_similarity(query: &[f32], target: &[f32], query_norm: f64) -> f64 {
    let target_norm = l2_norm(target);
    if target_norm < f64::EPSILON {
        return 0.0;
    }

    let dot_product: f64 = query
        .iter()
        .zip(target.iter())
        .map(|(a, b)| f64::from(*a) * f64::from(*b))
        .sum();
    dot_product / (query_norm * target_norm)
}
