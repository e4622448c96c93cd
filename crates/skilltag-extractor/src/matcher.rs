//! Top-K skill matching
//!
//! Scores a query vector against every row of an [`EmbeddingMatrix`] by
//! cosine similarity and keeps the `k` best. Results are ordered by score
//! descending, then by row index ascending, so equal scores always come back
//! in taxonomy order.

use crate::error::MatchError;
use crate::index::EmbeddingMatrix;
use skilltag_embed::cosine_similarity;
use std::cmp::Ordering;

/// One ranked skill
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkillMatch {
    /// Row of the matrix (position in the taxonomy)
    pub index: usize,

    /// Cosine similarity in [-1, 1]
    pub score: f32,
}

/// Check `0 < k <= available`
pub fn validate_k(k: usize, available: usize) -> Result<(), MatchError> {
    if k == 0 || k > available {
        return Err(MatchError::InvalidK { k, available });
    }
    Ok(())
}

/// Score descending, then index ascending
fn rank_order(a: &SkillMatch, b: &SkillMatch) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.index.cmp(&b.index))
}

/// Select the `k` rows most similar to `query`
///
/// # Errors
///
/// - [`MatchError::InvalidK`] if `k` is zero or exceeds the number of rows
/// - [`MatchError::DimensionMismatch`] if `query` has the wrong length
pub fn top_k(query: &[f32], matrix: &EmbeddingMatrix, k: usize) -> Result<Vec<SkillMatch>, MatchError> {
    validate_k(k, matrix.rows())?;
    if query.len() != matrix.dimension() {
        return Err(MatchError::DimensionMismatch {
            query: query.len(),
            matrix: matrix.dimension(),
        });
    }

    let mut scored: Vec<SkillMatch> = matrix
        .iter_rows()
        .enumerate()
        .map(|(index, row)| {
            let score = cosine_similarity(query, row);
            // NaN ranks last; adding 0.0 folds -0.0 into 0.0 so zero scores tie
            let score = if score.is_nan() { -1.0 } else { score + 0.0 };
            SkillMatch { index, score }
        })
        .collect();

    if k < scored.len() {
        scored.select_nth_unstable_by(k - 1, rank_order);
        scored.truncate(k);
    }
    scored.sort_by(rank_order);

    Ok(scored)
}
