//! Similarity Engine
//!
//! Mean-centered cosine similarity between two users:
//!
//! ```text
//!              Σ_{i ∈ A ∩ B} (a_i − ā)(b_i − b̄)
//! sim(A, B) = ─────────────────────────────────
//!              ‖A − ā‖ · ‖B − b̄‖
//! ```
//!
//! Each mean is taken over that user's own items only. The numerator runs
//! over the shared items, while each norm runs over the user's full vector.
//!
//! A user with no ratings, or whose ratings are all the same value, has a
//! zero norm after centering. Their similarity with anyone is undefined and
//! reported as `None`, never as NaN.

use crate::vectors::RatingVector;

/// A centered norm at or below this fraction of the uncentered norm is
/// treated as zero.
///
/// Absorbs the rounding left behind when a constant vector such as
/// `[0.1, 0.1, 0.1]` is centered on a mean that isn't exactly representable.
/// Scaling by the vector's own magnitude keeps genuinely small variances,
/// however small the ratings themselves are.
pub const ZERO_NORM_TOLERANCE: f64 = 1e-12;

/// A rating vector already shifted by its own mean, with its norm cached.
///
/// Centering the target user once and comparing it against every candidate
/// gives exactly the same numbers as calling [`similarity`] per pair.
#[derive(Debug, Clone)]
pub struct CenteredVector {
    centered: RatingVector,
    norm: f64,
    magnitude: f64,
}

impl CenteredVector {
    pub fn new(vector: &RatingVector) -> Self {
        let centered = vector.mean_centered();
        let norm = centered.norm();
        Self {
            centered,
            norm,
            magnitude: vector.norm(),
        }
    }

    /// Whether the vector has no variance to compare against
    pub fn is_degenerate(&self) -> bool {
        self.norm <= ZERO_NORM_TOLERANCE * self.magnitude
    }

    /// Cosine between this and `other`; `None` if either norm is zero
    pub fn cosine(&self, other: &CenteredVector) -> Option<f64> {
        if self.is_degenerate() || other.is_degenerate() {
            return None;
        }
        let cosine = self.centered.dot(&other.centered) / (self.norm * other.norm);
        Some(cosine.clamp(-1.0, 1.0))
    }
}

/// Mean-centered cosine similarity of two rating vectors
pub fn similarity(a: &RatingVector, b: &RatingVector) -> Option<f64> {
    CenteredVector::new(a).cosine(&CenteredVector::new(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::ItemId;

    fn vector(entries: &[(ItemId, f64)]) -> RatingVector {
        entries.iter().copied().collect()
    }

    #[test]
    fn test_self_similarity() {
        let a = vector(&[(1, 5.0), (2, 3.0), (3, 4.0), (4, 1.0)]);
        let sim = similarity(&a, &a).unwrap();
        assert!((sim - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_symmetry() {
        let a = vector(&[(1, 5.0), (2, 3.0), (3, 4.0)]);
        let b = vector(&[(2, 2.0), (3, 5.0), (4, 1.0), (5, 3.5)]);

        assert_eq!(similarity(&a, &b), similarity(&b, &a));
    }

    #[test]
    fn test_opposite_tastes_are_negative() {
        let a = vector(&[(1, 5.0), (2, 1.0)]);
        let b = vector(&[(1, 1.0), (2, 5.0)]);

        let sim = similarity(&a, &b).unwrap();
        assert!((sim + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_norms_use_full_vectors() {
        // Item 3 is only in b: it adds nothing to the dot product but
        // still counts toward b's norm.
        let a = vector(&[(1, 5.0), (2, 3.0)]);
        let b = vector(&[(1, 4.0), (2, 2.0), (3, 6.0)]);

        // b's mean is 4: centered {0, -2, 2}; a's centered {1, -1}
        // dot = 0*1 + (-2)(-1) = 2; norms sqrt(2) and sqrt(8)
        let expected = 2.0 / (2.0_f64.sqrt() * 8.0_f64.sqrt());
        let sim = similarity(&a, &b).unwrap();
        assert!((sim - expected).abs() < 1e-12);
    }

    #[test]
    fn test_disjoint_vectors_are_zero() {
        let a = vector(&[(1, 5.0), (2, 3.0)]);
        let b = vector(&[(3, 4.0), (4, 2.0)]);

        assert_eq!(similarity(&a, &b), Some(0.0));
    }

    #[test]
    fn test_zero_norm_is_undefined() {
        let varied = vector(&[(1, 5.0), (2, 3.0)]);
        let single = vector(&[(1, 4.0)]);
        let flat = vector(&[(1, 3.0), (2, 3.0), (3, 3.0)]);
        let empty = RatingVector::new();

        assert_eq!(similarity(&varied, &single), None);
        assert_eq!(similarity(&single, &varied), None);
        assert_eq!(similarity(&varied, &flat), None);
        assert_eq!(similarity(&varied, &empty), None);
        assert_eq!(similarity(&empty, &empty), None);
    }

    #[test]
    fn test_inexact_constant_vector_is_undefined() {
        let varied = vector(&[(1, 5.0), (2, 3.0)]);
        let flat = vector(&[(1, 0.1), (2, 0.1), (3, 0.1)]);

        assert_eq!(similarity(&varied, &flat), None);
    }

    #[test]
    fn test_inexact_constant_vector_of_large_ratings_is_undefined() {
        let varied = vector(&[(1, 5000.0), (2, 3000.0)]);
        let flat = vector(&[(1, 3333.3), (2, 3333.3), (3, 3333.3)]);

        assert_eq!(similarity(&varied, &flat), None);
    }

    #[test]
    fn test_tiny_variance_is_not_degenerate() {
        let a = vector(&[(1, 2e-10), (2, 4e-10), (3, 3e-10)]);
        let b = vector(&[(1, 1e-10), (2, 5e-10), (3, 3e-10)]);

        assert!(!CenteredVector::new(&a).is_degenerate());
        let sim = similarity(&a, &b).unwrap();
        assert!((sim - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_centered_vector_matches_pairwise() {
        let a = vector(&[(1, 5.0), (2, 3.0), (3, 4.0)]);
        let b = vector(&[(1, 2.0), (3, 5.0), (4, 1.0)]);

        let target = CenteredVector::new(&a);
        assert_eq!(target.cosine(&CenteredVector::new(&b)), similarity(&a, &b));
    }
}
