//! Neighborhood Selector
//!
//! Ranks candidate co-raters by similarity to the target user and keeps the
//! best K with a positive similarity.
//!
//! ## Algorithm
//! 1. Compute `similarity(target, candidate)` for every candidate
//! 2. Drop candidates whose similarity is undefined (zero norm)
//! 3. Stable sort, best first: equal scores keep encounter order
//! 4. Take the first K, stopping at the first non-positive score

use crate::similarity::CenteredVector;
use crate::types::{Neighborhood, UserSimilarity};
use crate::vectors::RatingVector;
use data_loader::UserId;
use std::cmp::Ordering;

/// Default number of neighbors kept per item
pub const DEFAULT_NEIGHBORHOOD_SIZE: usize = 30;

/// Select at most `k` positively similar neighbors for `target`.
///
/// Candidates are ranked in the order they are yielded when similarities
/// tie, so callers should pass them in a deterministic order.
pub fn top_neighbors<'a>(
    target: &RatingVector,
    candidates: impl IntoIterator<Item = (UserId, &'a RatingVector)>,
    k: usize,
) -> Neighborhood {
    let target = CenteredVector::new(target);
    if target.is_degenerate() {
        return Neighborhood::default();
    }

    let mut scored: Vec<UserSimilarity> = candidates
        .into_iter()
        .filter_map(|(user_id, vector)| {
            target
                .cosine(&CenteredVector::new(vector))
                .map(|similarity| UserSimilarity::new(user_id, similarity))
        })
        .collect();

    // `sort_by` is stable; similarities are never NaN
    scored.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(Ordering::Equal)
    });

    let neighbors = scored
        .into_iter()
        .take(k)
        .take_while(|n| n.similarity > 0.0)
        .collect();

    Neighborhood::from_ranked(neighbors)
}
