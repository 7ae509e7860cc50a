//! Predictor
//!
//! Combines a neighborhood's ratings into a predicted score:
//!
//! ```text
//! score = mean(target) + Σ sim(u) · (r_u − mean(u)) / Σ sim(u)
//! ```
//!
//! where `u` ranges over the neighborhood and `r_u` is u's rating for the
//! item. Items whose neighborhood is smaller than the configured minimum
//! get no prediction.

use crate::neighborhood::top_neighbors;
use crate::scorer::ScorerConfig;
use crate::types::{MeanTable, Neighborhood, Prediction};
use crate::vectors::{RatingVector, RatingVectorBuilder};
use anyhow::Result;
use data_loader::{ItemId, RatingStore, UserId};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Rating vectors of every candidate rater, keyed by user
pub type CandidateVectors = HashMap<UserId, RatingVector>;

/// Build the neighborhood of `target_user` among the raters of one item.
///
/// The target is excluded from `raters`. Candidates are visited in
/// ascending user order, which fixes how similarity ties are ranked.
pub fn rater_neighborhood<S: RatingStore + ?Sized>(
    builder: &RatingVectorBuilder<'_, S>,
    target_user: UserId,
    target_vector: &RatingVector,
    raters: &BTreeMap<UserId, f64>,
    neighborhood_size: usize,
) -> Result<(Neighborhood, CandidateVectors)> {
    let mut ordered = Vec::with_capacity(raters.len());
    for &user_id in raters.keys().filter(|&&u| u != target_user) {
        ordered.push((user_id, builder.rating_vector_for(user_id)?));
    }

    let neighborhood = top_neighbors(
        target_vector,
        ordered.iter().map(|(user_id, vector)| (*user_id, vector)),
        neighborhood_size,
    );

    Ok((neighborhood, ordered.into_iter().collect()))
}

/// Mean rating of the target user and of every neighbor
pub fn mean_table(
    target_user: UserId,
    target_vector: &RatingVector,
    neighborhood: &Neighborhood,
    candidates: &CandidateVectors,
) -> MeanTable {
    let mut means = MeanTable::with_capacity(neighborhood.len() + 1);

    for neighbor in neighborhood.iter() {
        if let Some(mean) = candidates.get(&neighbor.user_id).and_then(RatingVector::mean) {
            means.insert(neighbor.user_id, mean);
        }
    }
    if let Some(mean) = target_vector.mean() {
        means.insert(target_user, mean);
    }

    means
}

/// Predict `target_user`'s rating for `item_id` from its raters.
///
/// Returns `Ok(None)` when the neighborhood is too small or the weighted
/// average is undefined.
pub fn predict<S: RatingStore + ?Sized>(
    builder: &RatingVectorBuilder<'_, S>,
    target_user: UserId,
    target_vector: &RatingVector,
    item_id: ItemId,
    raters: &BTreeMap<UserId, f64>,
    config: &ScorerConfig,
) -> Result<Option<Prediction>> {
    let (neighborhood, candidates) = rater_neighborhood(
        builder,
        target_user,
        target_vector,
        raters,
        config.neighborhood_size,
    )?;

    if neighborhood.len() < config.min_neighbors {
        debug!(
            "Item {}: {} neighbors, need {}",
            item_id,
            neighborhood.len(),
            config.min_neighbors
        );
        return Ok(None);
    }

    let means = mean_table(target_user, target_vector, &neighborhood, &candidates);
    let Some(&target_mean) = means.get(&target_user) else {
        return Ok(None);
    };

    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for neighbor in neighborhood.iter() {
        let rating = candidates
            .get(&neighbor.user_id)
            .and_then(|v| v.get(item_id))
            .or_else(|| raters.get(&neighbor.user_id).copied());
        let (Some(rating), Some(&mean)) = (rating, means.get(&neighbor.user_id)) else {
            continue;
        };

        numerator += neighbor.similarity * (rating - mean);
        denominator += neighbor.similarity;
    }

    if denominator <= 0.0 || !denominator.is_finite() {
        debug!("Item {}: similarity weights sum to {}", item_id, denominator);
        return Ok(None);
    }

    let score = target_mean + numerator / denominator;
    if !score.is_finite() {
        return Ok(None);
    }

    Ok(Some(Prediction {
        item_id,
        score,
        neighborhood,
    }))
}
