//! User-user item scorer.
//!
//! Wires the four stages together behind one entry point. Every call
//! rebuilds the target vector and the full item → raters grouping from the
//! store, so results always reflect the store's current contents.

use crate::neighborhood::DEFAULT_NEIGHBORHOOD_SIZE;
use crate::predictor::{predict, rater_neighborhood};
use crate::types::{Neighborhood, Prediction, ScoreRequest};
use crate::vectors::RatingVectorBuilder;
use anyhow::{Context, Result};
use data_loader::{ItemId, RatingStore, UserId};
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Default minimum neighborhood size for a prediction
pub const DEFAULT_MIN_NEIGHBORS: usize = 3;

/// Tuning knobs for the scorer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScorerConfig {
    /// Maximum neighbors kept per item (K)
    pub neighborhood_size: usize,
    /// Fewest neighbors an item needs to be scored
    pub min_neighbors: usize,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            neighborhood_size: DEFAULT_NEIGHBORHOOD_SIZE,
            min_neighbors: DEFAULT_MIN_NEIGHBORS,
        }
    }
}

impl ScorerConfig {
    /// Configure the neighborhood size (default: 30)
    pub fn with_neighborhood_size(mut self, size: usize) -> Self {
        self.neighborhood_size = size;
        self
    }

    /// Configure the minimum neighborhood size (default: 3)
    pub fn with_min_neighbors(mut self, min: usize) -> Self {
        self.min_neighbors = min;
        self
    }
}

/// Predicts ratings with mean-centered user-user collaborative filtering
pub struct UserUserScorer<S: RatingStore> {
    /// Shared, read-only rating store
    store: Arc<S>,
    config: ScorerConfig,
}

impl<S: RatingStore> Clone for UserUserScorer<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: self.config,
        }
    }
}

impl<S: RatingStore> UserUserScorer<S> {
    /// Create a scorer with the default configuration
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            config: ScorerConfig::default(),
        }
    }

    /// Replace the whole configuration
    pub fn with_config(mut self, config: ScorerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ScorerConfig {
        &self.config
    }

    /// Predict `user_id`'s rating for each of `items`.
    ///
    /// Items without a qualifying neighborhood are left out. The result
    /// keeps the order of `items`; repeated ids are scored once.
    #[instrument(skip(self, items), fields(items = items.len()))]
    pub fn score_with_details(&self, user_id: UserId, items: &[ItemId]) -> Result<Vec<Prediction>> {
        let builder = RatingVectorBuilder::new(self.store.as_ref());

        let target_vector = builder
            .rating_vector_for(user_id)
            .with_context(|| format!("Failed to build rating vector for user {}", user_id))?;
        let groups = builder
            .rater_groups()
            .with_context(|| format!("Failed to group raters while scoring user {}", user_id))?;

        let mut seen = HashSet::with_capacity(items.len());
        let mut predictions = Vec::new();

        for &item_id in items {
            if !seen.insert(item_id) {
                continue;
            }
            let Some(raters) = groups.raters_of(item_id) else {
                debug!("Item {} has no raters", item_id);
                continue;
            };

            if let Some(prediction) =
                predict(&builder, user_id, &target_vector, item_id, raters, &self.config)
                    .with_context(|| format!("Failed to score item {} for user {}", item_id, user_id))?
            {
                predictions.push(prediction);
            }
        }

        debug!("Scored {} of {} items", predictions.len(), seen.len());
        Ok(predictions)
    }

    /// Predicted score per item, for items that could be scored
    pub fn score(&self, user_id: UserId, items: &[ItemId]) -> Result<HashMap<ItemId, f64>> {
        let predictions = self.score_with_details(user_id, items)?;
        Ok(predictions
            .into_iter()
            .map(|p| (p.item_id, p.score))
            .collect())
    }

    /// Score several users in parallel.
    ///
    /// Each request is an independent single-threaded call; results come
    /// back in request order.
    #[instrument(skip(self, requests), fields(requests = requests.len()))]
    pub fn score_batch(&self, requests: &[ScoreRequest]) -> Vec<Result<HashMap<ItemId, f64>>> {
        requests
            .par_iter()
            .map(|request| self.score(request.user_id, &request.items))
            .collect()
    }

    /// The neighborhood `user_id` would get for `item_id`.
    ///
    /// Unlike scoring, this applies no minimum size, so it also shows why an
    /// item went unscored.
    #[instrument(skip(self))]
    pub fn neighborhood_for(&self, user_id: UserId, item_id: ItemId) -> Result<Neighborhood> {
        let builder = RatingVectorBuilder::new(self.store.as_ref());

        let target_vector = builder
            .rating_vector_for(user_id)
            .with_context(|| format!("Failed to build rating vector for user {}", user_id))?;
        let groups = builder
            .rater_groups()
            .with_context(|| format!("Failed to group raters for user {}", user_id))?;
        let Some(raters) = groups.raters_of(item_id) else {
            return Ok(Neighborhood::default());
        };

        let (neighborhood, _) = rater_neighborhood(
            &builder,
            user_id,
            &target_vector,
            raters,
            self.config.neighborhood_size,
        )
        .with_context(|| format!("Failed to rank neighbors of user {} for item {}", user_id, item_id))?;
        Ok(neighborhood)
    }
}
