//! Request-scoped result types shared by the scoring stages.

use data_loader::{ItemId, UserId};
use serde::Serialize;
use std::collections::HashMap;

/// Mean rating of every user taking part in one prediction
pub type MeanTable = HashMap<UserId, f64>;

/// A candidate neighbor and how similar they are to the target user
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UserSimilarity {
    pub user_id: UserId,
    /// Mean-centered cosine similarity in [-1, 1]
    pub similarity: f64,
}

impl UserSimilarity {
    pub fn new(user_id: UserId, similarity: f64) -> Self {
        Self { user_id, similarity }
    }
}

/// The most similar raters of one item, best first.
///
/// Holds at most K entries, every one with a strictly positive similarity.
/// Only the neighborhood selector builds these, which keeps both bounds
/// true for every instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Neighborhood {
    neighbors: Vec<UserSimilarity>,
}

impl Neighborhood {
    pub(crate) fn from_ranked(neighbors: Vec<UserSimilarity>) -> Self {
        Self { neighbors }
    }

    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }

    /// Neighbors in rank order
    pub fn iter(&self) -> impl Iterator<Item = &UserSimilarity> {
        self.neighbors.iter()
    }

    /// Similarity of `user_id`, if they made the cut
    pub fn get(&self, user_id: UserId) -> Option<f64> {
        self.neighbors
            .iter()
            .find(|n| n.user_id == user_id)
            .map(|n| n.similarity)
    }

    pub fn contains(&self, user_id: UserId) -> bool {
        self.get(user_id).is_some()
    }
}

/// A predicted rating for one item
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub item_id: ItemId,
    pub score: f64,
    /// The neighbors whose ratings produced `score`
    pub neighborhood: Neighborhood,
}

impl Prediction {
    pub fn neighbor_count(&self) -> usize {
        self.neighborhood.len()
    }
}

/// One user's scoring request, used for batch scoring
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreRequest {
    pub user_id: UserId,
    pub items: Vec<ItemId>,
}

impl ScoreRequest {
    pub fn new(user_id: UserId, items: Vec<ItemId>) -> Self {
        Self { user_id, items }
    }
}
