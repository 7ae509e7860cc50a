//! Core domain types for rating data.
//!
//! This module defines the records a rating store hands out and the
//! in-memory index that serves them.

use serde::Serialize;
use std::collections::HashMap;

// =============================================================================
// Type Aliases
// =============================================================================
// These make the domain clearer and prevent mixing up user IDs with item IDs

/// Unique identifier for a user
pub type UserId = u64;

/// Unique identifier for a rated item
pub type ItemId = u64;

// =============================================================================
// Rating Type
// =============================================================================

/// A single rating from a user for an item
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rating {
    pub user_id: UserId,
    pub item_id: ItemId,
    /// Rating value, typically 0.5 to 5.0
    pub value: f64,
    /// Unix timestamp when the rating was made (0 when the source has none)
    pub timestamp: i64,
}

impl Rating {
    pub fn new(user_id: UserId, item_id: ItemId, value: f64) -> Self {
        Self {
            user_id,
            item_id,
            value,
            timestamp: 0,
        }
    }

    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Whether this record should replace `other` for the same (user, item).
    ///
    /// The latest timestamp wins; on equal timestamps the greater value wins.
    /// This makes duplicate resolution independent of record order.
    pub fn supersedes(&self, other: &Rating) -> bool {
        match self.timestamp.cmp(&other.timestamp) {
            std::cmp::Ordering::Greater => true,
            std::cmp::Ordering::Less => false,
            std::cmp::Ordering::Equal => self.value > other.value,
        }
    }
}

// =============================================================================
// RatingIndex - In-Memory Rating Store
// =============================================================================

/// Holds every loaded rating, indexed by user and by item.
///
/// Records are stored as loaded; duplicate (user, item) pairs are kept and
/// resolved by consumers via [`Rating::supersedes`].
#[derive(Debug, Default)]
pub struct RatingIndex {
    /// All ratings made by each user
    pub(crate) user_ratings: HashMap<UserId, Vec<Rating>>,
    /// All ratings received by each item
    pub(crate) item_ratings: HashMap<ItemId, Vec<Rating>>,
}

impl RatingIndex {
    /// Creates a new, empty RatingIndex
    pub fn new() -> Self {
        Self {
            user_ratings: HashMap::new(),
            item_ratings: HashMap::new(),
        }
    }

    /// Build an index from an iterator of ratings
    pub fn from_ratings(ratings: impl IntoIterator<Item = Rating>) -> Self {
        let mut index = Self::new();
        for rating in ratings {
            index.insert_rating(rating);
        }
        index
    }

    /// Get all ratings made by a user
    ///
    /// Returns an empty slice if the user has no ratings
    pub fn user_ratings(&self, user_id: UserId) -> &[Rating] {
        self.user_ratings
            .get(&user_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Get all ratings for an item
    pub fn item_ratings(&self, item_id: ItemId) -> &[Rating] {
        self.item_ratings
            .get(&item_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// All user IDs with at least one rating, ascending
    pub fn user_ids(&self) -> Vec<UserId> {
        let mut ids: Vec<UserId> = self.user_ratings.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// All item IDs with at least one rating, ascending
    pub fn item_ids(&self) -> Vec<ItemId> {
        let mut ids: Vec<ItemId> = self.item_ratings.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Insert a rating and update both indices
    pub fn insert_rating(&mut self, rating: Rating) {
        self.user_ratings
            .entry(rating.user_id)
            .or_default()
            .push(rating);

        self.item_ratings
            .entry(rating.item_id)
            .or_default()
            .push(rating);
    }

    /// (users, items, ratings) counts for logging and validation
    pub fn counts(&self) -> (usize, usize, usize) {
        let total_ratings = self.user_ratings.values().map(|v| v.len()).sum();
        (self.user_ratings.len(), self.item_ratings.len(), total_ratings)
    }
}
