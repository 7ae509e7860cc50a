//! The rating store seam.
//!
//! Scoring code depends only on [`RatingStore`], never on a particular
//! storage technology. [`RatingIndex`] is the in-memory implementation.

use crate::error::Result;
use crate::types::{Rating, RatingIndex, UserId};

/// Read-only access to rating records.
///
/// `Send + Sync` lets one store back scoring calls on several threads.
/// Implementations must stay consistent for the duration of a single
/// scoring call; between calls the contents may change.
pub trait RatingStore: Send + Sync {
    /// Every rating in the store, in any order
    fn all_ratings(&self) -> Result<Vec<Rating>>;

    /// Every rating authored by `user_id`, in any order
    fn ratings_by_user(&self, user_id: UserId) -> Result<Vec<Rating>>;
}

impl RatingStore for RatingIndex {
    fn all_ratings(&self) -> Result<Vec<Rating>> {
        Ok(self.user_ratings.values().flatten().copied().collect())
    }

    fn ratings_by_user(&self, user_id: UserId) -> Result<Vec<Rating>> {
        Ok(self.user_ratings(user_id).to_vec())
    }
}
