//! # User-User Scorer Crate
//!
//! Predicts a user's rating for items they haven't rated using mean-centered
//! user-user collaborative filtering: "users who rate like you rated this
//! item above (or below) their own average".
//!
//! ## Stages
//!
//! 1. **vectors**: per-user rating vectors and per-item rater groups
//! 2. **similarity**: mean-centered cosine similarity between two users
//! 3. **neighborhood**: top-K positively similar raters of an item
//! 4. **predictor**: similarity-weighted, mean-centered average
//!
//! [`UserUserScorer`] runs all four for a user and a set of items.
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::RatingIndex;
//! use uu_scorer::UserUserScorer;
//! use std::sync::Arc;
//!
//! let index = Arc::new(RatingIndex::load_from_file("data/ratings.csv".as_ref())?);
//! let scorer = UserUserScorer::new(index);
//!
//! for (item, score) in scorer.score(42, &[10, 20, 30])? {
//!     println!("{item}: {score:.2}");
//! }
//! ```

// Public modules
pub mod types;
pub mod vectors;
pub mod similarity;
pub mod neighborhood;
pub mod predictor;
pub mod scorer;

// Re-export commonly used types
pub use neighborhood::{top_neighbors, DEFAULT_NEIGHBORHOOD_SIZE};
pub use scorer::{ScorerConfig, UserUserScorer, DEFAULT_MIN_NEIGHBORS};
pub use similarity::similarity;
pub use types::{MeanTable, Neighborhood, Prediction, ScoreRequest, UserSimilarity};
pub use vectors::{RaterGroups, RatingVector, RatingVectorBuilder};
