//! # Data Loader Crate
//!
//! This crate loads rating data and serves it to the scorer through the
//! [`RatingStore`] trait.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (Rating, RatingIndex)
//! - **parser**: Parse `ratings.csv` / `ratings.dat` files into Rust structs
//! - **index**: Load and validate a RatingIndex
//! - **store**: The RatingStore trait the scorer consumes
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::{RatingIndex, RatingStore};
//! use std::path::Path;
//!
//! let index = RatingIndex::load_from_file(Path::new("data/ratings.csv"))?;
//! let history = index.ratings_by_user(42)?;
//!
//! println!("User 42 rated {} items", history.len());
//! ```

// Public modules
pub mod error;
pub mod types;
pub mod parser;
pub mod index;
pub mod store;

// Re-export commonly used types for convenience
pub use error::{DataLoadError, Result};
pub use parser::RatingFormat;
pub use store::RatingStore;
pub use types::{
    // Type aliases
    UserId,
    ItemId,
    // Core types
    Rating,
    RatingIndex,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_index_creation() {
        let index = RatingIndex::new();
        let (users, items, ratings) = index.counts();

        assert_eq!(users, 0);
        assert_eq!(items, 0);
        assert_eq!(ratings, 0);
    }

    #[test]
    fn test_insert_rating() {
        let mut index = RatingIndex::new();

        index.insert_rating(Rating::new(1, 1193, 5.0).with_timestamp(978300760));

        let user_ratings = index.user_ratings(1);
        assert_eq!(user_ratings.len(), 1);
        assert_eq!(user_ratings[0].value, 5.0);

        let item_ratings = index.item_ratings(1193);
        assert_eq!(item_ratings.len(), 1);
    }

    #[test]
    fn test_empty_queries() {
        let index = RatingIndex::new();

        assert!(index.user_ratings(999).is_empty());
        assert!(index.item_ratings(999).is_empty());
        assert!(index.ratings_by_user(999).unwrap().is_empty());
        assert!(index.all_ratings().unwrap().is_empty());
    }

    #[test]
    fn test_store_returns_only_user_ratings() {
        let index = RatingIndex::from_ratings(vec![
            Rating::new(1, 10, 4.0),
            Rating::new(1, 11, 3.0),
            Rating::new(2, 10, 5.0),
        ]);

        let history = index.ratings_by_user(1).unwrap();
        assert_eq!(history.len(), 2);
        assert!(history.iter().all(|r| r.user_id == 1));
        assert_eq!(index.all_ratings().unwrap().len(), 3);
    }

    #[test]
    fn test_sorted_ids() {
        let index = RatingIndex::from_ratings(vec![
            Rating::new(7, 30, 4.0),
            Rating::new(3, 10, 3.0),
            Rating::new(5, 20, 5.0),
        ]);

        assert_eq!(index.user_ids(), vec![3, 5, 7]);
        assert_eq!(index.item_ids(), vec![10, 20, 30]);
    }

    #[test]
    fn test_supersedes() {
        let older = Rating::new(1, 1, 5.0).with_timestamp(100);
        let newer = Rating::new(1, 1, 2.0).with_timestamp(200);
        assert!(newer.supersedes(&older));
        assert!(!older.supersedes(&newer));

        // Same timestamp: greater value wins
        let low = Rating::new(1, 1, 2.0);
        let high = Rating::new(1, 1, 4.0);
        assert!(high.supersedes(&low));
        assert!(!low.supersedes(&high));
    }
}
