//! RatingIndex loading and validation.

use crate::error::{DataLoadError, Result};
use crate::parser;
use crate::types::*;
use rayon::prelude::*;
use std::path::Path;
use tracing::info;

impl RatingIndex {
    /// Load a ratings file into a validated index
    ///
    /// Steps:
    /// 1. Parse the file (layout picked from the extension)
    /// 2. Index every rating by user and by item
    /// 3. Validate rating values
    pub fn load_from_file(path: &Path) -> Result<Self> {
        info!("Loading ratings from {:?}", path);

        let ratings = parser::parse_ratings(path)?;
        let index = RatingIndex::from_ratings(ratings);

        let (users, items, ratings) = index.counts();
        info!("Loaded {} users, {} items, {} ratings", users, items, ratings);

        index.validate()?;
        Ok(index)
    }

    /// Validate data integrity
    ///
    /// Every rating value must be finite: a NaN or infinite rating would
    /// poison every mean and similarity it takes part in.
    pub fn validate(&self) -> Result<()> {
        let bad = self
            .user_ratings
            .par_iter()
            .flat_map_iter(|(_, ratings)| ratings.iter())
            .find_any(|rating| !rating.value.is_finite());

        match bad {
            Some(rating) => Err(DataLoadError::InvalidValue {
                field: format!("rating (user {}, item {})", rating.user_id, rating.item_id),
                value: rating.value.to_string(),
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_finite() {
        let index = RatingIndex::from_ratings(vec![Rating::new(1, 1, 4.0), Rating::new(2, 1, 0.5)]);
        assert!(index.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_nan() {
        let index = RatingIndex::from_ratings(vec![Rating::new(1, 1, 4.0), Rating::new(2, 1, f64::NAN)]);
        assert!(matches!(index.validate(), Err(DataLoadError::InvalidValue { .. })));
    }

    #[test]
    fn test_load_dataset() {
        // Requires a real ratings file; skipped when it isn't present
        let path = Path::new("../../data/ratings.csv");

        if path.exists() {
            let index = RatingIndex::load_from_file(path).unwrap();
            let (users, items, ratings) = index.counts();

            assert!(users > 0);
            assert!(items > 0);
            assert!(ratings >= users);
        }
    }
}
