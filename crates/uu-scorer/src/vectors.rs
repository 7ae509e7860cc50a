//! Rating-Vector Builder
//!
//! Turns raw rating records from a [`RatingStore`] into per-user sparse
//! vectors (item → rating) and into per-item rater groups (user → rating).
//!
//! Both structures are keyed by ordered maps. Means, norms and dot products
//! therefore always accumulate in ascending id order, so a given store state
//! always produces bit-identical results.
//!
//! When a store holds several records for the same (user, item) pair, the
//! one chosen by [`Rating::supersedes`] is kept. Record order never matters.

use anyhow::{Context, Result};
use data_loader::{ItemId, Rating, RatingStore, UserId};
use serde::Serialize;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Everything known about one user's preferences: item → rating
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RatingVector {
    entries: BTreeMap<ItemId, f64>,
}

impl RatingVector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a vector from rating records, resolving duplicate items
    pub fn from_ratings<'a>(ratings: impl IntoIterator<Item = &'a Rating>) -> Self {
        let mut latest: BTreeMap<ItemId, Rating> = BTreeMap::new();
        for rating in ratings {
            keep_latest(&mut latest, rating.item_id, *rating);
        }

        Self {
            entries: latest.into_iter().map(|(item, r)| (item, r.value)).collect(),
        }
    }

    pub fn get(&self, item_id: ItemId) -> Option<f64> {
        self.entries.get(&item_id).copied()
    }

    pub fn contains(&self, item_id: ItemId) -> bool {
        self.entries.contains_key(&item_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in ascending item order
    pub fn iter(&self) -> impl Iterator<Item = (ItemId, f64)> + '_ {
        self.entries.iter().map(|(&item, &value)| (item, value))
    }

    /// Arithmetic mean of the ratings; `None` for an empty vector
    pub fn mean(&self) -> Option<f64> {
        if self.entries.is_empty() {
            return None;
        }
        let sum: f64 = self.entries.values().sum();
        Some(sum / self.entries.len() as f64)
    }

    /// A copy with the vector's own mean subtracted from every entry
    pub fn mean_centered(&self) -> RatingVector {
        let Some(mean) = self.mean() else {
            return RatingVector::new();
        };
        self.iter().map(|(item, value)| (item, value - mean)).collect()
    }

    /// L2 norm over every entry
    pub fn norm(&self) -> f64 {
        self.entries.values().map(|v| v * v).sum::<f64>().sqrt()
    }

    /// Dot product over the items both vectors contain
    pub fn dot(&self, other: &RatingVector) -> f64 {
        let mut left = self.entries.iter().peekable();
        let mut right = other.entries.iter().peekable();
        let mut sum = 0.0;

        while let (Some((li, lv)), Some((ri, rv))) = (left.peek().copied(), right.peek().copied()) {
            match li.cmp(ri) {
                std::cmp::Ordering::Less => {
                    left.next();
                }
                std::cmp::Ordering::Greater => {
                    right.next();
                }
                std::cmp::Ordering::Equal => {
                    sum += lv * rv;
                    left.next();
                    right.next();
                }
            }
        }
        sum
    }
}

impl FromIterator<(ItemId, f64)> for RatingVector {
    fn from_iter<T: IntoIterator<Item = (ItemId, f64)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Every user who rated each item, with their rating
#[derive(Debug, Clone, Default)]
pub struct RaterGroups {
    groups: HashMap<ItemId, BTreeMap<UserId, f64>>,
}

impl RaterGroups {
    /// Group rating records by item, resolving duplicate (user, item) pairs
    pub fn from_ratings<'a>(ratings: impl IntoIterator<Item = &'a Rating>) -> Self {
        let mut latest: HashMap<ItemId, BTreeMap<UserId, Rating>> = HashMap::new();
        for rating in ratings {
            let group = latest.entry(rating.item_id).or_default();
            keep_latest(group, rating.user_id, *rating);
        }

        let groups = latest
            .into_iter()
            .map(|(item, raters)| {
                let values = raters.into_iter().map(|(user, r)| (user, r.value)).collect();
                (item, values)
            })
            .collect();

        Self { groups }
    }

    /// Raters of `item_id` in ascending user order; `None` if nobody rated it
    pub fn raters_of(&self, item_id: ItemId) -> Option<&BTreeMap<UserId, f64>> {
        self.groups.get(&item_id)
    }

    /// Number of distinct rated items
    pub fn item_count(&self) -> usize {
        self.groups.len()
    }
}

fn keep_latest<K: Ord>(map: &mut BTreeMap<K, Rating>, key: K, rating: Rating) {
    match map.entry(key) {
        Entry::Vacant(slot) => {
            slot.insert(rating);
        }
        Entry::Occupied(mut slot) => {
            if rating.supersedes(slot.get()) {
                slot.insert(rating);
            }
        }
    }
}

/// Reads vectors and rater groups out of a rating store
pub struct RatingVectorBuilder<'a, S: RatingStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: RatingStore + ?Sized> RatingVectorBuilder<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// The rating vector of `user_id`; empty if they have no ratings
    pub fn rating_vector_for(&self, user_id: UserId) -> Result<RatingVector> {
        let history = self
            .store
            .ratings_by_user(user_id)
            .with_context(|| format!("Failed to load ratings for user {}", user_id))?;

        Ok(RatingVector::from_ratings(
            history.iter().filter(|r| r.user_id == user_id),
        ))
    }

    /// Scan the whole store once and group ratings by item
    pub fn rater_groups(&self) -> Result<RaterGroups> {
        let ratings = self
            .store
            .all_ratings()
            .context("Failed to scan the rating store")?;
        let groups = RaterGroups::from_ratings(&ratings);

        debug!(
            "Grouped {} ratings into {} items",
            ratings.len(),
            groups.item_count()
        );
        Ok(groups)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::RatingIndex;

    fn vector(entries: &[(ItemId, f64)]) -> RatingVector {
        entries.iter().copied().collect()
    }

    #[test]
    fn test_vector_for_user_excludes_others() {
        let index = RatingIndex::from_ratings(vec![
            Rating::new(1, 10, 4.0),
            Rating::new(1, 11, 2.0),
            Rating::new(2, 10, 5.0),
        ]);
        let builder = RatingVectorBuilder::new(&index);

        let v = builder.rating_vector_for(1).unwrap();
        assert_eq!(v.len(), 2);
        assert_eq!(v.get(10), Some(4.0));
        assert_eq!(v.get(11), Some(2.0));
    }

    #[test]
    fn test_vector_for_unknown_user_is_empty() {
        let index = RatingIndex::new();
        let builder = RatingVectorBuilder::new(&index);

        assert!(builder.rating_vector_for(42).unwrap().is_empty());
    }

    #[test]
    fn test_duplicates_resolve_independent_of_order() {
        let older = Rating::new(1, 10, 5.0).with_timestamp(100);
        let newer = Rating::new(1, 10, 2.0).with_timestamp(200);

        let forward = RatingVector::from_ratings(&[older, newer]);
        let backward = RatingVector::from_ratings(&[newer, older]);

        assert_eq!(forward, backward);
        assert_eq!(forward.get(10), Some(2.0));
    }

    #[test]
    fn test_mean_and_norm() {
        let v = vector(&[(1, 5.0), (2, 3.0)]);
        assert_eq!(v.mean(), Some(4.0));
        assert!((v.norm() - 34.0_f64.sqrt()).abs() < 1e-12);
        assert_eq!(RatingVector::new().mean(), None);
    }

    #[test]
    fn test_mean_centered_is_a_copy() {
        let v = vector(&[(1, 5.0), (2, 3.0)]);
        let centered = v.mean_centered();

        assert_eq!(centered.get(1), Some(1.0));
        assert_eq!(centered.get(2), Some(-1.0));
        // The source vector is untouched
        assert_eq!(v.get(1), Some(5.0));
    }

    #[test]
    fn test_mean_centering_idempotent() {
        let zero_mean = vector(&[(1, -1.5), (2, 0.5), (3, 1.0)]);
        assert_eq!(zero_mean.mean_centered(), zero_mean);

        let centered = vector(&[(1, 4.0), (2, 2.0), (3, 3.0)]).mean_centered();
        assert_eq!(centered.mean_centered(), centered);
    }

    #[test]
    fn test_dot_uses_intersection_only() {
        let a = vector(&[(1, 1.0), (2, 2.0), (3, 3.0)]);
        let b = vector(&[(2, 4.0), (3, -1.0), (9, 100.0)]);

        assert_eq!(a.dot(&b), 2.0 * 4.0 + 3.0 * -1.0);
        assert_eq!(a.dot(&RatingVector::new()), 0.0);
    }

    #[test]
    fn test_rater_groups() {
        let ratings = vec![
            Rating::new(3, 10, 4.0),
            Rating::new(1, 10, 2.0),
            Rating::new(2, 11, 5.0),
        ];
        let groups = RaterGroups::from_ratings(&ratings);

        let raters: Vec<UserId> = groups.raters_of(10).unwrap().keys().copied().collect();
        assert_eq!(raters, vec![1, 3]);
        assert_eq!(groups.raters_of(11).unwrap()[&2], 5.0);
        assert!(groups.raters_of(99).is_none());
        assert_eq!(groups.item_count(), 2);
    }

    #[test]
    fn test_builder_rater_groups_scan_store() {
        let index = RatingIndex::from_ratings(vec![
            Rating::new(1, 10, 4.0),
            Rating::new(2, 10, 3.0),
            Rating::new(2, 10, 1.0).with_timestamp(50),
        ]);
        let groups = RatingVectorBuilder::new(&index).rater_groups().unwrap();

        let raters = groups.raters_of(10).unwrap();
        assert_eq!(raters.len(), 2);
        assert_eq!(raters[&2], 1.0);
    }
}
