//! Location estimates and the time/accuracy-windowed estimate store
//!
//! A raw geographic fix on its own says nothing about the scene; what matters
//! is where the scene was when the fix arrived. `LocationEstimate` binds the
//! two together, and `EstimateStore` keeps the set of estimates that are still
//! spatially relevant to the present.

use crate::core::types::{horizontal_distance, GeoPoint, LocalPosition, Translation};
use serde::{Deserialize, Serialize};

/// How the current device location is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EstimateMethod {
    /// Pick the most accurate, then most recent, estimate from the store and
    /// translate it to the current scene position.
    #[default]
    MostRelevant,
    /// Bypass the store entirely and use the last raw fix as delivered.
    RawFixOnly,
}

/// A geographic fix paired with the local scene position recorded at the
/// moment the fix arrived. Immutable; created exactly once per fix.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationEstimate {
    pub location: GeoPoint,
    pub position: LocalPosition,
}

impl LocationEstimate {
    pub fn new(location: GeoPoint, position: LocalPosition) -> Self {
        Self { location, position }
    }

    /// The displacement from this estimate's recorded position to another
    /// local position, mapped into geographic axes. Frame convention:
    /// z grows southward, so north is `self.z - target.z`.
    pub fn translation_to(&self, position: &LocalPosition) -> Translation {
        Translation {
            north_south: f64::from(self.position.z - position.z),
            east_west: f64::from(position.x - self.position.x),
            up_down: f64::from(position.y - self.position.y),
        }
    }

    /// Projects this estimate's geographic coordinate to a different local
    /// position, yielding a geo estimate for something sitting there.
    pub fn translated_location(&self, position: &LocalPosition) -> GeoPoint {
        self.location.translated_by(&self.translation_to(position))
    }
}

/// Insertion-ordered collection of location estimates, pruned by spatial
/// radius around the current position. May legitimately be empty.
#[derive(Debug, Default)]
pub struct EstimateStore {
    estimates: Vec<LocationEstimate>,
}

impl EstimateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a new estimate binding `location` to the scene position it
    /// arrived at.
    pub fn insert(&mut self, location: GeoPoint, position: LocalPosition) {
        self.estimates.push(LocationEstimate::new(location, position));
    }

    /// The best estimation of location that has been taken.
    /// Favours the most accurate, then the most recent result; remaining ties
    /// keep insertion order. This doesn't indicate where the user currently is.
    pub fn best_estimate(&self) -> Option<&LocationEstimate> {
        self.estimates.iter().reduce(|best, candidate| {
            let best_acc = best.location.horizontal_accuracy;
            let cand_acc = candidate.location.horizontal_accuracy;

            if cand_acc < best_acc {
                candidate
            } else if cand_acc == best_acc
                && candidate.location.timestamp_ms > best.location.timestamp_ms
            {
                candidate
            } else {
                best
            }
        })
    }

    /// Removes every estimate whose horizontal distance from
    /// `current_position` exceeds `radius_m`, calling `on_removed` for each
    /// one before it is dropped. Survivors keep their relative order.
    pub fn prune<F>(&mut self, current_position: &LocalPosition, radius_m: f64, mut on_removed: F)
    where
        F: FnMut(&LocalPosition, &GeoPoint),
    {
        self.estimates.retain(|estimate| {
            let within =
                f64::from(horizontal_distance(current_position, &estimate.position)) <= radius_m;
            if !within {
                on_removed(&estimate.position, &estimate.location);
            }
            within
        });
    }

    /// The reconciled current device location, or `None` when no fix is
    /// available yet. `RawFixOnly` returns `last_raw_fix` as delivered; the
    /// default method requires both a best estimate and a current position.
    pub fn current_location(
        &self,
        method: EstimateMethod,
        current_position: Option<&LocalPosition>,
        last_raw_fix: Option<&GeoPoint>,
    ) -> Option<GeoPoint> {
        if method == EstimateMethod::RawFixOnly {
            return last_raw_fix.cloned();
        }

        let best = self.best_estimate()?;
        let position = current_position?;
        Some(best.translated_location(position))
    }

    pub fn len(&self) -> usize {
        self.estimates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.estimates.is_empty()
    }

    pub fn clear(&mut self) {
        self.estimates.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &LocationEstimate> {
        self.estimates.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fix(accuracy: f64, timestamp_ms: u64) -> GeoPoint {
        GeoPoint::new(52.52, 13.40, 34.0, accuracy, timestamp_ms)
    }

    fn pos(x: f32, z: f32) -> LocalPosition {
        LocalPosition::new(x, 0.0, z)
    }

    #[test]
    fn test_best_estimate_prefers_accuracy_over_recency() {
        let mut store = EstimateStore::new();
        store.insert(fix(10.0, 1_000), pos(0.0, 0.0));
        store.insert(fix(5.0, 500), pos(1.0, 0.0));

        let best = store.best_estimate().unwrap();
        assert_eq!(best.location.horizontal_accuracy, 5.0);
        assert_eq!(best.location.timestamp_ms, 500);
    }

    #[test]
    fn test_best_estimate_breaks_accuracy_ties_by_recency() {
        let mut store = EstimateStore::new();
        store.insert(fix(5.0, 1_000), pos(0.0, 0.0));
        store.insert(fix(5.0, 2_000), pos(1.0, 0.0));
        store.insert(fix(5.0, 1_500), pos(2.0, 0.0));

        let best = store.best_estimate().unwrap();
        assert_eq!(best.location.timestamp_ms, 2_000);
    }

    #[test]
    fn test_best_estimate_full_tie_keeps_insertion_order() {
        let mut store = EstimateStore::new();
        store.insert(fix(5.0, 1_000), pos(1.0, 0.0));
        store.insert(fix(5.0, 1_000), pos(2.0, 0.0));

        let best = store.best_estimate().unwrap();
        assert_eq!(best.position, pos(1.0, 0.0));
    }

    #[test]
    fn test_best_estimate_insertion_order_invariant() {
        let estimates = [
            (fix(10.0, 1_000), pos(0.0, 0.0)),
            (fix(3.0, 500), pos(1.0, 0.0)),
            (fix(7.0, 2_000), pos(2.0, 0.0)),
        ];

        // Every permutation of insertions yields the same winner.
        let orders: [[usize; 3]; 6] = [
            [0, 1, 2],
            [0, 2, 1],
            [1, 0, 2],
            [1, 2, 0],
            [2, 0, 1],
            [2, 1, 0],
        ];
        for order in orders {
            let mut store = EstimateStore::new();
            for i in order {
                let (location, position) = estimates[i].clone();
                store.insert(location, position);
            }
            assert_eq!(
                store.best_estimate().unwrap().location.horizontal_accuracy,
                3.0
            );
        }
    }

    #[test]
    fn test_best_estimate_empty_store() {
        let store = EstimateStore::new();
        assert!(store.best_estimate().is_none());
    }

    #[test]
    fn test_prune_removes_only_distant_estimates() {
        let mut store = EstimateStore::new();
        store.insert(fix(5.0, 1_000), pos(0.0, 0.0));
        store.insert(fix(6.0, 2_000), pos(50.0, 0.0));
        store.insert(fix(7.0, 3_000), pos(0.0, 150.0));
        store.insert(fix(8.0, 4_000), pos(99.0, 0.0));

        let mut removed = Vec::new();
        store.prune(&pos(0.0, 0.0), 100.0, |position, _location| {
            removed.push(*position);
        });

        assert_eq!(removed, vec![pos(0.0, 150.0)]);
        assert_eq!(store.len(), 3);

        // Survivors keep their relative order.
        let positions: Vec<_> = store.iter().map(|e| e.position).collect();
        assert_eq!(positions, vec![pos(0.0, 0.0), pos(50.0, 0.0), pos(99.0, 0.0)]);
    }

    #[test]
    fn test_prune_ignores_vertical_axis() {
        let mut store = EstimateStore::new();
        store.insert(fix(5.0, 1_000), LocalPosition::new(10.0, 500.0, 0.0));

        store.prune(&pos(0.0, 0.0), 100.0, |_, _| panic!("should not remove"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_translated_location_round_trip_at_same_position() {
        let location = fix(5.0, 1_000);
        let estimate = LocationEstimate::new(location.clone(), pos(10.0, -20.0));

        let translated = estimate.translated_location(&pos(10.0, -20.0));
        assert!((translated.latitude - location.latitude).abs() < 1e-9);
        assert!((translated.longitude - location.longitude).abs() < 1e-9);
    }

    #[test]
    fn test_translation_frame_convention() {
        // Scene frame: x = east, y = up, z = south. Moving to a position
        // further north (smaller z) and further east (larger x) must produce
        // positive north and east deltas.
        let estimate = LocationEstimate::new(fix(5.0, 1_000), pos(0.0, 0.0));
        let t = estimate.translation_to(&LocalPosition::new(3.0, 2.0, -4.0));

        assert_eq!(t.north_south, 4.0);
        assert_eq!(t.east_west, 3.0);
        assert_eq!(t.up_down, 2.0);
    }

    #[test]
    fn test_current_location_most_relevant_uses_best_estimate() {
        let mut store = EstimateStore::new();
        let position = pos(0.0, 0.0);
        store.insert(fix(10.0, 1_000), position);
        store.insert(fix(5.0, 500), position);

        let raw = fix(50.0, 9_000);
        let current = store
            .current_location(EstimateMethod::MostRelevant, Some(&position), Some(&raw))
            .unwrap();

        // Same position as the estimate, so the coordinate passes through and
        // the 5 m estimate wins regardless of timestamp.
        assert_eq!(current.horizontal_accuracy, 5.0);
    }

    #[test]
    fn test_current_location_raw_fix_only_bypasses_store() {
        let mut store = EstimateStore::new();
        store.insert(fix(1.0, 1_000), pos(0.0, 0.0));

        let raw = fix(50.0, 9_000);
        let current = store
            .current_location(EstimateMethod::RawFixOnly, Some(&pos(0.0, 0.0)), Some(&raw))
            .unwrap();
        assert_eq!(current.horizontal_accuracy, 50.0);
    }

    #[test]
    fn test_current_location_missing_context_is_none() {
        let mut store = EstimateStore::new();
        assert!(store
            .current_location(EstimateMethod::MostRelevant, Some(&pos(0.0, 0.0)), None)
            .is_none());

        store.insert(fix(5.0, 1_000), pos(0.0, 0.0));
        assert!(store
            .current_location(EstimateMethod::MostRelevant, None, None)
            .is_none());
    }
}
