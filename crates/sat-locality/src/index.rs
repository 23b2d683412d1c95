//! Circular variable index: bearings on a circle of circumference 1.
//!
//! Purpose
//! - Answer "which variables lie within angular distance `w` of `center`"
//!   with two binary searches over the bearing-sorted sequence.
//!
//! Model
//! - Bearings live in [0, 1) and are sorted ascending, each paired with the
//!   1-based id it was created with. Equal bearings are legal.
//! - A query window `[center - w, center + w]` is reduced modulo 1. When it
//!   straddles the 0/1 boundary it becomes the two runs `[lo, 1)` and `[0, hi]`.
//! - `w >= 0.5` covers the whole circle.
//!
//! The index is read-only after construction and can be shared across threads.

use crate::error::GeneratorError;
use crate::stream::RandomStream;
use std::ops::Range;

/// Dense 1-based variable identifier.
pub type VarId = u32;

/// Largest variable count whose ids fit a signed 32-bit DIMACS literal.
pub const MAX_VARIABLES: usize = i32::MAX as usize;

#[derive(Clone, Debug)]
pub struct CircleIndex {
    bearings: Vec<f64>,
    ids: Vec<VarId>,
}

impl CircleIndex {
    /// Build from bearings given in id order: `bearings[i]` belongs to id `i + 1`.
    pub fn from_bearings(bearings: Vec<f64>) -> Result<Self, GeneratorError> {
        if bearings.len() > MAX_VARIABLES {
            return Err(GeneratorError::invalid(format!(
                "at most {MAX_VARIABLES} variables supported"
            )));
        }
        if let Some(b) = bearings.iter().find(|b| !(0.0..1.0).contains(*b)) {
            return Err(GeneratorError::invalid(format!(
                "bearing {b} outside [0, 1)"
            )));
        }
        let mut pairs: Vec<(f64, VarId)> = bearings
            .into_iter()
            .zip(1..)
            .collect();
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
        let (bearings, ids) = pairs.into_iter().unzip();
        Ok(Self { bearings, ids })
    }

    /// Place `n` variables at independent uniform bearings drawn from `stream`.
    pub fn random(n: usize, stream: &mut RandomStream) -> Result<Self, GeneratorError> {
        tracing::debug!(n, "generating random bearings");
        let bearings: Vec<f64> = (0..n).map(|_| stream.next_f64()).collect();
        Self::from_bearings(bearings)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// `(bearing, id)` pairs in ascending bearing order.
    pub fn iter(&self) -> impl Iterator<Item = (f64, VarId)> + '_ {
        self.bearings.iter().copied().zip(self.ids.iter().copied())
    }

    /// Ids within angular distance `w` of `center` (both ends inclusive).
    ///
    /// Order follows the sorted sequence, starting from bearing 0 when the
    /// window wraps. Rejects negative or NaN `w`.
    pub fn eligible(&self, center: f64, w: f64) -> Result<Vec<VarId>, GeneratorError> {
        Ok(self.window(center, w)?.iter().collect())
    }

    /// Non-materialised form of [`CircleIndex::eligible`].
    pub fn window(&self, center: f64, w: f64) -> Result<Window<'_>, GeneratorError> {
        check_width(w)?;
        Ok(self.window_unchecked(center, w))
    }

    /// `w` must already be known to be a non-negative number.
    pub(crate) fn window_unchecked(&self, center: f64, w: f64) -> Window<'_> {
        let n = self.len();
        if w >= 0.5 {
            return Window::new(&self.ids, 0..n, 0..0);
        }
        let lo = (center - w).rem_euclid(1.0);
        let hi = (center + w).rem_euclid(1.0);
        let start = self.bearings.partition_point(|&b| b < lo);
        let end = self.bearings.partition_point(|&b| b <= hi);
        if lo <= hi {
            Window::new(&self.ids, start..end.max(start), 0..0)
        } else {
            // Straddles the boundary: [0, hi] then [lo, 1).
            Window::new(&self.ids, 0..end, start..n)
        }
    }
}

pub(crate) fn check_width(w: f64) -> Result<(), GeneratorError> {
    if w.is_nan() || w < 0.0 {
        return Err(GeneratorError::invalid(format!(
            "window width must be >= 0, got {w}"
        )));
    }
    Ok(())
}

/// Eligible variables for one query: up to two runs of the sorted sequence.
#[derive(Clone, Debug)]
pub struct Window<'a> {
    ids: &'a [VarId],
    head: Range<usize>,
    tail: Range<usize>,
}

impl<'a> Window<'a> {
    fn new(ids: &'a [VarId], head: Range<usize>, tail: Range<usize>) -> Self {
        Self { ids, head, tail }
    }

    pub fn len(&self) -> usize {
        self.head.len() + self.tail.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Id at position `i` of the window (`i < len()`).
    #[inline]
    pub fn get(&self, i: usize) -> VarId {
        let h = self.head.len();
        if i < h {
            self.ids[self.head.start + i]
        } else {
            self.ids[self.tail.start + (i - h)]
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = VarId> + 'a {
        let ids = self.ids;
        ids[self.head.clone()]
            .iter()
            .chain(ids[self.tail.clone()].iter())
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    fn small() -> CircleIndex {
        CircleIndex::from_bearings(vec![0.05, 0.10, 0.90, 0.95]).unwrap()
    }

    fn set(v: Vec<VarId>) -> BTreeSet<VarId> {
        v.into_iter().collect()
    }

    fn circular_distance(a: f64, b: f64) -> f64 {
        let d = (a - b).abs();
        d.min(1.0 - d)
    }

    #[test]
    fn wraps_past_the_boundary() {
        let idx = small();
        let got = set(idx.eligible(0.98, 0.1).unwrap());
        assert_eq!(got, BTreeSet::from([1, 3, 4]));
    }

    #[test]
    fn wraps_below_zero() {
        let idx = small();
        // 0.90 sits 0.12 away from 0.02.
        let got = set(idx.eligible(0.02, 0.1).unwrap());
        assert_eq!(got, BTreeSet::from([1, 2, 4]));
        let got = set(idx.eligible(0.0, 0.06).unwrap());
        assert_eq!(got, BTreeSet::from([1, 4]));
    }

    #[test]
    fn contiguous_window() {
        let idx = small();
        let got = set(idx.eligible(0.5, 0.3).unwrap());
        assert!(got.is_empty());
        let got = set(idx.eligible(0.08, 0.04).unwrap());
        assert_eq!(got, BTreeSet::from([1, 2]));
    }

    #[test]
    fn half_width_covers_everything() {
        let idx = small();
        for center in [0.0, 0.3, 0.5, 0.99] {
            assert_eq!(idx.eligible(center, 0.5).unwrap().len(), 4);
            assert_eq!(idx.eligible(center, 3.0).unwrap().len(), 4);
        }
    }

    #[test]
    fn zero_width_matches_exact_bearings_only() {
        let idx = small();
        assert_eq!(idx.eligible(0.10, 0.0).unwrap(), vec![2]);
        assert!(idx.eligible(0.11, 0.0).unwrap().is_empty());
    }

    #[test]
    fn rejects_negative_and_nan_width() {
        let idx = small();
        assert!(matches!(
            idx.eligible(0.5, -0.1),
            Err(GeneratorError::InvalidParams { .. })
        ));
        assert!(idx.window(0.5, f64::NAN).is_err());
    }

    #[test]
    fn rejects_out_of_range_bearings() {
        assert!(CircleIndex::from_bearings(vec![0.2, 1.0]).is_err());
        assert!(CircleIndex::from_bearings(vec![-0.1]).is_err());
    }

    #[test]
    fn equal_bearings_keep_both_ids() {
        let idx = CircleIndex::from_bearings(vec![0.4, 0.4, 0.7]).unwrap();
        let got = idx.eligible(0.4, 0.01).unwrap();
        assert_eq!(set(got.clone()), BTreeSet::from([1, 2]));
        assert_eq!(got.len(), 2);
    }

    #[test]
    fn window_get_matches_iter() {
        let idx = small();
        let win = idx.window(0.98, 0.1).unwrap();
        let by_get: Vec<VarId> = (0..win.len()).map(|i| win.get(i)).collect();
        assert_eq!(by_get, win.iter().collect::<Vec<_>>());
    }

    #[test]
    fn sorted_and_ids_preserved() {
        let mut s = RandomStream::with_batch(Some(5), 32);
        let idx = CircleIndex::random(100, &mut s).unwrap();
        let pairs: Vec<_> = idx.iter().collect();
        assert!(pairs.windows(2).all(|p| p[0].0 <= p[1].0));
        let ids: BTreeSet<VarId> = pairs.iter().map(|p| p.1).collect();
        assert_eq!(ids, (1..=100).collect::<BTreeSet<VarId>>());
    }

    proptest! {
        #[test]
        fn window_matches_brute_force(
            bearings in proptest::collection::vec(0.0f64..1.0, 0..60),
            center in 0.0f64..1.0,
            w in 0.0f64..0.6,
        ) {
            let idx = CircleIndex::from_bearings(bearings.clone()).unwrap();
            let got = set(idx.eligible(center, w).unwrap());
            // Stay clear of float ties at the window edges.
            for (i, &b) in bearings.iter().enumerate() {
                let d = circular_distance(b, center);
                let id = i as VarId + 1;
                if w >= 0.5 || d < w - 1e-9 {
                    prop_assert!(got.contains(&id));
                } else if d > w + 1e-9 {
                    prop_assert!(!got.contains(&id));
                }
            }
        }
    }
}
