//! # Time windows: ordered sets of disjoint closed intervals
//!
//! This module defines [`Interval`] and [`TimeWindow`], the value types exchanged with the
//! search engine. A [`TimeWindow`] is both the **confinement** input of a search (where the
//! engine is allowed to look) and its **result** (where the searched condition holds).
//!
//! ## Invariants
//!
//! A [`TimeWindow`] always holds its intervals
//!
//! * sorted ascending by start time,
//! * mutually disjoint and **non-adjacent**: for consecutive intervals `i, i+1`,
//!   `i.end < (i+1).start` strictly.
//!
//! Any insertion that overlaps or touches existing intervals merges with them, so the
//! invariant holds after every operation. Zero-width intervals (`start == end`) are valid
//! point events.
//!
//! ## Interchange format
//!
//! External tooling exchanges windows as a flat array of `2n` values holding alternating
//! `(start, end)` pairs. [`TimeWindow::from_pairs`] / [`TimeWindow::to_pairs`] convert to and
//! from that layout, and the serde representation of a window is that same flat array
//! (validated on deserialization).
//!
//! ```rust
//! use gfsearch::window::TimeWindow;
//!
//! let mut window = TimeWindow::from_pairs(&[0.0, 10.0, 20.0, 30.0]).unwrap();
//! window.insert(10.0, 20.0).unwrap(); // touches both: everything merges
//! assert_eq!(window.to_pairs(), vec![0.0, 30.0]);
//! ```
//!
//! ## Window algebra
//!
//! Beyond insertion, windows support the usual set operations
//! ([`union`](TimeWindow::union), [`intersection`](TimeWindow::intersection),
//! [`difference`](TimeWindow::difference),
//! [`complement_within`](TimeWindow::complement_within)) and the interval-wise transforms
//! used to post-process search results ([`contract`](TimeWindow::contract),
//! [`expand`](TimeWindow::expand), [`fill_gaps`](TimeWindow::fill_gaps),
//! [`filter_small`](TimeWindow::filter_small)). All of them return new windows.
use std::fmt;

use itertools::Itertools;

use serde::{Deserialize, Serialize};

use crate::constants::Seconds;
use crate::gfsearch_errors::SearchError;

pub mod display;

pub use display::WindowSummary;

/// A closed time interval `[start, end]` in the engine time scale.
///
/// Built through [`Interval::new`], which rejects `start > end` and non-finite bounds. The
/// bounds are read-only afterwards, so every `Interval` in circulation is well formed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 2]", into = "[f64; 2]")]
pub struct Interval {
    start: Seconds,
    end: Seconds,
}

impl Interval {
    /// Create a validated interval.
    ///
    /// Arguments
    /// -----------------
    /// * `start`: left endpoint (seconds).
    /// * `end`: right endpoint (seconds), `end >= start`.
    ///
    /// Return
    /// ----------
    /// * The interval, or [`SearchError::InvalidInterval`] if `start > end` or either bound
    ///   is NaN / infinite.
    pub fn new(start: Seconds, end: Seconds) -> Result<Self, SearchError> {
        if !start.is_finite() || !end.is_finite() || start > end {
            return Err(SearchError::InvalidInterval { start, end });
        }
        Ok(Interval { start, end })
    }

    /// Zero-width interval at `t`.
    pub fn point(t: Seconds) -> Result<Self, SearchError> {
        Interval::new(t, t)
    }

    #[inline]
    pub fn start(&self) -> Seconds {
        self.start
    }

    #[inline]
    pub fn end(&self) -> Seconds {
        self.end
    }

    #[inline]
    pub fn length(&self) -> Seconds {
        self.end - self.start
    }

    #[inline]
    pub fn is_point(&self) -> bool {
        self.start == self.end
    }

    #[inline]
    pub fn contains(&self, t: Seconds) -> bool {
        self.start <= t && t <= self.end
    }

    /// True if `other` lies entirely inside `self`.
    #[inline]
    pub fn covers(&self, other: &Interval) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// True if the two closed intervals share at least one point.
    #[inline]
    pub fn overlaps_or_touches(&self, other: &Interval) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

impl TryFrom<[f64; 2]> for Interval {
    type Error = SearchError;

    fn try_from(value: [f64; 2]) -> Result<Self, Self::Error> {
        Interval::new(value[0], value[1])
    }
}

impl From<Interval> for [f64; 2] {
    fn from(value: Interval) -> Self {
        [value.start, value.end]
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match f.precision() {
            Some(p) => write!(f, "[{:.*}, {:.*}]", p, self.start, p, self.end),
            None => write!(f, "[{}, {}]", self.start, self.end),
        }
    }
}

/// Ordered set of disjoint, non-adjacent closed intervals.
///
/// See the [module documentation](crate::window) for the invariants and the interchange format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct TimeWindow {
    intervals: Vec<Interval>,
}

impl TimeWindow {
    /// Create an empty window.
    pub fn new() -> Self {
        TimeWindow {
            intervals: Vec::new(),
        }
    }

    /// Build a window from a flat array of alternating `(start, end)` values.
    ///
    /// Arguments
    /// -----------------
    /// * `values`: `2n` values; pair `k` is `(values[2k], values[2k+1])`. Pairs do not need
    ///   to be sorted or disjoint: each one is inserted and merged.
    ///
    /// Return
    /// ----------
    /// * The merged window.
    /// * [`SearchError::OddPairCount`] if `values.len()` is odd.
    /// * [`SearchError::InvalidInterval`] if any pair is malformed.
    ///
    /// See also
    /// ------------
    /// * [`TimeWindow::to_pairs`] – Inverse conversion.
    pub fn from_pairs(values: &[f64]) -> Result<Self, SearchError> {
        if values.len() % 2 != 0 {
            return Err(SearchError::OddPairCount(values.len()));
        }
        let mut window = TimeWindow::new();
        for pair in values.chunks_exact(2) {
            window.insert(pair[0], pair[1])?;
        }
        Ok(window)
    }

    /// Build a window from already validated intervals, merging as needed.
    pub fn from_intervals<I>(intervals: I) -> Self
    where
        I: IntoIterator<Item = Interval>,
    {
        intervals.into_iter().collect()
    }

    /// Flatten the window into `2n` alternating start/end values, ascending.
    pub fn to_pairs(&self) -> Vec<f64> {
        self.intervals
            .iter()
            .flat_map(|iv| [iv.start, iv.end])
            .collect()
    }

    /// Insert `[start, end]`, merging with every interval it overlaps or touches.
    ///
    /// Arguments
    /// -----------------
    /// * `start`, `end`: bounds of the new interval.
    ///
    /// Return
    /// ----------
    /// * `Ok(())`, or [`SearchError::InvalidInterval`] if `start > end` or a bound is not
    ///   finite. On error the window is unchanged.
    pub fn insert(&mut self, start: Seconds, end: Seconds) -> Result<(), SearchError> {
        let interval = Interval::new(start, end)?;
        self.insert_interval(interval);
        Ok(())
    }

    /// Insert an already validated interval. See [`TimeWindow::insert`].
    pub fn insert_interval(&mut self, interval: Interval) {
        // ends are ascending as well, so both bounds of the merge range are found by bisection
        let lo = self.intervals.partition_point(|iv| iv.end < interval.start);
        let hi = self.intervals.partition_point(|iv| iv.start <= interval.end);

        if lo >= hi {
            self.intervals.insert(lo, interval);
            return;
        }

        let merged = Interval {
            start: interval.start.min(self.intervals[lo].start),
            end: interval.end.max(self.intervals[hi - 1].end),
        };
        self.intervals.splice(lo..hi, std::iter::once(merged));
    }

    /// Number of disjoint intervals.
    #[inline]
    pub fn cardinality(&self) -> usize {
        self.intervals.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// The `index`-th interval in ascending order.
    ///
    /// Return
    /// ----------
    /// * The interval, or [`SearchError::IndexOutOfRange`] if `index >= cardinality()`.
    pub fn interval(&self, index: usize) -> Result<Interval, SearchError> {
        self.intervals
            .get(index)
            .copied()
            .ok_or(SearchError::IndexOutOfRange {
                index,
                cardinality: self.intervals.len(),
            })
    }

    pub fn first(&self) -> Option<&Interval> {
        self.intervals.first()
    }

    pub fn last(&self) -> Option<&Interval> {
        self.intervals.last()
    }

    /// Smallest interval covering the whole window, `None` if empty.
    pub fn bounds(&self) -> Option<Interval> {
        match (self.intervals.first(), self.intervals.last()) {
            (Some(first), Some(last)) => Some(Interval {
                start: first.start,
                end: last.end,
            }),
            _ => None,
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Interval> {
        self.intervals.iter()
    }

    pub fn as_slice(&self) -> &[Interval] {
        &self.intervals
    }

    /// True if `t` lies in one of the intervals.
    pub fn contains(&self, t: Seconds) -> bool {
        let idx = self.intervals.partition_point(|iv| iv.end < t);
        self.intervals.get(idx).is_some_and(|iv| iv.contains(t))
    }

    /// True if `interval` lies entirely inside one interval of the window.
    pub fn includes(&self, interval: &Interval) -> bool {
        let idx = self.intervals.partition_point(|iv| iv.end < interval.start);
        self.intervals
            .get(idx)
            .is_some_and(|iv| iv.covers(interval))
    }

    /// Total measure: sum of the interval lengths.
    pub fn measure(&self) -> Seconds {
        self.intervals.iter().map(Interval::length).sum()
    }

    /// Union of two windows.
    pub fn union(&self, other: &TimeWindow) -> TimeWindow {
        let intervals = self
            .iter()
            .merge_by(other.iter(), |a, b| a.start <= b.start)
            .copied()
            .coalesce(|a, b| {
                if b.start <= a.end {
                    Ok(Interval {
                        start: a.start,
                        end: a.end.max(b.end),
                    })
                } else {
                    Err((a, b))
                }
            })
            .collect();
        TimeWindow { intervals }
    }

    /// Intersection of two windows (closed intervals: touching intervals intersect in a point).
    pub fn intersection(&self, other: &TimeWindow) -> TimeWindow {
        let (a, b) = (&self.intervals, &other.intervals);
        let (mut i, mut j) = (0, 0);
        let mut out = TimeWindow::new();

        while i < a.len() && j < b.len() {
            let start = a[i].start.max(b[j].start);
            let end = a[i].end.min(b[j].end);
            if start <= end {
                out.insert_interval(Interval { start, end });
            }
            if a[i].end < b[j].end {
                i += 1;
            } else {
                j += 1;
            }
        }
        out
    }

    /// Gaps of the window inside `[start, end]`.
    ///
    /// Only gaps of strictly positive length are returned; the gaps share their endpoints
    /// with the neighbouring intervals of `self`.
    ///
    /// Return
    /// ----------
    /// * The complement window, or [`SearchError::InvalidInterval`] if `[start, end]` is
    ///   malformed.
    pub fn complement_within(
        &self,
        start: Seconds,
        end: Seconds,
    ) -> Result<TimeWindow, SearchError> {
        let domain = Interval::new(start, end)?;
        let mut out = TimeWindow::new();
        let mut cursor = domain.start;

        for iv in self
            .intervals
            .iter()
            .filter(|iv| iv.overlaps_or_touches(&domain))
        {
            if iv.start > cursor {
                out.insert_interval(Interval {
                    start: cursor,
                    end: iv.start,
                });
            }
            cursor = cursor.max(iv.end);
        }
        if cursor < domain.end {
            out.insert_interval(Interval {
                start: cursor,
                end: domain.end,
            });
        }
        Ok(out)
    }

    /// Parts of `self` not covered by `other`.
    pub fn difference(&self, other: &TimeWindow) -> TimeWindow {
        match self.bounds() {
            None => TimeWindow::new(),
            Some(bounds) => {
                // bounds come from a valid window
                let gaps = other
                    .complement_within(bounds.start, bounds.end)
                    .unwrap_or_default();
                self.intersection(&gaps)
                    .filter_small(0.0)
                    .union(&self.isolated_points_outside(other))
            }
        }
    }

    /// Zero-width intervals of `self` that `other` does not contain.
    fn isolated_points_outside(&self, other: &TimeWindow) -> TimeWindow {
        self.intervals
            .iter()
            .filter(|iv| iv.is_point() && !other.contains(iv.start))
            .copied()
            .collect()
    }

    /// Shrink every interval: `[s, e] -> [s + left, e - right]`.
    ///
    /// Intervals that would become inverted are dropped.
    ///
    /// Return
    /// ----------
    /// * The contracted window, or [`SearchError::InvalidConfig`] if an amount is not finite.
    pub fn contract(&self, left: Seconds, right: Seconds) -> Result<TimeWindow, SearchError> {
        if !left.is_finite() || !right.is_finite() {
            return Err(SearchError::InvalidConfig(
                "contraction amounts must be finite".into(),
            ));
        }
        Ok(self
            .intervals
            .iter()
            .filter_map(|iv| Interval::new(iv.start + left, iv.end - right).ok())
            .collect())
    }

    /// Grow every interval: `[s, e] -> [s - left, e + right]`, merging any overlap.
    ///
    /// Negative amounts shrink; intervals that would become inverted are dropped.
    pub fn expand(&self, left: Seconds, right: Seconds) -> Result<TimeWindow, SearchError> {
        self.contract(-left, -right)
    }

    /// Merge intervals separated by gaps of at most `max_gap`.
    pub fn fill_gaps(&self, max_gap: Seconds) -> TimeWindow {
        let intervals = self
            .iter()
            .copied()
            .coalesce(|prev, iv| {
                if iv.start - prev.end <= max_gap {
                    Ok(Interval {
                        start: prev.start,
                        end: iv.end,
                    })
                } else {
                    Err((prev, iv))
                }
            })
            .collect();
        TimeWindow { intervals }
    }

    /// Remove intervals whose length is less than or equal to `small`.
    pub fn filter_small(&self, small: Seconds) -> TimeWindow {
        TimeWindow {
            intervals: self
                .intervals
                .iter()
                .filter(|iv| iv.length() > small)
                .copied()
                .collect(),
        }
    }

    /// Summary statistics on interval lengths, `None` for an empty window.
    ///
    /// See also
    /// ------------
    /// * [`WindowSummary`] – Fields and display formats.
    pub fn summary(&self) -> Option<WindowSummary> {
        WindowSummary::from_window(self)
    }
}

impl FromIterator<Interval> for TimeWindow {
    fn from_iter<I: IntoIterator<Item = Interval>>(iter: I) -> Self {
        let mut window = TimeWindow::new();
        window.extend(iter);
        window
    }
}

impl Extend<Interval> for TimeWindow {
    fn extend<I: IntoIterator<Item = Interval>>(&mut self, iter: I) {
        for interval in iter {
            self.insert_interval(interval);
        }
    }
}

impl<'a> IntoIterator for &'a TimeWindow {
    type Item = &'a Interval;
    type IntoIter = std::slice::Iter<'a, Interval>;

    fn into_iter(self) -> Self::IntoIter {
        self.intervals.iter()
    }
}

impl TryFrom<Vec<f64>> for TimeWindow {
    type Error = SearchError;

    fn try_from(value: Vec<f64>) -> Result<Self, Self::Error> {
        TimeWindow::from_pairs(&value)
    }
}

impl From<TimeWindow> for Vec<f64> {
    fn from(value: TimeWindow) -> Self {
        value.to_pairs()
    }
}

#[cfg(test)]
mod window_test {
    use super::*;

    fn window(pairs: &[f64]) -> TimeWindow {
        TimeWindow::from_pairs(pairs).unwrap()
    }

    #[test]
    fn test_interval_validation() {
        assert!(Interval::new(1.0, 1.0).unwrap().is_point());
        assert_eq!(
            Interval::new(2.0, 1.0),
            Err(SearchError::InvalidInterval {
                start: 2.0,
                end: 1.0
            })
        );
        assert!(Interval::new(f64::NAN, 1.0).is_err());
        assert!(Interval::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_malformed_intervals_never_enter_a_window() {
        let mut w = window(&[0.0, 10.0, 20.0, 30.0]);
        assert!(w.insert(50.0, 1.0).is_err());
        assert!(w.insert(f64::NAN, 3.0).is_err());

        let bad: Vec<Interval> = [[50.0, 1.0], [f64::NAN, 3.0], [40.0, 45.0]]
            .into_iter()
            .filter_map(|pair| Interval::try_from(pair).ok())
            .collect();
        w.extend(bad);
        assert_eq!(w.to_pairs(), vec![0.0, 10.0, 20.0, 30.0, 40.0, 45.0]);

        let iv = Interval::new(2.0, 3.0).unwrap();
        assert_eq!((iv.start(), iv.end()), (2.0, 3.0));
    }

    #[test]
    fn test_insert_keeps_order() {
        let mut w = TimeWindow::new();
        w.insert(50.0, 60.0).unwrap();
        w.insert(10.0, 20.0).unwrap();
        w.insert(30.0, 40.0).unwrap();
        assert_eq!(w.to_pairs(), vec![10.0, 20.0, 30.0, 40.0, 50.0, 60.0]);
        assert_eq!(w.cardinality(), 3);
    }

    #[test]
    fn test_insert_merges_overlap_and_adjacency() {
        let mut w = window(&[0.0, 10.0, 20.0, 30.0, 40.0, 50.0]);

        w.insert(5.0, 25.0).unwrap();
        assert_eq!(w.to_pairs(), vec![0.0, 30.0, 40.0, 50.0]);

        w.insert(30.0, 40.0).unwrap();
        assert_eq!(w.to_pairs(), vec![0.0, 50.0]);

        w.insert(-10.0, 100.0).unwrap();
        assert_eq!(w.to_pairs(), vec![-10.0, 100.0]);
    }

    #[test]
    fn test_insert_point_events() {
        let mut w = TimeWindow::new();
        w.insert(5.0, 5.0).unwrap();
        w.insert(7.0, 7.0).unwrap();
        assert_eq!(w.cardinality(), 2);

        // a point on the boundary of an interval is absorbed
        w.insert(5.0, 7.0).unwrap();
        assert_eq!(w.to_pairs(), vec![5.0, 7.0]);
    }

    #[test]
    fn test_insert_covered_is_noop() {
        let mut w = window(&[0.0, 10.0, 20.0, 30.0]);
        let before = w.clone();
        w.insert(2.0, 8.0).unwrap();
        w.insert(20.0, 30.0).unwrap();
        assert_eq!(w, before);
    }

    #[test]
    fn test_insert_invalid_leaves_window_unchanged() {
        let mut w = window(&[0.0, 10.0]);
        assert!(w.insert(5.0, 1.0).is_err());
        assert_eq!(w.to_pairs(), vec![0.0, 10.0]);
    }

    #[test]
    fn test_interval_index() {
        let w = window(&[0.0, 1.0, 2.0, 3.0]);
        assert_eq!(w.interval(1).unwrap(), Interval::new(2.0, 3.0).unwrap());
        assert_eq!(
            w.interval(2),
            Err(SearchError::IndexOutOfRange {
                index: 2,
                cardinality: 2
            })
        );
    }

    #[test]
    fn test_from_pairs_odd_length() {
        assert_eq!(
            TimeWindow::from_pairs(&[0.0, 1.0, 2.0]),
            Err(SearchError::OddPairCount(3))
        );
    }

    #[test]
    fn test_from_pairs_merges_unsorted_input() {
        let w = window(&[20.0, 30.0, 0.0, 10.0, 10.0, 15.0]);
        assert_eq!(w.to_pairs(), vec![0.0, 15.0, 20.0, 30.0]);
    }

    #[test]
    fn test_contains_and_includes() {
        let w = window(&[0.0, 10.0, 20.0, 30.0]);
        assert!(w.contains(0.0));
        assert!(w.contains(10.0));
        assert!(!w.contains(15.0));
        assert!(w.contains(25.0));
        assert!(!w.contains(31.0));

        assert!(w.includes(&Interval::new(21.0, 29.0).unwrap()));
        assert!(!w.includes(&Interval::new(5.0, 25.0).unwrap()));
    }

    #[test]
    fn test_measure_and_bounds() {
        let w = window(&[0.0, 10.0, 20.0, 25.0]);
        assert_eq!(w.measure(), 15.0);
        assert_eq!(w.bounds(), Some(Interval::new(0.0, 25.0).unwrap()));
        assert_eq!(TimeWindow::new().bounds(), None);
    }

    #[test]
    fn test_union_and_intersection() {
        let a = window(&[0.0, 10.0, 20.0, 30.0]);
        let b = window(&[5.0, 22.0, 28.0, 40.0]);

        assert_eq!(a.union(&b).to_pairs(), vec![0.0, 40.0]);
        assert_eq!(
            a.intersection(&b).to_pairs(),
            vec![5.0, 10.0, 20.0, 22.0, 28.0, 30.0]
        );

        let touching = window(&[10.0, 12.0]);
        assert_eq!(a.intersection(&touching).to_pairs(), vec![10.0, 10.0]);
    }

    #[test]
    fn test_complement_within() {
        let w = window(&[10.0, 20.0, 30.0, 40.0]);
        assert_eq!(
            w.complement_within(0.0, 50.0).unwrap().to_pairs(),
            vec![0.0, 10.0, 20.0, 30.0, 40.0, 50.0]
        );
        assert_eq!(
            w.complement_within(15.0, 35.0).unwrap().to_pairs(),
            vec![20.0, 30.0]
        );
        assert!(w.complement_within(12.0, 18.0).unwrap().is_empty());
        assert!(w.complement_within(5.0, 1.0).is_err());
    }

    #[test]
    fn test_difference() {
        let a = window(&[0.0, 10.0, 20.0, 30.0]);
        let b = window(&[5.0, 25.0]);
        assert_eq!(a.difference(&b).to_pairs(), vec![0.0, 5.0, 25.0, 30.0]);

        assert!(a.difference(&a).is_empty());
        assert_eq!(a.difference(&TimeWindow::new()), a);
    }

    #[test]
    fn test_contract_and_expand() {
        let w = window(&[0.0, 10.0, 20.0, 21.0]);
        assert_eq!(w.contract(1.0, 1.0).unwrap().to_pairs(), vec![1.0, 9.0]);
        assert_eq!(
            w.expand(1.0, 5.0).unwrap().to_pairs(),
            vec![-1.0, 15.0, 19.0, 26.0]
        );
        // gap of 10 s closed from the right
        assert_eq!(w.expand(0.0, 10.0).unwrap().to_pairs(), vec![0.0, 31.0]);
        assert!(w.contract(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_fill_gaps_and_filter_small() {
        let w = window(&[0.0, 10.0, 12.0, 20.0, 30.0, 30.5]);
        assert_eq!(w.fill_gaps(2.0).to_pairs(), vec![0.0, 20.0, 30.0, 30.5]);
        assert_eq!(w.filter_small(1.0).to_pairs(), vec![0.0, 10.0, 12.0, 20.0]);
    }

    #[test]
    fn test_iteration() {
        let w = window(&[0.0, 1.0, 2.0, 3.0]);
        let lengths: Vec<f64> = w.iter().map(Interval::length).collect();
        assert_eq!(lengths, vec![1.0, 1.0]);
        assert_eq!((&w).into_iter().count(), 2);
    }
}
