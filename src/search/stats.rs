//! Counters collected during a search, returned by
//! [`SearchEngine::run_with_stats`](crate::search::engine::SearchEngine::run_with_stats).
use std::fmt;

use crate::search::bracket::Brackets;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Confinement intervals fully searched.
    pub intervals_searched: usize,
    /// Sample times visited by the step sampler.
    pub samples: usize,
    /// State evaluations, sampling and bisection combined.
    pub evaluations: usize,
    /// Transitions bracketed, implicit left-endpoint `Enter`s included.
    pub transitions: usize,
    /// Bisection iterations over all refined transitions.
    pub refinement_iterations: usize,
    /// Intervals in the result window.
    pub result_intervals: usize,
}

impl SearchStats {
    /// Add the counters of `other` to `self`. `result_intervals` is left untouched since it
    /// describes the merged output window.
    pub fn merge(&mut self, other: &SearchStats) {
        self.intervals_searched += other.intervals_searched;
        self.samples += other.samples;
        self.evaluations += other.evaluations;
        self.transitions += other.transitions;
        self.refinement_iterations += other.refinement_iterations;
    }

    pub(crate) fn record_brackets(&mut self, brackets: &Brackets) {
        self.samples += brackets.samples;
        self.evaluations += brackets.evaluations;
        self.transitions += brackets.transitions.len();
    }

    pub(crate) fn record_refinement(&mut self, iterations: usize) {
        self.refinement_iterations += iterations;
        self.evaluations += iterations;
    }
}

impl fmt::Display for SearchStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            writeln!(f, "Search statistics")?;
            writeln!(f, "-----------------")?;
            writeln!(f, "  confinement intervals : {}", self.intervals_searched)?;
            writeln!(f, "  samples               : {}", self.samples)?;
            writeln!(f, "  state evaluations     : {}", self.evaluations)?;
            writeln!(f, "  transitions           : {}", self.transitions)?;
            writeln!(f, "  bisection iterations  : {}", self.refinement_iterations)?;
            write!(f, "  result intervals      : {}", self.result_intervals)
        } else {
            write!(
                f,
                "SearchStats(intervals={}, samples={}, evaluations={}, transitions={}, bisections={}, results={})",
                self.intervals_searched,
                self.samples,
                self.evaluations,
                self.transitions,
                self.refinement_iterations,
                self.result_intervals
            )
        }
    }
}

#[cfg(test)]
mod stats_test {
    use super::*;

    #[test]
    fn test_merge_keeps_result_count() {
        let mut a = SearchStats {
            intervals_searched: 1,
            samples: 10,
            evaluations: 30,
            transitions: 2,
            refinement_iterations: 20,
            result_intervals: 1,
        };
        let b = a;
        a.merge(&b);
        assert_eq!(a.samples, 20);
        assert_eq!(a.evaluations, 60);
        assert_eq!(a.result_intervals, 1);
    }

    #[test]
    fn test_display() {
        let s = SearchStats::default();
        assert_eq!(
            format!("{s}"),
            "SearchStats(intervals=0, samples=0, evaluations=0, transitions=0, bisections=0, results=0)"
        );
        assert!(format!("{s:#}").contains("bisection iterations  : 0"));
    }
}
