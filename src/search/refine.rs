//! # Transition refinement by bisection
//!
//! [`RootRefiner`] narrows a [`Transition`] bracket `[lo, hi]` until its width is at most the
//! convergence tolerance, then returns `lo`:
//!
//! ```text
//! mid = (lo + hi) / 2
//! membership(mid) == membership(lo)  =>  lo = mid
//! otherwise                          =>  hi = mid
//! ```
//!
//! Bisection also stops when `mid` is no longer strictly between `lo` and `hi`, which
//! happens when the tolerance is below the floating-point resolution at `t`. A bracket that
//! is already converged (including an implicit zero-width `Enter`) is returned unchanged
//! without evaluating the state.
//!
//! The returned time is within `tolerance` of the true transition, on the `before` side.
use log::trace;

use crate::constants::Seconds;
use crate::evaluator::StateEvaluator;
use crate::gfsearch_errors::SearchError;
use crate::search::bracket::{is_target, Direction, Transition};
use crate::window::Interval;

/// Converged transition time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Refinement {
    pub time: Seconds,
    /// Number of state evaluations spent bisecting.
    pub iterations: usize,
}

pub struct RootRefiner<'a, E: StateEvaluator> {
    evaluator: &'a E,
    target: &'a E::State,
    tolerance: Seconds,
}

impl<'a, E: StateEvaluator> RootRefiner<'a, E> {
    pub fn new(evaluator: &'a E, target: &'a E::State, tolerance: Seconds) -> Self {
        RootRefiner {
            evaluator,
            target,
            tolerance,
        }
    }

    /// Refine `transition`, found while searching `interval`.
    ///
    /// Errors
    /// -----------------
    /// * [`SearchError::EvaluationFailed`] (without partial result) if the evaluator fails at
    ///   a midpoint.
    pub fn refine(
        &self,
        transition: &Transition,
        interval: &Interval,
    ) -> Result<Refinement, SearchError> {
        let lo_inside = transition.direction == Direction::Leave;
        let mut lo = transition.before;
        let mut hi = transition.after;
        let mut iterations = 0;

        while hi - lo > self.tolerance {
            let mid = 0.5 * (lo + hi);
            if !(lo < mid && mid < hi) {
                break;
            }
            if is_target(self.evaluator, self.target, mid, interval)? == lo_inside {
                lo = mid;
            } else {
                hi = mid;
            }
            iterations += 1;
        }

        trace!(
            "{:?} refined to {lo} in {iterations} iterations (bracket width {})",
            transition.direction,
            hi - lo
        );
        Ok(Refinement {
            time: lo,
            iterations,
        })
    }
}
