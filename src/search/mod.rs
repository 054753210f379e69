//! # Event search over a confinement window
//!
//! This module hosts the search pipeline and its configuration. Given a confinement
//! [`TimeWindow`](crate::window::TimeWindow), a [`StateEvaluator`](crate::evaluator::StateEvaluator)
//! and a target state, the engine returns every maximal span where the evaluator reports the
//! target, with endpoints located to within the convergence tolerance.
//!
//! ## Pipeline overview
//!
//! For every interval `[a, b]` of the confinement window, in ascending order:
//!
//! 1. **Sampling** ([`sampler`]) – times `a, a+step, a+2·step, …, b`; both endpoints are
//!    always sampled.
//! 2. **Bracketing** ([`bracket`]) – consecutive samples whose target membership differs
//!    form a transition bracket (`Enter` or `Leave`). A target state already active at `a`
//!    yields an implicit zero-width `Enter` at `a`.
//! 3. **Refining** ([`refine`]) – each bracket is bisected down to the tolerance.
//! 4. **Emitting** ([`engine`]) – `Enter`/`Leave` times are paired into result intervals;
//!    an `Enter` left open at `b` closes at `b`.
//!
//! Result intervals are inserted into a fresh output window; the confinement window is
//! never modified.
//!
//! ## Configuration
//!
//! [`SearchParams`] carries the sampling step, the convergence tolerance, the cap on the
//! number of result intervals and the failure mode. Callers needing adaptive sampling pass
//! a [`SearchStrategy`](strategy::SearchStrategy) instead of the fixed step/tolerance pair.
//!
//! ```rust
//! use gfsearch::search::{SearchParams, FailureMode};
//!
//! let params = SearchParams::builder()
//!     .step(60.0)
//!     .tolerance(1e-3)
//!     .max_result_intervals(500)
//!     .failure_mode(FailureMode::BestEffort)
//!     .build()
//!     .unwrap();
//! assert_eq!(params.step, 60.0);
//! ```
//!
//! ## Feature flags
//!
//! * `parallel` – [`SearchEngine::run_parallel`](engine::SearchEngine::run_parallel) searches
//!   confinement intervals on the rayon pool.
//! * `progress` – [`progress::WithProgress`] decorates a strategy with a live progress bar.
//!
//! ## See also
//!
//! * [`engine::SearchEngine`] – entry points.
//! * [`stats::SearchStats`] – counters collected during a run.
//! * [`crate::gfsearch_errors::SearchError`] – failure taxonomy.
use std::cmp::Ordering::{Greater, Less};
use std::fmt;

use crate::constants::{Seconds, CNVTOL, DEFAULT_MAX_RESULT_INTERVALS, DEFAULT_STEP};
use crate::gfsearch_errors::SearchError;

pub mod bracket;
pub mod engine;
#[cfg(feature = "progress")]
pub mod progress;
pub mod refine;
pub mod sampler;
pub mod stats;
pub mod strategy;

/// What the engine does with the results of completed confinement intervals when the
/// state evaluator fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailureMode {
    /// The whole call fails; no partial result is returned.
    #[default]
    Abort,
    /// The error carries the window built from every confinement interval completed
    /// before the failure.
    BestEffort,
}

/// Configuration of a fixed-step search.
///
/// Fields
/// -----------------
/// * `step` – sampling cadence (seconds), finite and `> 0`. Condition spans shorter than
///   the step may be missed.
/// * `tolerance` – convergence tolerance (seconds) of transition times, `0 < tolerance < step`.
/// * `max_result_intervals` – capacity of the result window. Finding more intervals stops
///   the search with [`SearchError::ResultCapacityExceeded`].
/// * `failure_mode` – see [`FailureMode`].
///
/// Defaults
/// -----------------
/// * `step`: 3600 s
/// * `tolerance`: [`CNVTOL`] (1e-6 s)
/// * `max_result_intervals`: 10 000
/// * `failure_mode`: [`FailureMode::Abort`]
#[derive(Debug, Clone, PartialEq)]
pub struct SearchParams {
    pub step: Seconds,
    pub tolerance: Seconds,
    pub max_result_intervals: usize,
    pub failure_mode: FailureMode,
}

impl SearchParams {
    /// Validated parameters with the default failure mode.
    pub fn new(
        step: Seconds,
        tolerance: Seconds,
        max_result_intervals: usize,
    ) -> Result<Self, SearchError> {
        SearchParams::builder()
            .step(step)
            .tolerance(tolerance)
            .max_result_intervals(max_result_intervals)
            .build()
    }

    /// Create a new [`SearchParamsBuilder`] initialized with the defaults.
    pub fn builder() -> SearchParamsBuilder {
        SearchParamsBuilder::new()
    }

    /// Check the parameters.
    ///
    /// Validation rules
    /// -----------------
    /// * `step` finite and `> 0`.
    /// * `tolerance > 0` and `tolerance < step`.
    ///
    /// NaN fails every rule.
    pub fn validate(&self) -> Result<(), SearchError> {
        if !self.step.is_finite() || !gt0(self.step) {
            return Err(SearchError::InvalidConfig(format!(
                "step must be finite and > 0, got {}",
                self.step
            )));
        }
        if !gt0(self.tolerance) {
            return Err(SearchError::InvalidConfig(format!(
                "tolerance must be > 0, got {}",
                self.tolerance
            )));
        }
        if self.tolerance.partial_cmp(&self.step) != Some(Less) {
            return Err(SearchError::InvalidConfig(format!(
                "tolerance ({}) must be smaller than step ({})",
                self.tolerance, self.step
            )));
        }
        Ok(())
    }
}

impl Default for SearchParams {
    fn default() -> Self {
        SearchParams {
            step: DEFAULT_STEP,
            tolerance: CNVTOL,
            max_result_intervals: DEFAULT_MAX_RESULT_INTERVALS,
            failure_mode: FailureMode::Abort,
        }
    }
}

/// Return true iff x > 0.0 and comparable (i.e., not NaN).
#[inline]
pub(crate) fn gt0(x: f64) -> bool {
    x.partial_cmp(&0.0) == Some(Greater)
}

/// Builder for [`SearchParams`], with validation.
#[derive(Debug, Clone)]
pub struct SearchParamsBuilder {
    params: SearchParams,
}

impl Default for SearchParamsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchParamsBuilder {
    pub fn new() -> Self {
        Self {
            params: SearchParams::default(),
        }
    }

    pub fn step(mut self, v: Seconds) -> Self {
        self.params.step = v;
        self
    }
    pub fn tolerance(mut self, v: Seconds) -> Self {
        self.params.tolerance = v;
        self
    }
    pub fn max_result_intervals(mut self, v: usize) -> Self {
        self.params.max_result_intervals = v;
        self
    }
    pub fn failure_mode(mut self, v: FailureMode) -> Self {
        self.params.failure_mode = v;
        self
    }

    /// Finalize the builder.
    ///
    /// Returns
    /// -----------------
    /// * `Ok(SearchParams)` if [`SearchParams::validate`] passes.
    /// * `Err(SearchError::InvalidConfig)` otherwise.
    pub fn build(self) -> Result<SearchParams, SearchError> {
        self.params.validate()?;
        Ok(self.params)
    }
}

impl fmt::Display for SearchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            const PARAM_COL: usize = 40;
            writeln!(f, "Search Parameters")?;
            writeln!(f, "-----------------")?;

            macro_rules! line {
                ($fmt:expr, $val:expr, $comment:expr) => {{
                    let s = format!($fmt, $val);
                    let pad = if s.len() < PARAM_COL {
                        " ".repeat(PARAM_COL - s.len())
                    } else {
                        " ".to_string()
                    };
                    writeln!(f, "  {}{}# {}", s, pad, $comment)
                }};
            }

            line!("step                 = {:.3} s", self.step, "Sampling cadence")?;
            line!(
                "tolerance            = {:.1e} s",
                self.tolerance,
                "Convergence tolerance of transition times"
            )?;
            line!(
                "max_result_intervals = {}",
                self.max_result_intervals,
                "Capacity of the result window"
            )?;
            line!(
                "failure_mode         = {:?}",
                self.failure_mode,
                "Evaluator failure handling"
            )?;
            Ok(())
        } else {
            write!(
                f,
                "SearchParams(step={:.3}s, tolerance={:.1e}s, max_result_intervals={}, failure_mode={:?})",
                self.step, self.tolerance, self.max_result_intervals, self.failure_mode
            )
        }
    }
}
