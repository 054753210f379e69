//! # Sampling and refinement strategies
//!
//! A [`SearchStrategy`] replaces the fixed step/tolerance pair of a search when the caller
//! needs control over how the confinement window is walked:
//!
//! * **adaptive step sizing** – [`SearchStrategy::step_size`] is asked for the next step at
//!   every sample, so a strategy can sample densely near expected events and coarsely
//!   elsewhere;
//! * **interruption** – [`SearchStrategy::is_interrupted`] is polled before every sample;
//!   returning `true` aborts the search with
//!   [`SearchError::Cancelled`](crate::gfsearch_errors::SearchError::Cancelled);
//! * **progress reporting** – `report_*` hooks are called at the start of the search, at every
//!   sample, after each confinement interval and at the end.
//!
//! [`FixedStep`] is the plain step/tolerance strategy used by
//! [`SearchEngine::run`](crate::search::engine::SearchEngine::run).
//!
//! Hooks take `&self`: a strategy that records state must use interior mutability, and a
//! strategy used by a parallel search must be `Sync`.
use crate::constants::Seconds;
use crate::gfsearch_errors::SearchError;
use crate::search::SearchParams;
use crate::window::TimeWindow;

pub trait SearchStrategy {
    /// Step (seconds) from sample time `t` to the next sample. Must be finite and `> 0`.
    fn step_size(&self, t: Seconds) -> Seconds;

    /// Convergence tolerance (seconds) of refined transition times. Must be `> 0`.
    fn tolerance(&self) -> Seconds;

    /// Constant step, if the strategy has one.
    ///
    /// Fixed-step sampling computes sample `k` as `a + k·step` instead of accumulating
    /// steps, so long intervals do not drift.
    fn fixed_step(&self) -> Option<Seconds> {
        None
    }

    /// Polled before every sample; `true` cancels the search.
    fn is_interrupted(&self) -> bool {
        false
    }

    /// Called once, before any sampling.
    fn report_start(&self, _confinement: &TimeWindow) {}

    /// Called at every sample time `t` of confinement interval `interval_index`.
    fn report_progress(&self, _interval_index: usize, _t: Seconds) {}

    /// Called when confinement interval `interval_index` has been fully searched.
    fn report_interval_done(&self, _interval_index: usize) {}

    /// Called once when the search ends, whatever its outcome.
    fn report_finish(&self) {}
}

impl<S: SearchStrategy + ?Sized> SearchStrategy for &S {
    fn step_size(&self, t: Seconds) -> Seconds {
        (**self).step_size(t)
    }
    fn tolerance(&self) -> Seconds {
        (**self).tolerance()
    }
    fn fixed_step(&self) -> Option<Seconds> {
        (**self).fixed_step()
    }
    fn is_interrupted(&self) -> bool {
        (**self).is_interrupted()
    }
    fn report_start(&self, confinement: &TimeWindow) {
        (**self).report_start(confinement)
    }
    fn report_progress(&self, interval_index: usize, t: Seconds) {
        (**self).report_progress(interval_index, t)
    }
    fn report_interval_done(&self, interval_index: usize) {
        (**self).report_interval_done(interval_index)
    }
    fn report_finish(&self) {
        (**self).report_finish()
    }
}

/// Constant step and tolerance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedStep {
    step: Seconds,
    tolerance: Seconds,
}

impl FixedStep {
    /// Validated fixed-step strategy: `step` finite and `> 0`, `0 < tolerance < step`.
    pub fn new(step: Seconds, tolerance: Seconds) -> Result<Self, SearchError> {
        SearchParams::builder()
            .step(step)
            .tolerance(tolerance)
            .build()
            .map(|p| FixedStep::from(&p))
    }

    pub fn step(&self) -> Seconds {
        self.step
    }
}

impl From<&SearchParams> for FixedStep {
    fn from(params: &SearchParams) -> Self {
        FixedStep {
            step: params.step,
            tolerance: params.tolerance,
        }
    }
}

impl SearchStrategy for FixedStep {
    #[inline]
    fn step_size(&self, _t: Seconds) -> Seconds {
        self.step
    }
    #[inline]
    fn tolerance(&self) -> Seconds {
        self.tolerance
    }
    #[inline]
    fn fixed_step(&self) -> Option<Seconds> {
        Some(self.step)
    }
}

/// Adds a cancellation check to another strategy.
///
/// The closure is polled before every sample, in addition to the inner strategy's own
/// [`SearchStrategy::is_interrupted`].
pub struct Cancellable<S, F> {
    inner: S,
    should_cancel: F,
}

impl<S, F> Cancellable<S, F>
where
    S: SearchStrategy,
    F: Fn() -> bool,
{
    pub fn new(inner: S, should_cancel: F) -> Self {
        Cancellable {
            inner,
            should_cancel,
        }
    }
}

impl<S, F> SearchStrategy for Cancellable<S, F>
where
    S: SearchStrategy,
    F: Fn() -> bool,
{
    fn step_size(&self, t: Seconds) -> Seconds {
        self.inner.step_size(t)
    }
    fn tolerance(&self) -> Seconds {
        self.inner.tolerance()
    }
    fn fixed_step(&self) -> Option<Seconds> {
        self.inner.fixed_step()
    }
    fn is_interrupted(&self) -> bool {
        (self.should_cancel)() || self.inner.is_interrupted()
    }
    fn report_start(&self, confinement: &TimeWindow) {
        self.inner.report_start(confinement)
    }
    fn report_progress(&self, interval_index: usize, t: Seconds) {
        self.inner.report_progress(interval_index, t)
    }
    fn report_interval_done(&self, interval_index: usize) {
        self.inner.report_interval_done(interval_index)
    }
    fn report_finish(&self) {
        self.inner.report_finish()
    }
}
