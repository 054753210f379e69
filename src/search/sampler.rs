//! # Sample times within one confinement interval
//!
//! [`StepSampler`] walks a closed interval `[a, b]` forward and yields the times at which
//! the state evaluator is sampled. Both endpoints are always produced and the last sample
//! is exactly `b`.
//!
//! Cadence
//! -----------------
//! * **Fixed** – when the strategy reports a [`fixed_step`](SearchStrategy::fixed_step),
//!   sample `k` is `a + k·step`, computed directly so that long intervals accumulate no
//!   rounding drift. `[0, 10]` with step `3` yields `0, 3, 6, 9, 10`; with step `5` it yields
//!   `0, 5, 10` (the right endpoint is not repeated).
//! * **Adaptive** – otherwise `t_{k+1} = t_k + step_size(t_k)`.
//!
//! Every step is clamped to `b`. A zero-width interval yields its single point.
//!
//! Errors
//! -----------------
//! * [`SearchError::InvalidConfig`] when the strategy returns a step that is not finite and
//!   `> 0`, or one too small to advance the floating-point time.
//! * [`SearchError::Cancelled`] when [`SearchStrategy::is_interrupted`] reports `true`;
//!   it is polled before every sample.
//!
//! The iterator is fused after its first error.
use log::trace;

use crate::constants::Seconds;
use crate::gfsearch_errors::SearchError;
use crate::search::gt0;
use crate::search::strategy::SearchStrategy;
use crate::window::Interval;

pub struct StepSampler<'a, St: ?Sized> {
    interval: Interval,
    strategy: &'a St,
    /// Index of the next fixed-step sample.
    k: u64,
    last: Option<Seconds>,
    done: bool,
}

impl<'a, St: SearchStrategy + ?Sized> StepSampler<'a, St> {
    pub fn new(interval: Interval, strategy: &'a St) -> Self {
        StepSampler {
            interval,
            strategy,
            k: 0,
            last: None,
            done: false,
        }
    }

    pub fn interval(&self) -> &Interval {
        &self.interval
    }

    fn next_time(&mut self) -> Result<Seconds, SearchError> {
        let Some(prev) = self.last else {
            return Ok(self.interval.start());
        };

        let candidate = match self.strategy.fixed_step() {
            Some(step) => {
                check_step(step, prev)?;
                self.k += 1;
                self.interval.start() + self.k as f64 * step
            }
            None => {
                let step = self.strategy.step_size(prev);
                check_step(step, prev)?;
                prev + step
            }
        };

        let t = candidate.min(self.interval.end());
        if t <= prev {
            return Err(SearchError::InvalidConfig(format!(
                "sampling step does not advance past t = {prev}"
            )));
        }
        Ok(t)
    }
}

fn check_step(step: Seconds, t: Seconds) -> Result<(), SearchError> {
    if step.is_finite() && gt0(step) {
        Ok(())
    } else {
        Err(SearchError::InvalidConfig(format!(
            "step must be finite and > 0, got {step} at t = {t}"
        )))
    }
}

impl<St: SearchStrategy + ?Sized> Iterator for StepSampler<'_, St> {
    type Item = Result<Seconds, SearchError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if self.strategy.is_interrupted() {
            self.done = true;
            return Some(Err(SearchError::Cancelled));
        }

        match self.next_time() {
            Ok(t) => {
                if t >= self.interval.end() {
                    self.done = true;
                }
                self.last = Some(t);
                Some(Ok(t))
            }
            Err(err) => {
                trace!("sampler stopped on {}: {err}", self.interval);
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

impl<St: SearchStrategy + ?Sized> std::iter::FusedIterator for StepSampler<'_, St> {}
