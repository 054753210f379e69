//! # Search engine
//!
//! [`SearchEngine`] pairs a [`StateEvaluator`] with the target state to look for, and searches
//! confinement windows for the spans where the evaluator reports that target.
//!
//! Algorithm
//! -----------------
//! For every confinement interval `[a, b]`, in ascending order:
//!
//! 1. sample `[a, b]` ([`StepSampler`]) and bracket membership changes
//!    ([`TransitionBracketer`]);
//! 2. bisect every bracket down to the tolerance ([`RootRefiner`]);
//! 3. pair each `Enter` with the following `Leave` into a result interval; an `Enter` with no
//!    `Leave` closes at `b`;
//! 4. insert the result intervals into the output window.
//!
//! Result intervals are therefore always contained in the confinement window. A condition
//! true at `a` yields a result starting exactly at `a`, and one still true at `b` yields a
//! result ending exactly at `b`.
//!
//! Failure semantics
//! -----------------
//! * Configuration problems and an empty confinement window are rejected before any
//!   sampling.
//! * Evaluator errors are never retried: the search stops with
//!   [`SearchError::EvaluationFailed`]. In [`FailureMode::BestEffort`] the error carries the
//!   window built from every confinement interval completed before the failure.
//! * Inserting more than `max_result_intervals` intervals stops the search with
//!   [`SearchError::ResultCapacityExceeded`] carrying exactly `max_result_intervals`
//!   intervals.
//! * A cancelled search fails with [`SearchError::Cancelled`] and returns nothing.
//!
//! Example
//! -----------------
//! ```rust
//! use gfsearch::evaluator::from_fn;
//! use gfsearch::search::engine::SearchEngine;
//! use gfsearch::search::SearchParams;
//! use gfsearch::window::TimeWindow;
//!
//! let confinement = TimeWindow::from_pairs(&[0.0, 100.0]).unwrap();
//! let engine = SearchEngine::binary(from_fn(|t: f64| (20.0..=40.0).contains(&t)));
//! let params = SearchParams::new(1.0, 1e-6, 10).unwrap();
//!
//! let found = engine.run(&confinement, &params).unwrap();
//! assert_eq!(found.cardinality(), 1);
//! assert!((found.interval(0).unwrap().start() - 20.0).abs() <= 1e-6);
//! ```
use std::cmp::Ordering::Less;

use log::{debug, warn};

use crate::constants::Seconds;
use crate::evaluator::StateEvaluator;
use crate::gfsearch_errors::SearchError;
use crate::search::bracket::{Direction, TransitionBracketer};
use crate::search::refine::RootRefiner;
use crate::search::sampler::StepSampler;
use crate::search::stats::SearchStats;
use crate::search::strategy::{Cancellable, FixedStep, SearchStrategy};
use crate::search::{gt0, FailureMode, SearchParams};
use crate::window::{Interval, TimeWindow};

pub struct SearchEngine<E: StateEvaluator> {
    evaluator: E,
    target: E::State,
}

impl<E: StateEvaluator<State = bool>> SearchEngine<E> {
    /// Engine looking for the spans where a boolean condition is `true`.
    pub fn binary(evaluator: E) -> Self {
        SearchEngine::new(evaluator, true)
    }
}

impl<E: StateEvaluator> SearchEngine<E> {
    pub fn new(evaluator: E, target: E::State) -> Self {
        SearchEngine { evaluator, target }
    }

    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    pub fn target(&self) -> &E::State {
        &self.target
    }

    /// Find every span of `confinement` where the state equals the target.
    ///
    /// Arguments
    /// -----------------
    /// * `confinement`: window to search; never modified.
    /// * `params`: sampling step, tolerance, result capacity and failure mode.
    ///
    /// Return
    /// ----------
    /// * A fresh window holding the result intervals.
    /// * See the [module documentation](self) for the failure semantics.
    pub fn run(
        &self,
        confinement: &TimeWindow,
        params: &SearchParams,
    ) -> Result<TimeWindow, SearchError> {
        self.run_with_stats(confinement, params)
            .map(|(window, _)| window)
    }

    /// Same as [`SearchEngine::run`], also returning the counters of the run.
    pub fn run_with_stats(
        &self,
        confinement: &TimeWindow,
        params: &SearchParams,
    ) -> Result<(TimeWindow, SearchStats), SearchError> {
        params.validate()?;
        self.search(
            confinement,
            &FixedStep::from(params),
            params.max_result_intervals,
            params.failure_mode,
        )
    }

    /// Same as [`SearchEngine::run`], with cooperative cancellation.
    ///
    /// `should_cancel` is polled before every sample; once it returns `true` the search
    /// stops with [`SearchError::Cancelled`].
    pub fn run_with_cancel<F>(
        &self,
        confinement: &TimeWindow,
        params: &SearchParams,
        should_cancel: F,
    ) -> Result<TimeWindow, SearchError>
    where
        F: Fn() -> bool,
    {
        params.validate()?;
        let strategy = Cancellable::new(FixedStep::from(params), should_cancel);
        self.search(
            confinement,
            &strategy,
            params.max_result_intervals,
            params.failure_mode,
        )
        .map(|(window, _)| window)
    }

    /// Search with a caller-supplied [`SearchStrategy`] in place of the fixed step and
    /// tolerance.
    ///
    /// Arguments
    /// -----------------
    /// * `confinement`: window to search.
    /// * `strategy`: step sizing, tolerance, interruption and report hooks.
    /// * `max_result_intervals`: capacity of the result window.
    /// * `failure_mode`: handling of evaluator failures.
    ///
    /// Return
    /// ----------
    /// * The result window and the counters of the run.
    /// * [`SearchError::InvalidConfig`] if the strategy tolerance is not `> 0`, or not
    ///   smaller than its fixed step.
    pub fn run_with_strategy<St>(
        &self,
        confinement: &TimeWindow,
        strategy: &St,
        max_result_intervals: usize,
        failure_mode: FailureMode,
    ) -> Result<(TimeWindow, SearchStats), SearchError>
    where
        St: SearchStrategy + ?Sized,
    {
        self.search(confinement, strategy, max_result_intervals, failure_mode)
    }

    fn search<St>(
        &self,
        confinement: &TimeWindow,
        strategy: &St,
        max_result_intervals: usize,
        failure_mode: FailureMode,
    ) -> Result<(TimeWindow, SearchStats), SearchError>
    where
        St: SearchStrategy + ?Sized,
    {
        check_search(confinement, strategy)?;

        strategy.report_start(confinement);
        let result = self.search_serial(confinement, strategy, max_result_intervals, failure_mode);
        strategy.report_finish();

        log_outcome(&result);
        result
    }

    fn search_serial<St>(
        &self,
        confinement: &TimeWindow,
        strategy: &St,
        max_result_intervals: usize,
        failure_mode: FailureMode,
    ) -> Result<(TimeWindow, SearchStats), SearchError>
    where
        St: SearchStrategy + ?Sized,
    {
        let mut output = TimeWindow::new();
        let mut stats = SearchStats::default();

        for (idx, interval) in confinement.iter().enumerate() {
            let (found, interval_stats) = match self.search_interval(idx, interval, strategy) {
                Ok(res) => res,
                Err(err) => return Err(attach_partial(err, output, failure_mode)),
            };
            emit(&mut output, found, max_result_intervals)?;
            stats.merge(&interval_stats);
            strategy.report_interval_done(idx);
        }

        stats.result_intervals = output.cardinality();
        Ok((output, stats))
    }

    /// Sample, bracket, refine and pair the transitions of one confinement interval.
    fn search_interval<St>(
        &self,
        idx: usize,
        interval: &Interval,
        strategy: &St,
    ) -> Result<(Vec<Interval>, SearchStats), SearchError>
    where
        St: SearchStrategy + ?Sized,
    {
        debug!("searching confinement interval #{idx} {interval}");
        let mut stats = SearchStats {
            intervals_searched: 1,
            ..SearchStats::default()
        };

        let samples = StepSampler::new(*interval, strategy).inspect(|sample| {
            if let Ok(t) = sample {
                strategy.report_progress(idx, *t);
            }
        });
        let brackets =
            TransitionBracketer::new(&self.evaluator, &self.target).bracket(interval, samples)?;
        stats.record_brackets(&brackets);

        let refiner = RootRefiner::new(&self.evaluator, &self.target, strategy.tolerance());
        let mut found = Vec::new();
        let mut open: Option<Seconds> = None;

        for transition in &brackets.transitions {
            let refined = refiner.refine(transition, interval)?;
            stats.record_refinement(refined.iterations);

            match transition.direction {
                Direction::Enter => open = Some(refined.time),
                Direction::Leave => {
                    let start = open.take().unwrap_or(interval.start());
                    found.push(Interval::new(start, refined.time)?);
                }
            }
        }
        if let Some(start) = open {
            found.push(Interval::new(start, interval.end())?);
        }

        debug!(
            "confinement interval #{idx}: {} samples, {} transitions, {} result intervals",
            stats.samples,
            stats.transitions,
            found.len()
        );
        Ok((found, stats))
    }
}

#[cfg(feature = "parallel")]
impl<E> SearchEngine<E>
where
    E: StateEvaluator + Sync,
    E::State: Sync,
{
    /// Same as [`SearchEngine::run`], searching the confinement intervals on the rayon pool.
    ///
    /// Each confinement interval is an independent task. Results are merged in ascending
    /// order once every task is done, with the same capacity and failure semantics as the
    /// serial search. When any task is cancelled the whole search reports
    /// [`SearchError::Cancelled`].
    pub fn run_parallel(
        &self,
        confinement: &TimeWindow,
        params: &SearchParams,
    ) -> Result<TimeWindow, SearchError> {
        params.validate()?;
        self.run_parallel_with_strategy(
            confinement,
            &FixedStep::from(params),
            params.max_result_intervals,
            params.failure_mode,
        )
        .map(|(window, _)| window)
    }

    /// Parallel counterpart of [`SearchEngine::run_with_strategy`].
    pub fn run_parallel_with_strategy<St>(
        &self,
        confinement: &TimeWindow,
        strategy: &St,
        max_result_intervals: usize,
        failure_mode: FailureMode,
    ) -> Result<(TimeWindow, SearchStats), SearchError>
    where
        St: SearchStrategy + Sync + ?Sized,
    {
        use rayon::prelude::*;

        check_search(confinement, strategy)?;
        strategy.report_start(confinement);

        let per_interval: Vec<Result<(Vec<Interval>, SearchStats), SearchError>> = confinement
            .as_slice()
            .par_iter()
            .enumerate()
            .map(|(idx, interval)| {
                let res = self.search_interval(idx, interval, strategy);
                if res.is_ok() {
                    strategy.report_interval_done(idx);
                }
                res
            })
            .collect();
        strategy.report_finish();

        let result = reduce_ordered(per_interval, max_result_intervals, failure_mode);
        log_outcome(&result);
        result
    }
}

/// Merge per-interval outcomes in confinement order.
#[cfg(feature = "parallel")]
fn reduce_ordered(
    per_interval: Vec<Result<(Vec<Interval>, SearchStats), SearchError>>,
    max_result_intervals: usize,
    failure_mode: FailureMode,
) -> Result<(TimeWindow, SearchStats), SearchError> {
    if per_interval
        .iter()
        .any(|res| matches!(res, Err(SearchError::Cancelled)))
    {
        return Err(SearchError::Cancelled);
    }

    let mut output = TimeWindow::new();
    let mut stats = SearchStats::default();
    for res in per_interval {
        match res {
            Ok((found, interval_stats)) => {
                emit(&mut output, found, max_result_intervals)?;
                stats.merge(&interval_stats);
            }
            Err(err) => return Err(attach_partial(err, output, failure_mode)),
        }
    }
    stats.result_intervals = output.cardinality();
    Ok((output, stats))
}

/// Checks done before any sampling.
fn check_search<St>(confinement: &TimeWindow, strategy: &St) -> Result<(), SearchError>
where
    St: SearchStrategy + ?Sized,
{
    if confinement.is_empty() {
        return Err(SearchError::EmptyConfinementWindow);
    }

    let tolerance = strategy.tolerance();
    if !gt0(tolerance) {
        return Err(SearchError::InvalidConfig(format!(
            "tolerance must be > 0, got {tolerance}"
        )));
    }
    if let Some(step) = strategy.fixed_step() {
        if !step.is_finite() || !gt0(step) {
            return Err(SearchError::InvalidConfig(format!(
                "step must be finite and > 0, got {step}"
            )));
        }
        if tolerance.partial_cmp(&step) != Some(Less) {
            return Err(SearchError::InvalidConfig(format!(
                "tolerance ({tolerance}) must be smaller than step ({step})"
            )));
        }
    }
    Ok(())
}

/// Insert the intervals found in one confinement interval, enforcing the capacity.
fn emit(
    output: &mut TimeWindow,
    found: Vec<Interval>,
    max_result_intervals: usize,
) -> Result<(), SearchError> {
    for interval in found {
        if output.cardinality() >= max_result_intervals {
            warn!("result capacity of {max_result_intervals} intervals reached, search truncated");
            return Err(SearchError::ResultCapacityExceeded {
                max: max_result_intervals,
                partial: std::mem::take(output),
            });
        }
        output.insert_interval(interval);
    }
    Ok(())
}

/// In best-effort mode, an evaluation failure carries the intervals completed so far.
fn attach_partial(err: SearchError, completed: TimeWindow, mode: FailureMode) -> SearchError {
    match (err, mode) {
        (
            SearchError::EvaluationFailed {
                time,
                interval,
                source,
                ..
            },
            FailureMode::BestEffort,
        ) => SearchError::EvaluationFailed {
            time,
            interval,
            source,
            partial: Some(completed),
        },
        (err, _) => err,
    }
}

fn log_outcome(result: &Result<(TimeWindow, SearchStats), SearchError>) {
    match result {
        Ok((_, stats)) => debug!("search done: {stats}"),
        Err(SearchError::Cancelled) => warn!("search cancelled"),
        Err(err @ SearchError::EvaluationFailed { .. }) => warn!("search aborted: {err}"),
        Err(_) => {}
    }
}
