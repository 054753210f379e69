//! Progress bar reporting for long searches (feature `progress`).
//!
//! [`WithProgress`] decorates any [`SearchStrategy`] with an [`indicatif`] progress bar
//! advancing once per confinement interval. The bar message shows the number of samples
//! taken so far and the last / smoothed time spent per confinement interval.
//!
//! ```rust, no_run
//! use gfsearch::evaluator::from_fn;
//! use gfsearch::search::engine::SearchEngine;
//! use gfsearch::search::progress::WithProgress;
//! use gfsearch::search::strategy::FixedStep;
//! use gfsearch::search::FailureMode;
//! use gfsearch::window::TimeWindow;
//!
//! let confinement = TimeWindow::from_pairs(&[0.0, 1e6, 2e6, 3e6]).unwrap();
//! let engine = SearchEngine::binary(from_fn(|t: f64| (t / 3600.0).sin() > 0.9));
//! let strategy = WithProgress::new(FixedStep::new(60.0, 1e-3).unwrap());
//! let (found, _) = engine
//!     .run_with_strategy(&confinement, &strategy, 10_000, FailureMode::Abort)
//!     .unwrap();
//! ```
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};

use crate::constants::Seconds;
use crate::search::strategy::SearchStrategy;
use crate::window::TimeWindow;

/// Wall time spent per confinement interval, with an exponentially smoothed average.
struct IntervalClock {
    started: Instant,
    smoothed: Option<Duration>,
}

impl IntervalClock {
    /// Weight of the newest interval in the smoothed average.
    const WEIGHT: f64 = 0.2;

    fn new() -> Self {
        IntervalClock {
            started: Instant::now(),
            smoothed: None,
        }
    }

    fn restart(&mut self) {
        self.started = Instant::now();
        self.smoothed = None;
    }

    /// Close the current interval, returning its duration and the updated average.
    fn lap(&mut self) -> (Duration, Duration) {
        let now = Instant::now();
        let spent = now.duration_since(self.started);
        self.started = now;

        let avg = match self.smoothed {
            None => spent,
            Some(prev) => prev.mul_f64(1.0 - Self::WEIGHT) + spent.mul_f64(Self::WEIGHT),
        };
        self.smoothed = Some(avg);
        (spent, avg)
    }
}

/// Strategy decorator drawing a progress bar. Step sizing, tolerance and interruption are
/// delegated to the inner strategy.
pub struct WithProgress<St> {
    inner: St,
    bar: ProgressBar,
    clock: Mutex<IntervalClock>,
    samples: AtomicUsize,
}

impl<St: SearchStrategy> WithProgress<St> {
    pub fn new(inner: St) -> Self {
        WithProgress {
            inner,
            bar: ProgressBar::hidden(),
            clock: Mutex::new(IntervalClock::new()),
            samples: AtomicUsize::new(0),
        }
    }

    pub fn into_inner(self) -> St {
        self.inner
    }
}

impl<St: SearchStrategy> SearchStrategy for WithProgress<St> {
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
        let interrupted = self.inner.is_interrupted();
        if interrupted {
            self.bar.set_message("Interrupted");
        }
        interrupted
    }

    fn report_start(&self, confinement: &TimeWindow) {
        self.bar.set_length(confinement.cardinality().max(1) as u64);
        self.bar.set_position(0);
        self.bar.set_draw_target(indicatif::ProgressDrawTarget::stderr());
        if let Ok(style) = ProgressStyle::with_template(
            "{bar:40.cyan/blue} {pos}/{len} ({percent:>3}%) | ETA {eta_precise} | {msg}",
        ) {
            self.bar.set_style(style);
        }
        self.bar.enable_steady_tick(Duration::from_millis(200));
        self.samples.store(0, Ordering::Relaxed);
        if let Ok(mut clock) = self.clock.lock() {
            clock.restart();
        }
        self.inner.report_start(confinement);
    }

    fn report_progress(&self, interval_index: usize, t: Seconds) {
        self.samples.fetch_add(1, Ordering::Relaxed);
        self.inner.report_progress(interval_index, t);
    }

    fn report_interval_done(&self, interval_index: usize) {
        if let Ok(mut clock) = self.clock.lock() {
            let (last, avg) = clock.lap();
            self.bar.set_message(format!(
                "samples: {}, last: {last:.1?}, avg: {avg:.1?}",
                self.samples.load(Ordering::Relaxed)
            ));
        }
        self.bar.inc(1);
        self.inner.report_interval_done(interval_index);
    }

    fn report_finish(&self) {
        self.bar.disable_steady_tick();
        self.bar.finish_and_clear();
        self.inner.report_finish();
    }
}

#[cfg(test)]
mod progress_test {
    use super::*;
    use crate::evaluator::from_fn;
    use crate::search::engine::SearchEngine;
    use crate::search::strategy::FixedStep;
    use crate::search::FailureMode;

    #[test]
    fn test_clock_average_follows_laps() {
        let mut clock = IntervalClock::new();
        let (first, avg) = clock.lap();
        assert_eq!(first, avg);

        // nanosecond rounding of the weighted sum
        let slack = Duration::from_nanos(2);
        let (second, avg) = clock.lap();
        assert!(first.min(second) <= avg + slack);
        assert!(avg <= first.max(second) + slack);

        clock.restart();
        assert!(clock.smoothed.is_none());
    }

    #[test]
    fn test_search_with_progress() {
        let engine = SearchEngine::binary(from_fn(|t: f64| (10.0..20.0).contains(&t)));
        let conf = TimeWindow::from_pairs(&[0.0, 30.0, 40.0, 50.0]).unwrap();
        let strategy = WithProgress::new(FixedStep::new(1.0, 1e-6).unwrap());

        let (found, stats) = engine
            .run_with_strategy(&conf, &strategy, 10, FailureMode::Abort)
            .unwrap();
        assert_eq!(found.cardinality(), 1);
        assert_eq!(strategy.samples.load(Ordering::Relaxed), stats.samples);
        assert_eq!(strategy.bar.position(), 2);
    }
}
