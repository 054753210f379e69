mod common;

use std::cell::Cell;
use std::f64::consts::TAU;

use approx::assert_abs_diff_eq;
use common::{assert_window_close, init_logger, periodic_pairs, square_wave};
use gfsearch::evaluator::{from_fn, try_from_fn, Relation, Threshold};
use gfsearch::{
    FailureMode, SearchEngine, SearchError, SearchParams, SearchStrategy, Seconds, TimeWindow,
};

fn params(step: f64, max: usize) -> SearchParams {
    SearchParams::new(step, 1e-6, max).unwrap()
}

#[test]
fn test_two_spans_in_one_interval() {
    init_logger();
    let engine = SearchEngine::binary(square_wave(&[20.0, 40.0, 60.0, 65.0]));
    let confinement = TimeWindow::from_pairs(&[0.0, 100.0]).unwrap();

    let found = engine.run(&confinement, &params(1.0, 10)).unwrap();
    assert_window_close(&found, &[20.0, 40.0, 60.0, 65.0], 1e-6);
    assert_eq!(confinement.to_pairs(), vec![0.0, 100.0]);
}

#[test]
fn test_borrowed_evaluator() {
    let evaluator = square_wave(&[20.0, 40.0]);
    let confinement = TimeWindow::from_pairs(&[0.0, 100.0]).unwrap();

    let first = SearchEngine::binary(&evaluator)
        .run(&confinement, &params(1.0, 10))
        .unwrap();
    let second = SearchEngine::binary(&evaluator)
        .run(&confinement, &params(3.0, 10))
        .unwrap();
    assert_window_close(&first, &[20.0, 40.0], 1e-6);
    assert_window_close(&second, &[20.0, 40.0], 1e-6);
}

#[test]
fn test_boundary_flush() {
    let engine = SearchEngine::binary(square_wave(&[-10.0, 30.0]));
    let confinement = TimeWindow::from_pairs(&[0.0, 100.0]).unwrap();

    let found = engine.run(&confinement, &params(1.0, 10)).unwrap();
    assert_eq!(found.interval(0).unwrap().start(), 0.0);
    assert_abs_diff_eq!(found.interval(0).unwrap().end(), 30.0, epsilon = 1e-6);
}

#[test]
fn test_truncation_at_right_edge() {
    let engine = SearchEngine::binary(square_wave(&[70.0, 150.0]));
    let confinement = TimeWindow::from_pairs(&[0.0, 100.0]).unwrap();

    let found = engine.run(&confinement, &params(1.0, 10)).unwrap();
    assert_eq!(found.cardinality(), 1);
    assert_abs_diff_eq!(found.interval(0).unwrap().start(), 70.0, epsilon = 1e-6);
    assert_eq!(found.interval(0).unwrap().end(), 100.0);
}

#[test]
fn test_results_clipped_to_every_confinement_interval() {
    let engine = SearchEngine::binary(square_wave(&[20.0, 40.0]));
    let confinement = TimeWindow::from_pairs(&[0.0, 30.0, 35.0, 100.0]).unwrap();

    let found = engine.run(&confinement, &params(1.0, 10)).unwrap();
    assert_window_close(&found, &[20.0, 30.0, 35.0, 40.0], 1e-6);
    assert_eq!(found.interval(0).unwrap().end(), 30.0);
    assert_eq!(found.interval(1).unwrap().start(), 35.0);
}

#[test]
fn test_capacity_truncation() {
    let engine = SearchEngine::binary(square_wave(&periodic_pairs(8, 10.0, 4.0, 2.0)));
    let confinement = TimeWindow::from_pairs(&[0.0, 100.0]).unwrap();

    let err = engine.run(&confinement, &params(1.0, 5)).unwrap_err();
    let SearchError::ResultCapacityExceeded { max, partial } = err else {
        panic!("expected ResultCapacityExceeded");
    };
    assert_eq!(max, 5);
    assert_window_close(&partial, &periodic_pairs(5, 10.0, 4.0, 2.0), 1e-6);

    let all = engine.run(&confinement, &params(1.0, 8)).unwrap();
    assert_eq!(all.cardinality(), 8);
}

#[test]
fn test_narrow_span_is_missed() {
    let engine = SearchEngine::binary(square_wave(&[50.2, 50.7]));
    let confinement = TimeWindow::from_pairs(&[0.0, 100.0]).unwrap();

    let found = engine.run(&confinement, &params(1.0, 10)).unwrap();
    assert!(found.is_empty());

    let fine = engine.run(&confinement, &params(0.1, 10)).unwrap();
    assert_window_close(&fine, &[50.2, 50.7], 1e-6);
}

#[test]
fn test_threshold_evaluator() {
    let quantity = from_fn(|t: f64| (TAU * t / 100.0).sin());
    let engine = SearchEngine::binary(Threshold::new(quantity, Relation::Above, 0.5));
    let confinement = TimeWindow::from_pairs(&[0.0, 200.0]).unwrap();

    let found = engine.run(&confinement, &params(1.0, 10)).unwrap();
    let (lo, hi) = (100.0 / 12.0, 500.0 / 12.0);
    assert_window_close(&found, &[lo, hi, 100.0 + lo, 100.0 + hi], 1e-5);
}

#[test]
fn test_cancellation() {
    let engine = SearchEngine::binary(square_wave(&[20.0, 40.0]));
    let confinement = TimeWindow::from_pairs(&[0.0, 100.0, 200.0, 300.0]).unwrap();
    let polls = Cell::new(0usize);

    let res = engine.run_with_cancel(&confinement, &params(1.0, 10), || {
        polls.set(polls.get() + 1);
        polls.get() > 150
    });
    assert_eq!(res, Err(SearchError::Cancelled));
    assert_eq!(polls.get(), 151);
}

#[derive(Debug)]
struct EphemerisGap(f64);

impl std::fmt::Display for EphemerisGap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "no ephemeris coverage at {}", self.0)
    }
}

impl std::error::Error for EphemerisGap {}

#[test]
fn test_best_effort_keeps_completed_intervals() {
    let truth = TimeWindow::from_pairs(&[20.0, 40.0, 120.0, 130.0]).unwrap();
    let engine = SearchEngine::binary(try_from_fn(move |t: f64| {
        if (250.0..260.0).contains(&t) {
            Err(EphemerisGap(t))
        } else {
            Ok(truth.contains(t))
        }
    }));
    let confinement = TimeWindow::from_pairs(&[0.0, 50.0, 100.0, 150.0, 200.0, 300.0]).unwrap();

    let abort = engine.run(&confinement, &params(1.0, 10)).unwrap_err();
    assert!(abort.partial_window().is_none());
    assert!(abort.to_string().contains("no ephemeris coverage at 250"));

    let best_effort = SearchParams::builder()
        .step(1.0)
        .tolerance(1e-6)
        .failure_mode(FailureMode::BestEffort)
        .build()
        .unwrap();
    let err = engine.run(&confinement, &best_effort).unwrap_err();
    match err {
        SearchError::EvaluationFailed {
            time,
            interval,
            partial: Some(partial),
            ..
        } => {
            assert_eq!(time, 250.0);
            assert_eq!((interval.start(), interval.end()), (200.0, 300.0));
            assert_window_close(&partial, &[20.0, 40.0, 120.0, 130.0], 1e-6);
        }
        other => panic!("unexpected error {other:?}"),
    }
}

/// Dense sampling in the first half of every 100 s, coarse elsewhere.
struct TwoRate;

impl SearchStrategy for TwoRate {
    fn step_size(&self, t: Seconds) -> Seconds {
        if t.rem_euclid(100.0) < 50.0 {
            0.25
        } else {
            5.0
        }
    }

    fn tolerance(&self) -> Seconds {
        1e-6
    }
}

#[test]
fn test_adaptive_strategy_agrees_with_fixed_step() {
    let engine = SearchEngine::binary(square_wave(&[20.0, 40.0, 60.0, 75.0, 110.0, 111.0]));
    let confinement = TimeWindow::from_pairs(&[0.0, 200.0]).unwrap();

    let fixed = engine.run(&confinement, &params(0.5, 10)).unwrap();
    let (adaptive, stats) = engine
        .run_with_strategy(&confinement, &TwoRate, 10, FailureMode::Abort)
        .unwrap();

    assert_eq!(adaptive.cardinality(), fixed.cardinality());
    assert_window_close(&adaptive, &fixed.to_pairs(), 2e-6);
    assert_eq!(stats.samples, 421);
}

#[test]
fn test_invalid_strategy_tolerance() {
    struct NoTolerance;

    impl SearchStrategy for NoTolerance {
        fn step_size(&self, _t: Seconds) -> Seconds {
            1.0
        }
        fn tolerance(&self) -> Seconds {
            0.0
        }
    }

    let engine = SearchEngine::binary(square_wave(&[20.0, 40.0]));
    let confinement = TimeWindow::from_pairs(&[0.0, 100.0]).unwrap();
    assert!(matches!(
        engine.run_with_strategy(&confinement, &NoTolerance, 10, FailureMode::Abort),
        Err(SearchError::InvalidConfig(_))
    ));
}

#[test]
fn test_stats() {
    let engine = SearchEngine::binary(square_wave(&[20.0, 40.0, 60.0, 65.0]));
    let confinement = TimeWindow::from_pairs(&[0.0, 50.0, 55.0, 100.0]).unwrap();

    let (found, stats) = engine
        .run_with_stats(&confinement, &params(1.0, 10))
        .unwrap();
    assert_eq!(found.cardinality(), 2);
    assert_eq!(stats.intervals_searched, 2);
    assert_eq!(stats.samples, 51 + 46);
    assert_eq!(stats.transitions, 4);
    assert_eq!(stats.result_intervals, 2);
    assert!(stats.refinement_iterations > 0);
}

#[cfg(feature = "parallel")]
#[test]
fn test_parallel_and_serial_agree() {
    let engine = SearchEngine::binary(square_wave(&periodic_pairs(40, 25.0, 7.5, 3.0)));
    let confinement = TimeWindow::from_pairs(&periodic_pairs(10, 100.0, 90.0, 0.0)).unwrap();
    let p = params(1.0, 100);

    assert_eq!(
        engine.run_parallel(&confinement, &p).unwrap(),
        engine.run(&confinement, &p).unwrap()
    );

    let capped = params(1.0, 7);
    assert_eq!(
        engine.run_parallel(&confinement, &capped),
        engine.run(&confinement, &capped)
    );
}
