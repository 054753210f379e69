#![allow(dead_code)]

use approx::assert_abs_diff_eq;
use gfsearch::evaluator::{from_fn, FnEvaluator};
use gfsearch::TimeWindow;

/// Boolean evaluator true on the closed intervals of `pairs` (flat start/end values).
pub fn square_wave(pairs: &[f64]) -> FnEvaluator<impl Fn(f64) -> bool, bool> {
    let truth = TimeWindow::from_pairs(pairs).unwrap();
    from_fn(move |t: f64| truth.contains(t))
}

/// Flat start/end values of `n` true spans of width `width`, one every `period` seconds
/// starting at `offset`.
pub fn periodic_pairs(n: usize, period: f64, width: f64, offset: f64) -> Vec<f64> {
    (0..n)
        .flat_map(|k| {
            let start = offset + k as f64 * period;
            [start, start + width]
        })
        .collect()
}

/// Same cardinality and endpoints within `epsilon`.
pub fn assert_window_close(actual: &TimeWindow, expected: &[f64], epsilon: f64) {
    assert_eq!(
        actual.to_pairs().len(),
        expected.len(),
        "window {actual} does not match {expected:?}"
    );
    for (a, e) in actual.to_pairs().iter().zip(expected) {
        assert_abs_diff_eq!(*a, *e, epsilon = epsilon);
    }
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
