use thiserror::Error;

use crate::constants::Seconds;
use crate::window::{Interval, TimeWindow};

/// Opaque cause attached to a failed state evaluation.
pub type EvaluationCause = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Invalid interval: start {start} must not exceed end {end} and both must be finite")]
    InvalidInterval { start: Seconds, end: Seconds },

    #[error("Interchange array must hold an even number of values, got {0}")]
    OddPairCount(usize),

    #[error("Interval index {index} out of range for a window of {cardinality} intervals")]
    IndexOutOfRange { index: usize, cardinality: usize },

    #[error("Invalid search configuration: {0}")]
    InvalidConfig(String),

    #[error("Confinement window is empty")]
    EmptyConfinementWindow,

    #[error("State evaluation failed at t = {time} s (confinement interval {interval}): {source}")]
    EvaluationFailed {
        time: Seconds,
        interval: Interval,
        #[source]
        source: EvaluationCause,
        partial: Option<TimeWindow>,
    },

    #[error("Search found more than {max} result intervals; result truncated")]
    ResultCapacityExceeded { max: usize, partial: TimeWindow },

    #[error("Search cancelled")]
    Cancelled,

    #[error("Invalid epoch: {0}")]
    InvalidEpoch(String),
}

impl SearchError {
    /// Borrow the truncated result carried by this error, if any.
    ///
    /// Only [`SearchError::ResultCapacityExceeded`] and a best-effort
    /// [`SearchError::EvaluationFailed`] carry a partial window.
    pub fn partial_window(&self) -> Option<&TimeWindow> {
        match self {
            SearchError::ResultCapacityExceeded { partial, .. } => Some(partial),
            SearchError::EvaluationFailed { partial, .. } => partial.as_ref(),
            _ => None,
        }
    }

    /// Take ownership of the truncated result carried by this error, if any.
    pub fn into_partial_window(self) -> Option<TimeWindow> {
        match self {
            SearchError::ResultCapacityExceeded { partial, .. } => Some(partial),
            SearchError::EvaluationFailed { partial, .. } => partial,
            _ => None,
        }
    }
}

impl PartialEq for SearchError {
    fn eq(&self, other: &Self) -> bool {
        use SearchError::*;
        match (self, other) {
            (
                InvalidInterval {
                    start: s1,
                    end: e1,
                },
                InvalidInterval {
                    start: s2,
                    end: e2,
                },
            ) => s1.to_bits() == s2.to_bits() && e1.to_bits() == e2.to_bits(),
            (OddPairCount(a), OddPairCount(b)) => a == b,
            (
                IndexOutOfRange {
                    index: i1,
                    cardinality: c1,
                },
                IndexOutOfRange {
                    index: i2,
                    cardinality: c2,
                },
            ) => i1 == i2 && c1 == c2,
            (InvalidConfig(a), InvalidConfig(b)) => a == b,
            (InvalidEpoch(a), InvalidEpoch(b)) => a == b,

            // The evaluator cause is not comparable: same time, interval and partial result
            (
                EvaluationFailed {
                    time: t1,
                    interval: i1,
                    partial: p1,
                    ..
                },
                EvaluationFailed {
                    time: t2,
                    interval: i2,
                    partial: p2,
                    ..
                },
            ) => t1 == t2 && i1 == i2 && p1 == p2,
            (
                ResultCapacityExceeded {
                    max: m1,
                    partial: p1,
                },
                ResultCapacityExceeded {
                    max: m2,
                    partial: p2,
                },
            ) => m1 == m2 && p1 == p2,

            (EmptyConfinementWindow, EmptyConfinementWindow) => true,
            (Cancelled, Cancelled) => true,

            _ => false,
        }
    }
}
