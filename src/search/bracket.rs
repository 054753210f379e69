//! # Transition bracketing
//!
//! The bracketer consumes the sample times of one confinement interval, evaluates the state
//! once per sample and records every pair of consecutive samples whose membership in the
//! target state differs. Each record is a [`Transition`]: the true transition time lies in
//! `[before, after]`.
//!
//! If the first sample of the interval is already in the target state, a zero-width
//! implicit `Enter` is recorded at the left endpoint, so a condition active when the
//! interval opens is reported from that endpoint rather than missed.
use log::trace;

use crate::constants::Seconds;
use crate::evaluator::StateEvaluator;
use crate::gfsearch_errors::SearchError;
use crate::window::Interval;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Outside the target before, inside after.
    Enter,
    /// Inside the target before, outside after.
    Leave,
}

/// A sample pair bracketing a change of membership.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub before: Seconds,
    pub after: Seconds,
    pub direction: Direction,
}

impl Transition {
    pub(crate) fn implicit_enter(t: Seconds) -> Self {
        Transition {
            before: t,
            after: t,
            direction: Direction::Enter,
        }
    }

    pub fn width(&self) -> Seconds {
        self.after - self.before
    }

    /// Zero-width `Enter` recorded at the left endpoint of a confinement interval.
    pub fn is_implicit(&self) -> bool {
        self.direction == Direction::Enter && self.before == self.after
    }
}

/// Transitions found in one confinement interval, with the work it took.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Brackets {
    pub transitions: Vec<Transition>,
    pub samples: usize,
    pub evaluations: usize,
}

pub struct TransitionBracketer<'a, E: StateEvaluator> {
    evaluator: &'a E,
    target: &'a E::State,
}

impl<'a, E: StateEvaluator> TransitionBracketer<'a, E> {
    pub fn new(evaluator: &'a E, target: &'a E::State) -> Self {
        TransitionBracketer { evaluator, target }
    }

    /// Bracket the transitions of `interval` from its sample times.
    ///
    /// Arguments
    /// -----------------
    /// * `interval` – confinement interval being searched, reported in errors.
    /// * `samples` – ascending sample times of `interval`, as produced by
    ///   [`StepSampler`](crate::search::sampler::StepSampler).
    ///
    /// Return
    /// ----------
    /// * The transitions in ascending time, alternating `Enter`/`Leave`.
    /// * The first sampling error, or [`SearchError::EvaluationFailed`] (without partial
    ///   result) when the evaluator fails.
    pub fn bracket<I>(&self, interval: &Interval, samples: I) -> Result<Brackets, SearchError>
    where
        I: IntoIterator<Item = Result<Seconds, SearchError>>,
    {
        let mut out = Brackets::default();
        let mut prev: Option<(Seconds, bool)> = None;

        for sample in samples {
            let t = sample?;
            let inside = is_target(self.evaluator, self.target, t, interval)?;
            out.samples += 1;
            out.evaluations += 1;

            let transition = match prev {
                None if inside => Some(Transition::implicit_enter(t)),
                Some((before, was_inside)) if was_inside != inside => Some(Transition {
                    before,
                    after: t,
                    direction: if inside {
                        Direction::Enter
                    } else {
                        Direction::Leave
                    },
                }),
                _ => None,
            };
            if let Some(tr) = transition {
                trace!(
                    "{:?} bracketed in [{}, {}] on {interval}",
                    tr.direction,
                    tr.before,
                    tr.after
                );
                out.transitions.push(tr);
            }
            prev = Some((t, inside));
        }

        Ok(out)
    }
}

/// Membership of `state(t)` in the target, with evaluator failures mapped to
/// [`SearchError::EvaluationFailed`].
pub(crate) fn is_target<E: StateEvaluator>(
    evaluator: &E,
    target: &E::State,
    t: Seconds,
    interval: &Interval,
) -> Result<bool, SearchError> {
    evaluator
        .state(t)
        .map(|s| &s == target)
        .map_err(|e| SearchError::EvaluationFailed {
            time: t,
            interval: *interval,
            source: Box::new(e),
            partial: None,
        })
}
