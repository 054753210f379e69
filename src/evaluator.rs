//! # State evaluators
//!
//! A **state evaluator** maps a time (seconds in the engine time scale) to a discrete state.
//! The search engine treats it as a black box: it samples it on a grid, compares consecutive
//! states, and re-evaluates it at bisection midpoints to locate transitions.
//!
//! ## Contract
//!
//! * **Deterministic** – the same `t` must always yield the same state (or the same error).
//!   The refiner relies on this when it revisits converging midpoints, and the engine never
//!   retries a failed evaluation.
//! * **Total over the confinement window** – domain failures (e.g. missing ephemeris data at
//!   `t`) are returned as `Err` and surface as
//!   [`SearchError::EvaluationFailed`](crate::gfsearch_errors::SearchError::EvaluationFailed).
//! * **Reentrant** – evaluation takes `&self`; an evaluator used with the `parallel` feature
//!   must also be `Sync`.
//!
//! The engine assumes nothing about smoothness: a true-interval narrower than the sampling
//! step may fall between two samples and be missed.
//!
//! ## Adapters
//!
//! * [`from_fn`] – wrap an infallible closure `Fn(f64) -> S`.
//! * [`try_from_fn`] – wrap a fallible closure `Fn(f64) -> Result<S, E>`.
//! * [`Threshold`] – turn a scalar quantity of time into a boolean condition, e.g. "angular
//!   separation below one degree".
//!
//! ```rust
//! use gfsearch::evaluator::{from_fn, StateEvaluator};
//!
//! let daylight = from_fn(|t: f64| (t % 86_400.0) < 43_200.0);
//! assert_eq!(daylight.state(3_600.0), Ok(true));
//! ```
use std::convert::Infallible;
use std::marker::PhantomData;

use crate::constants::Seconds;

/// Caller-supplied function from time to a discrete state.
pub trait StateEvaluator {
    /// Discrete state; only equality with the searched target matters.
    type State: PartialEq;
    /// Domain failure raised when the state cannot be computed at a given time.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Evaluate the state at time `t`.
    fn state(&self, t: Seconds) -> Result<Self::State, Self::Error>;
}

impl<E: StateEvaluator + ?Sized> StateEvaluator for &E {
    type State = E::State;
    type Error = E::Error;

    #[inline]
    fn state(&self, t: Seconds) -> Result<Self::State, Self::Error> {
        (**self).state(t)
    }
}

impl<E: StateEvaluator + ?Sized> StateEvaluator for Box<E> {
    type State = E::State;
    type Error = E::Error;

    #[inline]
    fn state(&self, t: Seconds) -> Result<Self::State, Self::Error> {
        (**self).state(t)
    }
}

/// Evaluator backed by an infallible closure. Built by [`from_fn`].
#[derive(Clone, Copy)]
pub struct FnEvaluator<F, S> {
    f: F,
    _state: PhantomData<fn() -> S>,
}

impl<F, S> StateEvaluator for FnEvaluator<F, S>
where
    F: Fn(Seconds) -> S,
    S: PartialEq,
{
    type State = S;
    type Error = Infallible;

    #[inline]
    fn state(&self, t: Seconds) -> Result<S, Infallible> {
        Ok((self.f)(t))
    }
}

/// Wrap an infallible closure as a [`StateEvaluator`].
pub fn from_fn<F, S>(f: F) -> FnEvaluator<F, S>
where
    F: Fn(Seconds) -> S,
    S: PartialEq,
{
    FnEvaluator {
        f,
        _state: PhantomData,
    }
}

/// Evaluator backed by a fallible closure. Built by [`try_from_fn`].
#[derive(Clone, Copy)]
pub struct TryFnEvaluator<F, S, E> {
    f: F,
    _marker: PhantomData<fn() -> (S, E)>,
}

impl<F, S, E> StateEvaluator for TryFnEvaluator<F, S, E>
where
    F: Fn(Seconds) -> Result<S, E>,
    S: PartialEq,
    E: std::error::Error + Send + Sync + 'static,
{
    type State = S;
    type Error = E;

    #[inline]
    fn state(&self, t: Seconds) -> Result<S, E> {
        (self.f)(t)
    }
}

/// Wrap a fallible closure as a [`StateEvaluator`].
pub fn try_from_fn<F, S, E>(f: F) -> TryFnEvaluator<F, S, E>
where
    F: Fn(Seconds) -> Result<S, E>,
    S: PartialEq,
    E: std::error::Error + Send + Sync + 'static,
{
    TryFnEvaluator {
        f,
        _marker: PhantomData,
    }
}

/// Comparison applied by a [`Threshold`] evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// `quantity < reference`
    Below,
    /// `quantity > reference`
    Above,
    /// `|quantity| < reference`
    AbsBelow,
}

/// Boolean condition "scalar quantity compared to a reference value".
///
/// The quantity is any evaluator with `f64` state; a NaN quantity never satisfies the
/// relation.
///
/// Example
/// -----------------
/// An antenna pass happens while the angular separation between the antenna boresight
/// and the Earth direction stays under one degree:
///
/// ```rust
/// use gfsearch::evaluator::{from_fn, Relation, StateEvaluator, Threshold};
///
/// let separation_deg = from_fn(|t: f64| 5.0 * (t / 600.0).cos());
/// let pass = Threshold::new(separation_deg, Relation::AbsBelow, 1.0);
/// assert_eq!(pass.state(900.0), Ok(true));
/// assert_eq!(pass.state(0.0), Ok(false));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Threshold<Q> {
    quantity: Q,
    relation: Relation,
    reference: f64,
}

impl<Q> Threshold<Q>
where
    Q: StateEvaluator<State = f64>,
{
    pub fn new(quantity: Q, relation: Relation, reference: f64) -> Self {
        Threshold {
            quantity,
            relation,
            reference,
        }
    }

    pub fn relation(&self) -> Relation {
        self.relation
    }

    pub fn reference(&self) -> f64 {
        self.reference
    }
}

impl<Q> StateEvaluator for Threshold<Q>
where
    Q: StateEvaluator<State = f64>,
{
    type State = bool;
    type Error = Q::Error;

    fn state(&self, t: Seconds) -> Result<bool, Q::Error> {
        let q = self.quantity.state(t)?;
        Ok(match self.relation {
            Relation::Below => q < self.reference,
            Relation::Above => q > self.reference,
            Relation::AbsBelow => q.abs() < self.reference,
        })
    }
}
