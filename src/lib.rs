//! # gfsearch
//!
//! Time-window event search: given a confinement window, a time-dependent state evaluator
//! and a target state, find every span of the window where the evaluator reports the target
//! (eclipses, occultations, antenna passes, ...). Transition times are located by sampling
//! at a fixed or adaptive step and bisecting down to a convergence tolerance.
//!
//! ```rust
//! use gfsearch::{from_fn, SearchEngine, SearchParams, TimeWindow};
//!
//! let confinement = TimeWindow::from_pairs(&[0.0, 100.0]).unwrap();
//! let engine = SearchEngine::binary(from_fn(|t: f64| {
//!     (20.0..=40.0).contains(&t) || (60.0..=65.0).contains(&t)
//! }));
//!
//! let found = engine
//!     .run(&confinement, &SearchParams::new(1.0, 1e-6, 10).unwrap())
//!     .unwrap();
//! assert_eq!(found.cardinality(), 2);
//! ```
pub mod constants;
pub mod evaluator;
pub mod gfsearch_errors;
pub mod search;
pub mod time;
pub mod window;

pub use constants::{Seconds, CNVTOL};
pub use evaluator::{from_fn, try_from_fn, Relation, StateEvaluator, Threshold};
pub use gfsearch_errors::SearchError;
pub use search::engine::SearchEngine;
pub use search::stats::SearchStats;
pub use search::strategy::{FixedStep, SearchStrategy};
pub use search::{FailureMode, SearchParams};
pub use window::{Interval, TimeWindow};
