//! # Constants and type definitions for gfsearch
//!
//! This module centralizes the **numerical defaults** and **common type aliases** used by the
//! window algebra and the search engine.
//!
//! ## Overview
//!
//! - Working time scale: seconds past J2000 in the TDB scale
//! - Default convergence tolerance for root refinement
//! - Default cap on the number of result intervals

// -------------------------------------------------------------------------------------------------
// Time scale and conversions
// -------------------------------------------------------------------------------------------------

/// Time coordinate of the engine, in seconds past J2000 TDB
pub type Seconds = f64;

/// Number of seconds in a Julian day
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Number of seconds in an hour
pub const SECONDS_PER_HOUR: f64 = 3_600.0;

// -------------------------------------------------------------------------------------------------
// Search defaults
// -------------------------------------------------------------------------------------------------

/// Default convergence tolerance (seconds) used to refine transition times.
///
/// Tight enough that the tolerance rarely limits accuracy: the quality of the data behind
/// the state evaluator usually does.
pub const CNVTOL: Seconds = 1e-6;

/// Default sampling step (seconds): one hour.
pub const DEFAULT_STEP: Seconds = SECONDS_PER_HOUR;

/// Default maximum number of result intervals returned by a search
pub const DEFAULT_MAX_RESULT_INTERVALS: usize = 10_000;
