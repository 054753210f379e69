//! # Time scale helpers
//!
//! The search engine works on plain `f64` seconds. By convention this crate uses
//! **TDB seconds past J2000** (2000-01-01 12:00:00 TDB), the independent variable of
//! ephemeris-based state evaluators. This module converts between that scale and
//! [`hifitime::Epoch`], and builds confinement windows from epochs or calendar strings.
//!
//! Calendar strings are parsed by hifitime, e.g. `"2024-03-20T03:06:00 UTC"`; a string
//! without time scale suffix is read as UTC.
//!
//! ```rust
//! use gfsearch::time::{tdb_seconds_to_epoch, window_from_calendar};
//!
//! let window = window_from_calendar(&[("2024-01-01T00:00:00 UTC", "2024-01-02T00:00:00 UTC")]).unwrap();
//! let day = window.interval(0).unwrap();
//! assert!((day.length() - 86_400.0).abs() < 1e-3);
//!
//! let (start, _) = day.to_epochs();
//! assert_eq!(start, tdb_seconds_to_epoch(day.start()));
//! ```
use hifitime::Epoch;
use std::str::FromStr;

use crate::constants::{Seconds, SECONDS_PER_DAY};
use crate::gfsearch_errors::SearchError;
use crate::window::{Interval, TimeWindow};

/// Seconds past J2000 in the TDB scale.
pub fn epoch_to_tdb_seconds(epoch: Epoch) -> Seconds {
    epoch.to_tdb_seconds()
}

/// Inverse of [`epoch_to_tdb_seconds`].
pub fn tdb_seconds_to_epoch(t: Seconds) -> Epoch {
    Epoch::from_tdb_seconds(t)
}

/// Transformation from modified julian date (MJD) in the UTC scale to TDB seconds past J2000
///
/// Argument
/// --------
/// * `mjd`: modified julian date, UTC
///
/// Return
/// ------
/// * TDB seconds past J2000
pub fn mjd_utc_to_tdb_seconds(mjd: f64) -> Seconds {
    Epoch::from_mjd_utc(mjd).to_tdb_seconds()
}

/// Transformation from TDB seconds past J2000 to julian days in the TDB scale
pub fn tdb_seconds_to_jd(t: Seconds) -> f64 {
    Epoch::from_tdb_seconds(t).to_jde_tdb_days()
}

/// Parse a calendar string and convert it to TDB seconds past J2000.
///
/// Return
/// ------
/// * the time, or [`SearchError::InvalidEpoch`] if hifitime rejects the string
pub fn calendar_to_tdb_seconds(date: &str) -> Result<Seconds, SearchError> {
    Epoch::from_str(date)
        .map(|epoch| epoch.to_tdb_seconds())
        .map_err(|e| SearchError::InvalidEpoch(format!("{date}: {e}")))
}

/// Build a window from `(start, end)` epoch pairs, merging as [`TimeWindow::insert`] does.
///
/// Return
/// ------
/// * the window, or [`SearchError::InvalidInterval`] if a pair ends before it starts
pub fn window_from_epochs(pairs: &[(Epoch, Epoch)]) -> Result<TimeWindow, SearchError> {
    let mut window = TimeWindow::new();
    for (start, end) in pairs {
        window.insert(start.to_tdb_seconds(), end.to_tdb_seconds())?;
    }
    Ok(window)
}

/// Build a window from `(start, end)` calendar string pairs.
///
/// Return
/// ------
/// * the window
/// * [`SearchError::InvalidEpoch`] if a string cannot be parsed
/// * [`SearchError::InvalidInterval`] if a pair ends before it starts
pub fn window_from_calendar(pairs: &[(&str, &str)]) -> Result<TimeWindow, SearchError> {
    let mut window = TimeWindow::new();
    for (start, end) in pairs {
        window.insert(calendar_to_tdb_seconds(start)?, calendar_to_tdb_seconds(end)?)?;
    }
    Ok(window)
}

impl Interval {
    /// Bounds of the interval as epochs, reading them as TDB seconds past J2000.
    pub fn to_epochs(&self) -> (Epoch, Epoch) {
        (
            tdb_seconds_to_epoch(self.start()),
            tdb_seconds_to_epoch(self.end()),
        )
    }

    /// Length of the interval in days.
    pub fn length_days(&self) -> f64 {
        self.length() / SECONDS_PER_DAY
    }
}
