//! Display helpers for [`TimeWindow`] and summary statistics on interval lengths.
//!
//! * `format!("{}", window)` – compact single line, e.g. `[20, 40] [60, 65]`.
//! * `format!("{:#}", window)` – aligned table with one row per interval.
//! * A precision applies to every number: `format!("{:.3}", window)`.
use std::fmt;

use super::{Interval, TimeWindow};
use crate::constants::Seconds;

/// Summary statistics on the interval lengths of a [`TimeWindow`].
///
/// Fields
/// -----------------
/// * `cardinality` – number of intervals.
/// * `measure` – total length.
/// * `mean` – average length.
/// * `std_dev` – population standard deviation of the lengths.
/// * `shortest` / `longest` – index of the shortest / longest interval
///   (the first one on ties).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowSummary {
    pub cardinality: usize,
    pub measure: Seconds,
    pub mean: Seconds,
    pub std_dev: Seconds,
    pub shortest: usize,
    pub longest: usize,
}

impl WindowSummary {
    pub(crate) fn from_window(window: &TimeWindow) -> Option<Self> {
        if window.is_empty() {
            return None;
        }

        let lengths: Vec<Seconds> = window.iter().map(Interval::length).collect();
        let n = lengths.len() as f64;
        let measure: Seconds = lengths.iter().sum();
        let mean = measure / n;
        let var = lengths.iter().map(|l| (l - mean).powi(2)).sum::<f64>() / n;

        let mut shortest = 0;
        let mut longest = 0;
        for (i, &len) in lengths.iter().enumerate() {
            if len < lengths[shortest] {
                shortest = i;
            }
            if len > lengths[longest] {
                longest = i;
            }
        }

        Some(WindowSummary {
            cardinality: lengths.len(),
            measure,
            mean,
            std_dev: var.sqrt(),
            shortest,
            longest,
        })
    }
}

impl fmt::Display for WindowSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            writeln!(f, "Time window summary")?;
            writeln!(f, "-------------------")?;
            writeln!(f, "intervals : {}", self.cardinality)?;
            writeln!(f, "measure   : {:.6} s", self.measure)?;
            writeln!(f, "mean      : {:.6} s", self.mean)?;
            writeln!(f, "std dev   : {:.6} s", self.std_dev)?;
            writeln!(f, "shortest  : #{}", self.shortest)?;
            write!(f, "longest   : #{}", self.longest)
        } else {
            write!(
                f,
                "n={}, measure={:.3}s, mean={:.3}s, std={:.3}s, shortest=#{}, longest=#{}",
                self.cardinality,
                self.measure,
                self.mean,
                self.std_dev,
                self.shortest,
                self.longest
            )
        }
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prec = f.precision().unwrap_or(6);

        if f.alternate() {
            writeln!(f, "Time window ({} intervals)", self.cardinality())?;
            writeln!(
                f,
                "{:>5}  {:>24}  {:>24}  {:>18}",
                "#", "start (s)", "end (s)", "length (s)"
            )?;
            for (i, iv) in self.iter().enumerate() {
                writeln!(
                    f,
                    "{:>5}  {:>24.*}  {:>24.*}  {:>18.*}",
                    i,
                    prec,
                    iv.start,
                    prec,
                    iv.end,
                    prec,
                    iv.length()
                )?;
            }
            write!(f, "total measure: {:.*} s", prec, self.measure())
        } else {
            if self.is_empty() {
                return write!(f, "[]");
            }
            let mut first = true;
            for iv in self.iter() {
                if !first {
                    write!(f, " ")?;
                }
                first = false;
                match f.precision() {
                    Some(p) => write!(f, "{iv:.p$}")?,
                    None => write!(f, "{iv}")?,
                }
            }
            Ok(())
        }
    }
}
