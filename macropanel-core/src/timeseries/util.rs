//! Shared helpers for series arithmetic and invariants.

use crate::series::ResampledSeries;
use crate::{Frequency, PanelError};

/// Percentage change from `prev` to `cur`.
///
/// `None` when either side is missing, `prev` is zero, or the result is not
/// finite.
#[must_use]
pub fn pct_change(prev: Option<f64>, cur: Option<f64>) -> Option<f64> {
    let (p, c) = (prev?, cur?);
    if p == 0.0 {
        return None;
    }
    let r = (c - p) / p * 100.0;
    r.is_finite().then_some(r)
}

/// True when `actual` is within `tolerance` of `expected`, scaled by
/// `max(|expected|, 1)`.
#[must_use]
pub fn within_tolerance(expected: f64, actual: f64, tolerance: f64) -> bool {
    (actual - expected).abs() <= tolerance * expected.abs().max(1.0)
}

/// Ensure a resampled series is at `frequency`, keyed by period starts, and
/// gap-free.
///
/// # Errors
/// - `PanelError::FrequencyMismatch` if the series is at another frequency.
/// - `PanelError::Data` if a point is not on a period start or the periods
///   are not consecutive.
pub fn ensure_contiguous(series: &ResampledSeries, frequency: Frequency) -> Result<(), PanelError> {
    if series.frequency != frequency {
        return Err(PanelError::FrequencyMismatch {
            dataset: series.name.clone(),
            expected: frequency,
            found: series.frequency,
        });
    }
    let mut prev: Option<i64> = None;
    for p in &series.points {
        if !frequency.is_period_start(p.date) {
            return Err(PanelError::Data(format!(
                "{}: {} is not the start of a {frequency} period",
                series.name, p.date
            )));
        }
        let ord = frequency.ordinal(p.date);
        if prev.is_some_and(|before| ord != before + 1) {
            return Err(PanelError::Data(format!(
                "{}: periods are not contiguous at {}",
                series.name, p.date
            )));
        }
        prev = Some(ord);
    }
    Ok(())
}
