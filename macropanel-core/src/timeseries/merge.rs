use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::panel::{Panel, PanelColumn};
use crate::series::ResampledSeries;
use crate::timeseries::util::ensure_contiguous;
use crate::PanelError;

/// Align resampled series on one complete date index.
///
/// - The index runs from the earliest to the latest period of any series; a
///   caller-supplied `start` or `end` replaces that side (snapped to its
///   period start), padding or clipping every column.
/// - Columns appear in dataset-name order. A cell is present only when its
///   value was observed in that period; filled cells keep their value with
///   `present == false`; periods a series does not cover are null.
///
/// # Errors
/// - `PanelError::EmptyInput` if `named` is empty, or no series has any period
///   and the bounds do not pin down an index.
/// - `PanelError::FrequencyMismatch` if the series are not all at one frequency.
/// - `PanelError::InvalidArg` if `start` is after `end` or a dataset name is empty.
/// - `PanelError::Data` if a series is not contiguous.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        name = "macropanel_core::merge",
        skip(named),
        fields(datasets = named.len()),
    )
)]
pub fn merge(
    named: &BTreeMap<String, ResampledSeries>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<Panel, PanelError> {
    let Some(frequency) = named.values().next().map(|s| s.frequency) else {
        return Err(PanelError::empty_input("no datasets to merge"));
    };
    for (name, series) in named {
        if name.is_empty() {
            return Err(PanelError::invalid_arg("dataset name must not be empty"));
        }
        if series.frequency != frequency {
            return Err(PanelError::FrequencyMismatch {
                dataset: name.clone(),
                expected: frequency,
                found: series.frequency,
            });
        }
        ensure_contiguous(series, frequency)?;
    }

    let lo_bound = start.map(|d| frequency.ordinal(d));
    let hi_bound = end.map(|d| frequency.ordinal(d));
    if let (Some(s), Some(e)) = (start, end) {
        if frequency.ordinal(s) > frequency.ordinal(e) {
            return Err(PanelError::invalid_arg(format!(
                "start {s} is after end {e}"
            )));
        }
    }

    let lo = lo_bound.or_else(|| {
        named
            .values()
            .filter_map(ResampledSeries::first_date)
            .map(|d| frequency.ordinal(d))
            .min()
    });
    let hi = hi_bound.or_else(|| {
        named
            .values()
            .filter_map(ResampledSeries::last_date)
            .map(|d| frequency.ordinal(d))
            .max()
    });
    let (Some(lo), Some(hi)) = (lo, hi) else {
        return Err(PanelError::empty_input("no observations in any dataset"));
    };

    let index: Vec<NaiveDate> = (lo..=hi).filter_map(|o| frequency.from_ordinal(o)).collect();
    let rows = index.len();

    let columns = named
        .iter()
        .map(|(name, series)| {
            let mut values = vec![None; rows];
            let mut present = vec![false; rows];
            for p in &series.points {
                let Ok(row) = usize::try_from(frequency.ordinal(p.date) - lo) else {
                    continue;
                };
                if row >= rows {
                    continue;
                }
                values[row] = p.value;
                present[row] = p.origin.is_observed() && p.value.is_some();
            }
            PanelColumn {
                name: name.clone(),
                aggregation: series.aggregation,
                fill_limit: series.fill_limit,
                values,
                present,
            }
        })
        .collect();

    #[cfg(feature = "tracing")]
    tracing::debug!(rows, from = ?index.first(), to = ?index.last(), "merged panel index");

    Ok(Panel::from_parts(frequency, index, columns))
}
