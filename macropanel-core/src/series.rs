//! Canonical and resampled series.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Aggregation, DatasetSummary, Frequency, ParseError};

/// One normalized observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Calendar date of the observation.
    pub date: NaiveDate,
    /// Finite value, or `None` when the source reported the value as missing.
    pub value: Option<f64>,
    /// Descriptive fields carried over through the source's column mapping.
    pub metadata: Option<BTreeMap<String, String>>,
}

impl Observation {
    /// Observation without metadata.
    #[must_use]
    pub const fn new(date: NaiveDate, value: Option<f64>) -> Self {
        Self {
            date,
            value,
            metadata: None,
        }
    }
}

/// Counters describing what normalization kept and dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizeStats {
    /// Raw records received.
    pub rows_in: usize,
    /// Rows dropped because they could not be parsed.
    pub skipped: usize,
    /// Rows collapsed onto an earlier row with the same date.
    pub duplicates: usize,
    /// Kept observations carrying the explicit missing marker.
    pub missing: usize,
    /// Why each skipped row was dropped, keyed by its zero-based row number.
    pub rejected: Vec<(usize, ParseError)>,
    /// Dates that appeared more than once (each listed once).
    pub duplicate_dates: Vec<NaiveDate>,
}

/// Normalized representation of one loaded dataset.
///
/// Invariants: entries are sorted by strictly increasing date, and every value
/// is either finite or `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalSeries {
    /// Dataset name.
    pub name: String,
    /// Observations in date order.
    pub entries: Vec<Observation>,
    /// Declared or inferred native sampling frequency.
    pub native_frequency: Option<Frequency>,
    /// Normalization counters.
    pub stats: NormalizeStats,
}

impl CanonicalSeries {
    /// Build a series from observations that are already clean: sorted,
    /// unique dates, finite values.
    ///
    /// Intended for callers that bypass raw-record normalization (tests,
    /// derived datasets). Entries are sorted; later duplicates are dropped.
    pub fn from_observations(
        name: impl Into<String>,
        native_frequency: Option<Frequency>,
        entries: impl IntoIterator<Item = Observation>,
    ) -> Self {
        let mut entries: Vec<Observation> = entries
            .into_iter()
            .map(|mut o| {
                o.value = o.value.filter(|v| v.is_finite());
                o
            })
            .collect();
        let rows_in = entries.len();
        entries.sort_by_key(|o| o.date);
        entries.dedup_by_key(|o| o.date);
        let missing = entries.iter().filter(|o| o.value.is_none()).count();
        Self {
            name: name.into(),
            native_frequency,
            stats: NormalizeStats {
                rows_in,
                duplicates: rows_in - entries.len(),
                missing,
                ..NormalizeStats::default()
            },
            entries,
        }
    }

    /// Number of observations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no observation survived normalization.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Date of the first observation.
    #[must_use]
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.entries.first().map(|o| o.date)
    }

    /// Date of the last observation.
    #[must_use]
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.entries.last().map(|o| o.date)
    }

    /// Summary of this series for reporting.
    ///
    /// Panel row counts stay zero until the series is merged.
    #[must_use]
    pub fn summary(&self) -> DatasetSummary {
        DatasetSummary {
            name: self.name.clone(),
            rows_in: self.stats.rows_in,
            kept: self.entries.len(),
            skipped: self.stats.skipped,
            duplicates: self.stats.duplicates,
            missing: self.stats.missing,
            first: self.first_date(),
            last: self.last_date(),
            native_frequency: self.native_frequency,
            observed: 0,
            filled: 0,
        }
    }
}

/// Where a resampled value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "origin")]
pub enum Origin {
    /// Folded from `count` real observations in this period.
    Observed {
        /// Number of non-missing observations in the bucket.
        count: usize,
    },
    /// Carried forward from the observation `offset` periods earlier.
    Filled {
        /// Distance in periods from the originating observation (at least 1).
        offset: u32,
    },
    /// No value for this period.
    Missing,
}

impl Origin {
    /// True when the value comes from real data in this very period.
    #[must_use]
    pub const fn is_observed(self) -> bool {
        matches!(self, Self::Observed { .. })
    }
}

/// One period of a resampled series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResampledPoint {
    /// First day of the period.
    pub date: NaiveDate,
    /// Value, or `None` for an empty or explicitly missing period.
    pub value: Option<f64>,
    /// Provenance of the value.
    pub origin: Origin,
}

/// A series re-expressed at a target frequency.
///
/// Invariant: `points` is the complete, contiguous sequence of periods at
/// `frequency` between the series' first and last observed period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResampledSeries {
    /// Dataset name.
    pub name: String,
    /// Target frequency.
    pub frequency: Frequency,
    /// Aggregation applied to buckets.
    pub aggregation: Aggregation,
    /// Forward-fill bound when the series was upsampled from a coarser cadence.
    pub fill_limit: Option<u32>,
    /// Periods in order.
    pub points: Vec<ResampledPoint>,
}

impl ResampledSeries {
    /// Number of periods.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True when the series covers no period.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// First period start.
    #[must_use]
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    /// Last period start.
    #[must_use]
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// Point for the period starting at `date`.
    #[must_use]
    pub fn get(&self, date: NaiveDate) -> Option<&ResampledPoint> {
        self.points
            .binary_search_by_key(&date, |p| p.date)
            .ok()
            .map(|i| &self.points[i])
    }

    /// Value for the period starting at `date`.
    #[must_use]
    pub fn value_at(&self, date: NaiveDate) -> Option<f64> {
        self.get(date).and_then(|p| p.value)
    }
}
