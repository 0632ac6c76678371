//! Integrity validation of a merged panel against the series it came from.
//!
//! Every check runs independently of the others and reports findings as data;
//! nothing here fails or panics on a malformed panel.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::panel::{Panel, PanelColumn};
use crate::series::CanonicalSeries;
use crate::timeseries::util::within_tolerance;
use crate::{Aggregation, Frequency, IntegrityReport, Issue, IssueKind};

/// Default cap on anchor periods checked per dataset.
pub const DEFAULT_MAX_ANCHORS: usize = 16;

/// Knobs for [`validate_with`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationOptions {
    /// Extra periods to spot-check in every dataset, on top of the first,
    /// middle and last original periods.
    pub anchors: Vec<NaiveDate>,
    /// Cap on spot-checked periods per dataset.
    pub max_anchors: usize,
    /// Relative tolerance for periods holding exactly one original value.
    pub passthrough_tolerance: f64,
    /// Relative tolerance for periods folded from several original values.
    pub aggregate_tolerance: f64,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            anchors: Vec::new(),
            max_anchors: DEFAULT_MAX_ANCHORS,
            passthrough_tolerance: 1e-6,
            aggregate_tolerance: 1e-4,
        }
    }
}

/// Validate with default options.
///
/// See [`validate_with`].
#[must_use]
pub fn validate(panel: &Panel, originals: &BTreeMap<String, CanonicalSeries>) -> IntegrityReport {
    validate_with(panel, originals, &ValidationOptions::default())
}

/// Check a panel for structural soundness, completeness, value fidelity at
/// anchor periods, and fill bounds.
///
/// A mismatched anchor whose value turns up in a nearby row is also reported
/// as a `DateShift` carrying the offset in periods.
///
/// The report passes when no finding has error severity.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        name = "macropanel_core::validate",
        skip(panel, originals, opts),
        fields(rows = panel.len(), datasets = originals.len()),
    )
)]
#[must_use]
pub fn validate_with(
    panel: &Panel,
    originals: &BTreeMap<String, CanonicalSeries>,
    opts: &ValidationOptions,
) -> IntegrityReport {
    let mut issues = Vec::new();
    check_index(panel, &mut issues);

    let freq = panel.frequency();
    for name in originals.keys() {
        if panel.column(name).is_none() {
            issues.push(Issue::error(
                IssueKind::MissingColumn,
                Some(name),
                "dataset is missing from the panel",
            ));
        }
    }

    for col in panel.columns() {
        let original = originals.get(&col.name);
        if original.is_none() {
            issues.push(Issue::warning(
                IssueKind::Unverified,
                Some(&col.name),
                "no original series to verify against",
            ));
        }
        // Misshapen columns were reported above; row-wise checks need aligned rows.
        if !shape_ok(panel, col) {
            continue;
        }
        if let Some(original) = original {
            let buckets = original_buckets(original, freq);
            check_completeness(panel, col, &buckets, &mut issues);
            check_anchors(panel, col, &buckets, opts, &mut issues);
            check_fabricated(panel, col, &buckets, &mut issues);
        }
        check_fill_bound(panel, col, &mut issues);
    }

    let report = IntegrityReport::from_issues(issues);
    #[cfg(feature = "tracing")]
    tracing::info!(
        passed = report.passed,
        errors = report.errors().count(),
        warnings = report.warnings().count(),
        "integrity check finished"
    );
    report
}

/// Non-missing original values grouped by panel period ordinal, in date order.
fn original_buckets(original: &CanonicalSeries, freq: Frequency) -> BTreeMap<i64, Vec<f64>> {
    let mut buckets: BTreeMap<i64, Vec<f64>> = BTreeMap::new();
    for obs in &original.entries {
        if let Some(v) = obs.value {
            buckets.entry(freq.ordinal(obs.date)).or_default().push(v);
        }
    }
    buckets
}

#[allow(clippy::cast_precision_loss)]
fn expected_value(values: &[f64], agg: Aggregation) -> Option<f64> {
    let (&first, &last) = (values.first()?, values.last()?);
    Some(match agg {
        Aggregation::Mean => values.iter().sum::<f64>() / values.len() as f64,
        Aggregation::Sum => values.iter().sum(),
        Aggregation::First => first,
        Aggregation::Last => last,
        Aggregation::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        Aggregation::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
    })
}

fn shape_ok(panel: &Panel, col: &PanelColumn) -> bool {
    col.values.len() == panel.len() && col.present.len() == panel.len()
}

fn check_index(panel: &Panel, issues: &mut Vec<Issue>) {
    let freq = panel.frequency();
    let index = panel.index();

    for &date in index {
        if !freq.is_period_start(date) {
            issues.push(
                Issue::error(
                    IssueKind::MisalignedPeriod,
                    None,
                    format!("{date} is not the start of a {freq} period"),
                )
                .at(date),
            );
        }
    }
    for w in index.windows(2) {
        if w[1] <= w[0] {
            issues.push(
                Issue::error(
                    IssueKind::NonMonotonicIndex,
                    None,
                    format!("{} does not follow {}", w[1], w[0]),
                )
                .at(w[1]),
            );
        } else if freq.periods_between(w[0], w[1]) != 1 {
            issues.push(
                Issue::error(
                    IssueKind::IrregularStep,
                    None,
                    format!(
                        "{} periods between {} and {}",
                        freq.periods_between(w[0], w[1]),
                        w[0],
                        w[1]
                    ),
                )
                .at(w[1]),
            );
        }
    }
    for col in panel.columns() {
        if !shape_ok(panel, col) {
            issues.push(Issue::error(
                IssueKind::ShapeMismatch,
                Some(&col.name),
                format!(
                    "{} values and {} flags for {} index rows",
                    col.values.len(),
                    col.present.len(),
                    panel.len()
                ),
            ));
        }
    }
}

fn check_completeness(
    panel: &Panel,
    col: &PanelColumn,
    buckets: &BTreeMap<i64, Vec<f64>>,
    issues: &mut Vec<Issue>,
) {
    let (Some(first), Some(last)) = (
        col.present.iter().position(|p| *p),
        col.present.iter().rposition(|p| *p),
    ) else {
        return;
    };
    let freq = panel.frequency();
    for row in first..=last {
        if col.values[row].is_some() {
            continue;
        }
        let date = panel.index()[row];
        if buckets.contains_key(&freq.ordinal(date)) {
            issues.push(
                Issue::error(
                    IssueKind::InteriorGap,
                    Some(&col.name),
                    "null cell where the original series has data",
                )
                .at(date),
            );
        } else {
            issues.push(
                Issue::warning(
                    IssueKind::SourceGap,
                    Some(&col.name),
                    "no source data for this period",
                )
                .at(date),
            );
        }
    }
}

fn anchor_periods(
    panel: &Panel,
    buckets: &BTreeMap<i64, Vec<f64>>,
    opts: &ValidationOptions,
) -> Vec<NaiveDate> {
    let freq = panel.frequency();
    let in_panel: Vec<NaiveDate> = buckets
        .keys()
        .filter_map(|&o| freq.from_ordinal(o))
        .filter(|d| panel.position(*d).is_some())
        .collect();

    let mut picks: Vec<NaiveDate> = Vec::new();
    if let (Some(&first), Some(&last)) = (in_panel.first(), in_panel.last()) {
        picks.extend([first, in_panel[in_panel.len() / 2], last]);
    }
    picks.extend(
        opts.anchors
            .iter()
            .map(|&d| freq.period_start(d))
            .filter(|d| panel.position(*d).is_some()),
    );

    let mut seen: Vec<NaiveDate> = Vec::with_capacity(picks.len());
    for d in picks {
        if !seen.contains(&d) {
            seen.push(d);
        }
    }
    seen.truncate(opts.max_anchors);
    seen
}

fn check_anchors(
    panel: &Panel,
    col: &PanelColumn,
    buckets: &BTreeMap<i64, Vec<f64>>,
    opts: &ValidationOptions,
    issues: &mut Vec<Issue>,
) {
    let freq = panel.frequency();
    for date in anchor_periods(panel, buckets, opts) {
        let Some(values) = buckets.get(&freq.ordinal(date)) else {
            continue;
        };
        let (Some(expected), Some(row)) = (expected_value(values, col.aggregation), panel.position(date))
        else {
            continue;
        };
        let tolerance = if values.len() == 1 {
            opts.passthrough_tolerance
        } else {
            opts.aggregate_tolerance
        };
        let found = match col.values[row] {
            Some(actual) if within_tolerance(expected, actual, tolerance) => continue,
            Some(actual) => actual.to_string(),
            None => "null".to_string(),
        };
        issues.push(
            Issue::error(
                IssueKind::AnchorMismatch,
                Some(&col.name),
                format!("expected {expected}, found {found}"),
            )
            .at(date),
        );
        if let Some(shift) = locate_shift(col, row, expected, tolerance, freq.periods_per_year()) {
            let landed = panel.index()[row.saturating_add_signed(shift)];
            issues.push(
                Issue::error(
                    IssueKind::DateShift,
                    Some(&col.name),
                    format!("value for {date} sits at {landed}, {shift:+} periods away"),
                )
                .at(date)
                .shifted_by(i64::try_from(shift).unwrap_or(i64::MAX)),
            );
        }
    }
}

/// Nearest row offset within `window` periods whose value matches `expected`.
///
/// Later rows win ties, since a lagged merge pushes values forward.
fn locate_shift(
    col: &PanelColumn,
    row: usize,
    expected: f64,
    tolerance: f64,
    window: u32,
) -> Option<isize> {
    let matches = |k: isize| {
        row.checked_add_signed(k)
            .and_then(|r| col.values.get(r).copied().flatten())
            .is_some_and(|v| within_tolerance(expected, v, tolerance))
    };
    let window = isize::try_from(window).unwrap_or(isize::MAX);
    (1..=window).flat_map(|k| [k, -k]).find(|&k| matches(k))
}

fn check_fabricated(
    panel: &Panel,
    col: &PanelColumn,
    buckets: &BTreeMap<i64, Vec<f64>>,
    issues: &mut Vec<Issue>,
) {
    let freq = panel.frequency();
    for (row, _) in col.present.iter().enumerate().filter(|(_, p)| **p) {
        let date = panel.index()[row];
        if !buckets.contains_key(&freq.ordinal(date)) {
            issues.push(
                Issue::error(
                    IssueKind::FabricatedValue,
                    Some(&col.name),
                    "marked present but the original series has no data here",
                )
                .at(date),
            );
        }
    }
}

fn check_fill_bound(panel: &Panel, col: &PanelColumn, issues: &mut Vec<Issue>) {
    let limit = col.fill_limit.map_or(0, |l| l.saturating_sub(1));
    // Leading rows may carry an observation clipped off by the index start.
    let mut anchored = true;
    let mut run = 0u32;
    let mut reported = false;

    for (row, (value, present)) in col.values.iter().zip(&col.present).enumerate() {
        if *present {
            anchored = true;
            run = 0;
            reported = false;
            continue;
        }
        if value.is_none() {
            anchored = false;
            run = 0;
            reported = false;
            continue;
        }
        run = run.saturating_add(1);
        if reported {
            continue;
        }
        let date = panel.index()[row];
        if !anchored {
            issues.push(
                Issue::error(
                    IssueKind::FillBoundExceeded,
                    Some(&col.name),
                    "filled value without a preceding observation",
                )
                .at(date),
            );
            reported = true;
        } else if run > limit {
            issues.push(
                Issue::error(
                    IssueKind::FillBoundExceeded,
                    Some(&col.name),
                    format!("{run} consecutive filled periods, at most {limit} allowed"),
                )
                .at(date),
            );
            reported = true;
        }
    }
}
