//! Report envelopes produced by the validator and the orchestrator.

use core::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::Frequency;

/// How serious an integrity finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Worth knowing; does not fail the report.
    Warning,
    /// The panel cannot be trusted as-is.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Warning => "warning",
            Self::Error => "error",
        })
    }
}

/// Category of an integrity finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum IssueKind {
    /// Index dates are not strictly increasing.
    NonMonotonicIndex,
    /// Adjacent index dates are not exactly one period apart.
    IrregularStep,
    /// An index date is not the first day of its period.
    MisalignedPeriod,
    /// A column's length differs from the index length.
    ShapeMismatch,
    /// A period with original data is null inside the column's range.
    InteriorGap,
    /// The source itself has no data for a period inside the range.
    SourceGap,
    /// An anchor cell disagrees with the independently recomputed value.
    AnchorMismatch,
    /// An anchor value turns up in a different row of the same column.
    DateShift,
    /// A cell claims real data for a period the source never reported.
    FabricatedValue,
    /// Forward-filled values run longer than the configured bound.
    FillBoundExceeded,
    /// An original dataset has no column in the panel.
    MissingColumn,
    /// A panel column has no original series to check against.
    Unverified,
}

impl IssueKind {
    /// Lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NonMonotonicIndex => "non_monotonic_index",
            Self::IrregularStep => "irregular_step",
            Self::MisalignedPeriod => "misaligned_period",
            Self::ShapeMismatch => "shape_mismatch",
            Self::InteriorGap => "interior_gap",
            Self::SourceGap => "source_gap",
            Self::AnchorMismatch => "anchor_mismatch",
            Self::DateShift => "date_shift",
            Self::FabricatedValue => "fabricated_value",
            Self::FillBoundExceeded => "fill_bound_exceeded",
            Self::MissingColumn => "missing_column",
            Self::Unverified => "unverified",
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One integrity finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    /// Category.
    pub kind: IssueKind,
    /// Severity.
    pub severity: Severity,
    /// Dataset the finding concerns; `None` for panel-wide findings.
    pub dataset: Option<String>,
    /// Period the finding concerns, when it is about a single period.
    pub date: Option<NaiveDate>,
    /// Human-readable detail.
    pub detail: String,
    /// Signed distance in periods from where a value belongs to where it was
    /// found. Set only on `DateShift` findings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shift: Option<i64>,
}

impl Issue {
    /// Error-severity finding.
    pub fn error(kind: IssueKind, dataset: Option<&str>, detail: impl Into<String>) -> Self {
        Self {
            kind,
            severity: Severity::Error,
            dataset: dataset.map(str::to_string),
            date: None,
            detail: detail.into(),
            shift: None,
        }
    }

    /// Warning-severity finding.
    pub fn warning(kind: IssueKind, dataset: Option<&str>, detail: impl Into<String>) -> Self {
        Self {
            kind,
            severity: Severity::Warning,
            dataset: dataset.map(str::to_string),
            date: None,
            detail: detail.into(),
            shift: None,
        }
    }

    /// Attach the period the finding concerns.
    #[must_use]
    pub const fn at(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Attach the period offset of a shifted value.
    #[must_use]
    pub const fn shifted_by(mut self, periods: i64) -> Self {
        self.shift = Some(periods);
        self
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.severity, self.kind)?;
        if let Some(ds) = &self.dataset {
            write!(f, " {ds}")?;
        }
        if let Some(d) = self.date {
            write!(f, " @ {d}")?;
        }
        write!(f, ": {}", self.detail)
    }
}

/// Outcome of one validation run.
///
/// Built once from the collected issues; `passed` is true when no issue has
/// error severity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrityReport {
    /// All findings, in check order.
    pub issues: Vec<Issue>,
    /// Overall verdict.
    pub passed: bool,
}

impl IntegrityReport {
    /// Build a report from collected issues.
    #[must_use]
    pub fn from_issues(issues: Vec<Issue>) -> Self {
        let passed = !issues.iter().any(|i| i.severity == Severity::Error);
        Self { issues, passed }
    }

    /// Error-severity findings.
    pub fn errors(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|i| i.severity == Severity::Error)
    }

    /// Warning-severity findings.
    pub fn warnings(&self) -> impl Iterator<Item = &Issue> {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
    }

    /// Findings of one kind.
    pub fn of_kind(&self, kind: IssueKind) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(move |i| i.kind == kind)
    }

    /// Findings about one dataset.
    pub fn for_dataset<'a>(&'a self, dataset: &'a str) -> impl Iterator<Item = &'a Issue> {
        self.issues
            .iter()
            .filter(move |i| i.dataset.as_deref() == Some(dataset))
    }

    /// One-line verdict, e.g. `"FAILED: 2 errors, 1 warning"`.
    #[must_use]
    pub fn summary(&self) -> String {
        let errors = self.errors().count();
        let warnings = self.warnings().count();
        let verdict = if self.passed { "PASSED" } else { "FAILED" };
        format!(
            "{verdict}: {errors} error{}, {warnings} warning{}",
            if errors == 1 { "" } else { "s" },
            if warnings == 1 { "" } else { "s" },
        )
    }
}

impl fmt::Display for IntegrityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.summary())?;
        for issue in &self.issues {
            writeln!(f, "  {issue}")?;
        }
        Ok(())
    }
}

/// Per-dataset account of what normalization kept and dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSummary {
    /// Dataset name.
    pub name: String,
    /// Raw records received.
    pub rows_in: usize,
    /// Observations kept after dropping bad rows and duplicates.
    pub kept: usize,
    /// Rows dropped because the date or value could not be parsed.
    pub skipped: usize,
    /// Rows collapsed because their date was already seen.
    pub duplicates: usize,
    /// Kept observations carrying the explicit missing marker.
    pub missing: usize,
    /// First observation date.
    pub first: Option<NaiveDate>,
    /// Last observation date.
    pub last: Option<NaiveDate>,
    /// Declared or inferred native frequency.
    pub native_frequency: Option<Frequency>,
    /// Panel rows holding a value observed in that period.
    #[serde(default)]
    pub observed: usize,
    /// Panel rows holding a forward-filled value.
    #[serde(default)]
    pub filled: usize,
}
