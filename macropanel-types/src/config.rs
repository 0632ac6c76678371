//! Configuration types shared by the orchestrator and its callers.

use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Aggregation, Frequency, SourceSpec};

/// Default bound on how many target periods one coarse observation may occupy.
pub const DEFAULT_MAX_FILL_PERIODS: u32 = 3;

/// Per-dataset configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Dataset name; becomes the `<name>` in `value_<name>` / `source_<name>`.
    pub name: String,
    /// How raw records of this dataset are read.
    pub spec: SourceSpec,
    /// How observations are folded into target periods. Required.
    pub aggregation: Option<Aggregation>,
    /// Per-dataset override of the forward-fill bound.
    pub max_fill_periods: Option<u32>,
}

impl DatasetConfig {
    /// Dataset with an explicit aggregation function.
    pub fn new(name: impl Into<String>, spec: SourceSpec, aggregation: Aggregation) -> Self {
        Self {
            name: name.into(),
            spec,
            aggregation: Some(aggregation),
            max_fill_periods: None,
        }
    }

    /// Override the forward-fill bound for this dataset only.
    #[must_use]
    pub const fn with_max_fill_periods(mut self, periods: u32) -> Self {
        self.max_fill_periods = Some(periods);
        self
    }
}

/// Global configuration for a pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Target merge frequency.
    pub target: Frequency,
    /// Forward-fill bound applied to datasets without an override.
    pub max_fill_periods: u32,
    /// Optional inclusive lower bound of the panel index.
    pub start: Option<NaiveDate>,
    /// Optional inclusive upper bound of the panel index.
    pub end: Option<NaiveDate>,
    /// Validate the merged panel and return an integrity report.
    pub run_integrity_check: bool,
    /// Attach change and calendar columns to the panel.
    pub derive_features: bool,
    /// Year-over-year lag; defaults to the target frequency's convention.
    pub periods_per_year: Option<u32>,
    /// Extra dates sampled by the anchor-value check.
    pub anchors: Vec<NaiveDate>,
    /// Timeout for each individual source fetch.
    pub source_timeout: Duration,
    /// Optional deadline for the whole fetch fan-out.
    pub request_timeout: Option<Duration>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            target: Frequency::Monthly,
            max_fill_periods: DEFAULT_MAX_FILL_PERIODS,
            start: None,
            end: None,
            run_integrity_check: true,
            derive_features: false,
            periods_per_year: None,
            anchors: Vec::new(),
            source_timeout: Duration::from_secs(30),
            request_timeout: None,
        }
    }
}

impl PipelineConfig {
    /// Year-over-year lag in effect for this configuration.
    #[must_use]
    pub fn effective_periods_per_year(&self) -> u32 {
        self.periods_per_year
            .unwrap_or_else(|| self.target.periods_per_year())
    }
}
