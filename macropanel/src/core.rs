use std::collections::HashSet;
#[cfg(feature = "tracing")]
use std::convert::TryFrom;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use macropanel_core::{
    Aggregation, DatasetConfig, FetchRequest, Frequency, PanelError, PipelineConfig, RecordSource,
    ValidationOptions,
};

/// One registered dataset: how to read it and, optionally, where to fetch it.
pub(crate) struct DatasetEntry {
    pub(crate) cfg: DatasetConfig,
    pub(crate) source: Option<(Arc<dyn RecordSource>, String)>,
}

/// Orchestrator that runs normalization, resampling, merging, feature
/// derivation, and validation over a fixed set of datasets.
pub struct MacroPanel {
    pub(crate) datasets: Vec<DatasetEntry>,
    pub(crate) cfg: PipelineConfig,
    pub(crate) validation: ValidationOptions,
}

/// Builder for constructing a `MacroPanel` with custom configuration.
pub struct MacroPanelBuilder {
    datasets: Vec<DatasetEntry>,
    cfg: PipelineConfig,
    validation: ValidationOptions,
}

impl Default for MacroPanelBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MacroPanelBuilder {
    /// Create a new builder with defaults.
    ///
    /// - Starts with no datasets; register at least one via [`dataset`](Self::dataset).
    /// - Monthly target, fill bound of 3 periods, no index bounds.
    /// - Integrity check on, feature derivation off.
    #[must_use]
    pub fn new() -> Self {
        Self {
            datasets: vec![],
            cfg: PipelineConfig::default(),
            validation: ValidationOptions::default(),
        }
    }

    /// Register a dataset whose raw records the caller supplies to
    /// [`MacroPanel::run`].
    #[must_use]
    pub fn dataset(mut self, cfg: DatasetConfig) -> Self {
        self.datasets.push(DatasetEntry { cfg, source: None });
        self
    }

    /// Register a dataset fetched from `source` by
    /// [`MacroPanel::fetch_and_run`].
    ///
    /// `source_dataset` is the identifier the source understands (stat code,
    /// table id, series id); the panel column is named after `cfg.name`.
    #[must_use]
    pub fn dataset_from(
        mut self,
        cfg: DatasetConfig,
        source: Arc<dyn RecordSource>,
        source_dataset: impl Into<String>,
    ) -> Self {
        self.datasets.push(DatasetEntry {
            cfg,
            source: Some((source, source_dataset.into())),
        });
        self
    }

    /// Replace the whole pipeline configuration.
    #[must_use]
    pub fn config(mut self, cfg: PipelineConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Target merge frequency.
    #[must_use]
    pub const fn target(mut self, frequency: Frequency) -> Self {
        self.cfg.target = frequency;
        self
    }

    /// Forward-fill bound for datasets without their own override.
    #[must_use]
    pub const fn max_fill_periods(mut self, periods: u32) -> Self {
        self.cfg.max_fill_periods = periods;
        self
    }

    /// Inclusive lower bound of the panel index.
    #[must_use]
    pub const fn start(mut self, date: NaiveDate) -> Self {
        self.cfg.start = Some(date);
        self
    }

    /// Inclusive upper bound of the panel index.
    #[must_use]
    pub const fn end(mut self, date: NaiveDate) -> Self {
        self.cfg.end = Some(date);
        self
    }

    /// Toggle the integrity check after merging.
    #[must_use]
    pub const fn run_integrity_check(mut self, yes: bool) -> Self {
        self.cfg.run_integrity_check = yes;
        self
    }

    /// Toggle change and calendar columns.
    #[must_use]
    pub const fn derive_features(mut self, yes: bool) -> Self {
        self.cfg.derive_features = yes;
        self
    }

    /// Override the year-over-year lag.
    #[must_use]
    pub const fn periods_per_year(mut self, periods: u32) -> Self {
        self.cfg.periods_per_year = Some(periods);
        self
    }

    /// Add a date spot-checked by the anchor-value check in every dataset.
    #[must_use]
    pub fn anchor(mut self, date: NaiveDate) -> Self {
        self.cfg.anchors.push(date);
        self
    }

    /// Replace the validation options (tolerances, anchor cap).
    ///
    /// Anchors registered via [`anchor`](Self::anchor) are added on top.
    #[must_use]
    pub fn validation(mut self, opts: ValidationOptions) -> Self {
        self.validation = opts;
        self
    }

    /// Timeout applied to each individual source fetch.
    #[must_use]
    pub const fn source_timeout(mut self, timeout: Duration) -> Self {
        self.cfg.source_timeout = timeout;
        self
    }

    /// Deadline for the whole fetch fan-out.
    #[must_use]
    pub const fn request_timeout(mut self, timeout: Duration) -> Self {
        self.cfg.request_timeout = Some(timeout);
        self
    }

    /// Build the `MacroPanel` orchestrator.
    ///
    /// # Errors
    /// - `EmptyInput` if no datasets have been registered.
    /// - `MissingConfig` if a dataset has no aggregation function.
    /// - `InvalidArg` if a dataset name is empty or repeated, or `start` is
    ///   after `end`.
    pub fn build(mut self) -> Result<MacroPanel, PanelError> {
        if self.datasets.is_empty() {
            return Err(PanelError::empty_input(
                "no datasets registered; add at least one via dataset(...)",
            ));
        }
        let mut seen: HashSet<&str> = HashSet::new();
        for d in &self.datasets {
            if d.cfg.name.is_empty() {
                return Err(PanelError::invalid_arg("dataset name must not be empty"));
            }
            if !seen.insert(d.cfg.name.as_str()) {
                return Err(PanelError::invalid_arg(format!(
                    "dataset {} registered twice",
                    d.cfg.name
                )));
            }
            if d.cfg.aggregation.is_none() {
                return Err(PanelError::missing_config(
                    d.cfg.name.clone(),
                    "an aggregation function",
                ));
            }
        }
        if let (Some(start), Some(end)) = (self.cfg.start, self.cfg.end) {
            if start > end {
                return Err(PanelError::invalid_arg(format!(
                    "start {start} is after end {end}"
                )));
            }
        }

        self.validation.anchors.extend(self.cfg.anchors.iter().copied());
        Ok(MacroPanel {
            datasets: self.datasets,
            cfg: self.cfg,
            validation: self.validation,
        })
    }
}

/// Re-tag an error coming out of a source so it names that source.
pub fn tag_err(source_name: &str, e: PanelError) -> PanelError {
    match e {
        e @ (PanelError::Source { .. }
        | PanelError::SourceTimeout { .. }
        | PanelError::RequestTimeout
        | PanelError::SourcesFailed(_)) => e,
        other => PanelError::source_failed(source_name, other.to_string()),
    }
}

/// Apply an optional deadline to a future, mapping expiry to `RequestTimeout`.
pub(crate) async fn with_request_deadline<F, T>(
    deadline: Option<Duration>,
    fut: F,
) -> Result<T, PanelError>
where
    F: core::future::Future<Output = T>,
{
    match deadline {
        Some(d) => tokio::time::timeout(d, fut)
            .await
            .map_err(|_| PanelError::RequestTimeout),
        None => Ok(fut.await),
    }
}

impl MacroPanel {
    /// Wrap a source future with a timeout and standardized timeout error mapping.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "macropanel::core::source_call_with_timeout",
            skip(fut),
            fields(
                source = source_name,
                timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            ),
        )
    )]
    pub(crate) async fn source_call_with_timeout<T, Fut>(
        source_name: &'static str,
        timeout: Duration,
        fut: Fut,
    ) -> Result<T, PanelError>
    where
        Fut: core::future::Future<Output = Result<T, PanelError>>,
    {
        (tokio::time::timeout(timeout, fut).await)
            .unwrap_or_else(|_| Err(PanelError::source_timeout(source_name)))
    }

    /// Start building a new `MacroPanel`.
    ///
    /// ```
    /// use macropanel::{Aggregation, DatasetConfig, Frequency, MacroPanel, SourceKind, SourceSpec};
    ///
    /// let mp = MacroPanel::builder()
    ///     .dataset(DatasetConfig::new(
    ///         "base_rate",
    ///         SourceSpec::preset(SourceKind::Bok),
    ///         Aggregation::Last,
    ///     ))
    ///     .target(Frequency::Monthly)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(mp.config().target, Frequency::Monthly);
    /// ```
    #[must_use]
    pub fn builder() -> MacroPanelBuilder {
        MacroPanelBuilder::new()
    }

    /// Effective pipeline configuration.
    #[must_use]
    pub const fn config(&self) -> &PipelineConfig {
        &self.cfg
    }

    /// Registered datasets, in registration order.
    pub fn datasets(&self) -> impl Iterator<Item = &DatasetConfig> {
        self.datasets.iter().map(|d| &d.cfg)
    }

    pub(crate) fn fetch_request(&self, source_dataset: &str) -> FetchRequest {
        FetchRequest::new(source_dataset).between(self.cfg.start, self.cfg.end)
    }

    pub(crate) fn fill_bound(&self, cfg: &DatasetConfig) -> u32 {
        cfg.max_fill_periods.unwrap_or(self.cfg.max_fill_periods)
    }

    pub(crate) fn aggregation(cfg: &DatasetConfig) -> Result<Aggregation, PanelError> {
        cfg.aggregation
            .ok_or_else(|| PanelError::missing_config(cfg.name.clone(), "an aggregation function"))
    }
}
