//! Stage sequencing: normalize, resample, merge, derive, validate.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use macropanel_core::{
    Aggregation, CanonicalSeries, DatasetConfig, DatasetSummary, Frequency, IntegrityReport, Panel,
    PanelError, RawRecord, ResampledSeries, SourceSpec, add_derived, merge, normalize_named,
    resample, validate_with,
};
use serde::Serialize;

use crate::core::MacroPanel;

/// Result of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineOutput {
    /// Merged (and optionally enriched) panel.
    pub panel: Panel,
    /// Integrity report, when the check was enabled.
    pub report: Option<IntegrityReport>,
    /// What normalization kept and dropped, per dataset in name order.
    pub summaries: Vec<DatasetSummary>,
}

struct Staged {
    panel: Panel,
    originals: BTreeMap<String, CanonicalSeries>,
    summaries: Vec<DatasetSummary>,
}

impl MacroPanel {
    /// Run the pipeline over caller-supplied raw records, keyed by dataset
    /// name.
    ///
    /// Every registered dataset must have an entry in `raw`; extra entries
    /// are ignored.
    ///
    /// # Errors
    /// - `MissingConfig` if a registered dataset has no raw records.
    /// - `EmptyDataset` if a dataset keeps no observation after normalization.
    /// - Any error from [`merge`] or [`add_derived`].
    ///
    /// All of these abort before a panel is produced; row-level parse
    /// failures do not, and are counted in the summaries instead.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "macropanel::run",
            skip(self, raw),
            fields(datasets = self.datasets.len(), target = %self.cfg.target),
        )
    )]
    pub fn run(
        &self,
        raw: &BTreeMap<String, Vec<RawRecord>>,
    ) -> Result<PipelineOutput, PanelError> {
        let staged = self.stage(raw)?;
        let report = self
            .cfg
            .run_integrity_check
            .then(|| validate_with(&staged.panel, &staged.originals, &self.validation));

        #[cfg(feature = "tracing")]
        if let Some(r) = &report {
            if r.passed {
                tracing::info!(rows = staged.panel.len(), "{}", r.summary());
            } else {
                tracing::warn!(rows = staged.panel.len(), "{}", r.summary());
            }
        }

        Ok(PipelineOutput {
            panel: staged.panel,
            report,
            summaries: staged.summaries,
        })
    }

    fn stage(&self, raw: &BTreeMap<String, Vec<RawRecord>>) -> Result<Staged, PanelError> {
        let mut originals: BTreeMap<String, CanonicalSeries> = BTreeMap::new();
        let mut resampled: BTreeMap<String, ResampledSeries> = BTreeMap::new();

        for entry in &self.datasets {
            let cfg = &entry.cfg;
            let records = raw
                .get(&cfg.name)
                .ok_or_else(|| PanelError::missing_config(cfg.name.clone(), "raw records"))?;
            let series = normalize_named(&cfg.name, records, &cfg.spec);
            if series.is_empty() {
                return Err(PanelError::empty_dataset(cfg.name.clone()));
            }
            let agg = Self::aggregation(cfg)?;
            resampled.insert(
                cfg.name.clone(),
                resample(&series, self.cfg.target, agg, self.fill_bound(cfg)),
            );
            originals.insert(cfg.name.clone(), series);
        }

        let mut panel = merge(&resampled, self.cfg.start, self.cfg.end)?;
        if self.cfg.derive_features {
            panel = add_derived(&panel, self.cfg.effective_periods_per_year())?;
        }
        let summaries = originals
            .values()
            .map(|series| {
                let mut summary = series.summary();
                if let Some(col) = panel.column(&series.name) {
                    summary.observed = col.observed_count();
                    summary.filled = col.filled_count();
                }
                summary
            })
            .collect();
        Ok(Staged {
            panel,
            originals,
            summaries,
        })
    }
}

/// Normalize, resample, merge, and validate a named set of raw datasets.
///
/// `specs` and `agg_funcs` must hold an entry for every dataset in
/// `named_raw`; there is no default aggregation.
///
/// # Errors
/// - `EmptyInput` if `named_raw` is empty.
/// - `MissingConfig` if a dataset has no spec or no aggregation function.
/// - `EmptyDataset` if a dataset keeps no observation after normalization.
/// - `InvalidArg` if `start` is after `end`.
/// - Any error from [`merge`].
pub fn run_pipeline(
    named_raw: &BTreeMap<String, Vec<RawRecord>>,
    specs: &BTreeMap<String, SourceSpec>,
    target: Frequency,
    agg_funcs: &BTreeMap<String, Aggregation>,
    max_fill_periods: u32,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<(Panel, IntegrityReport), PanelError> {
    let mut builder = MacroPanel::builder()
        .target(target)
        .max_fill_periods(max_fill_periods);
    if let Some(s) = start {
        builder = builder.start(s);
    }
    if let Some(e) = end {
        builder = builder.end(e);
    }
    for name in named_raw.keys() {
        let spec = specs
            .get(name)
            .ok_or_else(|| PanelError::missing_config(name.clone(), "a source spec"))?;
        let agg = agg_funcs
            .get(name)
            .ok_or_else(|| PanelError::missing_config(name.clone(), "an aggregation function"))?;
        builder = builder.dataset(DatasetConfig::new(name.clone(), spec.clone(), *agg));
    }
    let mp = builder.build()?;
    let staged = mp.stage(named_raw)?;
    let report = validate_with(&staged.panel, &staged.originals, &mp.validation);
    Ok((staged.panel, report))
}
