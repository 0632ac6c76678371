//! macropanel builds analysis-ready economic panels from heterogeneous
//! statistical sources.
//!
//! Overview
//! - Normalizes raw records from each source (date encodings, missing-value
//!   tokens, duplicates) into canonical date-sorted series.
//! - Resamples every series to one target frequency with a per-dataset
//!   aggregation and a bounded forward fill.
//! - Aligns the series on a shared contiguous period index, recording for each
//!   cell whether it was observed, filled, or missing.
//! - Optionally derives percentage changes and calendar attributes.
//! - Validates the panel against the normalized originals and reports issues
//!   instead of failing.
//!
//! Key behaviors and trade-offs
//! - Aggregation has no default: a dataset without one is rejected at build
//!   time, since `mean` and `last` give different answers for rates and
//!   levels.
//! - Forward fill stops after `max_fill_periods` target periods and at an
//!   explicitly missing value, so stale data never runs unbounded.
//! - Row-level parse failures drop the row and are counted; only structural
//!   problems (empty datasets, mismatched frequencies, missing config) abort.
//!
//! Examples
//! Running the pipeline over records the caller already holds:
//! ```rust
//! use std::collections::BTreeMap;
//! use macropanel::{
//!     Aggregation, DatasetConfig, Frequency, MacroPanel, RawRecord, SourceKind, SourceSpec,
//! };
//!
//! let mp = MacroPanel::builder()
//!     .dataset(DatasetConfig::new(
//!         "base_rate",
//!         SourceSpec::preset(SourceKind::Bok),
//!         Aggregation::Last,
//!     ))
//!     .target(Frequency::Monthly)
//!     .build()?;
//!
//! let mut raw = BTreeMap::new();
//! raw.insert(
//!     "base_rate".to_string(),
//!     vec![
//!         RawRecord::new().with("TIME", "202001").with("DATA_VALUE", "1.25"),
//!         RawRecord::new().with("TIME", "202002").with("DATA_VALUE", "1.25"),
//!         RawRecord::new().with("TIME", "202003").with("DATA_VALUE", "0.75"),
//!     ],
//! );
//! let out = mp.run(&raw)?;
//! assert_eq!(out.panel.len(), 3);
//! assert!(out.report.is_some_and(|r| r.passed));
//! # Ok::<(), macropanel::PanelError>(())
//! ```
//!
//! Fetching from registered sources is the async counterpart:
//! ```rust,ignore
//! let mp = MacroPanel::builder()
//!     .dataset_from(cfg, Arc::new(source), "722Y001")
//!     .source_timeout(Duration::from_secs(10))
//!     .build()?;
//! let out = mp.fetch_and_run().await?;
//! ```
//!
//! See `macropanel/examples/` for runnable end-to-end demonstrations.
#![warn(missing_docs)]

pub(crate) mod core;
mod fetch;
mod pipeline;

pub use core::{MacroPanel, MacroPanelBuilder, tag_err};
pub use fetch::util::{collapse_errors, join_with_deadline};
pub use pipeline::{PipelineOutput, run_pipeline};

// Re-export core types for convenience
pub use macropanel_core::{
    // Configuration & source descriptions
    Aggregation,
    // Panel types
    CalendarColumns,
    // Series types
    CanonicalSeries,
    Cell,
    ChangeColumns,
    ColumnMapping,
    DEFAULT_MAX_FILL_PERIODS,
    DatasetConfig,
    // Reports
    DatasetSummary,
    DateEncoding,
    DerivedFeatures,
    // Record sources
    FetchRequest,
    Frequency,
    IntegrityReport,
    Issue,
    IssueKind,
    NormalizeStats,
    Observation,
    Origin,
    Panel,
    PanelColumn,
    // Errors
    PanelError,
    PanelTable,
    ParseError,
    PipelineConfig,
    RawRecord,
    RawValue,
    RecordSource,
    ResampledPoint,
    ResampledSeries,
    Severity,
    SourceKind,
    SourceSpec,
    ValidationOptions,
};

// Stage functions, for callers composing their own pipeline
pub use macropanel_core::{
    add_derived, infer_frequency, merge, normalize, normalize_named, resample, validate,
    validate_with,
};
