//! macropanel-core
//!
//! Pure building blocks of the macropanel pipeline. Every stage is a plain
//! function from values to values; nothing here performs I/O.
//!
//! - `normalize`: raw source records to a canonical, date-sorted series.
//! - `timeseries`: cadence inference, resampling with bounded forward fill,
//!   and panel alignment.
//! - `panel`: the merged panel and its flat table view.
//! - `derive`: percentage changes and calendar attributes.
//! - `validate`: integrity checks of a panel against its original series.
//! - `connector`: the `RecordSource` trait implemented by data sources.
//!
#![warn(missing_docs)]

/// Record source trait and fetch requests.
pub mod connector;
pub mod derive;
pub mod normalize;
pub mod panel;
pub mod record;
pub mod series;
/// Time-series utilities for inference, resampling, and merging.
pub mod timeseries;
pub mod types;
pub mod validate;

pub use connector::{FetchRequest, RecordSource};
pub use derive::add_derived;
pub use normalize::{detect_encoding, format_date, normalize, normalize_named, parse_date};
pub use panel::{
    CalendarColumns, Cell, ChangeColumns, DerivedFeatures, Panel, PanelColumn, PanelTable,
    source_column_name, value_column_name,
};
pub use record::{RawRecord, RawValue};
pub use series::{CanonicalSeries, NormalizeStats, Observation, Origin, ResampledPoint, ResampledSeries};
pub use timeseries::infer::{classify_step, estimate_step_days, infer_frequency};
pub use timeseries::merge::merge;
pub use timeseries::resample::resample;
pub use types::*;
pub use validate::{DEFAULT_MAX_ANCHORS, ValidationOptions, validate, validate_with};
