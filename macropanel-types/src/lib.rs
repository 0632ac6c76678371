//! Shared value types for the macropanel workspace: errors, frequencies,
//! source descriptions, configuration, and report envelopes.
#![warn(missing_docs)]

mod config;
mod error;
mod frequency;
mod reports;
mod source;

pub use config::{DEFAULT_MAX_FILL_PERIODS, DatasetConfig, PipelineConfig};
pub use error::{PanelError, ParseError};
pub use frequency::{Aggregation, Frequency};
pub use reports::{DatasetSummary, IntegrityReport, Issue, IssueKind, Severity};
pub use source::{ColumnMapping, DateEncoding, SourceKind, SourceSpec};
