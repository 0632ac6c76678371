//! Re-export of foundational types from `macropanel-types`.
// Consolidated re-exports so downstream crates can depend on `macropanel-core` only

pub use macropanel_types::{DEFAULT_MAX_FILL_PERIODS, DatasetConfig, PipelineConfig};
pub use macropanel_types::{
    Aggregation, ColumnMapping, DateEncoding, Frequency, SourceKind, SourceSpec,
};
pub use macropanel_types::{DatasetSummary, IntegrityReport, Issue, IssueKind, Severity};
pub use macropanel_types::{PanelError, ParseError};
