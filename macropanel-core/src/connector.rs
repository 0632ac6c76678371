use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::record::RawRecord;
use crate::{PanelError, SourceKind};

/// What to fetch from a source: one dataset, optionally bounded in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchRequest {
    /// Source-specific dataset identifier (stat code, table id, series id).
    pub dataset: String,
    /// Earliest date of interest.
    pub start: Option<NaiveDate>,
    /// Latest date of interest.
    pub end: Option<NaiveDate>,
}

impl FetchRequest {
    /// Unbounded request for a dataset.
    pub fn new(dataset: impl Into<String>) -> Self {
        Self {
            dataset: dataset.into(),
            start: None,
            end: None,
        }
    }

    /// Restrict the request to `[start, end]`.
    #[must_use]
    pub const fn between(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start = start;
        self.end = end;
        self
    }
}

/// Source of raw records for the pipeline.
///
/// Implementations own transport, authentication and pagination; the pipeline
/// only sees the records they return. Record layout is described separately
/// by a [`SourceSpec`](crate::SourceSpec).
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Stable identifier used in errors and logs.
    fn name(&self) -> &'static str;

    /// Source family, used to pick a default [`SourceSpec`](crate::SourceSpec).
    fn kind(&self) -> SourceKind;

    /// Fetch the raw records of one dataset.
    async fn fetch(&self, req: &FetchRequest) -> Result<Vec<RawRecord>, PanelError>;
}
