//! Deterministic record sources for tests and examples.
//!
//! [`MockSource`] serves static fixtures shaped like the real sources' payloads.
//! [`DynamicMockSource`] defers every fetch to a controller the test drives.

use async_trait::async_trait;
use macropanel_core::{
    DateEncoding, FetchRequest, PanelError, RawRecord, RecordSource, SourceKind, SourceSpec,
    parse_date,
};

mod dynamic;
mod fixtures;

pub use dynamic::{DynamicMockController, DynamicMockSource, MockBehavior};

/// Mock source for CI-safe examples. Provides deterministic data from static fixtures.
///
/// Two dataset ids are special for every kind:
/// - `"FAIL"` fails with a source error.
/// - `"TIMEOUT"` sleeps before answering, so short source timeouts expire.
pub struct MockSource {
    kind: SourceKind,
}

impl MockSource {
    /// Mock of the given source family.
    #[must_use]
    pub const fn new(kind: SourceKind) -> Self {
        Self { kind }
    }

    /// Bank of Korea statistics: `722Y001` (base rate, monthly), `200Y002`
    /// (real GDP, quarterly), `MALFORMED`.
    #[must_use]
    pub const fn bok() -> Self {
        Self::new(SourceKind::Bok)
    }

    /// KOSIS tables: `DT_1J20003` (CPI, monthly).
    #[must_use]
    pub const fn kosis() -> Self {
        Self::new(SourceKind::Kosis)
    }

    /// FRED series: `UNRATE` (monthly), `GDPC1` (quarterly), `DFF` (daily).
    #[must_use]
    pub const fn fred() -> Self {
        Self::new(SourceKind::Fred)
    }

    /// Dataset ids this mock has fixtures for.
    #[must_use]
    pub const fn datasets(&self) -> &'static [&'static str] {
        match self.kind {
            SourceKind::Bok => fixtures::bok::CODES,
            SourceKind::Kosis => fixtures::kosis::TABLES,
            SourceKind::Fred => fixtures::fred::SERIES,
            _ => &[],
        }
    }

    fn not_found(&self, dataset: &str) -> PanelError {
        PanelError::source_failed(self.name(), format!("unknown dataset {dataset}"))
    }

    async fn maybe_fail_or_timeout(&self, dataset: &str) -> Result<(), PanelError> {
        match dataset {
            "FAIL" => Err(PanelError::source_failed(self.name(), "forced failure")),
            "TIMEOUT" => {
                // Long enough to trip a short source timeout, short enough for CI.
                tokio::time::sleep(std::time::Duration::from_millis(200)).await;
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn fixture(&self, dataset: &str) -> Option<Vec<RawRecord>> {
        match self.kind {
            SourceKind::Bok => fixtures::bok::by_code(dataset),
            SourceKind::Kosis => fixtures::kosis::by_table(dataset),
            SourceKind::Fred => fixtures::fred::by_series(dataset),
            _ => None,
        }
    }

    /// Drop rows whose decodable date falls outside the request window.
    /// Undecodable rows are kept so the normalizer can account for them.
    fn clip(&self, records: Vec<RawRecord>, req: &FetchRequest) -> Vec<RawRecord> {
        if req.start.is_none() && req.end.is_none() {
            return records;
        }
        let date_field = SourceSpec::preset(self.kind).date_field;
        records
            .into_iter()
            .filter(|r| {
                let date = r
                    .get(&date_field)
                    .and_then(macropanel_core::RawValue::to_text)
                    .and_then(|t| parse_date(&t, DateEncoding::Auto).ok());
                date.is_none_or(|d| {
                    req.start.is_none_or(|s| d >= s) && req.end.is_none_or(|e| d <= e)
                })
            })
            .collect()
    }
}

#[async_trait]
impl RecordSource for MockSource {
    fn name(&self) -> &'static str {
        "macropanel-mock"
    }

    fn kind(&self) -> SourceKind {
        self.kind
    }

    async fn fetch(&self, req: &FetchRequest) -> Result<Vec<RawRecord>, PanelError> {
        self.maybe_fail_or_timeout(&req.dataset).await?;
        let records = self
            .fixture(&req.dataset)
            .ok_or_else(|| self.not_found(&req.dataset))?;
        Ok(self.clip(records, req))
    }
}
