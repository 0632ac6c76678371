#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use macropanel::{
    Aggregation, DatasetConfig, MacroPanelBuilder, RawRecord, RecordSource, SourceKind, SourceSpec,
};
use macropanel_mock::MockSource;

pub fn d(y: i32, m: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, 1).unwrap()
}

pub fn bok(name: &str, agg: Aggregation) -> DatasetConfig {
    DatasetConfig::new(name, SourceSpec::preset(SourceKind::Bok), agg)
}

pub fn kosis(name: &str, agg: Aggregation) -> DatasetConfig {
    DatasetConfig::new(name, SourceSpec::preset(SourceKind::Kosis), agg)
}

pub fn fred(name: &str, agg: Aggregation) -> DatasetConfig {
    DatasetConfig::new(name, SourceSpec::preset(SourceKind::Fred), agg)
}

/// Builder with base rate and CPI (monthly) plus real GDP (quarterly), all
/// backed by the fixture mocks.
pub fn three_source_builder(gdp_fill: u32) -> MacroPanelBuilder {
    let bok_src: Arc<dyn RecordSource> = Arc::new(MockSource::bok());
    let kosis_src: Arc<dyn RecordSource> = Arc::new(MockSource::kosis());
    let fred_src: Arc<dyn RecordSource> = Arc::new(MockSource::fred());
    macropanel::MacroPanel::builder()
        .dataset_from(bok("base_rate", Aggregation::Last), bok_src, "722Y001")
        .dataset_from(kosis("cpi", Aggregation::Mean), kosis_src, "DT_1J20003")
        .dataset_from(
            fred("gdp", Aggregation::Last).with_max_fill_periods(gdp_fill),
            fred_src,
            "GDPC1",
        )
}

/// Fixture records of one mock dataset.
pub async fn fixture(src: &MockSource, dataset: &str) -> Vec<RawRecord> {
    src.fetch(&macropanel::FetchRequest::new(dataset))
        .await
        .expect("fixture exists")
}

pub fn raw(entries: Vec<(&str, Vec<RawRecord>)>) -> BTreeMap<String, Vec<RawRecord>> {
    entries
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

pub fn fred_rows(rows: &[(&str, &str)]) -> Vec<RawRecord> {
    rows.iter()
        .map(|(date, value)| RawRecord::new().with("date", *date).with("value", *value))
        .collect()
}
