use async_trait::async_trait;
use macropanel_core::{
    FetchRequest, PanelError, RawRecord, RecordSource, SourceKind, SourceSpec, normalize_named,
};

struct Inline;

#[async_trait]
impl RecordSource for Inline {
    fn name(&self) -> &'static str {
        "inline"
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Fred
    }

    async fn fetch(&self, req: &FetchRequest) -> Result<Vec<RawRecord>, PanelError> {
        if req.dataset == "missing" {
            return Err(PanelError::source_failed(self.name(), "unknown series"));
        }
        Ok(vec![
            RawRecord::new().with("date", "2020-01-01").with("value", "1.0"),
            RawRecord::new().with("date", "2020-02-01").with("value", "."),
        ])
    }
}

#[tokio::test]
async fn fetched_records_normalize_with_the_source_preset() {
    let src: Box<dyn RecordSource> = Box::new(Inline);
    let records = src.fetch(&FetchRequest::new("UNRATE")).await.unwrap();
    let series = normalize_named("unrate", &records, &SourceSpec::preset(src.kind()));
    assert_eq!(series.len(), 2);
    assert_eq!(series.stats.missing, 1);
}

#[tokio::test]
async fn fetch_errors_are_tagged_with_the_source() {
    let err = Inline.fetch(&FetchRequest::new("missing")).await.unwrap_err();
    assert!(matches!(err, PanelError::Source { ref source_name, .. } if source_name == "inline"));
    assert!(err.is_fetch_error());
}
