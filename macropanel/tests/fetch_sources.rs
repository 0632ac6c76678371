mod helpers;

use std::sync::Arc;
use std::time::Duration;

use helpers::{bok, d, fred, fred_rows};
use macropanel::{Aggregation, MacroPanel, PanelError, RecordSource, SourceKind};
use macropanel_mock::{DynamicMockSource, MockBehavior, MockSource};

fn mock_bok() -> Arc<dyn RecordSource> {
    Arc::new(MockSource::bok())
}

#[tokio::test]
async fn single_failure_is_returned_as_is() {
    let mp = MacroPanel::builder()
        .dataset_from(bok("rate", Aggregation::Last), mock_bok(), "722Y001")
        .dataset_from(bok("broken", Aggregation::Last), mock_bok(), "FAIL")
        .build()
        .unwrap();
    let err = mp.fetch_and_run().await.unwrap_err();
    match err {
        PanelError::Source { source_name, msg } => {
            assert_eq!(source_name, "macropanel-mock");
            assert!(msg.contains("forced failure"));
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[tokio::test]
async fn several_failures_are_collected() {
    let mp = MacroPanel::builder()
        .dataset_from(bok("a", Aggregation::Last), mock_bok(), "FAIL")
        .dataset_from(bok("b", Aggregation::Last), mock_bok(), "NO_SUCH_CODE")
        .dataset_from(bok("c", Aggregation::Last), mock_bok(), "722Y001")
        .build()
        .unwrap();
    match mp.fetch_all().await.unwrap_err() {
        PanelError::SourcesFailed(errs) => {
            assert_eq!(errs.len(), 2);
            assert!(errs.iter().all(PanelError::is_fetch_error));
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[tokio::test]
async fn slow_source_hits_its_timeout() {
    let mp = MacroPanel::builder()
        .dataset_from(bok("slow", Aggregation::Last), mock_bok(), "TIMEOUT")
        .source_timeout(Duration::from_millis(20))
        .build()
        .unwrap();
    let err = mp.fetch_and_run().await.unwrap_err();
    assert_eq!(err, PanelError::source_timeout("macropanel-mock"));
}

#[tokio::test]
async fn request_deadline_bounds_the_whole_fan_out() {
    let (src, ctl) = DynamicMockSource::new_with_controller("dyn", SourceKind::Fred);
    ctl.set_behavior("HANG", MockBehavior::Hang).await;
    ctl.set_behavior("OK", MockBehavior::Return(fred_rows(&[("2020-01-01", "1")])))
        .await;

    let mp = MacroPanel::builder()
        .dataset_from(fred("ok", Aggregation::Last), Arc::clone(&src), "OK")
        .dataset_from(fred("stuck", Aggregation::Last), src, "HANG")
        .source_timeout(Duration::from_secs(10))
        .request_timeout(Duration::from_millis(30))
        .build()
        .unwrap();
    let err = mp.fetch_and_run().await.unwrap_err();
    assert_eq!(err, PanelError::RequestTimeout);
}

#[tokio::test]
async fn requests_carry_source_ids_and_bounds() {
    let (src, ctl) = DynamicMockSource::new_with_controller("dyn", SourceKind::Fred);
    ctl.set_behavior(
        "UNRATE",
        MockBehavior::Return(fred_rows(&[("2020-01-01", "3.5"), ("2020-02-01", "3.6")])),
    )
    .await;

    let mp = MacroPanel::builder()
        .dataset_from(fred("unemployment", Aggregation::Mean), src, "UNRATE")
        .start(d(2020, 1))
        .end(d(2020, 6))
        .build()
        .unwrap();
    let out = mp.fetch_and_run().await.unwrap();
    assert_eq!(out.panel.len(), 6);
    assert_eq!(out.panel.value("unemployment", d(2020, 2)), Some(3.6));

    let log = ctl.requests().await;
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].dataset, "UNRATE");
    assert_eq!(log[0].start, Some(d(2020, 1)));
    assert_eq!(log[0].end, Some(d(2020, 6)));
}

#[tokio::test]
async fn non_fetch_errors_are_retagged_with_the_source() {
    let (src, ctl) = DynamicMockSource::new_with_controller("dyn", SourceKind::Fred);
    ctl.set_behavior("X", MockBehavior::Fail(PanelError::Data("bad page".into())))
        .await;
    let mp = MacroPanel::builder()
        .dataset_from(fred("x", Aggregation::Last), src, "X")
        .build()
        .unwrap();
    match mp.fetch_all().await.unwrap_err() {
        PanelError::Source { source_name, msg } => {
            assert_eq!(source_name, "dyn");
            assert!(msg.contains("bad page"));
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[tokio::test]
async fn datasets_without_a_source() {
    let mp = MacroPanel::builder()
        .dataset_from(bok("rate", Aggregation::Last), mock_bok(), "722Y001")
        .dataset(fred("local", Aggregation::Last))
        .build()
        .unwrap();

    let fetched = mp.fetch_all().await.unwrap();
    assert_eq!(fetched.keys().collect::<Vec<_>>(), ["rate"]);

    let err = mp.fetch_and_run().await.unwrap_err();
    assert_eq!(err, PanelError::missing_config("local", "a record source"));
}
