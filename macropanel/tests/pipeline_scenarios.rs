mod helpers;

use std::collections::BTreeMap;

use helpers::{bok, d, fixture, fred, fred_rows, raw, three_source_builder};
use macropanel::{
    Aggregation, Frequency, IssueKind, MacroPanel, Panel, PanelError, SourceKind, SourceSpec,
    normalize_named, validate,
};
use macropanel_mock::MockSource;

#[tokio::test]
async fn basic_merge_of_three_sources() {
    let mp = three_source_builder(3).build().unwrap();
    let out = mp.fetch_and_run().await.unwrap();
    let panel = &out.panel;

    assert_eq!(panel.frequency(), Frequency::Monthly);
    assert_eq!(panel.len(), 24);
    assert_eq!(panel.index().first(), Some(&d(2020, 1)));
    assert_eq!(panel.index().last(), Some(&d(2021, 12)));
    assert_eq!(panel.dataset_names().collect::<Vec<_>>(), ["base_rate", "cpi", "gdp"]);

    assert_eq!(panel.value("base_rate", d(2020, 1)), Some(1.25));
    assert_eq!(panel.value("base_rate", d(2020, 3)), Some(0.75));
    // Quarterly GDP occupies its three months, then the index runs on without it.
    assert_eq!(panel.value("gdp", d(2020, 2)), Some(20665.553));
    assert_eq!(panel.value("gdp", d(2020, 12)), Some(20724.128));
    assert_eq!(panel.value("gdp", d(2021, 1)), None);
    assert!(panel.is_present("gdp", d(2020, 4)));
    assert!(!panel.is_present("gdp", d(2020, 5)));

    let report = out.report.expect("integrity check runs by default");
    assert!(report.passed, "{report}");
    assert_eq!(out.summaries.len(), 3);
    let gdp = &out.summaries[2];
    assert_eq!(gdp.name, "gdp");
    assert_eq!((gdp.observed, gdp.filled), (4, 8));
}

#[tokio::test]
async fn forward_fill_bound_leaves_third_month_null() {
    let mp = three_source_builder(2).build().unwrap();
    let out = mp.fetch_and_run().await.unwrap();
    let gdp = out.panel.column("gdp").unwrap();

    assert_eq!(gdp.fill_limit, Some(2));
    for q in 0..4u32 {
        let first = out.panel.position(d(2020, 3 * q + 1)).unwrap();
        assert!(gdp.values[first].is_some());
        assert!(gdp.values[first + 1].is_some());
        assert_eq!(gdp.values[first + 2], None, "quarter {q}");
    }

    let report = out.report.unwrap();
    assert!(report.passed, "{report}");
    assert_eq!(report.of_kind(IssueKind::SourceGap).count(), 3);
    assert_eq!(report.of_kind(IssueKind::FillBoundExceeded).count(), 0);
}

#[tokio::test]
async fn malformed_rows_are_dropped_and_counted() {
    let records = fixture(&MockSource::bok(), "MALFORMED").await;
    let spec = SourceSpec::preset(SourceKind::Bok).with_native_frequency(Frequency::Monthly);
    let mp = MacroPanel::builder()
        .dataset(macropanel::DatasetConfig::new("broken", spec, Aggregation::Last))
        .build()
        .unwrap();
    let out = mp.run(&raw(vec![("broken", records)])).unwrap();

    let summary = &out.summaries[0];
    assert_eq!(summary.rows_in, 3);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.missing, 1);
    assert_eq!(summary.kept, 2);
    assert_eq!((summary.observed, summary.filled), (1, 0));

    let col = out.panel.column("broken").unwrap();
    assert_eq!(col.values, vec![Some(100.0), None, None]);
    assert!(out.report.unwrap().passed);
}

#[tokio::test]
async fn derived_features_follow_the_panel() {
    let mp = three_source_builder(3).derive_features(true).build().unwrap();
    let out = mp.fetch_and_run().await.unwrap();
    let derived = out.panel.derived().expect("derived columns");

    assert_eq!(derived.periods_per_year, 12);
    let base = &derived.changes[0];
    assert_eq!(base.dataset, "base_rate");
    assert!((base.pct_change[2].unwrap() + 40.0).abs() < 1e-9);
    assert!((base.pct_change_yoy[12].unwrap() + 60.0).abs() < 1e-9);
    assert_eq!(derived.calendar.quarter[11], 4);

    let table = out.panel.to_table();
    assert!(table.columns.iter().any(|c| c == "value_cpi_pct_change_yoy"));
    assert_eq!(table.rows.len(), 24);
}

#[tokio::test]
async fn bounds_pad_and_clip_the_index() {
    let mp = three_source_builder(3)
        .start(chrono::NaiveDate::from_ymd_opt(2020, 2, 17).unwrap())
        .end(d(2022, 2))
        .build()
        .unwrap();
    let out = mp.fetch_and_run().await.unwrap();
    assert_eq!(out.panel.index().first(), Some(&d(2020, 2)));
    assert_eq!(out.panel.index().last(), Some(&d(2022, 2)));
    assert_eq!(out.panel.value("cpi", d(2022, 1)), None);
    // The clipped quarter keeps its carried value and still validates.
    assert_eq!(out.panel.value("gdp", d(2020, 2)), Some(20665.553));
    let report = out.report.unwrap();
    assert!(report.passed, "{report}");
}

#[test]
fn integrity_check_can_be_disabled() {
    let rows = fred_rows(&[("2020-01-01", "1"), ("2020-02-01", "2")]);
    let mp = MacroPanel::builder()
        .dataset(fred("x", Aggregation::Last))
        .run_integrity_check(false)
        .build()
        .unwrap();
    let out = mp.run(&raw(vec![("x", rows)])).unwrap();
    assert!(out.report.is_none());
    assert_eq!(out.panel.len(), 2);
}

#[test]
fn missing_raw_records_and_empty_datasets_abort() {
    let mp = MacroPanel::builder()
        .dataset(fred("a", Aggregation::Last))
        .dataset(fred("b", Aggregation::Last))
        .build()
        .unwrap();

    let err = mp
        .run(&raw(vec![("a", fred_rows(&[("2020-01-01", "1")]))]))
        .unwrap_err();
    assert!(matches!(err, PanelError::MissingConfig { ref dataset, .. } if dataset == "b"));

    let err = mp
        .run(&raw(vec![
            ("a", fred_rows(&[("2020-01-01", "1")])),
            ("b", fred_rows(&[("yesterday", "1"), ("2020-13-01", "2")])),
        ]))
        .unwrap_err();
    assert_eq!(err, PanelError::empty_dataset("b"));
}

#[test]
fn one_period_shift_is_caught() {
    let rows = fred_rows(&[
        ("2020-01-01", "10"),
        ("2020-02-01", "11"),
        ("2020-03-01", "12"),
        ("2020-04-01", "13"),
        ("2020-05-01", "14"),
    ]);
    let mp = MacroPanel::builder()
        .dataset(fred("x", Aggregation::Last))
        .build()
        .unwrap();
    let out = mp.run(&raw(vec![("x", rows.clone())])).unwrap();
    assert!(out.report.unwrap().passed);

    let mut cols = out.panel.columns().to_vec();
    cols[0].values.rotate_right(1);
    cols[0].values[0] = None;
    cols[0].present[0] = false;
    let shifted = Panel::from_parts(out.panel.frequency(), out.panel.index().to_vec(), cols);

    let original = normalize_named("x", &rows, &SourceSpec::preset(SourceKind::Fred));
    let originals = BTreeMap::from([("x".to_string(), original)]);
    let report = validate(&shifted, &originals);
    assert!(!report.passed);
    assert!(report.of_kind(IssueKind::AnchorMismatch).count() >= 2);
    let shift = report.of_kind(IssueKind::DateShift).next().unwrap();
    assert_eq!(shift.date, Some(d(2020, 1)));
    assert_eq!(shift.shift, Some(1));
}

#[test]
fn run_pipeline_always_validates() {
    let named = raw(vec![
        ("rate", fred_rows(&[("2020-01-01", "1.5"), ("2020-02-01", "1.6")])),
        ("gdp", fred_rows(&[("2020-01-01", "100"), ("2020-04-01", "101")])),
    ]);
    let specs = BTreeMap::from([
        ("rate".to_string(), SourceSpec::preset(SourceKind::Fred)),
        (
            "gdp".to_string(),
            SourceSpec::preset(SourceKind::Fred).with_native_frequency(Frequency::Quarterly),
        ),
    ]);
    let aggs = BTreeMap::from([
        ("rate".to_string(), Aggregation::Mean),
        ("gdp".to_string(), Aggregation::Sum),
    ]);

    let (panel, report) =
        macropanel::run_pipeline(&named, &specs, Frequency::Monthly, &aggs, 3, None, None).unwrap();
    assert_eq!(panel.len(), 6);
    assert_eq!(panel.value("gdp", d(2020, 6)), Some(101.0));
    assert!(report.passed, "{report}");
}

#[test]
fn run_pipeline_requires_complete_configuration() {
    let named = raw(vec![("rate", fred_rows(&[("2020-01-01", "1.5")]))]);
    let specs = BTreeMap::from([("rate".to_string(), SourceSpec::preset(SourceKind::Fred))]);

    let err = macropanel::run_pipeline(
        &named,
        &specs,
        Frequency::Monthly,
        &BTreeMap::new(),
        3,
        None,
        None,
    )
    .unwrap_err();
    assert_eq!(
        err,
        PanelError::missing_config("rate", "an aggregation function")
    );

    let aggs = BTreeMap::from([("rate".to_string(), Aggregation::Last)]);
    let err = macropanel::run_pipeline(
        &named,
        &BTreeMap::new(),
        Frequency::Monthly,
        &aggs,
        3,
        None,
        None,
    )
    .unwrap_err();
    assert!(matches!(err, PanelError::MissingConfig { .. }));

    let err = macropanel::run_pipeline(
        &named,
        &specs,
        Frequency::Monthly,
        &aggs,
        3,
        Some(d(2021, 1)),
        Some(d(2020, 1)),
    )
    .unwrap_err();
    assert!(matches!(err, PanelError::InvalidArg(_)));

    let err = macropanel::run_pipeline(
        &BTreeMap::new(),
        &specs,
        Frequency::Monthly,
        &aggs,
        3,
        None,
        None,
    )
    .unwrap_err();
    assert!(matches!(err, PanelError::EmptyInput(_)));
}

#[test]
fn bok_helper_registers_with_preset() {
    let cfg = bok("x", Aggregation::Max);
    assert_eq!(cfg.spec.date_field, "TIME");
    assert_eq!(cfg.aggregation, Some(Aggregation::Max));
}
