mod helpers;

use std::collections::BTreeMap;

use chrono::NaiveDate;
use helpers::{canonical, d, monthly_values, panel_of};
use macropanel_core::{Aggregation, Cell, Frequency, PanelError, add_derived, merge, resample};

#[test]
fn change_ratios_and_zero_denominator() {
    let s = monthly_values("cpi", 2020, &[100.0, 110.0, 0.0, 5.0]);
    let (panel, _) = panel_of(&[(&s, Aggregation::Last)], 3);
    let out = add_derived(&panel, 12).unwrap();
    let ch = &out.derived().unwrap().changes[0];
    assert_eq!(ch.dataset, "cpi");
    assert_eq!(ch.pct_change[0], None);
    assert!((ch.pct_change[1].unwrap() - 10.0).abs() < 1e-9);
    assert_eq!(ch.pct_change[2], Some(-100.0));
    assert_eq!(ch.pct_change[3], None);
    assert!(ch.pct_change_yoy.iter().all(Option::is_none));
}

#[test]
fn yoy_uses_periods_per_year_lag() {
    let values: Vec<f64> = (0..14).map(|i| 100.0 + f64::from(i)).collect();
    let s = monthly_values("ip", 2019, &values);
    let (panel, _) = panel_of(&[(&s, Aggregation::Last)], 3);
    let out = add_derived(&panel, 12).unwrap();
    let yoy = &out.derived().unwrap().changes[0].pct_change_yoy;
    assert_eq!(yoy[11], None);
    assert!((yoy[12].unwrap() - 12.0).abs() < 1e-9);
}

#[test]
fn null_inputs_give_null_ratios() {
    let s = canonical(
        "x",
        Frequency::Monthly,
        &[(d(2020, 1), Some(1.0)), (d(2020, 2), None), (d(2020, 3), Some(2.0))],
    );
    let (panel, _) = panel_of(&[(&s, Aggregation::Last)], 3);
    let out = add_derived(&panel, 12).unwrap();
    let ch = &out.derived().unwrap().changes[0].pct_change;
    assert_eq!(ch.as_slice(), &[None, None, None]);
}

#[test]
fn calendar_attributes_from_period_end() {
    let s = monthly_values("x", 2020, &[1.0, 2.0, 3.0, 4.0]);
    let (panel, _) = panel_of(&[(&s, Aggregation::Last)], 3);
    let out = add_derived(&panel, 12).unwrap();
    let cal = &out.derived().unwrap().calendar;
    assert_eq!(cal.year, vec![2020; 4]);
    assert_eq!(cal.month, vec![1, 2, 3, 4]);
    assert_eq!(cal.period, vec![1, 2, 3, 4]);
    assert_eq!(cal.quarter, vec![1, 1, 1, 2]);
    assert_eq!(cal.is_quarter_end, vec![false, false, true, false]);
    assert_eq!(cal.is_month_end, vec![true; 4]);
}

#[test]
fn existing_columns_are_untouched() {
    let s = monthly_values("x", 2020, &[1.0, 2.0]);
    let (panel, _) = panel_of(&[(&s, Aggregation::Last)], 3);
    let out = add_derived(&panel, 4).unwrap();
    assert_eq!(out.columns(), panel.columns());
    assert_eq!(out.index(), panel.index());
    assert!(panel.derived().is_none());

    let table = out.to_table();
    assert_eq!(table.columns.len(), 3 + 2 + 6);
    assert_eq!(table.columns[3], "value_x_pct_change");
    assert_eq!(table.rows[1][3], Cell::Float(Some(100.0)));
    assert_eq!(table.to_records()[0]["date"], serde_json::json!("2020-01-01"));
}

#[test]
fn zero_periods_per_year_is_invalid() {
    let s = monthly_values("x", 2020, &[1.0]);
    let (panel, _) = panel_of(&[(&s, Aggregation::Last)], 3);
    assert!(matches!(add_derived(&panel, 0), Err(PanelError::InvalidArg(_))));
}

#[test]
fn weekly_calendar_uses_iso_year_in_53_week_years() {
    let day = |y, m, dd| NaiveDate::from_ymd_opt(y, m, dd).unwrap();
    let s = canonical(
        "claims",
        Frequency::Daily,
        &[(day(2020, 12, 21), Some(1.0)), (day(2021, 1, 5), Some(2.0))],
    );
    let weekly = resample(&s, Frequency::Weekly, Aggregation::Last, 1);
    let panel = merge(&BTreeMap::from([("claims".to_string(), weekly)]), None, None).unwrap();
    assert_eq!(
        panel.index(),
        &[day(2020, 12, 21), day(2020, 12, 28), day(2021, 1, 4)]
    );

    let out = add_derived(&panel, 52).unwrap();
    let cal = &out.derived().unwrap().calendar;
    let pairs: Vec<(i32, u32)> = cal.year.iter().copied().zip(cal.period.iter().copied()).collect();
    assert_eq!(pairs, vec![(2020, 52), (2020, 53), (2021, 1)]);
}
