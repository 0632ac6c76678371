#![allow(dead_code)]

use std::collections::BTreeMap;

use chrono::NaiveDate;
use macropanel_core::{
    Aggregation, CanonicalSeries, Frequency, Observation, Panel, merge, resample,
};

pub fn d(y: i32, m: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, 1).unwrap()
}

pub fn canonical(
    name: &str,
    native: Frequency,
    obs: &[(NaiveDate, Option<f64>)],
) -> CanonicalSeries {
    CanonicalSeries::from_observations(
        name,
        Some(native),
        obs.iter().map(|&(dt, v)| Observation::new(dt, v)),
    )
}

/// Consecutive monthly values starting in January of `year`.
pub fn monthly_values(name: &str, year: i32, values: &[f64]) -> CanonicalSeries {
    let obs: Vec<_> = values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let ord = i64::from(year) * 12 + i as i64;
            (Frequency::Monthly.from_ordinal(ord).unwrap(), Some(*v))
        })
        .collect();
    canonical(name, Frequency::Monthly, &obs)
}

/// Resample to monthly, merge, and return the panel with the originals keyed
/// by name.
pub fn panel_of(
    series: &[(&CanonicalSeries, Aggregation)],
    max_fill: u32,
) -> (Panel, BTreeMap<String, CanonicalSeries>) {
    let named = series
        .iter()
        .map(|(s, agg)| {
            (
                s.name.clone(),
                resample(s, Frequency::Monthly, *agg, max_fill),
            )
        })
        .collect();
    let originals = series
        .iter()
        .map(|(s, _)| (s.name.clone(), (*s).clone()))
        .collect();
    (merge(&named, None, None).unwrap(), originals)
}
