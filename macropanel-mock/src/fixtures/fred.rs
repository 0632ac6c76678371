use chrono::{Datelike, Days, NaiveDate};
use macropanel_core::RawRecord;

pub const SERIES: &[&str] = &["UNRATE", "GDPC1", "DFF"];

pub fn by_series(id: &str) -> Option<Vec<RawRecord>> {
    match id {
        // Unemployment rate, monthly, with one `.` placeholder.
        "UNRATE" => Some(
            [
                "3.5", "3.5", "4.4", "14.8", "13.2", "11.0", ".", "8.4", "7.9", "6.9", "6.7",
                "6.7",
            ]
            .iter()
            .enumerate()
            .map(|(i, v)| obs(&format!("2020-{:02}-01", i + 1), v))
            .collect(),
        ),
        // Real GDP, quarterly.
        "GDPC1" => Some(vec![
            obs("2020-01-01", "20665.553"),
            obs("2020-04-01", "19034.830"),
            obs("2020-07-01", "20511.785"),
            obs("2020-10-01", "20724.128"),
        ]),
        // Effective federal funds rate, daily business days for two months.
        "DFF" => Some(
            (0..60u64)
                .filter_map(|i| NaiveDate::from_ymd_opt(2020, 1, 1)?.checked_add_days(Days::new(i)))
                .filter(|day| day.weekday().number_from_monday() <= 5)
                .map(|day| {
                    let rate = if day.month() == 1 { "1.55" } else { "1.58" };
                    obs(&day.format("%Y-%m-%d").to_string(), rate)
                })
                .collect(),
        ),
        _ => None,
    }
}

fn obs(date: &str, value: &str) -> RawRecord {
    RawRecord::new()
        .with("realtime_start", "2024-01-01")
        .with("realtime_end", "2024-01-01")
        .with("date", date)
        .with("value", value)
}
