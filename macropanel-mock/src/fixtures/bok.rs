use macropanel_core::RawRecord;

/// Bank of Korea statistic codes with fixture data.
pub const CODES: &[&str] = &["722Y001", "200Y002", "MALFORMED"];

pub fn by_code(code: &str) -> Option<Vec<RawRecord>> {
    match code {
        // Base rate, monthly, 2020-01 .. 2021-12.
        "722Y001" => Some(
            (0..24)
                .map(|i| {
                    let rate = match i {
                        0 | 1 => "1.25",
                        2..=4 => "0.75",
                        5..=19 => "0.50",
                        _ => "0.75",
                    };
                    row(
                        "722Y001",
                        "base rate",
                        &format!("{}{:02}", 2020 + i / 12, i % 12 + 1),
                        rate,
                        "%",
                    )
                })
                .collect(),
        ),
        // Real GDP, quarterly, 2020Q1 .. 2021Q4.
        "200Y002" => Some(
            [
                "464402.1", "451340.7", "460712.9", "466113.0", "473951.8", "477473.5",
                "478999.2", "484943.4",
            ]
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let label = format!("{}Q{}", 2020 + i / 4, i % 4 + 1);
                row("200Y002", "real GDP", &label, v, "KRW bn")
            })
            .collect(),
        ),
        // One good row, one undecodable date, one dash placeholder.
        "MALFORMED" => Some(vec![
            row("MALFORMED", "broken", "202001", "100.0", "index"),
            row("MALFORMED", "broken", "ABCDEFGH", "101.0", "index"),
            row("MALFORMED", "broken", "202003", "-", "index"),
        ]),
        _ => None,
    }
}

fn row(code: &str, name: &str, time: &str, value: &str, unit: &str) -> RawRecord {
    RawRecord::new()
        .with("STAT_CODE", code)
        .with("STAT_NAME", name)
        .with("ITEM_CODE1", "0101000")
        .with("ITEM_NAME1", name)
        .with("UNIT_NAME", unit)
        .with("TIME", time)
        .with("DATA_VALUE", value)
}
