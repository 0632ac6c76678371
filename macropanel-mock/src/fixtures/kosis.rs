use macropanel_core::RawRecord;

pub const TABLES: &[&str] = &["DT_1J20003"];

pub fn by_table(table: &str) -> Option<Vec<RawRecord>> {
    match table {
        // Consumer price index (2020=100), monthly, 2020-01 .. 2021-12.
        "DT_1J20003" => Some(
            (0..24u32)
                .map(|i| {
                    let cpi = 99.5 + f64::from(i) * 0.2;
                    RawRecord::new()
                        .with("C1_NM", "All regions")
                        .with("C2_NM", "All items")
                        .with("UNIT_NM", "2020=100")
                        .with("PRD_DE", format!("{}{:02}", 2020 + i / 12, i % 12 + 1))
                        .with("DT", format!("{cpi:.2}"))
                })
                .collect(),
        ),
        _ => None,
    }
}
