use std::collections::BTreeMap;

use macropanel::{
    Aggregation, DateEncoding, Frequency, RawRecord, SourceKind, SourceSpec, run_pipeline,
};

type JsonRow = serde_json::Map<String, serde_json::Value>;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Weekly oil prices fold into monthly means; the housing index passes through.
    // Records as a caller might load them from a JSON API response.
    let housing: Vec<RawRecord> = serde_json::from_str::<Vec<JsonRow>>(
        r#"[
            {"date": "2020.01", "total_index": 97.1},
            {"date": "2020.02", "total_index": 97.6},
            {"date": "2020.03", "total_index": "-"},
            {"date": "2020.04", "total_index": 98.4},
            {"date": "ABCDEFGH", "total_index": 99.0}
        ]"#,
    )?
    .into_iter()
    .map(RawRecord::from)
    .collect();
    let oil: Vec<RawRecord> = serde_json::from_str::<Vec<JsonRow>>(
        r#"[
            {"period": "20200106", "value": 63.3},
            {"period": "20200113", "value": 59.0},
            {"period": "20200120", "value": 58.4},
            {"period": "20200127", "value": 54.2},
            {"period": "20200203", "value": 50.1},
            {"period": "20200210", "value": 50.3},
            {"period": "20200217", "value": "NA"},
            {"period": "20200224", "value": 47.1}
        ]"#,
    )?
    .into_iter()
    .map(RawRecord::from)
    .collect();

    let named_raw = BTreeMap::from([("housing".to_string(), housing), ("oil".to_string(), oil)]);
    let specs = BTreeMap::from([
        (
            "housing".to_string(),
            SourceSpec::preset(SourceKind::KbLand)
                .with_encoding(DateEncoding::DottedYearMonth)
                .with_value_field("total_index"),
        ),
        ("oil".to_string(), SourceSpec::preset(SourceKind::Eia)),
    ]);
    let aggs = BTreeMap::from([
        ("housing".to_string(), Aggregation::Last),
        ("oil".to_string(), Aggregation::Mean),
    ]);

    let (panel, report) = run_pipeline(&named_raw, &specs, Frequency::Monthly, &aggs, 1, None, None)?;

    for (i, date) in panel.index().iter().enumerate() {
        let cells: Vec<String> = panel
            .columns()
            .iter()
            .map(|c| {
                c.values[i].map_or_else(|| "null".to_string(), |v| format!("{v:.2}"))
            })
            .collect();
        println!("{date} {}", cells.join(" "));
    }
    print!("{report}");
    Ok(())
}
