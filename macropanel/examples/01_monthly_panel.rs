use std::sync::Arc;
use std::time::Duration;

use macropanel::{Aggregation, DatasetConfig, Frequency, MacroPanel, SourceKind, SourceSpec};
use macropanel_mock::MockSource;
use tracing_subscriber::fmt::format::FmtSpan;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Suggested: RUST_LOG=info,macropanel=debug,macropanel_core=debug
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .with_span_events(FmtSpan::CLOSE)
        .try_init();

    let bok = Arc::new(MockSource::bok());
    let kosis = Arc::new(MockSource::kosis());

    // 1. Register datasets. Rates are sampled at period end, GDP is a flow.
    let mp = MacroPanel::builder()
        .dataset_from(
            DatasetConfig::new("base_rate", SourceSpec::preset(SourceKind::Bok), Aggregation::Last),
            bok.clone(),
            "722Y001",
        )
        .dataset_from(
            DatasetConfig::new("cpi", SourceSpec::preset(SourceKind::Kosis), Aggregation::Mean),
            kosis,
            "DT_1J20003",
        )
        .dataset_from(
            DatasetConfig::new("gdp", SourceSpec::preset(SourceKind::Bok), Aggregation::Sum)
                .with_max_fill_periods(3),
            bok,
            "200Y002",
        )
        .target(Frequency::Monthly)
        .derive_features(true)
        .source_timeout(Duration::from_secs(5))
        .build()?;

    // 2. Fetch everything concurrently and run the pipeline.
    let out = mp.fetch_and_run().await?;

    // 3. Inspect the result.
    for s in &out.summaries {
        println!(
            "{:<10} kept {:>3} of {:>3} rows ({} skipped, {} duplicates), {} observed and {} filled in the panel",
            s.name, s.kept, s.rows_in, s.skipped, s.duplicates, s.observed, s.filled
        );
    }
    if let Some(report) = &out.report {
        print!("{report}");
    }

    let table = out.panel.to_table();
    println!("{}", table.columns.join(","));
    for row in table.rows.iter().take(6) {
        let cells: Vec<String> = row
            .iter()
            .map(|c| serde_json::Value::from(c).to_string())
            .collect();
        println!("{}", cells.join(","));
    }

    Ok(())
}
