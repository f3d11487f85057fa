use chrono::NaiveDate;
use index_forecast::{CsvStore, ForecastConfig, Observation, Orchestrator};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Index Forecast: CSV Store Example");
    println!("=================================\n");

    let path = std::env::temp_dir().join("envcast_indices.csv");
    let store = CsvStore::new(&path);

    // Generate a dataset, then forecast from it
    let rows: Vec<Observation> = (0..30)
        .map(|i| {
            let date = NaiveDate::from_ymd_opt(2022 + i / 12, (i % 12) as u32 + 1, 1)
                .unwrap();
            let t = i as f64;
            Observation::new(
                date,
                0.4 + 0.005 * t,
                0.1 - 0.002 * t,
                -0.05 + 0.001 * t,
                24.0 + 6.0 * ((t / 12.0) * std::f64::consts::TAU).cos(),
            )
        })
        .collect();
    store.write_rows(&rows)?;
    println!("Wrote {} rows to {}\n", rows.len(), store.path().display());

    let orchestrator = Orchestrator::new(ForecastConfig::default());
    let summary = orchestrator.run(&store)?;

    for (index, outcome) in summary.iter() {
        match outcome.report() {
            Some(report) => println!(
                "{}: {} (rmse {:.4}), first forecast {:.4}",
                index,
                report.model_used,
                report.accuracy_score,
                report.future.first().map(|p| p.value).unwrap_or_default()
            ),
            None => println!("{}: error: {}", index, outcome.error().unwrap_or_default()),
        }
    }

    std::fs::remove_file(&path)?;
    Ok(())
}
