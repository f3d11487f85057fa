// This program walks one synthetic dataset through the forecasting pipeline
use envcast_workspace::index_forecast::{
    ForecastConfig, IndexName, MemorySource, ModelKind, Observation, Orchestrator,
};
use envcast_workspace::index_math::stats::quantile;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Exploring envcast\n");

    println!("=== Candidate models (tie-break order) ===");
    for kind in ModelKind::ALL {
        println!("- {}", kind);
    }

    let rows = synthetic_rows();
    let ndvi: Vec<f64> = rows.iter().filter_map(|r| r.ndvi).collect();
    println!("\n=== NDVI quartiles ===");
    println!("q1 = {:.4}, q3 = {:.4}", quantile(&ndvi, 0.25)?, quantile(&ndvi, 0.75)?);

    println!("\n=== Forecasts ===");
    let summary = Orchestrator::new(ForecastConfig::default()).run(&MemorySource::new(rows))?;
    for index in IndexName::ALL {
        if let Some(outcome) = summary.get(index) {
            match outcome.report() {
                Some(report) => println!(
                    "{}: {} (rmse {}), {} months ahead",
                    index,
                    report.model_used,
                    report.accuracy_score,
                    report.future.len()
                ),
                None => println!("{}: {}", index, outcome.error().unwrap_or("unknown error")),
            }
        }
    }

    println!("\nDone exploring");
    Ok(())
}

fn synthetic_rows() -> Vec<Observation> {
    (0..30)
        .map(|i| {
            let t = i as f64;
            let season = (t / 12.0 * std::f64::consts::TAU).sin();
            Observation::new(
                chrono::NaiveDate::from_ymd_opt(2021 + i / 12, (i % 12) as u32 + 1, 1).unwrap(),
                0.5 + 0.2 * season,
                0.1 - 0.05 * season,
                -0.05 + 0.001 * t,
                25.0 + 8.0 * season,
            )
        })
        .collect()
}
