use chrono::NaiveDate;
use index_forecast::{
    ForecastConfig, ForecastEngine, IndexName, IndexSeries, TimeSeriesPoint,
};
use std::f64::consts::PI;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Index Forecast: Basic Forecasting Example");
    println!("=========================================\n");

    // Three years of monthly NDVI with a growing season and a slow upward trend
    println!("Creating sample data...");
    let series = create_sample_ndvi();
    println!("Sample data created: {} monthly points\n", series.len());

    let engine = ForecastEngine::new(ForecastConfig::default());
    let report = engine.forecast_series(&series)?;

    println!("Winning model: {}", report.model_used);
    println!("Hold-out RMSE (scaled): {:.4}\n", report.accuracy_score);

    println!("Next {} months:", report.future.len());
    for point in &report.future {
        println!("  {}: {:.4}", point.date, point.value);
    }

    Ok(())
}

fn create_sample_ndvi() -> IndexSeries {
    let points = (0..36)
        .map(|i| {
            let date = NaiveDate::from_ymd_opt(2021 + i / 12, (i % 12) as u32 + 1, 1)
                .unwrap();
            let season = 0.15 * (2.0 * PI * ((i % 12) as f64 - 3.0) / 12.0).sin();
            TimeSeriesPoint {
                date,
                value: 0.45 + 0.002 * i as f64 + season,
            }
        })
        .collect();
    IndexSeries::from_points(IndexName::Ndvi, points)
}
