use chrono::{Datelike, NaiveDate};
use index_forecast::{
    CsvStore, ForecastConfig, IndexName, IndexOutcome, MemorySource, ModelKind, Observation,
    Orchestrator,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn month(i: usize) -> NaiveDate {
    NaiveDate::from_ymd_opt(2020 + (i / 12) as i32, (i % 12) as u32 + 1, 1).unwrap()
}

/// 24 months of plausible values for every index
fn sample_rows() -> Vec<Observation> {
    (0..24)
        .map(|i| {
            let t = i as f64;
            Observation::new(
                month(i),
                0.3 + 0.4 * t / 23.0,
                0.05 + 0.03 * ((t / 12.0) * std::f64::consts::TAU).sin(),
                -0.1 + 0.002 * t,
                22.0 + 5.0 * ((t / 12.0) * std::f64::consts::TAU).cos(),
            )
        })
        .collect()
}

#[test]
fn test_upward_trend_continues() {
    let orchestrator = Orchestrator::new(ForecastConfig::default());
    let summary = orchestrator.run(&MemorySource::new(sample_rows())).unwrap();

    let ndvi = summary.get(IndexName::Ndvi).and_then(|o| o.report()).unwrap();
    assert!(ndvi.accuracy_score.is_finite());
    assert_eq!(ndvi.history.len(), 24);
    assert_eq!(ndvi.future.len(), 12);

    let last = ndvi.history.last().unwrap().value;
    for point in &ndvi.future {
        assert!(point.value > last - 0.1, "{} vs last {}", point.value, last);
    }
    let names: Vec<&str> = ModelKind::ALL.iter().map(|k| k.name()).collect();
    assert!(names.contains(&ndvi.model_used.as_str()));
}

#[test]
fn test_short_index_does_not_affect_others() {
    // NDVI only present for the first 8 months
    let rows: Vec<Observation> = sample_rows()
        .into_iter()
        .enumerate()
        .map(|(i, mut row)| {
            if i >= 8 {
                row.ndvi = None;
            }
            row
        })
        .collect();

    let orchestrator = Orchestrator::new(ForecastConfig::default());
    let summary = orchestrator.run(&MemorySource::new(rows)).unwrap();

    assert_eq!(summary.len(), 4);
    let ndvi = summary.get(IndexName::Ndvi).unwrap();
    assert!(ndvi.error().unwrap().contains("Insufficient data for NDVI"));
    for index in [IndexName::Ndwi, IndexName::Ndbi, IndexName::Lst] {
        let report = summary.get(index).and_then(|o| o.report()).unwrap();
        assert_eq!(report.future.len(), 12);
    }
    assert_eq!(summary.succeeded(), 3);
}

#[test]
fn test_constant_series_reproduces_constant() {
    let rows: Vec<Observation> = (0..18)
        .map(|i| Observation::new(month(i), 0.5, 0.5, 0.5, 0.5))
        .collect();

    let orchestrator = Orchestrator::new(ForecastConfig::default());
    let summary = orchestrator.run(&MemorySource::new(rows)).unwrap();

    for (_, outcome) in summary.iter() {
        let report = outcome.report().unwrap();
        assert_eq!(report.accuracy_score, 0.0);
        assert!(report.history.iter().all(|p| p.value == 0.5));
        assert_eq!(report.future.len(), 12);
        assert!(report.future.iter().all(|p| p.value == 0.5));
    }
}

#[test]
fn test_future_dates_are_consecutive_month_starts() {
    // Observations mid-month still forecast from the 1st of the next month
    let rows: Vec<Observation> = sample_rows()
        .into_iter()
        .map(|mut row| {
            row.date = row.date.with_day0(14).unwrap();
            row
        })
        .collect();

    let orchestrator = Orchestrator::new(ForecastConfig::default());
    let report = orchestrator
        .forecast_index(&MemorySource::new(rows), IndexName::Lst)
        .unwrap();

    let expected: Vec<NaiveDate> = (24..36).map(month).collect();
    let actual: Vec<NaiveDate> = report.future.iter().map(|p| p.date).collect();
    assert_eq!(actual, expected);
}

#[test]
fn test_runs_are_deterministic() {
    let orchestrator = Orchestrator::new(ForecastConfig::default());
    let source = MemorySource::new(sample_rows());

    let first = serde_json::to_string(&orchestrator.run(&source).unwrap()).unwrap();
    let second = serde_json::to_string(&orchestrator.run(&source).unwrap()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_csv_store_end_to_end() {
    let dir = TempDir::new().unwrap();
    let store = CsvStore::new(dir.path().join("indices.csv"));
    let orchestrator = Orchestrator::new(ForecastConfig::default());

    // Nothing generated yet
    assert!(orchestrator.run(&store).unwrap_err().is_fatal());

    store.write_rows(&sample_rows()).unwrap();
    let summary = orchestrator.run(&store).unwrap();
    let json = serde_json::to_value(&summary).unwrap();

    let object = json.as_object().unwrap();
    let keys: Vec<&str> = object.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["LST", "NDBI", "NDVI", "NDWI"]);
    for value in object.values() {
        assert!(value.get("model_used").is_some());
        assert_eq!(value["future"].as_array().unwrap().len(), 12);
        let first = &value["future"][0];
        assert_eq!(first["date"], "2022-01-01");
        assert!(first["value"].is_f64());
    }
}

#[test]
fn test_outcome_from_json_error_marker() {
    let outcome: IndexOutcome =
        serde_json::from_str(r#"{"error": "All candidate models failed for NDBI"}"#).unwrap();
    assert!(outcome.is_error());
    assert!(outcome.report().is_none());
}
