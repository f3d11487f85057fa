//! Observation rows, per-index series and the tabular data sources they come from

use crate::error::{ForecastError, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

/// Date format used by the tabular store and the reports
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Environmental indices derived from satellite bands
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IndexName {
    /// Normalized difference vegetation index
    Ndvi,
    /// Normalized difference water index
    Ndwi,
    /// Normalized difference built-up index
    Ndbi,
    /// Land surface temperature
    Lst,
}

impl IndexName {
    /// Every index, in report order
    pub const ALL: [IndexName; 4] = [
        IndexName::Ndvi,
        IndexName::Ndwi,
        IndexName::Ndbi,
        IndexName::Lst,
    ];

    /// Column / key name
    pub fn as_str(&self) -> &'static str {
        match self {
            IndexName::Ndvi => "NDVI",
            IndexName::Ndwi => "NDWI",
            IndexName::Ndbi => "NDBI",
            IndexName::Lst => "LST",
        }
    }
}

impl fmt::Display for IndexName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IndexName {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        IndexName::ALL
            .into_iter()
            .find(|index| index.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ForecastError::InvalidParameter(format!("Unknown index: {}", s)))
    }
}

/// One row of the tabular store. Missing cells are `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub ndvi: Option<f64>,
    pub ndwi: Option<f64>,
    pub ndbi: Option<f64>,
    pub lst: Option<f64>,
}

impl Observation {
    /// Create a fully populated observation
    pub fn new(date: NaiveDate, ndvi: f64, ndwi: f64, ndbi: f64, lst: f64) -> Self {
        Self {
            date,
            ndvi: Some(ndvi),
            ndwi: Some(ndwi),
            ndbi: Some(ndbi),
            lst: Some(lst),
        }
    }

    /// Value of one index, if present
    pub fn value(&self, index: IndexName) -> Option<f64> {
        match index {
            IndexName::Ndvi => self.ndvi,
            IndexName::Ndwi => self.ndwi,
            IndexName::Ndbi => self.ndbi,
            IndexName::Lst => self.lst,
        }
    }
}

/// A dated scalar observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Chronological series of one index.
///
/// Dates are strictly increasing and no two points share a calendar month.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexSeries {
    index: IndexName,
    points: Vec<TimeSeriesPoint>,
}

impl IndexSeries {
    /// Extract one index from raw rows.
    ///
    /// Rows are stable-sorted by date, missing and non-finite values are
    /// dropped, and when several rows fall in the same calendar month the
    /// latest one is kept.
    pub fn from_observations(index: IndexName, rows: &[Observation]) -> Self {
        let mut points: Vec<TimeSeriesPoint> = rows
            .iter()
            .filter_map(|row| {
                row.value(index)
                    .filter(|v| v.is_finite())
                    .map(|value| TimeSeriesPoint {
                        date: row.date,
                        value,
                    })
            })
            .collect();
        points.sort_by_key(|p| p.date);

        let before = points.len();
        let mut deduped: Vec<TimeSeriesPoint> = Vec::with_capacity(points.len());
        for point in points {
            match deduped.last_mut() {
                Some(last) if same_month(last.date, point.date) => *last = point,
                _ => deduped.push(point),
            }
        }
        if deduped.len() < before {
            debug!(
                %index,
                dropped = before - deduped.len(),
                "collapsed same-month observations"
            );
        }

        Self {
            index,
            points: deduped,
        }
    }

    /// Build a series from points that are already clean.
    ///
    /// The points are used as given; callers are responsible for ordering.
    pub fn from_points(index: IndexName, points: Vec<TimeSeriesPoint>) -> Self {
        Self { index, points }
    }

    /// Which index this series holds
    pub fn index(&self) -> IndexName {
        self.index
    }

    /// Points in chronological order
    pub fn points(&self) -> &[TimeSeriesPoint] {
        &self.points
    }

    /// Observation dates
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    /// Observation values
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    /// Get the length of the series
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the series is empty
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Keep only points whose value is strictly above `floor`
    pub fn retain_above(&mut self, floor: f64) {
        self.points.retain(|p| p.value > floor);
    }
}

fn same_month(a: NaiveDate, b: NaiveDate) -> bool {
    a.year() == b.year() && a.month() == b.month()
}

/// Read side of the external tabular store
pub trait DataSource {
    /// Load every stored observation row.
    ///
    /// Returns `SourceUnavailable` when no dataset exists and `ParseError`
    /// when a row cannot be read.
    fn load(&self) -> Result<Vec<Observation>>;
}

/// In-memory rows, for tests and embedding
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    rows: Option<Vec<Observation>>,
}

impl MemorySource {
    /// A source holding the given rows
    pub fn new(rows: Vec<Observation>) -> Self {
        Self { rows: Some(rows) }
    }

    /// A source whose dataset was never generated
    pub fn unavailable() -> Self {
        Self { rows: None }
    }
}

impl DataSource for MemorySource {
    fn load(&self) -> Result<Vec<Observation>> {
        self.rows.clone().ok_or_else(|| {
            ForecastError::SourceUnavailable("in-memory dataset was not provided".to_string())
        })
    }
}

/// CSV file with a `date` column and one column per index
#[derive(Debug, Clone)]
pub struct CsvStore {
    path: PathBuf,
}

#[derive(Serialize)]
struct CsvRecord {
    date: String,
    #[serde(rename = "NDVI")]
    ndvi: Option<f64>,
    #[serde(rename = "NDWI")]
    ndwi: Option<f64>,
    #[serde(rename = "NDBI")]
    ndbi: Option<f64>,
    #[serde(rename = "LST")]
    lst: Option<f64>,
}

impl CsvStore {
    /// Store backed by the file at `path`
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Location of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the dataset with `rows`, header `date,NDVI,NDWI,NDBI,LST`
    pub fn write_rows(&self, rows: &[Observation]) -> Result<()> {
        let mut writer = csv::Writer::from_path(&self.path)?;
        for row in rows {
            writer.serialize(CsvRecord {
                date: row.date.format(DATE_FORMAT).to_string(),
                ndvi: row.ndvi,
                ndwi: row.ndwi,
                ndbi: row.ndbi,
                lst: row.lst,
            })?;
        }
        writer.flush()?;
        debug!(path = %self.path.display(), rows = rows.len(), "wrote dataset");
        Ok(())
    }

    fn column_position(headers: &csv::StringRecord, name: &str) -> Result<usize> {
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
            .ok_or_else(|| ForecastError::ParseError(format!("Missing column '{}'", name)))
    }
}

impl DataSource for CsvStore {
    fn load(&self) -> Result<Vec<Observation>> {
        if !self.path.exists() {
            return Err(ForecastError::SourceUnavailable(format!(
                "{} does not exist; generate a dataset first",
                self.path.display()
            )));
        }

        let file = File::open(&self.path)?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        let headers = reader.headers()?.clone();
        let date_col = Self::column_position(&headers, "date")?;
        let index_cols = [
            Self::column_position(&headers, IndexName::Ndvi.as_str())?,
            Self::column_position(&headers, IndexName::Ndwi.as_str())?,
            Self::column_position(&headers, IndexName::Ndbi.as_str())?,
            Self::column_position(&headers, IndexName::Lst.as_str())?,
        ];

        let mut rows = Vec::new();
        for (line, record) in reader.records().enumerate() {
            let record = record?;
            let date = parse_date(record.get(date_col).unwrap_or(""))
                .map_err(|e| ForecastError::ParseError(format!("row {}: {}", line + 1, e)))?;

            let mut values = [None; 4];
            for (slot, &col) in values.iter_mut().zip(index_cols.iter()) {
                *slot = parse_cell(record.get(col).unwrap_or(""))
                    .map_err(|e| ForecastError::ParseError(format!("row {}: {}", line + 1, e)))?;
            }

            rows.push(Observation {
                date,
                ndvi: values[0],
                ndwi: values[1],
                ndbi: values[2],
                lst: values[3],
            });
        }

        rows.sort_by_key(|row| row.date);
        debug!(path = %self.path.display(), rows = rows.len(), "loaded dataset");
        Ok(rows)
    }
}

/// Parse an ISO calendar date, tolerating a trailing time component
pub fn parse_date(raw: &str) -> std::result::Result<NaiveDate, String> {
    let trimmed = raw.trim();
    let date_part = trimmed
        .split(|c: char| c == 'T' || c == ' ')
        .next()
        .unwrap_or(trimmed);
    NaiveDate::parse_from_str(date_part, DATE_FORMAT)
        .map_err(|e| format!("invalid date '{}': {}", raw, e))
}

/// Parse one index cell; empty and NaN cells are missing values
fn parse_cell(raw: &str) -> std::result::Result<Option<f64>, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    trimmed
        .parse::<f64>()
        .map(|v| Some(v).filter(|v| v.is_finite()))
        .map_err(|e| format!("invalid number '{}': {}", raw, e))
}
