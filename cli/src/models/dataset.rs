use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::TimeSeries;

/// One trading day of OHLCV data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: u64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    fn value(&self, column: PriceColumn) -> f64 {
        match column {
            PriceColumn::Open => self.open,
            PriceColumn::High => self.high,
            PriceColumn::Low => self.low,
            PriceColumn::Close => self.close,
        }
    }
}

/// Price column selector for analysis steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceColumn {
    Open,
    High,
    Low,
    Close,
}

impl PriceColumn {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceColumn::Open => "Open",
            PriceColumn::High => "High",
            PriceColumn::Low => "Low",
            PriceColumn::Close => "Close",
        }
    }
}

/// Inclusive calendar date window for a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Signed number of calendar days from start to end.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    pub fn is_reversed(&self) -> bool {
        self.end < self.start
    }

    pub fn spans_less_than_one_year(&self) -> bool {
        self.days() < 365
    }
}

/// Daily price history for one ticker.
///
/// Points are kept sorted ascending by trading date with duplicates removed
/// (last occurrence wins). A dataset is replaced wholesale on re-fetch and
/// never mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    ticker: String,
    points: Vec<PricePoint>,
}

impl Dataset {
    pub fn new(ticker: impl Into<String>, mut points: Vec<PricePoint>) -> Self {
        points.sort_by_key(|p| p.date);
        // Duplicate trading dates collapse to the most recent row
        points.reverse();
        points.dedup_by_key(|p| p.date);
        points.reverse();

        Self {
            ticker: ticker.into(),
            points,
        }
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    pub fn column(&self, column: PriceColumn) -> Vec<f64> {
        self.points.iter().map(|p| p.value(column)).collect()
    }

    /// Extract one column as a date-indexed series.
    pub fn series(&self, column: PriceColumn) -> TimeSeries {
        TimeSeries::new(self.dates(), self.column(column))
    }

    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => Some((first.date, last.date)),
            _ => None,
        }
    }

    /// Count non-finite price values per column, reported after every fetch.
    pub fn non_finite_counts(&self) -> Vec<(PriceColumn, usize)> {
        [
            PriceColumn::Open,
            PriceColumn::High,
            PriceColumn::Low,
            PriceColumn::Close,
        ]
        .into_iter()
        .map(|column| {
            let count = self
                .points
                .iter()
                .filter(|p| !p.value(column).is_finite())
                .count();
            (column, count)
        })
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    fn point(d: u32, close: f64) -> PricePoint {
        PricePoint::new(date(d), close - 1.0, close + 1.0, close - 2.0, close, 1_000)
    }

    #[test]
    fn new_sorts_points_ascending() {
        let ds = Dataset::new("TEST", vec![point(3, 9.0), point(1, 10.0), point(2, 11.0)]);
        assert_eq!(ds.dates(), vec![date(1), date(2), date(3)]);
        assert_eq!(ds.column(PriceColumn::Close), vec![10.0, 11.0, 9.0]);
    }

    #[test]
    fn new_collapses_duplicate_dates_last_wins() {
        let ds = Dataset::new("TEST", vec![point(1, 10.0), point(2, 11.0), point(2, 12.5)]);
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.column(PriceColumn::Close), vec![10.0, 12.5]);
    }

    #[test]
    fn date_range_length_and_warnings() {
        let short = DateRange::new(date(1), date(20));
        assert_eq!(short.days(), 19);
        assert!(short.spans_less_than_one_year());
        assert!(!short.is_reversed());

        let reversed = DateRange::new(date(20), date(1));
        assert!(reversed.is_reversed());
    }

    #[test]
    fn non_finite_counts_flags_missing_values() {
        let mut bad = point(2, 11.0);
        bad.close = f64::NAN;
        let ds = Dataset::new("TEST", vec![point(1, 10.0), bad]);
        let counts = ds.non_finite_counts();
        assert_eq!(counts[3], (PriceColumn::Close, 1));
        assert_eq!(counts[0], (PriceColumn::Open, 0));
    }
}
