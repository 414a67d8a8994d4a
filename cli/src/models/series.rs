use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::render::DateSeries;

/// A date-indexed series of values, the common currency of the analysis
/// functions. Dates and values always have the same length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl TimeSeries {
    pub fn new(dates: Vec<NaiveDate>, values: Vec<f64>) -> Self {
        debug_assert_eq!(dates.len(), values.len());
        Self { dates, values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Convert into a named plot series with no gaps.
    pub fn to_date_series(&self, name: impl Into<String>) -> DateSeries {
        DateSeries {
            name: name.into(),
            dates: self.dates.clone(),
            values: self.values.iter().copied().map(Some).collect(),
        }
    }
}
