//! Stateless diagnostic functions. Each takes a dataset or series plus
//! formatting parameters and returns a render instruction and/or a derived
//! result; none mutate their input.

pub mod autocorrelation;
pub mod decomposition;
pub mod difference;
pub mod statistics;
pub mod stationarity;

use thiserror::Error;

use crate::models::{Dataset, PlotSpec, PriceColumn};

pub use autocorrelation::{acf, acf_pacf_plot, confidence_bound, pacf};
pub use decomposition::{
    seasonal_decompose, seasonal_decompose_plot, Decomposition, DecompositionModel,
};
pub use difference::{diff, first_difference};
pub use stationarity::{adf_test, stationarity_test, AdfReport};

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("not enough data: need at least {needed} points, have {have}")]
    NotEnoughData { needed: usize, have: usize },
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("numerical failure: {0}")]
    Numerical(String),
}

/// Line plot of one price column against the trading-date index.
pub fn price_series_plot(dataset: &Dataset, column: PriceColumn, title: String) -> PlotSpec {
    let series = dataset.series(column);
    PlotSpec::date_line(title, "Price", vec![series.to_date_series(column.as_str())])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PlotPanel, PricePoint};
    use chrono::NaiveDate;

    #[test]
    fn price_plot_uses_the_requested_column() {
        let points = vec![
            PricePoint::new(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(), 1.0, 3.0, 0.5, 2.0, 10),
            PricePoint::new(NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(), 2.0, 4.0, 1.5, 3.0, 10),
        ];
        let ds = Dataset::new("TEST", points);

        let plot = price_series_plot(&ds, PriceColumn::Open, "TEST Opening Prices".to_string());
        assert_eq!(plot.title, "TEST Opening Prices");
        let PlotPanel::DateLine { series, .. } = &plot.panels[0] else {
            panic!("expected a date-line panel");
        };
        assert_eq!(series[0].values, vec![Some(1.0), Some(2.0)]);
    }
}
