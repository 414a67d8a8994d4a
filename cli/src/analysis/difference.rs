//! First differencing of a price column.

use crate::models::{Dataset, PlotSpec, PriceColumn, TimeSeries};

use super::AnalysisError;

/// Successive differences v[i] − v[i−1]; the first, undefined entry is
/// dropped, so the output is one shorter than the input.
pub fn diff(values: &[f64]) -> Vec<f64> {
    values.windows(2).map(|w| w[1] - w[0]).collect()
}

/// Difference one column of a dataset and describe its plot.
///
/// The returned series is what the ACF/PACF step later consumes; callers are
/// expected to cache it alongside the dataset it came from.
pub fn first_difference(
    dataset: &Dataset,
    column: PriceColumn,
) -> Result<(PlotSpec, TimeSeries), AnalysisError> {
    if dataset.len() < 2 {
        return Err(AnalysisError::NotEnoughData {
            needed: 2,
            have: dataset.len(),
        });
    }

    let values = diff(&dataset.column(column));
    let dates = dataset.dates()[1..].to_vec();
    let series = TimeSeries::new(dates, values);

    let title = format!(
        "First Difference of {} {} Prices",
        dataset.ticker(),
        column.as_str()
    );
    let plot = PlotSpec::date_line(title, "Difference", vec![series.to_date_series("Difference")]);

    Ok((plot, series))
}
