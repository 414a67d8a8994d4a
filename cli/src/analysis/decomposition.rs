//! Moving-average seasonal decomposition into trend, seasonal, and residual
//! components.

use serde::{Deserialize, Serialize};

use crate::models::{Dataset, DateSeries, PlotPanel, PlotSpec, PriceColumn};

use super::AnalysisError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecompositionModel {
    Multiplicative,
    Additive,
}

impl DecompositionModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecompositionModel::Multiplicative => "multiplicative",
            DecompositionModel::Additive => "additive",
        }
    }
}

/// Decomposed series. `trend` and `residual` carry gaps at the edges where
/// the centered moving average is undefined. `model` is the model actually
/// used, which differs from the requested one when a multiplicative request
/// fell back to additive on non-positive input.
#[derive(Debug, Clone, PartialEq)]
pub struct Decomposition {
    pub model: DecompositionModel,
    pub observed: Vec<f64>,
    pub trend: Vec<Option<f64>>,
    pub seasonal: Vec<f64>,
    pub residual: Vec<Option<f64>>,
}

/// Centered moving average of length `period`. Even periods use the 2×MA
/// convention with half weights on the endpoints.
fn centered_trend(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let n = values.len();
    let mut trend = vec![None; n];
    let half = period / 2;

    if period % 2 == 1 {
        for i in half..n.saturating_sub(half) {
            let window = &values[i - half..=i + half];
            trend[i] = Some(window.iter().sum::<f64>() / period as f64);
        }
    } else {
        for i in half..n.saturating_sub(half) {
            let mut sum = 0.5 * values[i - half] + 0.5 * values[i + half];
            sum += values[i - half + 1..i + half].iter().sum::<f64>();
            trend[i] = Some(sum / period as f64);
        }
    }

    trend
}

/// Decompose a series. A multiplicative request on data with non-positive
/// values falls back to the additive model; the returned `model` records the
/// choice.
pub fn seasonal_decompose(
    values: &[f64],
    model: DecompositionModel,
    period: usize,
) -> Result<Decomposition, AnalysisError> {
    if period < 2 {
        return Err(AnalysisError::InvalidParameter(format!(
            "decomposition period must be at least 2, got {period}"
        )));
    }
    let n = values.len();
    if n < 2 * period {
        return Err(AnalysisError::NotEnoughData {
            needed: 2 * period,
            have: n,
        });
    }

    let model = match model {
        DecompositionModel::Multiplicative if values.iter().any(|v| *v <= 0.0) => {
            DecompositionModel::Additive
        }
        requested => requested,
    };

    let trend = centered_trend(values, period);

    // Detrended series where the trend is defined
    let detrended: Vec<Option<f64>> = values
        .iter()
        .zip(trend.iter())
        .map(|(v, t)| {
            t.map(|t| match model {
                DecompositionModel::Additive => v - t,
                DecompositionModel::Multiplicative => v / t,
            })
        })
        .collect();

    // Average by position within the period, then normalize the cycle
    let mut position_means = vec![0.0; period];
    for (pos, slot) in position_means.iter_mut().enumerate() {
        let hits: Vec<f64> = detrended
            .iter()
            .skip(pos)
            .step_by(period)
            .filter_map(|v| *v)
            .collect();
        *slot = if hits.is_empty() {
            match model {
                DecompositionModel::Additive => 0.0,
                DecompositionModel::Multiplicative => 1.0,
            }
        } else {
            hits.iter().sum::<f64>() / hits.len() as f64
        };
    }

    let cycle_mean = position_means.iter().sum::<f64>() / period as f64;
    for slot in position_means.iter_mut() {
        match model {
            DecompositionModel::Additive => *slot -= cycle_mean,
            DecompositionModel::Multiplicative => *slot /= cycle_mean,
        }
    }

    let seasonal: Vec<f64> = (0..n).map(|i| position_means[i % period]).collect();

    let residual: Vec<Option<f64>> = values
        .iter()
        .zip(trend.iter())
        .zip(seasonal.iter())
        .map(|((v, t), s)| {
            t.map(|t| match model {
                DecompositionModel::Additive => v - t - s,
                DecompositionModel::Multiplicative => v / (t * s),
            })
        })
        .collect();

    Ok(Decomposition {
        model,
        observed: values.to_vec(),
        trend,
        seasonal,
        residual,
    })
}

/// Decompose one dataset column and describe the four-panel component figure.
pub fn seasonal_decompose_plot(
    dataset: &Dataset,
    column: PriceColumn,
    model: DecompositionModel,
    period: usize,
) -> Result<(PlotSpec, Decomposition), AnalysisError> {
    let values = dataset.column(column);
    let decomposition = seasonal_decompose(&values, model, period)?;
    let dates = dataset.dates();

    let panel = |title: &str, values: Vec<Option<f64>>| PlotPanel::DateLine {
        title: title.to_string(),
        y_label: title.to_string(),
        series: vec![DateSeries {
            name: title.to_string(),
            dates: dates.clone(),
            values,
        }],
    };

    let plot = PlotSpec {
        title: format!(
            "Seasonal Decomposition of {} {} ({}, period {})",
            dataset.ticker(),
            column.as_str(),
            decomposition.model.as_str(),
            period
        ),
        panels: vec![
            panel(
                "Observed",
                decomposition.observed.iter().copied().map(Some).collect(),
            ),
            panel("Trend", decomposition.trend.clone()),
            panel(
                "Seasonal",
                decomposition.seasonal.iter().copied().map(Some).collect(),
            ),
            panel("Residual", decomposition.residual.clone()),
        ],
    };

    Ok((plot, decomposition))
}
