//! Autocorrelation and partial autocorrelation of a series.

use statrs::distribution::{ContinuousCDF, Normal};

use crate::models::{PlotPanel, PlotSpec, TimeSeries};

use super::statistics::{mean, variance};
use super::AnalysisError;

/// Autocorrelation function over lags 0..=max_lag. Lag 0 is 1 by definition.
pub fn acf(data: &[f64], max_lag: usize) -> Vec<f64> {
    let n = data.len();
    if n < 2 {
        return Vec::new();
    }

    let max_lag = max_lag.min(n - 1);
    let m = mean(data);
    let var = variance(data);
    if var == 0.0 {
        return vec![1.0; max_lag + 1];
    }

    (0..=max_lag)
        .map(|lag| {
            if lag == 0 {
                return 1.0;
            }
            let sum: f64 = data[lag..]
                .iter()
                .zip(data[..n - lag].iter())
                .map(|(a, b)| (a - m) * (b - m))
                .sum();
            sum / (n as f64 * var)
        })
        .collect()
}

/// Partial autocorrelation via the Durbin-Levinson recursion on the sample
/// ACF.
pub fn pacf(data: &[f64], max_lag: usize) -> Vec<f64> {
    let acf_values = acf(data, max_lag);
    if acf_values.is_empty() {
        return Vec::new();
    }

    let max_lag = max_lag.min(acf_values.len() - 1);
    let mut pacf_values = vec![0.0; max_lag + 1];
    pacf_values[0] = 1.0;
    if max_lag == 0 {
        return pacf_values;
    }

    let mut phi = vec![vec![0.0; max_lag + 1]; max_lag + 1];
    phi[1][1] = acf_values[1];
    pacf_values[1] = phi[1][1];

    for k in 2..=max_lag {
        let mut num = acf_values[k];
        let mut den = 1.0;
        for j in 1..k {
            num -= phi[k - 1][j] * acf_values[k - j];
            den -= phi[k - 1][j] * acf_values[j];
        }
        if den.abs() < 1e-10 {
            break;
        }

        phi[k][k] = num / den;
        pacf_values[k] = phi[k][k];
        for j in 1..k {
            phi[k][j] = phi[k - 1][j] - phi[k][k] * phi[k - 1][k - j];
        }
    }

    pacf_values
}

/// Symmetric white-noise confidence bound ±z/√n for the requested two-sided
/// confidence level.
pub fn confidence_bound(n: usize, confidence: f64) -> f64 {
    if n == 0 {
        return f64::NAN;
    }
    let z = Normal::new(0.0, 1.0)
        .map(|d| d.inverse_cdf(0.5 + confidence / 2.0))
        .unwrap_or(1.96);
    z / (n as f64).sqrt()
}

/// Two stacked stem panels: ACF on top, PACF below, both over lags
/// 0..=`lags` with a 95% confidence bound.
pub fn acf_pacf_plot(series: &TimeSeries, lags: usize) -> Result<PlotSpec, AnalysisError> {
    if series.len() <= lags {
        return Err(AnalysisError::NotEnoughData {
            needed: lags + 1,
            have: series.len(),
        });
    }

    let bound = confidence_bound(series.len(), 0.95);
    let title = "Autocorrelation and Partial Autocorrelation".to_string();

    Ok(PlotSpec {
        title,
        panels: vec![
            PlotPanel::LagStem {
                title: "Autocorrelation".to_string(),
                y_label: "Autocorrelation".to_string(),
                values: acf(series.values(), lags),
                confidence_bound: bound,
            },
            PlotPanel::LagStem {
                title: "Partial Autocorrelation".to_string(),
                y_label: "Partial Autocorrelation".to_string(),
                values: pacf(series.values(), lags),
                confidence_bound: bound,
            },
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn series_of(values: Vec<f64>) -> TimeSeries {
        let dates = (0..values.len())
            .map(|i| NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(i as i64))
            .collect();
        TimeSeries::new(dates, values)
    }

    #[test]
    fn acf_of_lag_zero_is_one() {
        let data: Vec<f64> = (0..100).map(|i| ((i * 7919) % 100) as f64 / 100.0).collect();
        let values = acf(&data, 10);
        assert_eq!(values.len(), 11);
        assert!((values[0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn acf_of_alternating_series_is_negative_at_lag_one() {
        let data: Vec<f64> = (0..60).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        let values = acf(&data, 2);
        assert!(values[1] < -0.9);
        assert!(values[2] > 0.9);
    }

    #[test]
    fn pacf_matches_acf_at_lag_one() {
        let data: Vec<f64> = (0..100).map(|i| (i as f64 * 0.3).sin()).collect();
        let a = acf(&data, 10);
        let p = pacf(&data, 10);
        assert!((p[0] - 1.0).abs() < 1e-12);
        assert!((p[1] - a[1]).abs() < 1e-12);
    }

    #[test]
    fn confidence_bound_shrinks_with_sample_size() {
        let small = confidence_bound(50, 0.95);
        let large = confidence_bound(5000, 0.95);
        assert!(small > large);
        // z for 95% is about 1.96
        assert!((small * (50f64).sqrt() - 1.96).abs() < 0.01);
    }

    #[test]
    fn plot_has_two_stacked_panels() {
        let values: Vec<f64> = (0..120).map(|i| (i as f64 * 0.4).sin()).collect();
        let plot = acf_pacf_plot(&series_of(values), 40).unwrap();
        assert_eq!(plot.panels.len(), 2);
        for panel in &plot.panels {
            let PlotPanel::LagStem { values, .. } = panel else {
                panic!("expected lag-stem panels");
            };
            assert_eq!(values.len(), 41);
        }
    }

    #[test]
    fn plot_requires_more_points_than_lags() {
        let values: Vec<f64> = (0..30).map(|i| i as f64).collect();
        assert!(matches!(
            acf_pacf_plot(&series_of(values), 40),
            Err(AnalysisError::NotEnoughData { .. })
        ));
    }
}
