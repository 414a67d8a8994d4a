//! Rolling statistics and the Augmented Dickey-Fuller stationarity test.
//!
//! The ADF regression is Δy_t = α + β·y_{t−1} + Σ γ_i·Δy_{t−i} + ε_t with the
//! lag order chosen by AIC over a fixed estimation window, and the test
//! statistic is the t-ratio of β. H0: the series has a unit root.

use nalgebra::{DMatrix, DVector};

use crate::models::{DateSeries, PlotPanel, PlotSpec, TimeSeries};

use super::{statistics, AnalysisError};

const MIN_OBSERVATIONS: usize = 12;

/// Result of the Augmented Dickey-Fuller test, formatted for display as
/// labeled key/value text.
#[derive(Debug, Clone)]
pub struct AdfReport {
    pub statistic: f64,
    pub p_value: f64,
    pub used_lag: usize,
    pub n_obs: usize,
    pub critical_values: Vec<(&'static str, f64)>,
}

impl AdfReport {
    pub fn to_text(&self) -> String {
        let mut out = String::from("Results of Dickey-Fuller Test:\n");
        out.push_str(&format!("{:<32}{:>14.6}\n", "Test Statistic", self.statistic));
        out.push_str(&format!("{:<32}{:>14.6}\n", "p-value", self.p_value));
        out.push_str(&format!("{:<32}{:>14}\n", "Used Lag", self.used_lag));
        out.push_str(&format!(
            "{:<32}{:>14}\n",
            "Number of Observations Used", self.n_obs
        ));
        for (level, value) in &self.critical_values {
            out.push_str(&format!(
                "{:<32}{:>14.6}\n",
                format!("Critical Value ({level})"),
                value
            ));
        }
        out
    }
}

struct AdfFit {
    t_stat: f64,
    aic: f64,
}

/// Fit the ADF regression for one lag order. Rows start at `start` so that
/// candidate fits over the same window have comparable AIC values.
fn fit_adf(data: &[f64], diff: &[f64], lag: usize, start: usize) -> Option<AdfFit> {
    let n_rows = diff.len().checked_sub(start)?;
    let n_cols = 2 + lag;
    if n_rows <= n_cols {
        return None;
    }

    let mut x_data = Vec::with_capacity(n_rows * n_cols);
    for t in start..diff.len() {
        x_data.push(1.0);
        x_data.push(data[t]);
        for i in 1..=lag {
            x_data.push(diff[t - i]);
        }
    }

    let x = DMatrix::from_row_slice(n_rows, n_cols, &x_data);
    let y = DVector::from_column_slice(&diff[start..]);

    let xtx = x.transpose() * &x;
    let xty = x.transpose() * &y;
    let xtx_inv = xtx.try_inverse()?;
    let beta = &xtx_inv * xty;

    let residuals = &y - &x * &beta;
    let sse: f64 = residuals.iter().map(|r| r * r).sum();
    let mse = sse / (n_rows - n_cols) as f64;
    let se_beta = (mse * xtx_inv[(1, 1)]).sqrt();
    if !se_beta.is_finite() || se_beta == 0.0 {
        return None;
    }

    Some(AdfFit {
        t_stat: beta[1] / se_beta,
        aic: n_rows as f64 * (sse / n_rows as f64).ln() + 2.0 * n_cols as f64,
    })
}

/// Finite-sample critical values for the constant-only ADF regression
/// (MacKinnon response-surface coefficients).
fn critical_values(n_obs: usize) -> Vec<(&'static str, f64)> {
    let n = n_obs as f64;
    vec![
        ("1%", -3.43035 - 6.5393 / n - 16.786 / (n * n)),
        ("5%", -2.86154 - 2.8903 / n - 4.234 / (n * n)),
        ("10%", -2.56677 - 1.5384 / n - 2.809 / (n * n)),
    ]
}

/// Approximate p-value by interpolating between the critical values, with
/// exponential tails outside the tabulated range.
fn approx_p_value(t_stat: f64, critical: &[(&'static str, f64)]) -> f64 {
    let cv_1 = critical[0].1;
    let cv_5 = critical[1].1;
    let cv_10 = critical[2].1;

    let p = if t_stat < cv_1 {
        0.01 * (t_stat - cv_1).exp()
    } else if t_stat < cv_5 {
        0.01 + 0.04 * (t_stat - cv_1) / (cv_5 - cv_1)
    } else if t_stat < cv_10 {
        0.05 + 0.05 * (t_stat - cv_5) / (cv_10 - cv_5)
    } else {
        0.10 + 0.90 * (1.0 - (-0.5 * (t_stat - cv_10)).exp())
    };
    p.clamp(0.0, 1.0)
}

/// Augmented Dickey-Fuller test with AIC lag selection.
///
/// `max_lag` defaults to the Schwert rule 12·(n/100)^¼, capped so the
/// regression keeps enough degrees of freedom.
pub fn adf_test(data: &[f64], max_lag: Option<usize>) -> Result<AdfReport, AnalysisError> {
    let n = data.len();
    if n < MIN_OBSERVATIONS {
        return Err(AnalysisError::NotEnoughData {
            needed: MIN_OBSERVATIONS,
            have: n,
        });
    }

    let diff: Vec<f64> = data.windows(2).map(|w| w[1] - w[0]).collect();

    let schwert = (12.0 * (n as f64 / 100.0).powf(0.25)).floor() as usize;
    let dof_cap = (n - 1) / 2;
    let dof_cap = dof_cap.saturating_sub(3);
    let max_lag = max_lag.unwrap_or(schwert).min(dof_cap);

    // All candidates are fit over the same rows, then the winner is refit on
    // the full sample its own lag order allows.
    let mut best: Option<(usize, f64)> = None;
    for lag in 0..=max_lag {
        if let Some(fit) = fit_adf(data, &diff, lag, max_lag) {
            match best {
                Some((_, best_aic)) if fit.aic >= best_aic => {}
                _ => best = Some((lag, fit.aic)),
            }
        }
    }

    let (used_lag, _) = best.ok_or_else(|| {
        AnalysisError::Numerical("ADF regression is singular for every lag order".to_string())
    })?;

    let fit = fit_adf(data, &diff, used_lag, used_lag).ok_or_else(|| {
        AnalysisError::Numerical("ADF regression is singular at the selected lag".to_string())
    })?;

    let n_obs = diff.len() - used_lag;
    let critical = critical_values(n_obs);
    let p_value = approx_p_value(fit.t_stat, &critical);

    Ok(AdfReport {
        statistic: fit.t_stat,
        p_value,
        used_lag,
        n_obs,
        critical_values: critical,
    })
}

/// Stationarity diagnostic: a figure overlaying the series with its trailing
/// rolling mean/std, and the ADF report for the same series.
pub fn stationarity_test(
    series: &TimeSeries,
    window: usize,
) -> Result<(PlotSpec, AdfReport), AnalysisError> {
    let report = adf_test(series.values(), None)?;

    let dates = series.dates().to_vec();
    let rolling_mean = statistics::rolling_mean(series.values(), window);
    let rolling_std = statistics::rolling_std(series.values(), window);

    let title = "Rolling Mean and Standard Deviation".to_string();
    let plot = PlotSpec {
        title: title.clone(),
        panels: vec![PlotPanel::DateLine {
            title,
            y_label: "Value".to_string(),
            series: vec![
                series.to_date_series("Original"),
                DateSeries {
                    name: format!("Rolling Mean ({window})"),
                    dates: dates.clone(),
                    values: rolling_mean,
                },
                DateSeries {
                    name: format!("Rolling Std ({window})"),
                    dates,
                    values: rolling_std,
                },
            ],
        }],
    };

    Ok((plot, report))
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

    fn pseudo_noise(seed: u64) -> impl FnMut() -> f64 {
        let mut state = seed;
        move || {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (state >> 33) as f64 / (1u64 << 31) as f64 - 0.5
        }
    }

    #[test]
    fn adf_rejects_unit_root_for_stationary_series() {
        let mut next = pseudo_noise(7);
        let data: Vec<f64> = (0..200)
            .map(|i| (i as f64 * 0.7).sin() + 0.3 * next())
            .collect();
        let report = adf_test(&data, None).unwrap();
        assert!(report.statistic < -2.5, "statistic = {}", report.statistic);
        assert!(report.p_value < 0.5);
    }

    #[test]
    fn adf_does_not_reject_for_drifting_walk() {
        // Deterministic pseudo-noise so the walk is reproducible
        let mut next = pseudo_noise(42);

        let mut data = vec![100.0];
        for i in 1..250 {
            data.push(data[i - 1] + 0.5 + next());
        }
        let report = adf_test(&data, None).unwrap();
        assert!(report.statistic > -3.0, "statistic = {}", report.statistic);
        assert!(report.p_value > 0.01);
    }

    #[test]
    fn adf_requires_a_minimum_sample() {
        let data = vec![1.0, 2.0, 3.0];
        assert!(matches!(
            adf_test(&data, None),
            Err(AnalysisError::NotEnoughData { .. })
        ));
    }

    #[test]
    fn report_text_is_labeled_key_values() {
        let mut next = pseudo_noise(3);
        let data: Vec<f64> = (0..120)
            .map(|i| (i as f64 * 0.5).sin() * 3.0 + next())
            .collect();
        let report = adf_test(&data, None).unwrap();
        let text = report.to_text();
        assert!(text.starts_with("Results of Dickey-Fuller Test:"));
        assert!(text.contains("Test Statistic"));
        assert!(text.contains("p-value"));
        assert!(text.contains("Used Lag"));
        assert!(text.contains("Number of Observations Used"));
        assert!(text.contains("Critical Value (5%)"));
    }

    #[test]
    fn rolling_overlay_has_expected_gap_count() {
        let values: Vec<f64> = (0..13).map(|i| 10.0 + (i as f64 * 1.3).sin()).collect();
        let (plot, _) = stationarity_test(&series_of(values), 12).unwrap();

        let PlotPanel::DateLine { series, .. } = &plot.panels[0] else {
            panic!("expected a date-line panel");
        };
        assert_eq!(series.len(), 3);
        let mean_points = series[1].values.iter().filter(|v| v.is_some()).count();
        let std_points = series[2].values.iter().filter(|v| v.is_some()).count();
        assert_eq!(mean_points, 2); // 13 − (12 − 1)
        assert_eq!(std_points, 2);
    }

    #[test]
    fn critical_values_are_ordered() {
        let cv = critical_values(250);
        assert!(cv[0].1 < cv[1].1 && cv[1].1 < cv[2].1);
    }
}
