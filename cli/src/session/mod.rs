//! Per-user session state: the single cached dataset, its derived
//! first-difference series, and the dispatch from a selected analysis step to
//! the matching diagnostic.
//!
//! Invariants:
//! - changing the ticker clears the dataset and the derived series before any
//!   new fetch;
//! - the derived series, when present, always comes from the currently cached
//!   dataset;
//! - a failed step or fetch leaves prior state untouched.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::analysis::{self, AnalysisError, DecompositionModel};
use crate::models::{
    AnalysisStep, Banner, DateRange, Dataset, PriceColumn, StepOutput, TimeSeries,
};

/// Tunable parameters of the analysis steps, with the defaults of the
/// interactive flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepParams {
    pub rolling_window: usize,
    pub lags: usize,
    pub period: usize,
    pub model: DecompositionModel,
}

impl Default for StepParams {
    fn default() -> Self {
        Self {
            rolling_window: 12,
            lags: 40,
            period: 5,
            model: DecompositionModel::Multiplicative,
        }
    }
}

#[derive(Debug, Error)]
pub enum StepError {
    #[error("no dataset loaded; fetch price history first")]
    NoDataset,
    #[error("please generate the First Difference plot first")]
    FirstDifferenceRequired,
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

/// Read-only view of a session for status displays.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub ticker: String,
    pub rows: usize,
    pub has_dataset: bool,
    pub has_first_difference: bool,
    pub date_span: Option<(NaiveDate, NaiveDate)>,
}

/// Session cache and controller. Owns at most one dataset and one derived
/// series, both implicitly keyed by the current ticker.
#[derive(Debug, Clone)]
pub struct SessionState {
    ticker: String,
    dataset: Option<Dataset>,
    first_diff: Option<TimeSeries>,
    last_range: Option<DateRange>,
}

impl SessionState {
    pub fn new(default_ticker: impl Into<String>) -> Self {
        Self {
            ticker: default_ticker.into(),
            dataset: None,
            first_diff: None,
            last_range: None,
        }
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    pub fn first_difference(&self) -> Option<&TimeSeries> {
        self.first_diff.as_ref()
    }

    pub fn last_range(&self) -> Option<DateRange> {
        self.last_range
    }

    /// The one place cached data is dropped. Both ticker changes and
    /// re-fetches funnel through here so invalidation cannot be missed.
    fn reset_cached_data(&mut self) {
        self.dataset = None;
        self.first_diff = None;
        self.last_range = None;
    }

    /// Change the active ticker. A real change clears all cached data and
    /// returns the cache-reset notice; setting the same ticker is a no-op.
    pub fn set_ticker(&mut self, ticker: &str) -> Option<Banner> {
        let ticker = ticker.trim();
        if ticker.is_empty() || ticker == self.ticker {
            return None;
        }

        self.reset_cached_data();
        self.ticker = ticker.to_string();
        info!(ticker = %self.ticker, "Ticker changed, cached data reset");
        Some(Banner::info(format!(
            "Ticker changed to {}. Resetting cached data.",
            self.ticker
        )))
    }

    /// Non-blocking validation of a requested fetch window.
    pub fn validate_range(range: &DateRange) -> Vec<Banner> {
        let mut banners = Vec::new();
        if range.is_reversed() {
            banners.push(Banner::warning(format!(
                "End date {} precedes start date {}; the provider will likely return nothing.",
                range.end, range.start
            )));
        } else if range.spans_less_than_one_year() {
            banners.push(Banner::warning(format!(
                "Selected range covers only {} days; at least one year of data is recommended.",
                range.days()
            )));
        }
        banners
    }

    /// Install a freshly fetched dataset. The derived series is always
    /// cleared, even for the same ticker, because the underlying window
    /// changed. Fetch failures never reach this method, so failed fetches
    /// leave the previous dataset in place.
    pub fn install_dataset(&mut self, dataset: Dataset, range: DateRange) -> Banner {
        debug_assert_eq!(dataset.ticker(), self.ticker.to_uppercase());
        self.first_diff = None;
        let rows = dataset.len();
        self.dataset = Some(dataset);
        self.last_range = Some(range);

        info!(ticker = %self.ticker, rows, "Installed fetched dataset");
        Banner::success(format!(
            "Data downloaded for {} from {} to {} ({rows} rows).",
            self.ticker, range.start, range.end
        ))
    }

    /// Dispatch one selected step to its analysis function and return the
    /// render instruction. Pure dispatch: the only state this may touch is
    /// storing the first-difference series.
    pub fn select_step(
        &mut self,
        step: AnalysisStep,
        params: &StepParams,
    ) -> Result<StepOutput, StepError> {
        if step == AnalysisStep::None {
            return Ok(StepOutput::empty(step));
        }
        let dataset = self.dataset.as_ref().ok_or(StepError::NoDataset)?;
        debug!(ticker = %self.ticker, step = %step, "Dispatching analysis step");

        match step {
            AnalysisStep::None => unreachable!("handled above"),
            AnalysisStep::OpeningPrices => {
                let title = format!("{} Opening Prices", self.ticker);
                let plot = analysis::price_series_plot(dataset, PriceColumn::Open, title);
                Ok(StepOutput::with_plot(step, plot))
            }
            AnalysisStep::ClosingPrices => {
                let title = format!("{} Closing Prices", self.ticker);
                let plot = analysis::price_series_plot(dataset, PriceColumn::Close, title);
                Ok(StepOutput::with_plot(step, plot))
            }
            AnalysisStep::FirstDifference => {
                let (plot, series) = analysis::first_difference(dataset, PriceColumn::Close)?;
                self.first_diff = Some(series);
                Ok(StepOutput::with_plot(step, plot))
            }
            AnalysisStep::AcfPacf => {
                // The ordering dependency is deliberate: the series is never
                // derived implicitly here
                let series = self
                    .first_diff
                    .as_ref()
                    .ok_or(StepError::FirstDifferenceRequired)?;
                let plot = analysis::acf_pacf_plot(series, params.lags)?;
                Ok(StepOutput::with_plot(step, plot))
            }
            AnalysisStep::StationarityTest => {
                let series = dataset.series(PriceColumn::Close);
                let (plot, report) = analysis::stationarity_test(&series, params.rolling_window)?;
                Ok(StepOutput {
                    step,
                    plot: Some(plot),
                    report: Some(report.to_text()),
                    banners: Vec::new(),
                })
            }
            AnalysisStep::SeasonalDecomposition => {
                let (plot, decomposition) = analysis::seasonal_decompose_plot(
                    dataset,
                    PriceColumn::Close,
                    params.model,
                    params.period,
                )?;

                let mut banners = Vec::new();
                if decomposition.model != params.model {
                    banners.push(Banner::warning(format!(
                        "{} series contains non-positive values; fell back to the additive model.",
                        self.ticker
                    )));
                }
                Ok(StepOutput {
                    step,
                    plot: Some(plot),
                    report: None,
                    banners,
                })
            }
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            ticker: self.ticker.clone(),
            rows: self.dataset.as_ref().map(Dataset::len).unwrap_or(0),
            has_dataset: self.dataset.is_some(),
            has_first_difference: self.first_diff.is_some(),
            date_span: self.dataset.as_ref().and_then(Dataset::date_span),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PlotPanel, PricePoint};
    use chrono::NaiveDate;

    fn dataset(ticker: &str, closes: &[f64]) -> Dataset {
        let points = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| {
                PricePoint::new(
                    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap() + chrono::Duration::days(i as i64),
                    close + 0.5,
                    close + 1.0,
                    close - 1.0,
                    close,
                    1_000,
                )
            })
            .collect();
        Dataset::new(ticker, points)
    }

    fn range(days: i64) -> DateRange {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        DateRange::new(start, start + chrono::Duration::days(days))
    }

    fn loaded_session(closes: &[f64]) -> SessionState {
        let mut session = SessionState::new("TEST");
        session.install_dataset(dataset("TEST", closes), range(closes.len() as i64));
        session
    }

    #[test]
    fn changing_ticker_clears_dataset_and_derived_series() {
        let mut session = loaded_session(&[10.0, 11.0, 9.0, 12.0]);
        session
            .select_step(AnalysisStep::FirstDifference, &StepParams::default())
            .unwrap();
        assert!(session.dataset().is_some());
        assert!(session.first_difference().is_some());

        let banner = session.set_ticker("OTHER").unwrap();
        assert_eq!(banner.level, crate::models::BannerLevel::Info);
        assert!(session.dataset().is_none());
        assert!(session.first_difference().is_none());
        assert_eq!(session.ticker(), "OTHER");
    }

    #[test]
    fn setting_same_ticker_is_idempotent() {
        let mut session = loaded_session(&[10.0, 11.0, 9.0]);
        assert!(session.set_ticker("TEST").is_none());
        assert!(session.dataset().is_some());

        // Whitespace and empty input never clear anything either
        assert!(session.set_ticker("  ").is_none());
        assert!(session.dataset().is_some());
    }

    #[test]
    fn refetch_same_ticker_clears_derived_series() {
        let mut session = loaded_session(&[10.0, 11.0, 9.0, 12.0]);
        session
            .select_step(AnalysisStep::FirstDifference, &StepParams::default())
            .unwrap();
        assert!(session.first_difference().is_some());

        session.install_dataset(dataset("TEST", &[20.0, 21.0, 19.0]), range(3));
        assert!(session.first_difference().is_none());
        assert_eq!(session.dataset().unwrap().len(), 3);
        assert_eq!(session.last_range(), Some(range(3)));
    }

    #[test]
    fn acf_pacf_before_first_difference_is_a_precondition_error() {
        let mut session = loaded_session(&(0..120).map(|i| 50.0 + (i as f64 * 0.3).sin()).collect::<Vec<_>>());
        let result = session.select_step(AnalysisStep::AcfPacf, &StepParams::default());
        assert!(matches!(result, Err(StepError::FirstDifferenceRequired)));
        // No state change on failure
        assert!(session.first_difference().is_none());
        assert!(session.dataset().is_some());
    }

    #[test]
    fn acf_pacf_consumes_the_stored_series_exactly() {
        let closes: Vec<f64> = (0..120).map(|i| 50.0 + (i as f64 * 0.3).sin()).collect();
        let mut session = loaded_session(&closes);
        session
            .select_step(AnalysisStep::FirstDifference, &StepParams::default())
            .unwrap();
        let stored = session.first_difference().unwrap().clone();

        let output = session
            .select_step(AnalysisStep::AcfPacf, &StepParams::default())
            .unwrap();
        assert!(output.plot.is_some());

        // The stored series is still the one derived from this dataset
        assert_eq!(session.first_difference().unwrap(), &stored);
        let expected = analysis::acf(stored.values(), StepParams::default().lags);
        let PlotPanel::LagStem { values, .. } = &output.plot.unwrap().panels[0] else {
            panic!("expected lag-stem panel");
        };
        assert_eq!(values, &expected);
    }

    #[test]
    fn first_difference_matches_the_worked_example() {
        let mut session = loaded_session(&[10.0, 11.0, 9.0, 12.0]);
        session
            .select_step(AnalysisStep::FirstDifference, &StepParams::default())
            .unwrap();

        let series = session.first_difference().unwrap();
        assert_eq!(series.values(), &[1.0, -2.0, 3.0]);
        assert_eq!(series.len(), 3);
        assert_eq!(series.dates()[0], NaiveDate::from_ymd_opt(2025, 1, 2).unwrap());
    }

    #[test]
    fn steps_require_a_dataset_except_none() {
        let mut session = SessionState::new("TEST");
        let params = StepParams::default();

        let none = session.select_step(AnalysisStep::None, &params).unwrap();
        assert!(none.plot.is_none() && none.report.is_none());

        for step in [
            AnalysisStep::OpeningPrices,
            AnalysisStep::ClosingPrices,
            AnalysisStep::FirstDifference,
            AnalysisStep::AcfPacf,
            AnalysisStep::StationarityTest,
            AnalysisStep::SeasonalDecomposition,
        ] {
            assert!(matches!(
                session.select_step(step, &params),
                Err(StepError::NoDataset)
            ));
        }
    }

    #[test]
    fn stationarity_step_produces_plot_and_report() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + (i as f64 * 0.8).sin() * 2.0).collect();
        let mut session = loaded_session(&closes);
        let output = session
            .select_step(AnalysisStep::StationarityTest, &StepParams::default())
            .unwrap();
        assert!(output.plot.is_some());
        let report = output.report.unwrap();
        assert!(report.contains("Results of Dickey-Fuller Test"));
    }

    #[test]
    fn decomposition_fallback_emits_a_warning_banner() {
        let closes: Vec<f64> = (0..40).map(|i| (i as f64 * 0.9).sin()).collect();
        let mut session = loaded_session(&closes);
        let output = session
            .select_step(AnalysisStep::SeasonalDecomposition, &StepParams::default())
            .unwrap();
        assert_eq!(output.banners.len(), 1);
        assert_eq!(output.banners[0].level, crate::models::BannerLevel::Warning);
        assert!(output.banners[0].text.contains("additive"));
    }

    #[test]
    fn short_range_warns_but_does_not_block() {
        let banners = SessionState::validate_range(&range(90));
        assert_eq!(banners.len(), 1);
        assert_eq!(banners[0].level, crate::models::BannerLevel::Warning);

        let none = SessionState::validate_range(&range(400));
        assert!(none.is_empty());
    }

    #[test]
    fn reversed_range_warns() {
        let start = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let banners = SessionState::validate_range(&DateRange::new(start, end));
        assert_eq!(banners.len(), 1);
        assert!(banners[0].text.contains("precedes"));
    }
}
