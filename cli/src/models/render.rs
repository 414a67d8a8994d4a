use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::AnalysisStep;

/// Severity of a user-facing message banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BannerLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A message the UI shell renders above the output panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Banner {
    pub level: BannerLevel,
    pub text: String,
}

impl Banner {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: BannerLevel::Info,
            text: text.into(),
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self {
            level: BannerLevel::Success,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            level: BannerLevel::Warning,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: BannerLevel::Error,
            text: text.into(),
        }
    }
}

/// A named line over the date axis. Gaps (for example the warm-up of a
/// trailing rolling window) are `None` and serialize as nulls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateSeries {
    pub name: String,
    pub dates: Vec<NaiveDate>,
    pub values: Vec<Option<f64>>,
}

/// One panel of a plot. Stacked panels share the figure title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlotPanel {
    /// Lines over trading dates (prices, differences, rolling statistics,
    /// decomposition components).
    DateLine {
        title: String,
        y_label: String,
        series: Vec<DateSeries>,
    },
    /// Stems over integer lags (ACF/PACF), with a symmetric confidence bound.
    LagStem {
        title: String,
        y_label: String,
        values: Vec<f64>,
        confidence_bound: f64,
    },
}

/// A renderable figure. The UI shell decides how to draw it; this crate only
/// describes what to draw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotSpec {
    pub title: String,
    pub panels: Vec<PlotPanel>,
}

impl PlotSpec {
    /// Single-panel line figure over dates.
    pub fn date_line(
        title: impl Into<String>,
        y_label: impl Into<String>,
        series: Vec<DateSeries>,
    ) -> Self {
        let title = title.into();
        Self {
            panels: vec![PlotPanel::DateLine {
                title: title.clone(),
                y_label: y_label.into(),
                series,
            }],
            title,
        }
    }
}

/// The result of dispatching one analysis step: an optional figure, an
/// optional text report, and any banners to show alongside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepOutput {
    pub step: AnalysisStep,
    pub plot: Option<PlotSpec>,
    pub report: Option<String>,
    pub banners: Vec<Banner>,
}

impl StepOutput {
    pub fn empty(step: AnalysisStep) -> Self {
        Self {
            step,
            plot: None,
            report: None,
            banners: Vec::new(),
        }
    }

    pub fn with_plot(step: AnalysisStep, plot: PlotSpec) -> Self {
        Self {
            step,
            plot: Some(plot),
            report: None,
            banners: Vec::new(),
        }
    }
}
