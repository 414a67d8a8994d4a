use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The analysis steps a session can display, in menu order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStep {
    None,
    OpeningPrices,
    ClosingPrices,
    FirstDifference,
    AcfPacf,
    StationarityTest,
    SeasonalDecomposition,
}

impl AnalysisStep {
    pub fn all() -> [AnalysisStep; 7] {
        [
            AnalysisStep::None,
            AnalysisStep::OpeningPrices,
            AnalysisStep::ClosingPrices,
            AnalysisStep::FirstDifference,
            AnalysisStep::AcfPacf,
            AnalysisStep::StationarityTest,
            AnalysisStep::SeasonalDecomposition,
        ]
    }

    /// Stable identifier used on the wire and on the CLI.
    pub fn id(&self) -> &'static str {
        match self {
            AnalysisStep::None => "none",
            AnalysisStep::OpeningPrices => "opening_prices",
            AnalysisStep::ClosingPrices => "closing_prices",
            AnalysisStep::FirstDifference => "first_difference",
            AnalysisStep::AcfPacf => "acf_pacf",
            AnalysisStep::StationarityTest => "stationarity_test",
            AnalysisStep::SeasonalDecomposition => "seasonal_decomposition",
        }
    }

    /// Human-facing menu label.
    pub fn label(&self) -> &'static str {
        match self {
            AnalysisStep::None => "None",
            AnalysisStep::OpeningPrices => "Opening Prices",
            AnalysisStep::ClosingPrices => "Closing Prices",
            AnalysisStep::FirstDifference => "First Difference",
            AnalysisStep::AcfPacf => "ACF and PACF",
            AnalysisStep::StationarityTest => "Stationarity Test",
            AnalysisStep::SeasonalDecomposition => "Seasonal Decomposition",
        }
    }
}

impl fmt::Display for AnalysisStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AnalysisStep {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AnalysisStep::all()
            .into_iter()
            .find(|step| step.id().eq_ignore_ascii_case(s) || step.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown analysis step: {s}"))
    }
}
