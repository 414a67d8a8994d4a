//! Run the diagnostic steps offline against a synthetic dataset.
//!
//! ```bash
//! cargo run --example basic_diagnostics
//! ```

use chrono::NaiveDate;
use tsdiag::models::{AnalysisStep, DateRange, Dataset, PricePoint};
use tsdiag::session::{SessionState, StepParams};

fn synthetic_dataset(ticker: &str, days: usize) -> (Dataset, DateRange) {
    let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    let points = (0..days)
        .map(|i| {
            let date = start + chrono::Duration::days(i as i64);
            // gentle trend with a weekly wobble
            let close = 100.0 + 0.05 * i as f64 + 2.0 * ((i % 5) as f64 - 2.0);
            PricePoint::new(date, close - 0.5, close + 1.0, close - 1.0, close, 10_000)
        })
        .collect();
    let range = DateRange::new(start, start + chrono::Duration::days(days as i64 - 1));
    (Dataset::new(ticker, points), range)
}

fn main() -> anyhow::Result<()> {
    tsdiag::init_logger()?;

    let (dataset, range) = synthetic_dataset("DEMO", 250);
    let mut session = SessionState::new("DEMO");
    session.install_dataset(dataset, range);

    let params = StepParams::default();
    let steps = [
        AnalysisStep::ClosingPrices,
        AnalysisStep::FirstDifference,
        AnalysisStep::AcfPacf,
        AnalysisStep::StationarityTest,
        AnalysisStep::SeasonalDecomposition,
    ];

    for step in steps {
        let output = session.select_step(step, &params)?;
        println!("== {step} ==");
        if let Some(plot) = &output.plot {
            println!("plot '{}' with {} panel(s)", plot.title, plot.panels.len());
        }
        if let Some(report) = &output.report {
            println!("{report}");
        }
        for banner in &output.banners {
            println!("[{:?}] {}", banner.level, banner.text);
        }
    }

    Ok(())
}
