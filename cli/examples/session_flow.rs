//! Demonstrates the session cache invalidation rules: ticker changes and
//! re-fetches clear the cached dataset and its derived series.
//!
//! ```bash
//! cargo run --example session_flow
//! ```

use chrono::NaiveDate;
use tsdiag::models::{AnalysisStep, DateRange, Dataset, PricePoint};
use tsdiag::session::{SessionState, StepParams};

fn small_dataset(ticker: &str, closes: &[f64]) -> (Dataset, DateRange) {
    let start = NaiveDate::from_ymd_opt(2025, 2, 3).unwrap();
    let points = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let date = start + chrono::Duration::days(i as i64);
            PricePoint::new(date, close, close + 0.5, close - 0.5, close, 1_000)
        })
        .collect();
    let range = DateRange::new(start, start + chrono::Duration::days(closes.len() as i64 - 1));
    (Dataset::new(ticker, points), range)
}

fn report(session: &SessionState, label: &str) {
    let snap = session.snapshot();
    println!(
        "{label}: ticker={} rows={} first_diff={}",
        snap.ticker, snap.rows, snap.has_first_difference
    );
}

fn main() -> anyhow::Result<()> {
    tsdiag::init_logger()?;
    let params = StepParams::default();

    let mut session = SessionState::new("AAA");
    let (dataset, range) = small_dataset("AAA", &[10.0, 11.0, 9.0, 12.0]);
    session.install_dataset(dataset, range);
    report(&session, "after fetch");

    session.select_step(AnalysisStep::FirstDifference, &params)?;
    report(&session, "after first difference");

    // Re-fetching the same ticker with a new window drops the derived series
    let (dataset, range) = small_dataset("AAA", &[12.0, 13.0, 11.0]);
    session.install_dataset(dataset, range);
    report(&session, "after re-fetch");

    // Selecting ACF/PACF now reports the missing precondition
    match session.select_step(AnalysisStep::AcfPacf, &params) {
        Err(err) => println!("acf/pacf refused: {err}"),
        Ok(_) => unreachable!("first difference was cleared by the re-fetch"),
    }

    // Changing the ticker clears everything
    if let Some(banner) = session.set_ticker("BBB") {
        println!("banner: {}", banner.text);
    }
    report(&session, "after ticker change");

    Ok(())
}
