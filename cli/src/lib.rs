//! # tsdiag - Time Series Diagnostics for Daily Price History
//!
//! A Rust library for interactive time-series diagnostics of stock/index
//! price history featuring:
//! - A market data client for daily OHLCV history
//! - Canned diagnostics: price plots, first differencing, ACF/PACF,
//!   Augmented Dickey-Fuller stationarity test, seasonal decomposition
//! - A per-user session cache with explicit invalidation and step dispatch
//! - Render instructions (plot specs and text reports) instead of drawn
//!   figures, so any frontend can display them
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tsdiag::prelude::*;
//! use tsdiag::services::MarketDataClient;
//! use tsdiag::utils::default_range;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut client = MarketDataClient::new("https://marketdata.tsdiag.io/udf", true, 30)?;
//!     let range = default_range();
//!
//!     let mut session = SessionState::new("^STI");
//!     let dataset = client.get_daily_history(session.ticker(), &range).await?;
//!     session.install_dataset(dataset, range);
//!
//!     let output = session.select_step(AnalysisStep::StationarityTest, &StepParams::default())?;
//!     println!("{}", output.report.unwrap_or_default());
//!     Ok(())
//! }
//! ```

// Core modules
pub mod analysis;
pub mod models;
pub mod services;
pub mod session;
pub mod utils;

// Prelude for convenient imports
pub mod prelude {
    //! The most commonly used types and functions:
    //! ```rust
    //! use tsdiag::prelude::*;
    //! ```

    pub use crate::analysis::{AdfReport, AnalysisError, DecompositionModel};
    pub use crate::models::{
        AnalysisStep, Banner, BannerLevel, DateRange, Dataset, PlotSpec, PriceColumn, PricePoint,
        StepOutput, SymbolTable, TimeSeries,
    };
    pub use crate::services::{FetchError, MarketDataClient};
    pub use crate::session::{SessionSnapshot, SessionState, StepError, StepParams};
}

// Re-export the logging setup used by the CLI and examples
pub use utils::{init_logger, Timer};
