use clap::{Parser, Subcommand};

use tsdiag::analysis::DecompositionModel;
use tsdiag::models::{AnalysisStep, DateRange, SymbolTable};
use tsdiag::services::MarketDataClient;
use tsdiag::session::{SessionState, StepParams};
use tsdiag::utils::{default_range, parse_date};
use tsdiag::Timer;

const DEFAULT_PROVIDER_URL: &str = "https://marketdata.tsdiag.io/udf";

#[derive(Parser)]
#[command(name = "tsdiag")]
#[command(about = "Headless time-series diagnostics for daily stock price history")]
pub struct Cli {
    /// Market data provider base URL
    #[arg(long, default_value = DEFAULT_PROVIDER_URL, global = true)]
    provider_url: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download daily price history and print a summary
    Fetch {
        /// Ticker symbol
        #[arg(short, long, conflicts_with = "company")]
        ticker: Option<String>,
        /// Company name to resolve into a ticker via the lookup table
        #[arg(long)]
        company: Option<String>,
        /// Path to the name,ticker CSV table used by --company
        #[arg(long, default_value = "symbols.csv")]
        table: String,
        /// Start date (YYYY-MM-DD), default one year ago
        #[arg(long)]
        start: Option<String>,
        /// End date (YYYY-MM-DD), default today
        #[arg(long)]
        end: Option<String>,
    },
    /// Run one analysis step and print its report and plot JSON
    Analyze {
        /// Ticker symbol
        #[arg(short, long)]
        ticker: String,
        /// Start date (YYYY-MM-DD), default one year ago
        #[arg(long)]
        start: Option<String>,
        /// End date (YYYY-MM-DD), default today
        #[arg(long)]
        end: Option<String>,
        /// Analysis step id (opening_prices, closing_prices, first_difference,
        /// acf_pacf, stationarity_test, seasonal_decomposition)
        #[arg(short, long)]
        step: String,
        /// Rolling window for the stationarity plot
        #[arg(long, default_value_t = 12)]
        window: usize,
        /// Lag count for ACF/PACF
        #[arg(long, default_value_t = 40)]
        lags: usize,
        /// Seasonal decomposition period
        #[arg(long, default_value_t = 5)]
        period: usize,
        /// Use the additive decomposition model instead of multiplicative
        #[arg(long, default_value_t = false)]
        additive: bool,
        /// Print the plot specification as JSON
        #[arg(long, default_value_t = false)]
        plot_json: bool,
    },
    /// Search the company-name lookup table
    Search {
        /// Company name fragment
        #[arg(short, long)]
        query: String,
        /// Path to the name,ticker CSV table
        #[arg(long, default_value = "symbols.csv")]
        table: String,
    },
}

fn resolve_range(start: Option<&str>, end: Option<&str>) -> anyhow::Result<DateRange> {
    let default = default_range();
    let start = match start {
        Some(s) => parse_date(s)?,
        None => default.start,
    };
    let end = match end {
        Some(s) => parse_date(s)?,
        None => default.end,
    };
    Ok(DateRange::new(start, end))
}

async fn fetch_session(
    provider_url: &str,
    ticker: &str,
    range: DateRange,
) -> anyhow::Result<SessionState> {
    let mut client = MarketDataClient::new(provider_url, true, 30)?;
    let mut session = SessionState::new(ticker);

    for banner in SessionState::validate_range(&range) {
        eprintln!("warning: {}", banner.text);
    }

    let timer = Timer::start("history fetch");
    let dataset = client.get_daily_history(session.ticker(), &range).await?;
    timer.log_elapsed();

    for (column, count) in dataset.non_finite_counts() {
        if count > 0 {
            eprintln!("warning: {count} missing values in column {}", column.as_str());
        }
    }
    let banner = session.install_dataset(dataset, range);
    eprintln!("{}", banner.text);
    Ok(session)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tsdiag::init_logger()?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Fetch {
            ticker,
            company,
            table,
            start,
            end,
        } => {
            let ticker = match (ticker, company) {
                (Some(ticker), _) => ticker,
                (None, Some(company)) => {
                    let table = SymbolTable::load(&table)?;
                    table
                        .resolve(&company)
                        .ok_or_else(|| anyhow::anyhow!("no company matches '{company}'"))?
                        .to_string()
                }
                (None, None) => anyhow::bail!("pass either --ticker or --company"),
            };
            let range = resolve_range(start.as_deref(), end.as_deref())?;
            let session = fetch_session(&cli.provider_url, &ticker, range).await?;
            let snapshot = session.snapshot();
            println!("ticker: {}", snapshot.ticker);
            println!("rows:   {}", snapshot.rows);
            if let Some((first, last)) = snapshot.date_span {
                println!("span:   {first} to {last}");
            }
        }
        Commands::Analyze {
            ticker,
            start,
            end,
            step,
            window,
            lags,
            period,
            additive,
            plot_json,
        } => {
            let step: AnalysisStep = step.parse().map_err(|e: String| anyhow::anyhow!(e))?;
            let range = resolve_range(start.as_deref(), end.as_deref())?;
            let mut session = fetch_session(&cli.provider_url, &ticker, range).await?;

            let params = StepParams {
                rolling_window: window,
                lags,
                period,
                model: if additive {
                    DecompositionModel::Additive
                } else {
                    DecompositionModel::Multiplicative
                },
            };

            // The interactive flow requires the first difference before
            // ACF/PACF; headless runs derive it explicitly up front
            if step == AnalysisStep::AcfPacf {
                eprintln!("deriving first difference for ACF/PACF");
                session.select_step(AnalysisStep::FirstDifference, &params)?;
            }

            let output = session.select_step(step, &params)?;
            for banner in &output.banners {
                eprintln!("{:?}: {}", banner.level, banner.text);
            }
            if let Some(report) = &output.report {
                println!("{report}");
            }
            if plot_json {
                if let Some(plot) = &output.plot {
                    println!("{}", serde_json::to_string_pretty(plot)?);
                }
            } else if let Some(plot) = &output.plot {
                println!("plot: {} ({} panel(s))", plot.title, plot.panels.len());
            }
        }
        Commands::Search { query, table } => {
            let table = SymbolTable::load(&table)?;
            let hits = table.search(&query);
            if hits.is_empty() {
                println!("no companies match '{query}'");
            } else {
                for record in hits {
                    println!("{}\t{}", record.ticker, record.name);
                }
            }
        }
    }

    Ok(())
}
