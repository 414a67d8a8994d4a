use tracing::info;
use tracing_subscriber::{
    fmt::{self, time::ChronoUtc},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Initialize logging for the CLI and examples. The server binary configures
/// its own subscriber.
pub fn init_logger() -> anyhow::Result<()> {
    let format_layer = fmt::layer()
        .with_target(true)
        .with_timer(ChronoUtc::rfc_3339())
        .compact();

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tsdiag=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(format_layer)
        .init();

    Ok(())
}

/// Wall-clock timing helper for coarse step instrumentation.
pub struct Timer {
    start: std::time::Instant,
    name: String,
}

impl Timer {
    pub fn start(name: &str) -> Self {
        Self {
            start: std::time::Instant::now(),
            name: name.to_string(),
        }
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    pub fn log_elapsed(&self) {
        info!("{} completed in {:.1}ms", self.name, self.elapsed_ms());
    }
}
