//! HTTP client for the daily-bar market data provider.
//!
//! The provider speaks the UDF-style chart protocol: a `history` endpoint
//! returning column arrays keyed `t/o/h/l/c/v` plus a status field `s`.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use rand::seq::IndexedRandom;
use reqwest::Client;
use serde_json::Value;
use std::time::{Duration, SystemTime};
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::models::{DateRange, Dataset, PricePoint};

const MAX_RETRIES: u32 = 5;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("ticker must not be empty")]
    EmptyTicker,
    #[error("provider request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("provider returned malformed data: {0}")]
    InvalidResponse(String),
    #[error("provider returned no rows for {ticker}")]
    EmptyResult { ticker: String },
    #[error("provider unavailable after {MAX_RETRIES} attempts")]
    RetriesExhausted,
}

/// Client for the market data provider with a per-minute request budget and
/// bounded retries.
pub struct MarketDataClient {
    client: Client,
    base_url: String,
    rate_limit_per_minute: u32,
    request_timestamps: Vec<SystemTime>,
    user_agents: Vec<String>,
    random_agent: bool,
}

impl MarketDataClient {
    pub fn new(
        base_url: impl Into<String>,
        random_agent: bool,
        rate_limit_per_minute: u32,
    ) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        let user_agents = vec![
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:120.0) Gecko/20100101 Firefox/120.0".to_string(),
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.3 Safari/605.1.15".to_string(),
        ];

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            rate_limit_per_minute: rate_limit_per_minute.max(1),
            request_timestamps: Vec::new(),
            user_agents,
            random_agent,
        })
    }

    fn pick_user_agent(&self) -> &str {
        if self.random_agent {
            self.user_agents
                .choose(&mut rand::rng())
                .unwrap_or(&self.user_agents[0])
        } else {
            &self.user_agents[0]
        }
    }

    async fn enforce_rate_limit(&mut self) {
        let now = SystemTime::now();
        self.request_timestamps.retain(|&ts| {
            now.duration_since(ts).unwrap_or(Duration::ZERO) < Duration::from_secs(60)
        });

        if self.request_timestamps.len() >= self.rate_limit_per_minute as usize {
            if let Some(&oldest) = self.request_timestamps.first() {
                let elapsed = now.duration_since(oldest).unwrap_or(Duration::ZERO);
                let wait = Duration::from_secs(60).saturating_sub(elapsed);
                if !wait.is_zero() {
                    debug!(wait_ms = wait.as_millis() as u64, "Rate limit reached, waiting");
                    sleep(wait + Duration::from_millis(100)).await;
                }
            }
        }

        self.request_timestamps.push(now);
    }

    async fn request_json(
        &mut self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<Value, FetchError> {
        for attempt in 0..MAX_RETRIES {
            self.enforce_rate_limit().await;

            if attempt > 0 {
                let backoff = 2.0_f64.powi(attempt as i32 - 1) + rand::random::<f64>();
                let delay = Duration::from_secs_f64(backoff).min(Duration::from_secs(60));
                debug!(attempt, delay_ms = delay.as_millis() as u64, "Retrying provider request");
                sleep(delay).await;
            }

            let response = self
                .client
                .get(url)
                .query(query)
                .header("Accept", "application/json, text/plain, */*")
                .header("User-Agent", self.pick_user_agent().to_string())
                .send()
                .await;

            match response {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_success() {
                        match resp.json::<Value>().await {
                            Ok(data) => return Ok(data),
                            Err(e) => {
                                warn!(attempt, error = %e, "Provider response was not valid JSON");
                                continue;
                            }
                        }
                    } else if status == 403 || status == 429 || status.is_server_error() {
                        warn!(attempt, %status, "Provider rejected request, will retry");
                        continue;
                    } else {
                        return Err(FetchError::InvalidResponse(format!(
                            "provider returned status {status}"
                        )));
                    }
                }
                Err(e) => {
                    warn!(attempt, error = %e, "Provider request failed, will retry");
                    continue;
                }
            }
        }

        Err(FetchError::RetriesExhausted)
    }

    /// Fetch the daily OHLCV history of one ticker over an inclusive date
    /// window. An empty result is an error distinct from transport failures;
    /// both are user-facing.
    pub async fn get_daily_history(
        &mut self,
        ticker: &str,
        range: &DateRange,
    ) -> Result<Dataset, FetchError> {
        let ticker = ticker.trim();
        if ticker.is_empty() {
            return Err(FetchError::EmptyTicker);
        }
        let symbol = ticker.to_uppercase();

        // The provider's `to` bound is exclusive, so push it one day past the
        // requested end
        let from_ts = range.start.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc().timestamp());
        let to_ts = (range.end + ChronoDuration::days(1))
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().timestamp());
        let (from_ts, to_ts) = match (from_ts, to_ts) {
            (Some(from), Some(to)) => (from, to),
            _ => {
                return Err(FetchError::InvalidResponse(
                    "date range cannot be converted to timestamps".to_string(),
                ))
            }
        };

        let url = format!("{}/history", self.base_url);
        let query = [
            ("symbol", symbol.clone()),
            ("resolution", "1D".to_string()),
            ("from", from_ts.to_string()),
            ("to", to_ts.to_string()),
        ];

        debug!(%symbol, start = %range.start, end = %range.end, "Requesting daily history");
        let response = self.request_json(&url, &query).await?;
        let points = parse_history_response(&symbol, &response, range)?;

        let dataset = Dataset::new(symbol.clone(), points);
        if dataset.is_empty() {
            return Err(FetchError::EmptyResult { ticker: symbol });
        }
        Ok(dataset)
    }
}

/// Decode a UDF-style history response into price points, dropping rows
/// outside the requested window.
fn parse_history_response(
    symbol: &str,
    response: &Value,
    range: &DateRange,
) -> Result<Vec<PricePoint>, FetchError> {
    match response.get("s").and_then(|s| s.as_str()) {
        Some("ok") => {}
        Some("no_data") => {
            return Err(FetchError::EmptyResult {
                ticker: symbol.to_string(),
            })
        }
        Some(other) => {
            return Err(FetchError::InvalidResponse(format!(
                "provider status '{other}'"
            )))
        }
        None => {
            return Err(FetchError::InvalidResponse(
                "missing status field".to_string(),
            ))
        }
    }

    let column = |key: &str| -> Result<&Vec<Value>, FetchError> {
        response
            .get(key)
            .and_then(|v| v.as_array())
            .ok_or_else(|| FetchError::InvalidResponse(format!("missing column '{key}'")))
    };

    let times = column("t")?;
    let opens = column("o")?;
    let highs = column("h")?;
    let lows = column("l")?;
    let closes = column("c")?;
    let volumes = column("v")?;

    let length = times.len();
    if [opens.len(), highs.len(), lows.len(), closes.len(), volumes.len()]
        .iter()
        .any(|&len| len != length)
    {
        return Err(FetchError::InvalidResponse(
            "inconsistent column lengths".to_string(),
        ));
    }

    let mut points = Vec::with_capacity(length);
    for i in 0..length {
        let timestamp = times[i].as_i64().ok_or_else(|| {
            FetchError::InvalidResponse(format!("invalid timestamp at index {i}"))
        })?;
        let time = DateTime::<Utc>::from_timestamp(timestamp, 0).ok_or_else(|| {
            FetchError::InvalidResponse(format!("timestamp {timestamp} out of range"))
        })?;

        let date = time.date_naive();
        if date < range.start || date > range.end {
            continue;
        }

        points.push(PricePoint::new(
            date,
            opens[i].as_f64().unwrap_or(f64::NAN),
            highs[i].as_f64().unwrap_or(f64::NAN),
            lows[i].as_f64().unwrap_or(f64::NAN),
            closes[i].as_f64().unwrap_or(f64::NAN),
            volumes[i].as_u64().unwrap_or(0),
        ));
    }

    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn range() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
        )
    }

    fn ts(y: i32, m: u32, d: u32) -> i64 {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            .and_utc()
            .timestamp()
    }

    #[test]
    fn client_creation() {
        let client = MarketDataClient::new("https://example.test/udf/", false, 30);
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn empty_ticker_is_rejected_before_any_request() {
        let mut client = MarketDataClient::new("https://example.test/udf", false, 30).unwrap();
        let result = client.get_daily_history("   ", &range()).await;
        assert!(matches!(result, Err(FetchError::EmptyTicker)));
    }

    #[test]
    fn parses_column_arrays_into_points() {
        let response = serde_json::json!({
            "s": "ok",
            "t": [ts(2025, 1, 2), ts(2025, 1, 3)],
            "o": [10.0, 11.0],
            "h": [10.5, 11.5],
            "l": [9.5, 10.5],
            "c": [10.2, 11.2],
            "v": [1000, 2000],
        });

        let points = parse_history_response("TEST", &response, &range()).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].date, NaiveDate::from_ymd_opt(2025, 1, 2).unwrap());
        assert_eq!(points[1].close, 11.2);
    }

    #[test]
    fn rows_outside_the_window_are_dropped() {
        let response = serde_json::json!({
            "s": "ok",
            "t": [ts(2024, 12, 31), ts(2025, 1, 2), ts(2025, 2, 1)],
            "o": [1.0, 2.0, 3.0],
            "h": [1.0, 2.0, 3.0],
            "l": [1.0, 2.0, 3.0],
            "c": [1.0, 2.0, 3.0],
            "v": [1, 2, 3],
        });

        let points = parse_history_response("TEST", &response, &range()).unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].close, 2.0);
    }

    #[test]
    fn no_data_status_maps_to_empty_result() {
        let response = serde_json::json!({ "s": "no_data" });
        assert!(matches!(
            parse_history_response("TEST", &response, &range()),
            Err(FetchError::EmptyResult { .. })
        ));
    }

    #[test]
    fn mismatched_columns_are_malformed() {
        let response = serde_json::json!({
            "s": "ok",
            "t": [ts(2025, 1, 2)],
            "o": [10.0, 11.0],
            "h": [10.5],
            "l": [9.5],
            "c": [10.2],
            "v": [1000],
        });
        assert!(matches!(
            parse_history_response("TEST", &response, &range()),
            Err(FetchError::InvalidResponse(_))
        ));
    }
}
