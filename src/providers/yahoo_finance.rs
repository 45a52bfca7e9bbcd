use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::util::with_retry;
use crate::core::config::YahooProviderConfig;
use crate::core::price::{PriceObservation, PriceSource};

const USER_AGENT: &str = "portrisk/0.1";
const SECONDS_PER_DAY: i64 = 86_400;

/// Daily closes from the Yahoo Finance chart API.
pub struct YahooFinanceProvider {
    base_url: String,
    retries: usize,
    retry_delay_ms: u64,
}

impl YahooFinanceProvider {
    pub fn new(base_url: &str) -> Self {
        YahooFinanceProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            retries: 0,
            retry_delay_ms: 0,
        }
    }

    pub fn with_retries(mut self, retries: usize, retry_delay_ms: u64) -> Self {
        self.retries = retries;
        self.retry_delay_ms = retry_delay_ms;
        self
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        with_retry(
            || client.get(url).send(),
            self.retries,
            self.retry_delay_ms,
        )
        .await
        .map_err(|e| anyhow!("Request error: {} URL: {}", e, url))
    }
}

impl From<&YahooProviderConfig> for YahooFinanceProvider {
    fn from(config: &YahooProviderConfig) -> Self {
        YahooFinanceProvider::new(&config.base_url)
            .with_retries(config.retries, config.retry_delay_ms)
    }
}

#[derive(Deserialize, Debug)]
struct YahooChartResponse {
    chart: ChartResult,
}

#[derive(Deserialize, Debug)]
struct ChartResult {
    result: Option<Vec<ChartItem>>,
    error: Option<ChartError>,
}

#[derive(Deserialize, Debug)]
struct ChartError {
    description: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ChartItem {
    meta: ChartMeta,
    timestamp: Option<Vec<i64>>,
    indicators: Option<Indicators>,
}

#[derive(Deserialize, Debug)]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Deserialize, Debug)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Deserialize, Debug)]
struct Quote {
    close: Option<Vec<Option<f64>>>,
}

fn unix_midnight(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}

/// Converts bars to exchange-local trading dates, skipping null closes.
fn extract_closes(item: &ChartItem) -> Vec<PriceObservation> {
    let (Some(timestamps), Some(closes)) = (
        item.timestamp.as_ref(),
        item.indicators
            .as_ref()
            .and_then(|inds| inds.quote.first())
            .and_then(|q| q.close.as_ref()),
    ) else {
        return Vec::new();
    };

    timestamps
        .iter()
        .zip(closes)
        .filter_map(|(ts, close)| {
            let date = DateTime::from_timestamp(ts + item.meta.gmtoffset, 0)?.date_naive();
            close.map(|c| PriceObservation::new(date, c))
        })
        .collect()
}

fn parse_chart(symbol: &str, text: &str) -> Result<YahooChartResponse> {
    serde_json::from_str(text)
        .map_err(|e| anyhow!("Failed to parse JSON response for {}: {}", symbol, e))
}

#[async_trait]
impl PriceSource for YahooFinanceProvider {
    #[instrument(name = "YahooResolve", skip(self), fields(symbol = %symbol))]
    async fn resolve(&self, symbol: &str) -> Result<bool> {
        let url = format!(
            "{}/v8/finance/chart/{}?range=1d&interval=1d",
            self.base_url, symbol
        );
        debug!("Resolving symbol via {}", url);

        let response = self.get(&url).await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!("Symbol {} not found", symbol);
            return Ok(false);
        }
        if !status.is_success() {
            return Err(anyhow!("HTTP error: {} for symbol: {}", status, symbol));
        }

        let data = parse_chart(symbol, &response.text().await?)?;
        Ok(data.chart.error.is_none() && data.chart.result.is_some_and(|r| !r.is_empty()))
    }

    #[instrument(
        name = "YahooCloseFetch",
        skip(self),
        fields(symbol = %symbol, start = %start, end = %end)
    )]
    async fn fetch_closes(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceObservation>> {
        // Exchanges east of UTC stamp the `start` bar on the previous UTC day.
        let url = format!(
            "{}/v8/finance/chart/{}?period1={}&period2={}&interval=1d&events=history",
            self.base_url,
            symbol,
            unix_midnight(start) - SECONDS_PER_DAY,
            unix_midnight(end)
        );
        debug!("Requesting daily closes from {}", url);

        let response = self.get(&url).await?;
        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for symbol: {}",
                response.status(),
                symbol
            ));
        }

        let data = parse_chart(symbol, &response.text().await?)?;
        if let Some(err) = data.chart.error {
            return Err(anyhow!(
                "Chart error for symbol {}: {}",
                symbol,
                err.description.unwrap_or_default()
            ));
        }
        let item = data
            .chart
            .result
            .as_ref()
            .and_then(|r| r.first())
            .ok_or_else(|| anyhow!("No price data found for symbol: {}", symbol))?;

        let closes: Vec<PriceObservation> = extract_closes(item)
            .into_iter()
            .filter(|obs| obs.date >= start && obs.date < end)
            .collect();
        debug!("Received {} closes", closes.len());
        Ok(closes)
    }
}
