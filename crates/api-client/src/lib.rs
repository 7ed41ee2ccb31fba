use crate::error::ApiError;
use crate::responses::{
    price_series_from_chart, statement_from_timeseries, statement_line_items, ChartResponse,
    TimeseriesResponse, ANNUAL_PREFIX,
};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use configuration::MarketDataSettings;
use core_types::{FinancialStatement, PriceSeries, StatementKind};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;

pub mod error;
pub mod in_memory;
pub mod responses;
// --- Public API ---
pub use in_memory::InMemoryMarketData;

/// How many years of annual statements are requested from the provider.
const STATEMENT_HISTORY_YEARS: i64 = 10;

/// The data-access interface the analysis layer depends on.
/// Implementations can be swapped (live provider or in-memory fixtures) without
/// touching the metric calculations.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Fetches daily closing prices over a trailing window such as "1y".
    async fn price_history(&self, symbol: &str, range: &str) -> Result<PriceSeries, ApiError>;

    /// Fetches one annual financial statement, most recent fiscal year first.
    async fn statement(
        &self,
        symbol: &str,
        kind: StatementKind,
    ) -> Result<FinancialStatement, ApiError>;
}

/// A concrete implementation of the `MarketDataSource` for Yahoo Finance.
#[derive(Clone)]
pub struct YahooClient {
    client: reqwest::Client,
    chart_base_url: Url,
    timeseries_base_url: Url,
}

impl YahooClient {
    pub fn new(settings: &MarketDataSettings) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&settings.user_agent)
                .map_err(|e| ApiError::InvalidData(format!("Invalid user agent: {}", e)))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(settings.request_timeout)
            .build()?;

        Ok(Self {
            client,
            chart_base_url: parse_base_url(&settings.chart_base_url)?,
            timeseries_base_url: parse_base_url(&settings.timeseries_base_url)?,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        symbol: &str,
        url: Url,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        tracing::debug!(%url, "Requesting market data.");
        let response = self.client.get(url.clone()).query(query).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::SymbolNotFound(symbol.to_string()));
        }
        if !status.is_success() {
            return Err(ApiError::ApiError(format!(
                "{} returned {}: {}",
                url.path(),
                status,
                text
            )));
        }

        serde_json::from_str::<T>(&text).map_err(|e| ApiError::Deserialization(e.to_string()))
    }
}

#[async_trait]
impl MarketDataSource for YahooClient {
    async fn price_history(&self, symbol: &str, range: &str) -> Result<PriceSeries, ApiError> {
        let url = endpoint(&self.chart_base_url, &["v8", "finance", "chart", symbol])?;
        let query = [
            ("range", range.to_string()),
            ("interval", "1d".to_string()),
            ("events", "div,splits".to_string()),
        ];

        let response: ChartResponse = self.get_json(symbol, url, &query).await?;
        let series = price_series_from_chart(symbol, response)?;

        tracing::info!(symbol, range, closes = series.len(), "Fetched price history.");
        Ok(series)
    }

    async fn statement(
        &self,
        symbol: &str,
        kind: StatementKind,
    ) -> Result<FinancialStatement, ApiError> {
        let url = endpoint(
            &self.timeseries_base_url,
            &["ws", "fundamentals-timeseries", "v1", "finance", "timeseries", symbol],
        )?;

        let types = statement_line_items(kind)
            .iter()
            .map(|(key, _)| format!("{}{}", ANNUAL_PREFIX, key))
            .collect::<Vec<_>>()
            .join(",");
        let now = Utc::now();
        let since = now - Duration::days(365 * STATEMENT_HISTORY_YEARS);
        let query = [
            ("symbol", symbol.to_string()),
            ("type", types),
            ("period1", since.timestamp().to_string()),
            ("period2", now.timestamp().to_string()),
        ];

        let response: TimeseriesResponse = self.get_json(symbol, url, &query).await?;
        let statement = statement_from_timeseries(kind, response)?;

        tracing::info!(
            symbol,
            statement = %kind,
            periods = statement.period_ends.len(),
            "Fetched financial statement."
        );
        Ok(statement)
    }
}

fn parse_base_url(base: &str) -> Result<Url, ApiError> {
    let url = Url::parse(base)
        .map_err(|e| ApiError::InvalidData(format!("Invalid base URL '{}': {}", base, e)))?;
    if url.cannot_be_a_base() {
        return Err(ApiError::InvalidData(format!("Base URL '{}' cannot hold a path", base)));
    }
    Ok(url)
}

/// Appends path segments to a base URL, percent-encoding each one.
fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, ApiError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| ApiError::InvalidData(format!("Base URL '{}' cannot hold a path", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration as StdDuration;

    fn settings() -> MarketDataSettings {
        MarketDataSettings {
            chart_base_url: "https://query1.finance.yahoo.com".to_string(),
            timeseries_base_url: "https://query2.finance.yahoo.com/".to_string(),
            user_agent: "equity-lens-test".to_string(),
            request_timeout: StdDuration::from_secs(10),
        }
    }

    #[test]
    fn endpoint_encodes_the_symbol_as_one_segment() {
        let client = YahooClient::new(&settings()).unwrap();

        let url = endpoint(&client.chart_base_url, &["v8", "finance", "chart", "BRK/B"]).unwrap();
        assert_eq!(url.as_str(), "https://query1.finance.yahoo.com/v8/finance/chart/BRK%2FB");

        let url = endpoint(&client.timeseries_base_url, &["ws", "AAPL"]).unwrap();
        assert_eq!(url.as_str(), "https://query2.finance.yahoo.com/ws/AAPL");
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let mut bad = settings();
        bad.chart_base_url = "not a url".to_string();

        assert!(matches!(YahooClient::new(&bad), Err(ApiError::InvalidData(_))));
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_fetch_price_history() {
        let client = YahooClient::new(&settings()).unwrap();
        let series = client.price_history("AAPL", "1y").await.unwrap();

        assert_eq!(series.symbol(), "AAPL");
        assert!(series.len() > 200);
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_fetch_balance_sheet() {
        let client = YahooClient::new(&settings()).unwrap();
        let balance = client.statement("AAPL", StatementKind::BalanceSheet).await.unwrap();

        assert!(balance.line_item("Total Assets").is_some());
        assert!(balance.period_ends.len() >= 2);
    }
}
