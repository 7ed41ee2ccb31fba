use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("Invalid symbol: {0:?}")]
    InvalidSymbol(String),

    #[error("Market data error: {0}")]
    MarketData(#[from] api_client::error::ApiError),

    #[error("Metric calculation error: {0}")]
    Metric(#[from] analytics::AnalyticsError),
}
