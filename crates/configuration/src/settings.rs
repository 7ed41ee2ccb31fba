use crate::error::ConfigError;
use core_types::BetaAlignment;
use serde::Deserialize;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub market_data: MarketDataSettings,
    pub analysis: AnalysisSettings,
}

/// Where the HTTP server binds.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// Interface to listen on. "0.0.0.0" listens on all interfaces.
    pub host: String,
    pub port: u16,
}

impl ServerSettings {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self.host.parse().map_err(|_| {
            ConfigError::ValidationError(format!("server.host '{}' is not an IP address", self.host))
        })?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Connection parameters for the upstream market-data provider.
#[derive(Debug, Clone, Deserialize)]
pub struct MarketDataSettings {
    /// Base URL of the chart (price history) endpoint, without a trailing slash.
    pub chart_base_url: String,
    /// Base URL of the fundamentals time-series endpoint, without a trailing slash.
    pub timeseries_base_url: String,
    pub user_agent: String,
    /// Applied to every upstream request.
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

/// Parameters of the metric calculations.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisSettings {
    /// The market index beta is measured against (e.g., "^GSPC").
    pub benchmark_symbol: String,
    /// Trailing window of daily closes, in the provider's range notation (e.g., "1y").
    pub history_range: String,
    #[serde(default)]
    pub beta_alignment: BetaAlignment,
}

impl Settings {
    /// Rejects values that would deserialize but cannot be used.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.socket_addr()?;

        let required = [
            ("market_data.chart_base_url", &self.market_data.chart_base_url),
            ("market_data.timeseries_base_url", &self.market_data.timeseries_base_url),
            ("analysis.benchmark_symbol", &self.analysis.benchmark_symbol),
            ("analysis.history_range", &self.analysis.history_range),
        ];
        if let Some((key, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(ConfigError::ValidationError(format!("{} must not be empty", key)));
        }

        if self.market_data.request_timeout.is_zero() {
            return Err(ConfigError::ValidationError(
                "market_data.request_timeout must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}
