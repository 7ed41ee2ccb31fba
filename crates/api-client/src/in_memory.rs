use crate::error::ApiError;
use crate::MarketDataSource;
use async_trait::async_trait;
use core_types::{FinancialStatement, PriceSeries, StatementKind};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// A `MarketDataSource` serving pre-loaded data, for offline runs and tests.
///
/// Every request is recorded in order so callers can check what was fetched.
/// Symbols without a registered price series are reported as not found.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMarketData {
    prices: HashMap<String, PriceSeries>,
    statements: HashMap<(String, StatementKind), FinancialStatement>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl InMemoryMarketData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the price history served for `series.symbol()`.
    pub fn with_prices(mut self, series: PriceSeries) -> Self {
        self.prices.insert(series.symbol().to_string(), series);
        self
    }

    pub fn with_statement(mut self, symbol: &str, statement: FinancialStatement) -> Self {
        self.statements
            .insert((symbol.to_string(), statement.kind), statement);
        self
    }

    /// The requests served so far, e.g. `"prices AAPL 1y"` or `"statement AAPL balance sheet"`.
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|log| log.clone())
            .unwrap_or_default()
    }

    fn record(&self, request: String) {
        if let Ok(mut log) = self.requests.lock() {
            log.push(request);
        }
    }
}

#[async_trait]
impl MarketDataSource for InMemoryMarketData {
    async fn price_history(&self, symbol: &str, range: &str) -> Result<PriceSeries, ApiError> {
        self.record(format!("prices {} {}", symbol, range));
        self.prices
            .get(symbol)
            .cloned()
            .ok_or_else(|| ApiError::SymbolNotFound(symbol.to_string()))
    }

    async fn statement(
        &self,
        symbol: &str,
        kind: StatementKind,
    ) -> Result<FinancialStatement, ApiError> {
        self.record(format!("statement {} {}", symbol, kind));
        if !self.prices.contains_key(symbol) {
            return Err(ApiError::SymbolNotFound(symbol.to_string()));
        }
        // A known symbol with nothing reported yields an empty statement, like the live provider.
        Ok(self
            .statements
            .get(&(symbol.to_string(), kind))
            .cloned()
            .unwrap_or_else(|| FinancialStatement::new(kind)))
    }
}
