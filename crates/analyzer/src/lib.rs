use crate::error::AnalyzerError;
use analytics::{AnalysisRecord, MetricsEngine};
use api_client::MarketDataSource;
use configuration::AnalysisSettings;
use core_types::{PriceSeries, StatementKind};
use std::sync::Arc;

pub mod error;

/// Fetches the data for one symbol and runs every metric over it.
///
/// The service holds no per-request state, so one instance is shared by all requests.
#[derive(Clone)]
pub struct AnalysisService {
    source: Arc<dyn MarketDataSource>,
    settings: AnalysisSettings,
    engine: MetricsEngine,
}

impl AnalysisService {
    pub fn new(source: Arc<dyn MarketDataSource>, settings: AnalysisSettings) -> Self {
        Self {
            source,
            settings,
            engine: MetricsEngine::new(),
        }
    }

    /// Produces the `AnalysisRecord` for `symbol`, taken verbatim (case-sensitive).
    ///
    /// Fetches run one after another, then the metrics are computed in order. The first
    /// failure aborts the whole analysis; there are no partial records.
    pub async fn analyze(&self, symbol: &str) -> Result<AnalysisRecord, AnalyzerError> {
        if symbol.trim().is_empty() {
            return Err(AnalyzerError::InvalidSymbol(symbol.to_string()));
        }
        tracing::info!(symbol, "Starting analysis.");

        // 1. Fetch
        let prices = self
            .source
            .price_history(symbol, &self.settings.history_range)
            .await?;
        let income = self.source.statement(symbol, StatementKind::Income).await?;
        let cashflow = self.source.statement(symbol, StatementKind::CashFlow).await?;
        let balance = self.source.statement(symbol, StatementKind::BalanceSheet).await?;

        // 2. Score
        let sharpe = self.engine.sharpe_ratio(&prices)?;
        let beta = self.beta(&prices).await?;
        let piotroski = self.engine.piotroski_f_score(&income, &cashflow, &balance)?;
        let altman = self.engine.altman_z_score(&balance, &income)?;

        let record = AnalysisRecord {
            sharpe,
            beta,
            piotroski,
            altman,
        };
        tracing::info!(symbol, ?record, "Analysis complete.");
        Ok(record)
    }

    /// Beta against the configured benchmark. The benchmark history is fetched here,
    /// as a second call to the data source, rather than passed in.
    pub async fn beta(&self, prices: &PriceSeries) -> Result<f64, AnalyzerError> {
        let benchmark = self
            .source
            .price_history(&self.settings.benchmark_symbol, &self.settings.history_range)
            .await?;

        Ok(self
            .engine
            .beta(prices, &benchmark, self.settings.beta_alignment)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analytics::AnalyticsError;
    use api_client::error::ApiError;
    use api_client::InMemoryMarketData;
    use chrono::{Duration, NaiveDate};
    use core_types::{BetaAlignment, FinancialStatement, PricePoint};

    const TRADING_DAYS: usize = 252;

    fn settings() -> AnalysisSettings {
        AnalysisSettings {
            benchmark_symbol: "^GSPC".to_string(),
            history_range: "1y".to_string(),
            beta_alignment: BetaAlignment::Positional,
        }
    }

    fn series(symbol: &str, close: impl Fn(usize) -> f64) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2023, 6, 1).unwrap();
        let points = (0..=TRADING_DAYS)
            .map(|i| PricePoint::new(start + Duration::days(i as i64), close(i)))
            .collect();
        PriceSeries::new(symbol, points).unwrap()
    }

    fn rising(i: usize) -> f64 {
        100.0 + i as f64
    }

    fn benchmark(i: usize) -> f64 {
        4000.0 + 10.0 * i as f64 + if i % 2 == 0 { 15.0 } else { 0.0 }
    }

    fn favourable_statements() -> [FinancialStatement; 3] {
        [
            FinancialStatement::new(StatementKind::Income)
                .with_line_item("Net Income", vec![10.0, 8.0])
                .with_line_item("Gross Profit", vec![50.0, 40.0])
                .with_line_item("Total Revenue", vec![100.0, 100.0])
                .with_line_item("EBIT", vec![20.0, 15.0]),
            FinancialStatement::new(StatementKind::CashFlow)
                .with_line_item("Operating Cash Flow", vec![15.0, 12.0]),
            FinancialStatement::new(StatementKind::BalanceSheet)
                .with_line_item("Long Term Debt", vec![50.0, 60.0])
                .with_line_item("Total Assets", vec![200.0, 250.0])
                .with_line_item("Current Assets", vec![120.0, 100.0])
                .with_line_item("Current Liabilities", vec![60.0, 80.0])
                .with_line_item("Ordinary Shares Number", vec![1000.0, 1000.0])
                .with_line_item("Share Issued", vec![1100.0, 1100.0])
                .with_line_item("Retained Earnings", vec![70.0, 60.0])
                .with_line_item("Total Liabilities Net Minority Interest", vec![100.0, 130.0]),
        ]
    }

    fn source_for(symbol: &str, prices: PriceSeries) -> InMemoryMarketData {
        favourable_statements().into_iter().fold(
            InMemoryMarketData::new()
                .with_prices(prices)
                .with_prices(series("^GSPC", benchmark)),
            |source, statement| source.with_statement(symbol, statement),
        )
    }

    #[tokio::test]
    async fn analyze_assembles_all_four_metrics() {
        let source = source_for("AAPL", series("AAPL", rising));
        let service = AnalysisService::new(Arc::new(source.clone()), settings());

        let record = service.analyze("AAPL").await.unwrap();

        let engine = MetricsEngine::new();
        let prices = series("AAPL", rising);
        let market = series("^GSPC", benchmark);
        assert_eq!(record.sharpe, engine.sharpe_ratio(&prices).unwrap());
        assert_eq!(
            record.beta,
            engine.beta(&prices, &market, BetaAlignment::Positional).unwrap()
        );
        assert_eq!(record.piotroski, 8);
        assert_eq!(record.altman, 2.88);
        assert!(record.sharpe.is_finite() && record.beta.is_finite());
    }

    #[tokio::test]
    async fn fetches_run_in_order_with_benchmark_last() {
        let source = source_for("AAPL", series("AAPL", rising));
        let service = AnalysisService::new(Arc::new(source.clone()), settings());

        service.analyze("AAPL").await.unwrap();

        assert_eq!(
            source.requests(),
            vec![
                "prices AAPL 1y",
                "statement AAPL income statement",
                "statement AAPL cashflow statement",
                "statement AAPL balance sheet",
                "prices ^GSPC 1y",
            ]
        );
    }

    #[tokio::test]
    async fn flat_one_percent_gains_have_no_sharpe_ratio() {
        // Compounding exactly 1% a day gives identical daily returns and zero volatility.
        let mut closes = vec![100.0];
        for _ in 0..TRADING_DAYS {
            let last = closes[closes.len() - 1];
            closes.push(last * 1.01);
        }
        let source = source_for("AAPL", series("AAPL", |i| closes[i]));
        let service = AnalysisService::new(Arc::new(source), settings());

        let err = service.analyze("AAPL").await.unwrap_err();

        assert!(matches!(
            err,
            AnalyzerError::Metric(AnalyticsError::DivisionByZero(ref metric)) if metric == "sharpe ratio"
        ));
    }

    #[tokio::test]
    async fn missing_net_income_fails_the_whole_analysis() {
        let [mut income, cashflow, balance] = favourable_statements();
        income.remove("Net Income");
        let source = InMemoryMarketData::new()
            .with_prices(series("AAPL", rising))
            .with_prices(series("^GSPC", benchmark))
            .with_statement("AAPL", income)
            .with_statement("AAPL", cashflow)
            .with_statement("AAPL", balance);
        let service = AnalysisService::new(Arc::new(source), settings());

        let err = service.analyze("AAPL").await.unwrap_err();

        assert!(matches!(
            err,
            AnalyzerError::Metric(AnalyticsError::MissingLineItem(ref item)) if item == "Net Income"
        ));
    }

    #[tokio::test]
    async fn unknown_symbol_is_reported_as_not_found() {
        let source = source_for("AAPL", series("AAPL", rising));
        let service = AnalysisService::new(Arc::new(source), settings());

        let err = service.analyze("aapl").await.unwrap_err();

        assert!(matches!(
            err,
            AnalyzerError::MarketData(ApiError::SymbolNotFound(ref s)) if s == "aapl"
        ));
    }

    #[tokio::test]
    async fn empty_symbol_is_rejected_before_fetching() {
        let source = source_for("AAPL", series("AAPL", rising));
        let service = AnalysisService::new(Arc::new(source.clone()), settings());

        assert!(matches!(
            service.analyze(" ").await,
            Err(AnalyzerError::InvalidSymbol(_))
        ));
        assert!(source.requests().is_empty());
    }

    #[tokio::test]
    async fn missing_benchmark_fails_beta() {
        let source = InMemoryMarketData::new().with_prices(series("AAPL", rising));
        let service = AnalysisService::new(Arc::new(source), settings());

        let err = service.beta(&series("AAPL", rising)).await.unwrap_err();

        assert!(matches!(
            err,
            AnalyzerError::MarketData(ApiError::SymbolNotFound(ref s)) if s == "^GSPC"
        ));
    }
}
