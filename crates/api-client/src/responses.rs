use crate::error::ApiError;
use chrono::{DateTime, NaiveDate};
use core_types::{FinancialStatement, PricePoint, PriceSeries, StatementKind};
use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// The body of `GET /v8/finance/chart/{symbol}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChartResponse {
    pub chart: ChartEnvelope,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartEnvelope {
    #[serde(default)]
    pub result: Option<Vec<ChartResult>>,
    #[serde(default)]
    pub error: Option<YahooErrorResponse>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartResult {
    #[serde(default)]
    pub meta: Option<ChartMeta>,
    #[serde(default)]
    pub timestamp: Vec<i64>,
    pub indicators: ChartIndicators,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartMeta {
    /// Exchange offset from UTC in seconds, used to date each bar in local market time.
    #[serde(default)]
    pub gmtoffset: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartIndicators {
    #[serde(default)]
    pub quote: Vec<ChartQuote>,
    #[serde(default)]
    pub adjclose: Vec<ChartAdjClose>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartQuote {
    #[serde(default)]
    pub close: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartAdjClose {
    #[serde(default)]
    pub adjclose: Vec<Option<f64>>,
}

/// Represents an error object embedded in a Yahoo response.
#[derive(Debug, Clone, Deserialize)]
pub struct YahooErrorResponse {
    pub code: String,
    #[serde(default)]
    pub description: String,
}

impl YahooErrorResponse {
    pub fn is_not_found(&self) -> bool {
        self.code.eq_ignore_ascii_case("Not Found")
    }
}

/// The body of `GET /ws/fundamentals-timeseries/v1/finance/timeseries/{symbol}`.
#[derive(Debug, Clone, Deserialize)]
pub struct TimeseriesResponse {
    pub timeseries: TimeseriesEnvelope,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TimeseriesEnvelope {
    #[serde(default)]
    pub result: Option<Vec<TimeseriesResult>>,
    #[serde(default)]
    pub error: Option<YahooErrorResponse>,
}

/// One requested series. The values live under a key equal to `meta.type[0]`,
/// e.g. `"annualNetIncome": [...]`, so they are captured as raw JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct TimeseriesResult {
    pub meta: TimeseriesMeta,
    #[serde(flatten)]
    pub series: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TimeseriesMeta {
    #[serde(rename = "type", default)]
    pub types: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeseriesPoint {
    pub as_of_date: NaiveDate,
    pub reported_value: ReportedValue,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportedValue {
    pub raw: f64,
}

/// Converts a chart response into a `PriceSeries` of dividend- and split-adjusted closes.
///
/// Rows with a missing close are skipped. When the provider repeats a trading day
/// (the in-progress session), the later row wins.
pub fn price_series_from_chart(symbol: &str, response: ChartResponse) -> Result<PriceSeries, ApiError> {
    if let Some(error) = response.chart.error {
        if error.is_not_found() {
            return Err(ApiError::SymbolNotFound(symbol.to_string()));
        }
        return Err(ApiError::ApiError(format!("{}: {}", error.code, error.description)));
    }

    let result = response
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| ApiError::SymbolNotFound(symbol.to_string()))?;

    let gmtoffset = result.meta.as_ref().map_or(0, |m| m.gmtoffset);
    let closes = match result.indicators.adjclose.into_iter().next() {
        Some(adjusted) => adjusted.adjclose,
        None => result
            .indicators
            .quote
            .into_iter()
            .next()
            .map(|q| q.close)
            .unwrap_or_default(),
    };

    let mut points: Vec<PricePoint> = Vec::with_capacity(result.timestamp.len());
    for (ts, close) in result.timestamp.iter().zip(closes) {
        let Some(close) = close else { continue };
        let date = DateTime::from_timestamp(ts + gmtoffset, 0)
            .ok_or_else(|| ApiError::InvalidData(format!("Invalid bar timestamp: {}", ts)))?
            .date_naive();

        match points.last_mut() {
            Some(last) if last.date == date => last.close = close,
            _ => points.push(PricePoint::new(date, close)),
        }
    }

    PriceSeries::new(symbol, points).map_err(|e| ApiError::InvalidData(e.to_string()))
}

/// The line items requested for each statement, as (Yahoo key, line-item name).
pub fn statement_line_items(kind: StatementKind) -> &'static [(&'static str, &'static str)] {
    match kind {
        StatementKind::Income => &[
            ("TotalRevenue", "Total Revenue"),
            ("CostOfRevenue", "Cost Of Revenue"),
            ("GrossProfit", "Gross Profit"),
            ("OperatingIncome", "Operating Income"),
            ("EBIT", "EBIT"),
            ("EBITDA", "EBITDA"),
            ("InterestExpense", "Interest Expense"),
            ("TaxProvision", "Tax Provision"),
            ("NetIncome", "Net Income"),
            ("BasicEPS", "Basic EPS"),
            ("DilutedEPS", "Diluted EPS"),
        ],
        StatementKind::CashFlow => &[
            ("OperatingCashFlow", "Operating Cash Flow"),
            ("InvestingCashFlow", "Investing Cash Flow"),
            ("FinancingCashFlow", "Financing Cash Flow"),
            ("CapitalExpenditure", "Capital Expenditure"),
            ("FreeCashFlow", "Free Cash Flow"),
            ("RepurchaseOfCapitalStock", "Repurchase Of Capital Stock"),
            ("CashDividendsPaid", "Cash Dividends Paid"),
        ],
        StatementKind::BalanceSheet => &[
            ("TotalAssets", "Total Assets"),
            ("CurrentAssets", "Current Assets"),
            ("CashAndCashEquivalents", "Cash And Cash Equivalents"),
            ("CurrentLiabilities", "Current Liabilities"),
            ("TotalLiabilitiesNetMinorityInterest", "Total Liabilities Net Minority Interest"),
            ("LongTermDebt", "Long Term Debt"),
            ("TotalDebt", "Total Debt"),
            ("StockholdersEquity", "Stockholders Equity"),
            ("RetainedEarnings", "Retained Earnings"),
            ("WorkingCapital", "Working Capital"),
            ("OrdinarySharesNumber", "Ordinary Shares Number"),
            ("ShareIssued", "Share Issued"),
        ],
    }
}

/// Prefix Yahoo puts in front of every annual series key.
pub const ANNUAL_PREFIX: &str = "annual";

/// Converts a time-series response into a statement table, most recent fiscal year first.
///
/// A line item with no reported values is left out of the table entirely. A line item
/// that skips a year holds `NaN` for that period.
pub fn statement_from_timeseries(
    kind: StatementKind,
    response: TimeseriesResponse,
) -> Result<FinancialStatement, ApiError> {
    if let Some(error) = response.timeseries.error {
        return Err(ApiError::ApiError(format!("{}: {}", error.code, error.description)));
    }

    let names: BTreeMap<String, &str> = statement_line_items(kind)
        .iter()
        .map(|(key, name)| (format!("{}{}", ANNUAL_PREFIX, key), *name))
        .collect();

    let mut reported: Vec<(&str, BTreeMap<NaiveDate, f64>)> = Vec::new();
    for result in response.timeseries.result.unwrap_or_default() {
        let Some(key) = result.meta.types.first() else { continue };
        let Some(name) = names.get(key) else { continue };
        let Some(raw) = result.series.get(key) else { continue };

        let entries: Vec<Option<TimeseriesPoint>> = serde_json::from_value(raw.clone())
            .map_err(|e| ApiError::Deserialization(format!("{}: {}", key, e)))?;
        let values: BTreeMap<NaiveDate, f64> = entries
            .into_iter()
            .flatten()
            .map(|p| (p.as_of_date, p.reported_value.raw))
            .collect();

        if !values.is_empty() {
            reported.push((*name, values));
        }
    }

    let periods: BTreeSet<NaiveDate> = reported
        .iter()
        .flat_map(|(_, values)| values.keys().copied())
        .collect();
    let period_ends: Vec<NaiveDate> = periods.into_iter().rev().collect();

    let mut statement = FinancialStatement::new(kind).with_period_ends(period_ends.clone());
    for (name, values) in reported {
        let row = period_ends
            .iter()
            .map(|date| values.get(date).copied().unwrap_or(f64::NAN))
            .collect();
        statement.insert(name, row);
    }

    Ok(statement)
}
