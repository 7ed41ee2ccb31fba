use crate::error::AnalyticsError;
use crate::stats::{mean, round_to, sample_covariance, sample_std_dev, sample_variance, simple_returns};
use chrono::NaiveDate;
use core_types::{BetaAlignment, FinancialStatement, PriceSeries};
use std::collections::BTreeMap;

/// Trading days used to annualize daily volatility.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Risk-free rate subtracted from the mean *daily* return in the Sharpe ratio.
pub const RISK_FREE_RATE: f64 = 0.03;

/// Fractional digits kept for the continuous scores.
const SCORE_DECIMALS: i32 = 3;

/// A stateless calculator for the diagnostic metrics of a single equity.
#[derive(Debug, Default, Clone, Copy)]
pub struct MetricsEngine {}

impl MetricsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Annualized Sharpe ratio of one year of daily closes.
    ///
    /// `(mean(r) - RISK_FREE_RATE) / (std(r) * sqrt(252))` over simple daily returns `r`,
    /// with the sample standard deviation, rounded to three decimals.
    pub fn sharpe_ratio(&self, prices: &PriceSeries) -> Result<f64, AnalyticsError> {
        if prices.len() < 2 {
            return Err(AnalyticsError::InsufficientData(format!(
                "sharpe ratio needs at least 2 closing prices, got {}",
                prices.len()
            )));
        }

        let closes: Vec<f64> = prices.closes().collect();
        let returns = simple_returns(&closes);

        let mean_return = mean(&returns).ok_or_else(|| {
            AnalyticsError::InsufficientData("sharpe ratio has no daily returns".to_string())
        })?;
        let std_dev = sample_std_dev(&returns).ok_or_else(|| {
            AnalyticsError::InsufficientData(format!(
                "sharpe ratio needs at least 2 daily returns, got {}",
                returns.len()
            ))
        })?;

        // A flat series has zero volatility; report it rather than emit NaN or inf.
        if std_dev == 0.0 {
            return Err(AnalyticsError::DivisionByZero("sharpe ratio".to_string()));
        }

        let ratio = (mean_return - RISK_FREE_RATE) / (std_dev * TRADING_DAYS_PER_YEAR.sqrt());
        tracing::debug!(symbol = prices.symbol(), mean_return, std_dev, ratio, "Computed sharpe ratio.");

        Ok(round_to(ratio, SCORE_DECIMALS))
    }

    /// Beta of `prices` against `benchmark`: sample covariance of the two daily return
    /// series over the sample variance of the benchmark returns, rounded to three decimals.
    ///
    /// With `BetaAlignment::Positional` the trailing returns are paired by position, so two
    /// series on different trading calendars are compared day-for-day regardless of dates.
    pub fn beta(
        &self,
        prices: &PriceSeries,
        benchmark: &PriceSeries,
        alignment: BetaAlignment,
    ) -> Result<f64, AnalyticsError> {
        let (stock_returns, market_returns) = match alignment {
            BetaAlignment::Positional => positional_returns(prices, benchmark),
            BetaAlignment::ByDate => dated_returns(prices, benchmark),
        };

        if stock_returns.len() < 2 {
            return Err(AnalyticsError::InsufficientData(format!(
                "beta needs at least 2 paired daily returns, got {}",
                stock_returns.len()
            )));
        }

        let covariance = sample_covariance(&stock_returns, &market_returns).ok_or_else(|| {
            AnalyticsError::InsufficientData("beta return series could not be paired".to_string())
        })?;
        let variance = sample_variance(&market_returns).ok_or_else(|| {
            AnalyticsError::InsufficientData("beta benchmark has too few returns".to_string())
        })?;

        if variance == 0.0 {
            return Err(AnalyticsError::DivisionByZero("beta".to_string()));
        }

        let beta = covariance / variance;
        tracing::debug!(
            symbol = prices.symbol(),
            benchmark = benchmark.symbol(),
            pairs = stock_returns.len(),
            beta,
            "Computed beta."
        );

        Ok(round_to(beta, SCORE_DECIMALS))
    }

    /// Piotroski F-Score over the two most recent fiscal periods.
    ///
    /// Criterion 4 (lower long-term debt) is evaluated but does not contribute to the
    /// total, so the highest reachable score is 8.
    pub fn piotroski_f_score(
        &self,
        income: &FinancialStatement,
        cashflow: &FinancialStatement,
        balance: &FinancialStatement,
    ) -> Result<u8, AnalyticsError> {
        let mut score = 0u8;

        // 1. Positive net income
        let net_income = two_periods(income, "Net Income")?;
        if net_income.current > 0.0 {
            score += 1;
        }

        // 2. Positive operating cash flow
        let operating_cash_flow = two_periods(cashflow, "Operating Cash Flow")?;
        if operating_cash_flow.current > 0.0 {
            score += 1;
        }

        // 3. Cash flow from operations exceeds net income
        if operating_cash_flow.current > net_income.current {
            score += 1;
        }

        // 4. Less long-term debt than the prior year. Not counted.
        let long_term_debt = two_periods(balance, "Long Term Debt")?;
        let total_assets = two_periods(balance, "Total Assets")?;
        let debt_reduced = long_term_debt.prior > long_term_debt.current;
        tracing::debug!(debt_reduced, "Piotroski criterion 4 evaluated, not scored.");

        // 5. Higher current ratio
        let current_assets = two_periods(balance, "Current Assets")?;
        let current_liabilities = two_periods(balance, "Current Liabilities")?;
        let current_ratio = current_assets.ratio(&current_liabilities);
        if current_ratio.prior < current_ratio.current {
            score += 1;
        }

        // 6. No new shares issued
        let ordinary_shares = two_periods(balance, "Ordinary Shares Number")?;
        let shares_issued = two_periods(balance, "Share Issued")?;
        if ordinary_shares.current == ordinary_shares.prior
            && shares_issued.current == shares_issued.prior
        {
            score += 1;
        }

        // 7. Higher gross margin
        let gross_profit = two_periods(income, "Gross Profit")?;
        let total_revenue = two_periods(income, "Total Revenue")?;
        let gross_margin = gross_profit.ratio(&total_revenue).scale(100.0);
        if gross_margin.current > gross_margin.prior {
            score += 1;
        }

        // 8. Higher asset turnover
        let asset_turnover = total_revenue.ratio(&total_assets);
        if asset_turnover.prior < asset_turnover.current {
            score += 1;
        }

        // 9. Higher return on assets
        let return_on_assets = net_income.ratio(&total_assets);
        if return_on_assets.current > return_on_assets.prior {
            score += 1;
        }

        tracing::debug!(score, "Computed Piotroski F-Score.");
        Ok(score)
    }

    /// Altman Z-Score from the most recent balance sheet and income statement.
    pub fn altman_z_score(
        &self,
        balance: &FinancialStatement,
        income: &FinancialStatement,
    ) -> Result<f64, AnalyticsError> {
        let working_capital =
            current_value(balance, "Current Assets")? - current_value(balance, "Current Liabilities")?;
        let retained_earnings = current_value(balance, "Retained Earnings")?;
        let ebit = current_value(income, "EBIT")?;
        let total_assets = current_value(balance, "Total Assets")?;
        let total_liabilities = current_value(balance, "Total Liabilities Net Minority Interest")?;
        let sales = current_value(income, "Total Revenue")?;

        if total_assets == 0.0 {
            return Err(AnalyticsError::DivisionByZero(
                "altman z-score (Total Assets)".to_string(),
            ));
        }
        if total_liabilities == 0.0 {
            return Err(AnalyticsError::DivisionByZero(
                "altman z-score (Total Liabilities Net Minority Interest)".to_string(),
            ));
        }

        let z1 = 1.2 * working_capital / total_assets;
        let z2 = 1.4 * retained_earnings / total_assets;
        let z3 = 3.3 * ebit / total_assets;
        let z4 = 0.6 * total_assets / total_liabilities;
        let z5 = 1.0 * sales / total_assets;

        let z_score = z1 + z2 + z3 + z4 + z5;
        tracing::debug!(z1, z2, z3, z4, z5, z_score, "Computed Altman Z-Score.");

        Ok(round_to(z_score, SCORE_DECIMALS))
    }
}

/// Current and prior-period values of one line item, or of a ratio of two.
#[derive(Debug, Clone, Copy)]
struct YearOverYear {
    current: f64,
    prior: f64,
}

impl YearOverYear {
    fn ratio(&self, denominator: &YearOverYear) -> YearOverYear {
        YearOverYear {
            current: self.current / denominator.current,
            prior: self.prior / denominator.prior,
        }
    }

    fn scale(&self, factor: f64) -> YearOverYear {
        YearOverYear {
            current: self.current * factor,
            prior: self.prior * factor,
        }
    }
}

fn line_item<'a>(statement: &'a FinancialStatement, name: &str) -> Result<&'a [f64], AnalyticsError> {
    statement
        .line_item(name)
        .ok_or_else(|| AnalyticsError::MissingLineItem(name.to_string()))
}

fn current_value(statement: &FinancialStatement, name: &str) -> Result<f64, AnalyticsError> {
    let value = line_item(statement, name)?
        .first()
        .copied()
        .ok_or_else(|| AnalyticsError::InsufficientData(format!("'{}' has no reported periods", name)))?;
    if !value.is_finite() {
        return Err(AnalyticsError::InsufficientData(format!(
            "'{}' is not reported for the current period",
            name
        )));
    }
    Ok(value)
}

fn two_periods(statement: &FinancialStatement, name: &str) -> Result<YearOverYear, AnalyticsError> {
    match line_item(statement, name)? {
        [current, prior, ..] => Ok(YearOverYear {
            current: *current,
            prior: *prior,
        }),
        values => Err(AnalyticsError::InsufficientData(format!(
            "'{}' needs 2 periods for a year-over-year comparison, got {}",
            name,
            values.len()
        ))),
    }
}

/// Pairs the trailing `min(n, m)` returns of both series by position.
fn positional_returns(prices: &PriceSeries, benchmark: &PriceSeries) -> (Vec<f64>, Vec<f64>) {
    let stock: Vec<f64> = simple_returns(&prices.closes().collect::<Vec<_>>());
    let market: Vec<f64> = simple_returns(&benchmark.closes().collect::<Vec<_>>());

    let paired = stock.len().min(market.len());
    (
        stock[stock.len() - paired..].to_vec(),
        market[market.len() - paired..].to_vec(),
    )
}

/// Pairs returns that end on the same date in both series.
fn dated_returns(prices: &PriceSeries, benchmark: &PriceSeries) -> (Vec<f64>, Vec<f64>) {
    let market: BTreeMap<NaiveDate, f64> = dated_simple_returns(benchmark).collect();

    dated_simple_returns(prices)
        .filter_map(|(date, stock)| market.get(&date).map(|m| (stock, *m)))
        .unzip()
}

fn dated_simple_returns(series: &PriceSeries) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
    series
        .points()
        .windows(2)
        .map(|w| (w[1].date, w[1].close / w[0].close - 1.0))
}
