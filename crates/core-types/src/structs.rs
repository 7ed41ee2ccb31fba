use crate::enums::StatementKind;
use crate::error::CoreError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single daily closing price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }
}

/// An ordered series of daily closes for one symbol over a trailing window.
///
/// The constructor enforces that dates are strictly increasing and that every
/// close is a positive, finite number. Once built, the series is read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    symbol: String,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(symbol: impl Into<String>, points: Vec<PricePoint>) -> Result<Self, CoreError> {
        let symbol = symbol.into();

        if let Some(bad) = points.iter().find(|p| !(p.close.is_finite() && p.close > 0.0)) {
            return Err(CoreError::InvalidInput(
                "PriceSeries".to_string(),
                format!("close on {} must be positive, got {}", bad.date, bad.close),
            ));
        }

        if let Some(w) = points.windows(2).find(|w| w[1].date <= w[0].date) {
            return Err(CoreError::InvalidInput(
                "PriceSeries".to_string(),
                format!("dates must be strictly increasing ({} then {})", w[0].date, w[1].date),
            ));
        }

        Ok(Self { symbol, points })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn closes(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.close)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// One financial statement (income, cashflow or balance sheet) across several fiscal periods.
///
/// Every line item holds one value per period, most recent period first: index 0 is the
/// current period and index 1 the prior one. A value that was not reported for a period
/// is stored as `NaN`, so comparisons against it are simply false.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialStatement {
    pub kind: StatementKind,
    /// Fiscal period end dates, most recent first. May be empty for hand-built tables.
    pub period_ends: Vec<NaiveDate>,
    line_items: BTreeMap<String, Vec<f64>>,
}

impl FinancialStatement {
    pub fn new(kind: StatementKind) -> Self {
        Self {
            kind,
            period_ends: Vec::new(),
            line_items: BTreeMap::new(),
        }
    }

    pub fn with_period_ends(mut self, period_ends: Vec<NaiveDate>) -> Self {
        self.period_ends = period_ends;
        self
    }

    /// Adds (or replaces) a line item. Values are ordered most recent period first.
    pub fn with_line_item(mut self, name: impl Into<String>, values: Vec<f64>) -> Self {
        self.insert(name, values);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, values: Vec<f64>) {
        self.line_items.insert(name.into(), values);
    }

    pub fn remove(&mut self, name: &str) -> Option<Vec<f64>> {
        self.line_items.remove(name)
    }

    /// Returns the per-period values of a line item, or `None` when the item is absent.
    pub fn line_item(&self, name: &str) -> Option<&[f64]> {
        self.line_items.get(name).map(Vec::as_slice)
    }

    pub fn line_item_names(&self) -> impl Iterator<Item = &str> {
        self.line_items.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.line_items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn price_series_accepts_ordered_positive_closes() {
        let series = PriceSeries::new(
            "AAPL",
            vec![PricePoint::new(day(2), 10.0), PricePoint::new(day(3), 10.5)],
        )
        .unwrap();

        assert_eq!(series.symbol(), "AAPL");
        assert_eq!(series.closes().collect::<Vec<_>>(), vec![10.0, 10.5]);
    }

    #[test]
    fn price_series_rejects_unordered_dates() {
        let err = PriceSeries::new(
            "AAPL",
            vec![PricePoint::new(day(3), 10.0), PricePoint::new(day(3), 10.5)],
        )
        .unwrap_err();

        assert!(matches!(err, CoreError::InvalidInput(..)));
    }

    #[test]
    fn price_series_rejects_non_positive_close() {
        assert!(PriceSeries::new("AAPL", vec![PricePoint::new(day(2), 0.0)]).is_err());
        assert!(PriceSeries::new("AAPL", vec![PricePoint::new(day(2), f64::NAN)]).is_err());
    }

    #[test]
    fn statement_lookup_is_exact() {
        let stmt = FinancialStatement::new(StatementKind::Income)
            .with_line_item("Net Income", vec![5.0, 4.0]);

        assert_eq!(stmt.line_item("Net Income"), Some(&[5.0, 4.0][..]));
        assert_eq!(stmt.line_item("net income"), None);
    }
}
