use serde::{Deserialize, Serialize};
use std::fmt;

/// The three financial statements a company reports each fiscal period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatementKind {
    Income,
    CashFlow,
    BalanceSheet,
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatementKind::Income => "income statement",
            StatementKind::CashFlow => "cashflow statement",
            StatementKind::BalanceSheet => "balance sheet",
        };
        f.write_str(name)
    }
}

/// How the stock and benchmark return series are paired before computing beta.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BetaAlignment {
    /// Pair the trailing returns of both series by position, regardless of their dates.
    #[default]
    Positional,
    /// Pair only the returns whose closing dates appear in both series.
    ByDate,
}
