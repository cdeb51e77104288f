use async_trait::async_trait;

use crate::{Bar, Fundamentals, Lookback, StockError};

/// Trait for market-data providers.
#[async_trait]
pub trait MarketData: Send + Sync {
    /// Daily bars for `ticker` over `lookback`, ascending by date. An empty
    /// vector is a valid response and distinct from an error; callers decide
    /// the retry policy.
    async fn history(&self, ticker: &str, lookback: Lookback) -> Result<Vec<Bar>, StockError>;

    /// Valuation ratios for `ticker`. Missing fields are `None`;
    /// implementations degrade to `Fundamentals::default()` instead of
    /// failing, so a missing ratio never aborts a report.
    async fn fundamentals(&self, ticker: &str) -> Fundamentals;
}
