//! Bounded-retry retrieval of historical price series.

use std::sync::Arc;
use std::time::Duration;

use stock_core::{Bar, Lookback, MarketData, StockError};

const MAX_ATTEMPTS: u32 = 3;
const RETRY_BACKOFF: Duration = Duration::from_secs(1);

/// Fetches price history with bounded retries.
///
/// An empty series and a provider error both trigger a retry after the
/// backoff; the two exhaust into distinct terminal errors so callers can
/// tell "no data" apart from "fetch error". Retries block only the
/// requesting task.
pub struct HistoryFetcher {
    provider: Arc<dyn MarketData>,
    max_attempts: u32,
    backoff: Duration,
}

impl HistoryFetcher {
    pub fn new(provider: Arc<dyn MarketData>) -> Self {
        Self {
            provider,
            max_attempts: MAX_ATTEMPTS,
            backoff: RETRY_BACKOFF,
        }
    }

    /// Override the retry policy. Tests use a short backoff.
    pub fn with_policy(provider: Arc<dyn MarketData>, max_attempts: u32, backoff: Duration) -> Self {
        Self {
            provider,
            max_attempts,
            backoff,
        }
    }

    pub async fn fetch(&self, ticker: &str, lookback: Lookback) -> Result<Vec<Bar>, StockError> {
        for attempt in 1..=self.max_attempts {
            match self.provider.history(ticker, lookback).await {
                Ok(bars) if !bars.is_empty() => return Ok(bars),
                Ok(_) => {
                    tracing::debug!(
                        "Empty history for {ticker} on attempt {attempt}/{}",
                        self.max_attempts
                    );
                }
                Err(e) if attempt == self.max_attempts => {
                    return Err(StockError::FetchFailed {
                        ticker: ticker.to_string(),
                        attempts: self.max_attempts,
                        reason: e.to_string(),
                    });
                }
                Err(e) => {
                    tracing::warn!(
                        "History fetch for {ticker} failed on attempt {attempt}/{}: {e}",
                        self.max_attempts
                    );
                }
            }

            if attempt < self.max_attempts {
                tokio::time::sleep(self.backoff).await;
            }
        }

        Err(StockError::NoData {
            ticker: ticker.to_string(),
            attempts: self.max_attempts,
        })
    }
}
