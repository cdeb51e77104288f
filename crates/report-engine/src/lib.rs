//! Report assembly: resolve the input, fetch history once, derive every
//! indicator from that single series, and compose the response payloads.

pub mod reports;

pub use reports::*;

use std::collections::HashMap;
use std::sync::Arc;

use market_data::HistoryFetcher;
use stock_core::{Bar, Fundamentals, Lookback, MarketData, StockError};
use technical_indicators::{ema, macd, round2, rsi, sma};
use ticker_directory::TickerDirectory;

/// Default SMA/EMA window when a request does not specify one.
pub const DEFAULT_WINDOW: usize = 14;

pub struct ReportEngine {
    directory: Arc<TickerDirectory>,
    fetcher: HistoryFetcher,
    provider: Arc<dyn MarketData>,
}

impl ReportEngine {
    pub fn new(directory: Arc<TickerDirectory>, provider: Arc<dyn MarketData>) -> Self {
        Self {
            directory,
            fetcher: HistoryFetcher::new(provider.clone()),
            provider,
        }
    }

    /// Replace the default fetch policy. Tests use a short backoff.
    pub fn with_fetcher(
        directory: Arc<TickerDirectory>,
        provider: Arc<dyn MarketData>,
        fetcher: HistoryFetcher,
    ) -> Self {
        Self {
            directory,
            fetcher,
            provider,
        }
    }

    pub fn resolve(&self, input: &str) -> Result<String, StockError> {
        self.directory.resolve(input)
    }

    /// Full report for one company input: metrics plus chart series.
    pub async fn full_report(
        &self,
        company_input: &str,
        window: usize,
        lookback: Lookback,
    ) -> Result<StockReport, StockError> {
        if window == 0 {
            return Err(StockError::MalformedInput(
                "window must be at least 1".to_string(),
            ));
        }

        let ticker = self.directory.resolve(company_input)?;
        let bars = self.fetcher.fetch(&ticker, lookback).await?;
        let fundamentals = self.provider.fundamentals(&ticker).await;

        assemble_report(ticker, &bars, window, fundamentals)
    }

    /// Compact metrics for one company input.
    pub async fn compact_metrics(
        &self,
        company_input: &str,
        lookback: Lookback,
    ) -> Result<TickerMetrics, StockError> {
        let ticker = self.directory.resolve(company_input)?;
        self.ticker_metrics(&ticker, lookback).await
    }

    /// Compact metrics for a ticker symbol directly, bypassing resolution.
    pub async fn metrics_for_ticker(
        &self,
        ticker: &str,
        lookback: Lookback,
    ) -> Result<TickerMetrics, StockError> {
        self.ticker_metrics(&ticker.trim().to_uppercase(), lookback).await
    }

    /// Compact metrics for a list of company inputs. Constituents are
    /// processed sequentially and fail independently; one bad input never
    /// aborts its siblings.
    pub async fn batch_metrics(&self, inputs: &[String], lookback: Lookback) -> BatchReport {
        let mut results = HashMap::new();
        let mut success = false;

        for input in inputs {
            match self.directory.resolve(input) {
                Ok(ticker) => {
                    let outcome = self.ticker_metrics(&ticker, lookback).await;
                    success |= outcome.is_ok();
                    results.insert(ticker, outcome);
                }
                Err(e) => {
                    tracing::warn!("Batch constituent '{input}' did not resolve: {e}");
                    results.insert(input.clone(), Err(e));
                }
            }
        }

        BatchReport { success, results }
    }

    async fn ticker_metrics(
        &self,
        ticker: &str,
        lookback: Lookback,
    ) -> Result<TickerMetrics, StockError> {
        let bars = self.fetcher.fetch(ticker, lookback).await?;
        let fundamentals = self.provider.fundamentals(ticker).await;

        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let latest_price = latest_close(ticker, &closes)?;

        Ok(TickerMetrics {
            ticker: ticker.to_string(),
            latest_price: round2(latest_price),
            fundamentals,
            rsi: rsi(&closes).last().copied().map(round2),
            macd_line: round2(macd(&closes).macd[closes.len() - 1]),
        })
    }
}

// the fetcher never yields an empty series
fn latest_close(ticker: &str, closes: &[f64]) -> Result<f64, StockError> {
    closes
        .last()
        .copied()
        .ok_or_else(|| StockError::Provider(format!("empty price series for {ticker}")))
}

fn assemble_report(
    ticker: String,
    bars: &[Bar],
    window: usize,
    fundamentals: Fundamentals,
) -> Result<StockReport, StockError> {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let latest_price = latest_close(&ticker, &closes)?;
    let last = closes.len() - 1;

    let sma_series = sma(&closes, window);
    let ema_series = ema(&closes, window);
    let rsi_series = rsi(&closes);
    let macd_series = macd(&closes);

    let chart = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| ChartPoint {
            date: bar.date,
            close: bar.close,
            sma: sma_series[i],
            ema: ema_series[i],
        })
        .collect();

    let metrics = MetricsReport {
        latest_price: round2(latest_price),
        sma: sma_series[last].map(round2),
        ema: round2(ema_series[last]),
        rsi: rsi_series.last().copied().map(round2),
        macd: round2(macd_series.macd[last]),
        signal: round2(macd_series.signal[last]),
        histogram: round2(macd_series.histogram[last]),
        fundamentals,
    };

    Ok(StockReport {
        ticker,
        metrics,
        chart,
    })
}
