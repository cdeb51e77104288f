//! Yahoo Finance provider client.
//!
//! Two read-only endpoints are used: the chart API for daily price history
//! and the quote-summary API for valuation ratios. The provider is treated
//! as unreliable; history errors are surfaced for the fetcher's retry
//! policy, while fundamentals degrade to an all-missing snapshot.

use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use reqwest::Client;
use serde::Deserialize;

use stock_core::{Bar, Fundamentals, Lookback, MarketData, StockError};

const BASE_URL: &str = "https://query1.finance.yahoo.com";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
const SUMMARY_MODULES: &str = "summaryDetail,defaultKeyStatistics,financialData";

#[derive(Clone)]
pub struct YahooClient {
    client: Client,
}

impl YahooClient {
    pub fn new() -> Result<Self, StockError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| StockError::Provider(e.to_string()))?;
        Ok(Self { client })
    }

    fn chart_url(ticker: &str, lookback: Lookback) -> String {
        format!(
            "{BASE_URL}/v8/finance/chart/{ticker}?range={}&interval=1d",
            lookback.as_range()
        )
    }

    fn summary_url(ticker: &str) -> String {
        format!("{BASE_URL}/v10/finance/quoteSummary/{ticker}?modules={SUMMARY_MODULES}")
    }

    async fn get_text(&self, url: &str) -> Result<String, StockError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| StockError::Provider(e.to_string()))?;

        if !response.status().is_success() {
            return Err(StockError::Provider(format!("HTTP {}", response.status())));
        }

        response
            .text()
            .await
            .map_err(|e| StockError::Provider(e.to_string()))
    }

    fn parse_chart(body: &str) -> Result<Vec<Bar>, StockError> {
        let parsed: ChartResponse =
            serde_json::from_str(body).map_err(|e| StockError::Provider(e.to_string()))?;

        if let Some(error) = parsed.chart.error {
            return Err(StockError::Provider(format!(
                "{}: {}",
                error.code, error.description
            )));
        }

        let result = match parsed.chart.result.and_then(|mut r| {
            if r.is_empty() {
                None
            } else {
                Some(r.remove(0))
            }
        }) {
            Some(result) => result,
            None => return Ok(vec![]),
        };

        let quote = match result.indicators.quote.first() {
            Some(quote) => quote,
            None => return Ok(vec![]),
        };

        let mut bars: Vec<Bar> = Vec::with_capacity(result.timestamp.len());
        for (i, &ts) in result.timestamp.iter().enumerate() {
            let open = quote.open.get(i).copied().flatten();
            let high = quote.high.get(i).copied().flatten();
            let low = quote.low.get(i).copied().flatten();
            let close = quote.close.get(i).copied().flatten();
            let volume = quote.volume.get(i).copied().flatten();
            let date = DateTime::from_timestamp(ts, 0).map(|dt| dt.date_naive());

            // skip partial rows
            let (Some(open), Some(high), Some(low), Some(close), Some(volume), Some(date)) =
                (open, high, low, close, volume, date)
            else {
                continue;
            };

            // the provider repeats the last session's date for live quotes;
            // keep the most recent row for a date
            if bars.last().is_some_and(|b| b.date == date) {
                bars.pop();
            }

            bars.push(Bar {
                date,
                open,
                high,
                low,
                close,
                volume,
            });
        }

        Ok(bars)
    }

    fn parse_summary(body: &str) -> Result<Fundamentals, StockError> {
        let parsed: SummaryResponse =
            serde_json::from_str(body).map_err(|e| StockError::Provider(e.to_string()))?;

        let modules = parsed
            .quote_summary
            .result
            .and_then(|mut r| if r.is_empty() { None } else { Some(r.remove(0)) })
            .unwrap_or_default();

        let detail = modules.summary_detail.unwrap_or_default();
        let stats = modules.key_statistics.unwrap_or_default();
        let financial = modules.financial_data.unwrap_or_default();

        Ok(Fundamentals {
            pe_ratio: raw(&detail.trailing_pe).or_else(|| raw(&detail.forward_pe)),
            pb_ratio: raw(&stats.price_to_book),
            ps_ratio: raw(&detail.price_to_sales),
            peg_ratio: raw(&stats.trailing_peg_ratio).or_else(|| raw(&stats.peg_ratio)),
            roe: raw(&financial.return_on_equity),
        })
    }

    async fn fetch_summary(&self, ticker: &str) -> Result<Fundamentals, StockError> {
        let body = self.get_text(&Self::summary_url(ticker)).await?;
        Self::parse_summary(&body)
    }
}

#[async_trait]
impl MarketData for YahooClient {
    async fn history(&self, ticker: &str, lookback: Lookback) -> Result<Vec<Bar>, StockError> {
        let body = self.get_text(&Self::chart_url(ticker, lookback)).await?;
        Self::parse_chart(&body)
    }

    async fn fundamentals(&self, ticker: &str) -> Fundamentals {
        match self.fetch_summary(ticker).await {
            Ok(fundamentals) => fundamentals,
            Err(e) => {
                tracing::warn!("Could not fetch fundamentals for {ticker}: {e}");
                Fundamentals::default()
            }
        }
    }
}

fn raw(field: &Option<WrappedValue>) -> Option<f64> {
    field.as_ref().and_then(|v| v.raw)
}

#[derive(Deserialize)]
struct ChartResponse {
    chart: ChartEnvelope,
}

#[derive(Deserialize)]
struct ChartEnvelope {
    result: Option<Vec<ChartResult>>,
    error: Option<ProviderError>,
}

#[derive(Deserialize)]
struct ProviderError {
    code: String,
    description: String,
}

#[derive(Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: ChartIndicators,
}

#[derive(Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<QuoteBlock>,
}

#[derive(Deserialize)]
struct QuoteBlock {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

#[derive(Deserialize)]
struct SummaryResponse {
    #[serde(rename = "quoteSummary")]
    quote_summary: SummaryEnvelope,
}

#[derive(Deserialize)]
struct SummaryEnvelope {
    result: Option<Vec<SummaryModules>>,
}

#[derive(Deserialize, Default)]
struct SummaryModules {
    #[serde(rename = "summaryDetail")]
    summary_detail: Option<SummaryDetail>,
    #[serde(rename = "defaultKeyStatistics")]
    key_statistics: Option<KeyStatistics>,
    #[serde(rename = "financialData")]
    financial_data: Option<FinancialData>,
}

#[derive(Deserialize, Default)]
struct SummaryDetail {
    #[serde(rename = "trailingPE")]
    trailing_pe: Option<WrappedValue>,
    #[serde(rename = "forwardPE")]
    forward_pe: Option<WrappedValue>,
    #[serde(rename = "priceToSalesTrailing12Months")]
    price_to_sales: Option<WrappedValue>,
}

#[derive(Deserialize, Default)]
struct KeyStatistics {
    #[serde(rename = "priceToBook")]
    price_to_book: Option<WrappedValue>,
    #[serde(rename = "trailingPegRatio")]
    trailing_peg_ratio: Option<WrappedValue>,
    #[serde(rename = "pegRatio")]
    peg_ratio: Option<WrappedValue>,
}

#[derive(Deserialize, Default)]
struct FinancialData {
    #[serde(rename = "returnOnEquity")]
    return_on_equity: Option<WrappedValue>,
}

#[derive(Deserialize)]
struct WrappedValue {
    #[serde(default)]
    raw: Option<f64>,
}
