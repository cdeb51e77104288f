use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use stock_core::{Fundamentals, StockError};

/// Metrics derived from one price series. Metric values are rounded to 2
/// decimals; `None` means the series was too short for the indicator.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub latest_price: f64,
    pub sma: Option<f64>,
    pub ema: f64,
    pub rsi: Option<f64>,
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
    pub fundamentals: Fundamentals,
}

/// One day of chart output, aligned with the price series. Field names
/// match the chart payload consumed by the frontend.
#[derive(Debug, Clone, Serialize)]
pub struct ChartPoint {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Close")]
    pub close: f64,
    #[serde(rename = "SMA")]
    pub sma: Option<f64>,
    #[serde(rename = "EMA")]
    pub ema: f64,
}

/// Full single-ticker report: metrics plus the chart-ready series.
#[derive(Debug, Clone, Serialize)]
pub struct StockReport {
    pub ticker: String,
    pub metrics: MetricsReport,
    pub chart: Vec<ChartPoint>,
}

/// Compact per-ticker metrics used by the metrics and batch queries.
#[derive(Debug, Clone, Serialize)]
pub struct TickerMetrics {
    pub ticker: String,
    pub latest_price: f64,
    pub fundamentals: Fundamentals,
    pub rsi: Option<f64>,
    pub macd_line: f64,
}

/// Batch outcome keyed by resolved ticker, or by the raw input when
/// resolution failed before a ticker was known. `success` is true iff at
/// least one constituent succeeded.
#[derive(Debug)]
pub struct BatchReport {
    pub success: bool,
    pub results: HashMap<String, Result<TickerMetrics, StockError>>,
}
