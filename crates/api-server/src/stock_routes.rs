//! Stock report endpoints.
//!
//! Wire shapes match the frontend contract: every response carries a
//! `success` flag (except the simple-metrics payload), metric keys use the
//! legacy `currentPrice`/`PE`/`MACDLine` names, and chart rows use
//! `Date`/`Close`/`SMA`/`EMA`.

use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ApiError, AppState};
use report_engine::{ChartPoint, TickerMetrics, DEFAULT_WINDOW};
use stock_core::{Fundamentals, StockError};

pub fn stock_routes() -> Router<AppState> {
    Router::new()
        .route("/api/stock_data", post(stock_data))
        .route("/api/stock_metrics", post(stock_metrics))
        .route("/api/multi_stock_metrics", post(multi_stock_metrics))
        // legacy path kept for older frontends
        .route("/multi_stock_metrics", post(multi_stock_metrics))
        .route("/api/simple_metrics/:ticker", get(simple_metrics))
}

#[derive(Deserialize)]
struct StockDataRequest {
    #[serde(default)]
    company_input: String,
    #[serde(default = "default_window")]
    window: usize,
}

fn default_window() -> usize {
    DEFAULT_WINDOW
}

#[derive(Deserialize)]
struct StockMetricsRequest {
    #[serde(default)]
    company_input: String,
}

#[derive(Serialize)]
struct ValuationBlock {
    pe_ratio: f64,
    pb_ratio: f64,
    ps_ratio: f64,
    peg_ratio: f64,
    roe: f64,
}

impl From<&Fundamentals> for ValuationBlock {
    fn from(f: &Fundamentals) -> Self {
        Self {
            pe_ratio: f.pe_ratio.unwrap_or(0.0),
            pb_ratio: f.pb_ratio.unwrap_or(0.0),
            ps_ratio: f.ps_ratio.unwrap_or(0.0),
            peg_ratio: f.peg_ratio.unwrap_or(0.0),
            roe: f.roe.unwrap_or(0.0),
        }
    }
}

#[derive(Serialize)]
struct TechnicalBlock {
    latest_price: f64,
    rsi: Option<f64>,
    macd_line: f64,
}

#[derive(Serialize)]
struct MetricsData {
    valuation_and_profitability: ValuationBlock,
    technical_indicators: TechnicalBlock,
}

#[derive(Serialize)]
struct StockDataResponse {
    success: bool,
    ticker: String,
    metrics_data: MetricsData,
    chart_data: Vec<ChartPoint>,
}

async fn stock_data(
    State(state): State<AppState>,
    Json(req): Json<StockDataRequest>,
) -> Result<Json<StockDataResponse>, ApiError> {
    let report = state
        .engine
        .full_report(&req.company_input, req.window, state.lookback)
        .await?;

    Ok(Json(StockDataResponse {
        success: true,
        metrics_data: MetricsData {
            valuation_and_profitability: ValuationBlock::from(&report.metrics.fundamentals),
            technical_indicators: TechnicalBlock {
                latest_price: report.metrics.latest_price,
                rsi: report.metrics.rsi,
                macd_line: report.metrics.macd,
            },
        },
        chart_data: report.chart,
        ticker: report.ticker,
    }))
}

#[derive(Serialize)]
struct CompactMetricsBody {
    ticker: String,
    #[serde(rename = "currentPrice")]
    current_price: f64,
    #[serde(rename = "PE")]
    pe: f64,
    #[serde(rename = "PB")]
    pb: f64,
    #[serde(rename = "PEG")]
    peg: f64,
    #[serde(rename = "PS")]
    ps: f64,
    #[serde(rename = "ROE")]
    roe: f64,
    #[serde(rename = "RSI")]
    rsi: Option<f64>,
    #[serde(rename = "MACDLine")]
    macd_line: f64,
}

impl From<TickerMetrics> for CompactMetricsBody {
    fn from(m: TickerMetrics) -> Self {
        Self {
            current_price: m.latest_price,
            pe: m.fundamentals.pe_ratio.unwrap_or(0.0),
            pb: m.fundamentals.pb_ratio.unwrap_or(0.0),
            peg: m.fundamentals.peg_ratio.unwrap_or(0.0),
            ps: m.fundamentals.ps_ratio.unwrap_or(0.0),
            roe: m.fundamentals.roe.unwrap_or(0.0),
            rsi: m.rsi,
            macd_line: m.macd_line,
            ticker: m.ticker,
        }
    }
}

#[derive(Serialize)]
struct StockMetricsResponse {
    success: bool,
    #[serde(flatten)]
    metrics: CompactMetricsBody,
}

async fn stock_metrics(
    State(state): State<AppState>,
    Json(req): Json<StockMetricsRequest>,
) -> Result<Json<StockMetricsResponse>, ApiError> {
    let metrics = state
        .engine
        .compact_metrics(&req.company_input, state.lookback)
        .await?;

    Ok(Json(StockMetricsResponse {
        success: true,
        metrics: metrics.into(),
    }))
}

#[derive(Serialize)]
struct MultiEntry {
    success: bool,
    #[serde(flatten)]
    metrics: Option<CompactMetricsBody>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
struct MultiMetricsResponse {
    success: bool,
    data: HashMap<String, MultiEntry>,
}

async fn multi_stock_metrics(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<MultiMetricsResponse>, ApiError> {
    let Some(list) = body.get("company_inputs").and_then(Value::as_array) else {
        return Err(StockError::MalformedInput(
            "provide a list of company inputs in the 'company_inputs' field".to_string(),
        )
        .into());
    };
    if list.is_empty() {
        return Err(StockError::MalformedInput(
            "provide a list of company inputs in the 'company_inputs' field".to_string(),
        )
        .into());
    }

    let mut inputs = Vec::with_capacity(list.len());
    for item in list {
        match item.as_str() {
            Some(s) => inputs.push(s.to_string()),
            None => {
                return Err(StockError::MalformedInput(
                    "'company_inputs' must contain strings".to_string(),
                )
                .into())
            }
        }
    }

    let batch = state.engine.batch_metrics(&inputs, state.lookback).await;

    let data = batch
        .results
        .into_iter()
        .map(|(key, outcome)| {
            let entry = match outcome {
                Ok(metrics) => MultiEntry {
                    success: true,
                    metrics: Some(metrics.into()),
                    error: None,
                },
                Err(e) => MultiEntry {
                    success: false,
                    metrics: None,
                    error: Some(e.to_string()),
                },
            };
            (key, entry)
        })
        .collect();

    Ok(Json(MultiMetricsResponse {
        success: batch.success,
        data,
    }))
}

#[derive(Serialize)]
struct SimpleMetricsResponse {
    ticker: String,
    latest_price: f64,
    peg_ratio: f64,
    pe_ratio: f64,
    pb_ratio: f64,
    ps_ratio: f64,
    roe: f64,
    rsi: Option<f64>,
    macd_line: f64,
}

async fn simple_metrics(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
) -> Result<Json<SimpleMetricsResponse>, ApiError> {
    let m = state
        .engine
        .metrics_for_ticker(&ticker, state.lookback)
        .await?;

    Ok(Json(SimpleMetricsResponse {
        latest_price: m.latest_price,
        peg_ratio: m.fundamentals.peg_ratio.unwrap_or(0.0),
        pe_ratio: m.fundamentals.pe_ratio.unwrap_or(0.0),
        pb_ratio: m.fundamentals.pb_ratio.unwrap_or(0.0),
        ps_ratio: m.fundamentals.ps_ratio.unwrap_or(0.0),
        roe: m.fundamentals.roe.unwrap_or(0.0),
        rsi: m.rsi,
        macd_line: m.macd_line,
        ticker: m.ticker,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use chrono::NaiveDate;
    use tower::ServiceExt;

    use market_data::HistoryFetcher;
    use report_engine::ReportEngine;
    use stock_core::{Bar, Lookback, MarketData};
    use ticker_directory::{CompanyRecord, TickerDirectory};

    struct FixtureProvider;

    fn sample_bars() -> Vec<Bar> {
        (0..40)
            .map(|i| {
                let close = 150.0 + i as f64 * 0.25;
                Bar {
                    date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
                        + chrono::Duration::days(i as i64),
                    open: close - 0.5,
                    high: close + 1.0,
                    low: close - 1.0,
                    close,
                    volume: 1_000_000.0,
                }
            })
            .collect()
    }

    #[async_trait]
    impl MarketData for FixtureProvider {
        async fn history(
            &self,
            ticker: &str,
            _lookback: Lookback,
        ) -> Result<Vec<Bar>, StockError> {
            if ticker == "AAPL" {
                Ok(sample_bars())
            } else {
                Ok(vec![])
            }
        }

        async fn fundamentals(&self, _ticker: &str) -> Fundamentals {
            Fundamentals {
                pe_ratio: Some(24.35),
                ..Default::default()
            }
        }
    }

    fn test_state() -> AppState {
        let directory = Arc::new(TickerDirectory::from_records(vec![CompanyRecord {
            cik_str: None,
            ticker: "AAPL".to_string(),
            title: "Apple Inc.".to_string(),
        }]));
        let provider = Arc::new(FixtureProvider);
        let fetcher =
            HistoryFetcher::with_policy(provider.clone(), 3, Duration::from_millis(1));
        AppState {
            engine: Arc::new(ReportEngine::with_fetcher(directory, provider, fetcher)),
            lookback: Lookback::OneYear,
        }
    }

    async fn post_json(uri: &str, body: &str) -> Value {
        let app = stock_routes().with_state(test_state());
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn stock_data_returns_metrics_and_chart() {
        let body = post_json(
            "/api/stock_data",
            r#"{"company_input": "Apple", "window": 10}"#,
        )
        .await;

        assert_eq!(body["success"], Value::Bool(true));
        assert_eq!(body["ticker"], "AAPL");
        assert_eq!(
            body["metrics_data"]["valuation_and_profitability"]["pe_ratio"],
            24.35
        );
        let chart = body["chart_data"].as_array().unwrap();
        assert_eq!(chart.len(), 40);
        assert!(chart[0]["Date"].is_string());
        assert!(chart[0]["SMA"].is_null());
        assert!(chart[9]["SMA"].is_number());
        assert!(chart[0]["EMA"].is_number());
    }

    #[tokio::test]
    async fn stock_metrics_uses_legacy_field_names() {
        let body = post_json("/api/stock_metrics", r#"{"company_input": "AAPL"}"#).await;

        assert_eq!(body["success"], Value::Bool(true));
        assert_eq!(body["ticker"], "AAPL");
        assert!(body["currentPrice"].is_number());
        assert_eq!(body["PE"], 24.35);
        assert_eq!(body["PB"], 0.0);
        assert!(body["RSI"].is_number());
        assert!(body["MACDLine"].is_number());
    }

    #[tokio::test]
    async fn unresolved_input_reports_in_band_error() {
        let body = post_json(
            "/api/stock_metrics",
            r#"{"company_input": "NotARealCompanyXYZ"}"#,
        )
        .await;

        assert_eq!(body["success"], Value::Bool(false));
        assert!(body["error"]
            .as_str()
            .unwrap()
            .contains("NotARealCompanyXYZ"));
    }

    #[tokio::test]
    async fn multi_metrics_isolates_failures() {
        let body = post_json(
            "/api/multi_stock_metrics",
            r#"{"company_inputs": ["AAPL", "NotARealCompanyXYZ"]}"#,
        )
        .await;

        assert_eq!(body["success"], Value::Bool(true));
        assert_eq!(body["data"]["AAPL"]["success"], Value::Bool(true));
        assert_eq!(
            body["data"]["NotARealCompanyXYZ"]["success"],
            Value::Bool(false)
        );
        assert!(body["data"]["NotARealCompanyXYZ"]["error"].is_string());
    }

    #[tokio::test]
    async fn multi_metrics_rejects_non_list_input() {
        let body = post_json("/api/multi_stock_metrics", r#"{"company_inputs": "AAPL"}"#).await;

        assert_eq!(body["success"], Value::Bool(false));
        assert!(body["error"].as_str().unwrap().contains("company_inputs"));
    }

    #[tokio::test]
    async fn legacy_multi_metrics_path_still_routes() {
        let body = post_json("/multi_stock_metrics", r#"{"company_inputs": ["AAPL"]}"#).await;

        assert_eq!(body["success"], Value::Bool(true));
    }

    #[tokio::test]
    async fn simple_metrics_uppercases_the_path_ticker() {
        let app = stock_routes().with_state(test_state());
        let response = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/api/simple_metrics/aapl")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(body["ticker"], "AAPL");
        assert!(body["latest_price"].is_number());
        assert!(body["macd_line"].is_number());
    }
}
