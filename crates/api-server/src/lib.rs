//! HTTP surface for the stock report service.

pub mod config;
pub mod stock_routes;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::HeaderValue;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::ServerConfig;
use market_data::YahooClient;
use report_engine::ReportEngine;
use stock_core::{Lookback, StockError};
use ticker_directory::TickerDirectory;

/// Shared handler state. The engine holds the process-wide ticker
/// directory; everything else is request-scoped.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ReportEngine>,
    pub lookback: Lookback,
}

/// Body returned for every failed request.
#[derive(Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
}

/// Converts domain errors into the wire error shape. Failures are reported
/// in-band with `success: false` rather than through the HTTP status.
pub struct ApiError(pub StockError);

impl From<StockError> for ApiError {
    fn from(err: StockError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        Json(ErrorBody {
            success: false,
            error: self.0.to_string(),
        })
        .into_response()
    }
}

fn init_tracing() {
    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    if json_logging {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    if config.production {
        let origins: Vec<HeaderValue> = config
            .allowed_origins()
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(stock_routes::stock_routes())
        .with_state(state)
}

pub async fn run_server() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ServerConfig::from_env()?;
    tracing::info!(
        "Server running in {} mode",
        if config.production { "production" } else { "development" }
    );
    tracing::info!("CORS allowed origins: {:?}", config.allowed_origins());

    let directory = Arc::new(TickerDirectory::load_embedded()?);
    let provider = Arc::new(YahooClient::new()?);
    let state = AppState {
        engine: Arc::new(ReportEngine::new(directory, provider)),
        lookback: config.lookback,
    };

    let app = router(state)
        .layer(cors_layer(&config))
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
