use std::env;

use anyhow::{Context, Result};
use stock_core::Lookback;

/// Server configuration loaded from the environment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub production: bool,
    pub frontend_url: String,
    pub lookback: Lookback,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        let port = env::var("PORT")
            .unwrap_or_else(|_| "5000".to_string())
            .parse()
            .context("PORT must be a port number")?;

        let production = env::var("APP_ENV")
            .map(|v| v.eq_ignore_ascii_case("production"))
            .unwrap_or(false);

        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3001".to_string());

        let range = env::var("HISTORY_RANGE").unwrap_or_else(|_| "1y".to_string());
        let lookback = Lookback::parse(&range)
            .with_context(|| format!("HISTORY_RANGE '{range}' is not a supported range"))?;

        Ok(Self {
            port,
            production,
            frontend_url,
            lookback,
        })
    }

    /// Origins allowed by CORS. Development adds the usual local frontend
    /// ports; production pins to the configured frontend.
    pub fn allowed_origins(&self) -> Vec<String> {
        if self.production {
            vec![self.frontend_url.clone()]
        } else {
            vec![
                self.frontend_url.clone(),
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
                "http://localhost:3001".to_string(),
                "http://127.0.0.1:3001".to_string(),
            ]
        }
    }
}
