use thiserror::Error;

#[derive(Error, Debug)]
pub enum StockError {
    #[error("Could not find ticker for input: '{0}'. Try a valid company name or ticker symbol.")]
    UnresolvedTicker(String),

    #[error("No price data available for {ticker} after {attempts} attempts")]
    NoData { ticker: String, attempts: u32 },

    #[error("Failed to fetch data for {ticker} after {attempts} attempts: {reason}")]
    FetchFailed {
        ticker: String,
        attempts: u32,
        reason: String,
    },

    #[error("Malformed request: {0}")]
    MalformedInput(String),

    #[error("Market data error: {0}")]
    Provider(String),

    #[error("Ticker dataset error: {0}")]
    Dataset(String),
}
