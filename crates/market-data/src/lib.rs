//! Market-data access: the provider HTTP client and the retrying history
//! fetcher.

pub mod fetcher;
pub mod yahoo;

pub use fetcher::HistoryFetcher;
pub use yahoo::YahooClient;
