use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One trading day of OHLCV data. Series are ascending by date with no
/// duplicate dates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Valuation ratio snapshot. `None` means the provider had no value for the
/// field; the reporting layer substitutes the 0.0 sentinel.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Fundamentals {
    pub pe_ratio: Option<f64>,
    pub pb_ratio: Option<f64>,
    pub ps_ratio: Option<f64>,
    pub peg_ratio: Option<f64>,
    pub roe: Option<f64>,
}

/// Lookback window for historical price requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Lookback {
    OneMonth,
    ThreeMonths,
    SixMonths,
    #[default]
    OneYear,
    TwoYears,
    FiveYears,
}

impl Lookback {
    /// Range string understood by the market-data provider.
    pub fn as_range(&self) -> &'static str {
        match self {
            Lookback::OneMonth => "1mo",
            Lookback::ThreeMonths => "3mo",
            Lookback::SixMonths => "6mo",
            Lookback::OneYear => "1y",
            Lookback::TwoYears => "2y",
            Lookback::FiveYears => "5y",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "1mo" => Some(Lookback::OneMonth),
            "3mo" => Some(Lookback::ThreeMonths),
            "6mo" => Some(Lookback::SixMonths),
            "1y" => Some(Lookback::OneYear),
            "2y" => Some(Lookback::TwoYears),
            "5y" => Some(Lookback::FiveYears),
            _ => None,
        }
    }
}
