//! Company name and ticker symbol resolution.
//!
//! A `TickerDirectory` maps normalized company names and uppercase ticker
//! symbols to canonical tickers. It is built once at startup from the
//! embedded company dataset and never mutated afterwards, so it can be
//! shared across request handlers without locking.

use std::collections::HashMap;

use serde::Deserialize;
use stock_core::StockError;

/// Corporate suffix tokens dropped during normalization.
const STOP_WORDS: &[&str] = &[
    "inc",
    "corp",
    "co",
    "ltd",
    "plc",
    "sa",
    "nv",
    "se",
    "llc",
    "lp",
    "group",
    "holdings",
    "international",
    "limited",
    "technologies",
    "solutions",
    "systems",
    "enterprise",
    "enterprises",
];

/// Normalize free-text company names into alias-table keys.
///
/// Lowercases, strips everything that is not a letter, digit or whitespace,
/// drops whole-word corporate suffixes, and collapses whitespace runs.
/// Pure and deterministic.
pub fn normalize(text: &str) -> String {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace())
        .collect();

    cleaned
        .split_whitespace()
        .filter(|word| !STOP_WORDS.contains(word))
        .collect::<Vec<_>>()
        .join(" ")
}

/// One record of the company dataset.
#[derive(Debug, Clone, Deserialize)]
pub struct CompanyRecord {
    #[serde(default)]
    pub cik_str: Option<u64>,
    pub ticker: String,
    pub title: String,
}

const COMPANY_DATA: &str = include_str!("../data/company_tickers.json");

/// Immutable alias table from normalized names and uppercase tickers to
/// canonical uppercase tickers.
#[derive(Debug)]
pub struct TickerDirectory {
    aliases: HashMap<String, String>,
}

impl TickerDirectory {
    /// Build the directory from the embedded company dataset.
    pub fn load_embedded() -> Result<Self, StockError> {
        let records: HashMap<String, CompanyRecord> =
            serde_json::from_str(COMPANY_DATA).map_err(|e| StockError::Dataset(e.to_string()))?;
        Ok(Self::from_records(records.into_values()))
    }

    /// Build from company records. Each record inserts two aliases: the
    /// normalized title and the uppercase ticker, both pointing at the
    /// uppercase ticker. Later records overwrite earlier ones for the same
    /// key.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = CompanyRecord>,
    {
        let mut aliases = HashMap::new();
        for record in records {
            let ticker = record.ticker.to_uppercase();
            if ticker.is_empty() {
                continue;
            }
            aliases.insert(normalize(&record.title), ticker.clone());
            aliases.insert(ticker.clone(), ticker);
        }
        tracing::info!("Ticker directory loaded with {} aliases", aliases.len());
        Self { aliases }
    }

    /// Resolve user input to a canonical ticker. Exact uppercase-symbol
    /// match wins over the normalized-name match.
    pub fn resolve(&self, input: &str) -> Result<String, StockError> {
        let trimmed = input.trim();
        if let Some(ticker) = self.aliases.get(&trimmed.to_uppercase()) {
            return Ok(ticker.clone());
        }
        if let Some(ticker) = self.aliases.get(&normalize(trimmed)) {
            return Ok(ticker.clone());
        }
        Err(StockError::UnresolvedTicker(input.to_string()))
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(ticker: &str, title: &str) -> CompanyRecord {
        CompanyRecord {
            cik_str: None,
            ticker: ticker.to_string(),
            title: title.to_string(),
        }
    }

    fn directory() -> TickerDirectory {
        TickerDirectory::from_records(vec![
            record("AAPL", "Apple Inc."),
            record("MSFT", "Microsoft Corp"),
            record("KO", "Coca-Cola Co"),
            record("MMM", "3M Co"),
        ])
    }

    #[test]
    fn normalize_strips_punctuation_and_suffixes() {
        assert_eq!(normalize("Apple Inc."), "apple");
        assert_eq!(normalize("Microsoft Corp"), "microsoft");
        assert_eq!(normalize("Advanced Micro Devices, Inc."), "advanced micro devices");
    }

    #[test]
    fn normalize_is_case_insensitive() {
        assert_eq!(normalize("Apple Inc."), normalize("apple inc"));
        assert_eq!(normalize("APPLE INC"), "apple");
    }

    #[test]
    fn normalize_collapses_whitespace() {
        assert_eq!(normalize("  Taiwan   Semiconductor  "), "taiwan semiconductor");
    }

    #[test]
    fn normalize_keeps_digits_and_glues_hyphenated_words() {
        assert_eq!(normalize("3M Co"), "3m");
        assert_eq!(normalize("Coca-Cola Co"), "cocacola");
    }

    #[test]
    fn normalize_drops_suffixes_only_as_whole_words() {
        // "inc" inside a word must survive
        assert_eq!(normalize("Incline Energy"), "incline energy");
    }

    #[test]
    fn resolves_known_company_names() {
        let dir = directory();
        assert_eq!(dir.resolve("Apple").unwrap(), "AAPL");
        assert_eq!(dir.resolve("apple inc.").unwrap(), "AAPL");
        assert_eq!(dir.resolve("Microsoft").unwrap(), "MSFT");
    }

    #[test]
    fn resolves_tickers_in_any_case() {
        let dir = directory();
        assert_eq!(dir.resolve("AAPL").unwrap(), "AAPL");
        assert_eq!(dir.resolve("aapl").unwrap(), "AAPL");
        assert_eq!(dir.resolve(" msft ").unwrap(), "MSFT");
    }

    #[test]
    fn unknown_input_fails_with_original_text() {
        let dir = directory();
        match dir.resolve("NotARealCompanyXYZ") {
            Err(StockError::UnresolvedTicker(input)) => {
                assert_eq!(input, "NotARealCompanyXYZ");
            }
            other => panic!("expected UnresolvedTicker, got {other:?}"),
        }
    }

    #[test]
    fn title_and_ticker_map_to_the_same_value() {
        let dir = directory();
        assert!(dir.resolve("Coca Cola").is_err());
        assert_eq!(dir.resolve("Coca-Cola").unwrap(), dir.resolve("KO").unwrap());
    }

    #[test]
    fn later_records_overwrite_earlier_ones() {
        let dir = TickerDirectory::from_records(vec![
            record("OLD", "Acme Widgets"),
            record("NEW", "Acme Widgets"),
        ]);
        assert_eq!(dir.resolve("Acme Widgets").unwrap(), "NEW");
        // both ticker aliases remain valid
        assert_eq!(dir.resolve("OLD").unwrap(), "OLD");
    }

    #[test]
    fn embedded_dataset_loads() {
        let dir = TickerDirectory::load_embedded().unwrap();
        assert!(!dir.is_empty());
        assert_eq!(dir.resolve("AAPL").unwrap(), "AAPL");
        assert_eq!(dir.resolve("Apple").unwrap(), "AAPL");
        assert_eq!(dir.resolve("nvidia").unwrap(), "NVDA");
    }
}
