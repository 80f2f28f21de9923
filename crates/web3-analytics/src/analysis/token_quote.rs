//! Token Quote Formatter
//!
//! Matches a symbol against a listing search result and maps the detailed
//! quote onto a fixed output schema.
//!
//! Symbols are compared case-insensitively and the first listing wins;
//! tokens sharing a ticker are not disambiguated.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{AnalyticsError, Result};
use crate::model::{TokenListing, TokenQuoteDetail};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TokenMetrics {
    pub id: u64,
    pub name: String,
    pub symbol: String,
    pub price_usd: Option<Decimal>,
    pub market_cap: Option<Decimal>,
    pub volume_24h: Option<Decimal>,
    pub change_1h: Option<f64>,
    pub change_24h: Option<f64>,
    pub change_7d: Option<f64>,
    pub change_30d: Option<f64>,
    pub circulating_supply: Option<Decimal>,
    pub total_supply: Option<Decimal>,
    pub max_supply: Option<Decimal>,
    pub cmc_rank: Option<u32>,
    pub last_updated: Option<String>,
}

/// First listing whose symbol equals `symbol`, ignoring case
pub fn find_listing<'a>(listings: &'a [TokenListing], symbol: &str) -> Result<&'a TokenListing> {
    let wanted = symbol.trim();
    listings
        .iter()
        .find(|l| l.symbol.eq_ignore_ascii_case(wanted))
        .ok_or_else(|| AnalyticsError::not_found("Token", wanted))
}

/// Map the matched listing's detailed quote (keyed by listing id) to [`TokenMetrics`]
pub fn format_token_quote(
    listing: &TokenListing,
    quotes: &HashMap<String, TokenQuoteDetail>,
) -> Result<TokenMetrics> {
    let detail = quotes
        .get(&listing.id.to_string())
        .ok_or_else(|| AnalyticsError::not_found("Token quote", listing.symbol.clone()))?;

    let usd = detail
        .usd()
        .ok_or_else(|| AnalyticsError::not_found("USD quote", listing.symbol.clone()))?;

    let or_listing = |value: &str, fallback: &str| {
        if value.is_empty() { fallback.to_string() } else { value.to_string() }
    };

    Ok(TokenMetrics {
        id: listing.id,
        name: or_listing(&detail.name, &listing.name),
        symbol: or_listing(&detail.symbol, &listing.symbol),
        price_usd: usd.price,
        market_cap: usd.market_cap,
        volume_24h: usd.volume_24h,
        change_1h: usd.percent_change_1h,
        change_24h: usd.percent_change_24h,
        change_7d: usd.percent_change_7d,
        change_30d: usd.percent_change_30d,
        circulating_supply: detail.circulating_supply,
        total_supply: detail.total_supply,
        max_supply: detail.max_supply,
        cmc_rank: detail.cmc_rank,
        last_updated: usd.last_updated.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn listings() -> Vec<TokenListing> {
        vec![
            TokenListing { id: 7226, name: "Injective".into(), symbol: "INJ".into() },
            TokenListing { id: 9999, name: "Impostor".into(), symbol: "inj".into() },
            TokenListing { id: 1027, name: "Ethereum".into(), symbol: "ETH".into() },
        ]
    }

    fn quotes() -> HashMap<String, TokenQuoteDetail> {
        serde_json::from_value(json!({
            "7226": {
                "id": 7226,
                "name": "Injective",
                "symbol": "INJ",
                "circulating_supply": 97727483.0,
                "total_supply": 100000000,
                "max_supply": null,
                "cmc_rank": 37,
                "quote": {
                    "USD": {
                        "price": 24.51,
                        "market_cap": 2395300000.5,
                        "volume_24h": 150000000,
                        "percent_change_1h": -0.2,
                        "percent_change_24h": 3.4,
                        "percent_change_7d": 8.1,
                        "percent_change_30d": -12.0,
                        "last_updated": "2024-05-01T12:00:00.000Z"
                    }
                }
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_first_case_insensitive_match_wins() {
        let all = listings();
        let listing = find_listing(&all, "inj").unwrap();
        assert_eq!(listing.id, 7226);
    }

    #[test]
    fn test_unknown_symbol_is_not_found() {
        let err = find_listing(&listings(), "NOPE").unwrap_err();
        assert!(matches!(err, AnalyticsError::NotFound { kind: "Token", .. }));
    }

    #[test]
    fn test_quote_mapping() {
        let all = listings();
        let metrics = format_token_quote(find_listing(&all, "INJ").unwrap(), &quotes()).unwrap();

        assert_eq!(metrics.name, "Injective");
        assert_eq!(metrics.price_usd, Some(dec!(24.51)));
        assert_eq!(metrics.change_24h, Some(3.4));
        assert_eq!(metrics.max_supply, None);
        assert_eq!(metrics.cmc_rank, Some(37));
        assert_eq!(metrics.last_updated.as_deref(), Some("2024-05-01T12:00:00.000Z"));
    }

    #[test]
    fn test_missing_quote_is_not_found_not_partial() {
        let all = listings();
        let eth = find_listing(&all, "eth").unwrap();
        assert!(matches!(
            format_token_quote(eth, &quotes()),
            Err(AnalyticsError::NotFound { .. })
        ));
    }

    #[test]
    fn test_quote_without_usd_is_not_found() {
        let all = listings();
        let inj = find_listing(&all, "INJ").unwrap();
        let quotes: HashMap<String, TokenQuoteDetail> = serde_json::from_value(json!({
            "7226": {
                "id": 7226,
                "name": "Injective",
                "symbol": "INJ",
                "quote": {"EUR": {"price": 22.1}}
            }
        }))
        .unwrap();

        let err = format_token_quote(inj, &quotes).unwrap_err();
        assert!(matches!(err, AnalyticsError::NotFound { kind: "USD quote", .. }));
        assert_eq!(err.code(), "NOT_FOUND");
    }
}
