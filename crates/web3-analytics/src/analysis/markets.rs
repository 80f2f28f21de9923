//! Spot market catalogue

use serde::{Deserialize, Serialize};

use crate::model::SpotMarket;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarketListing {
    pub count: usize,
    /// Quote token the listing was restricted to, uppercased
    pub quote_filter: Option<String>,
    pub markets: Vec<SpotMarket>,
}

/// Tradable markets, optionally restricted to one quote token, sorted by ticker.
///
/// Markets the venue has disabled are left out.
pub fn list_spot_markets(markets: Vec<SpotMarket>, quote_token: Option<&str>) -> MarketListing {
    let quote_filter = quote_token
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_uppercase);

    let mut markets: Vec<SpotMarket> = markets
        .into_iter()
        .filter(|m| m.trading_enabled)
        .filter(|m| quote_filter.as_deref().is_none_or(|q| m.quote_token.eq_ignore_ascii_case(q)))
        .collect();
    markets.sort_by(|a, b| a.ticker.cmp(&b.ticker));

    MarketListing {
        count: markets.len(),
        quote_filter,
        markets,
    }
}
