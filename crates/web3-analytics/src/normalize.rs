//! Market Data Normalizer
//!
//! Converts raw order-book, ticker, candle and gas-oracle payloads from
//! different venues into the uniform schemas of [`crate::model`].
//!
//! Cells may arrive as JSON numbers or as strings (plain or scientific
//! notation). Entries that cannot be parsed, or that violate a record's
//! invariant, are dropped rather than failing the whole payload; a payload
//! with no recognizable shape at all is [`AnalyticsError::MalformedPayload`].

use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::Value;

use crate::error::{AnalyticsError, Result};
use crate::model::{GasPrices, MarketTicker, OhlcvBar, OrderBook, OrderBookLevel, SpotMarket};

/// Column order of array-encoded candles
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CandleLayout {
    /// `[timestamp_ms, open, high, low, close, volume]`
    Ccxt,
    /// `[timestamp_s, open, close, high, low, volume, turnover]`
    Kucoin,
}

/// Parse a decimal from a JSON number or numeric string
pub fn parse_decimal(value: &Value) -> Option<Decimal> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

/// Parse a finite float from a JSON number or numeric string
pub fn parse_f64(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.filter(|f: &f64| f.is_finite())
}

fn parse_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse().ok().or_else(|| s.parse::<f64>().ok().map(|f| f as i64))
        }
        _ => None,
    }
}

/// First present, non-null field among `keys`
fn field<'a>(obj: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().filter_map(|k| obj.get(*k)).find(|v| !v.is_null())
}

/// Descend through `data` / `orderbook` / `market` envelopes
fn unwrap_envelope(raw: &Value) -> &Value {
    let mut current = raw;
    while let Some(inner) = field(current, &["data", "orderbook", "market"]).filter(|v| v.is_object()) {
        current = inner;
    }
    current
}

/// Normalize a raw order-book snapshot.
///
/// Accepts `{bids: [[price, qty], ..], asks: [..]}` and
/// `{buys: [{price, quantity}, ..], sells: [..]}`, optionally wrapped in a
/// `data` or `orderbook` envelope.
pub fn normalize_order_book(raw: &Value) -> Result<OrderBook> {
    let root = unwrap_envelope(raw);
    let bids = field(root, &["bids", "buys"]);
    let asks = field(root, &["asks", "sells"]);

    if bids.is_none() && asks.is_none() {
        return Err(AnalyticsError::MalformedPayload(
            "order book has neither bids nor asks".into(),
        ));
    }

    Ok(OrderBook::new(parse_levels(bids, "bids"), parse_levels(asks, "asks")))
}

fn parse_levels(side: Option<&Value>, label: &str) -> Vec<OrderBookLevel> {
    let Some(entries) = side.and_then(Value::as_array) else {
        return Vec::new();
    };

    let levels: Vec<OrderBookLevel> = entries
        .iter()
        .filter_map(|entry| {
            let (price, quantity) = match entry {
                Value::Array(cells) => (cells.first()?, cells.get(1)?),
                Value::Object(_) => (
                    field(entry, &["price", "p"])?,
                    field(entry, &["quantity", "size", "amount", "q"])?,
                ),
                _ => return None,
            };
            OrderBookLevel::new(parse_decimal(price)?, parse_decimal(quantity)?)
        })
        .collect();

    let dropped = entries.len() - levels.len();
    if dropped > 0 {
        tracing::debug!(side = label, dropped, "Dropped invalid order book levels");
    }
    levels
}

/// Normalize a raw 24h ticker payload
pub fn normalize_ticker(raw: &Value, symbol: &str) -> Result<MarketTicker> {
    let root = unwrap_envelope(raw);
    if !root.is_object() {
        return Err(AnalyticsError::MalformedPayload(format!("ticker for {} is not an object", symbol)));
    }

    let decimal = |keys: &[&str]| field(root, keys).and_then(parse_decimal);

    // `changeRate` is a fraction, the other spellings are already percentages
    let change_24h_percent = decimal(&["changeRate"])
        .map(|rate| rate * Decimal::ONE_HUNDRED)
        .or_else(|| decimal(&["price_24h_change", "change_24h", "priceChangePercent"]));

    Ok(MarketTicker {
        symbol: symbol.to_string(),
        last_price: decimal(&["last", "price", "mark_price", "lastPrice"]),
        change_24h_percent,
        volume_24h: decimal(&["vol", "volume_24h", "volume"]),
        best_bid: decimal(&["buy", "best_bid", "bidPrice"]),
        best_ask: decimal(&["sell", "best_ask", "askPrice"]),
    })
}

/// Normalize a spot market listing.
///
/// Accepts the exchange shape (`data: [{symbol, baseCurrency, quoteCurrency,
/// priceIncrement, baseIncrement, enableTrading}]`) and the chain indexer
/// shape (`markets: [{marketId, ticker, baseTokenMeta: {symbol}, ..}]`).
/// Entries without a base or quote token are dropped.
pub fn normalize_markets(raw: &Value) -> Result<Vec<SpotMarket>> {
    let rows = match raw {
        Value::Array(rows) => rows,
        Value::Object(_) => field(raw, &["data", "markets"])
            .and_then(Value::as_array)
            .ok_or_else(|| AnalyticsError::MalformedPayload("market listing has no entries".into()))?,
        _ => return Err(AnalyticsError::MalformedPayload("market listing is not a list".into())),
    };

    let markets: Vec<SpotMarket> = rows.iter().filter_map(parse_market).collect();
    if markets.len() < rows.len() {
        tracing::debug!(dropped = rows.len() - markets.len(), "Dropped unparsable markets");
    }
    Ok(markets)
}

fn parse_market(entry: &Value) -> Option<SpotMarket> {
    let text = |v: &Value| -> Option<String> {
        v.as_str().map(str::trim).filter(|s| !s.is_empty()).map(str::to_uppercase)
    };
    let token = |keys: &[&str], meta: &str| {
        field(entry, keys)
            .and_then(text)
            .or_else(|| entry.get(meta).and_then(|m| m.get("symbol")).and_then(text))
    };
    let tick = |keys: &[&str]| {
        field(entry, keys)
            .and_then(parse_decimal)
            .filter(|d| *d > Decimal::ZERO)
    };

    let base_token = token(&["baseCurrency", "base_token", "base"], "baseTokenMeta")?;
    let quote_token = token(&["quoteCurrency", "quote_token", "quote"], "quoteTokenMeta")?;
    let ticker = format!("{base_token}/{quote_token}");
    let market_id = field(entry, &["marketId", "market_id", "symbol"])
        .and_then(Value::as_str)
        .map_or_else(|| ticker.clone(), str::to_string);

    let trading_enabled = match field(entry, &["enableTrading", "marketStatus"]) {
        Some(Value::Bool(enabled)) => *enabled,
        Some(Value::String(status)) => status.eq_ignore_ascii_case("active"),
        _ => true,
    };

    Some(SpotMarket {
        ticker,
        market_id,
        base_token,
        quote_token,
        min_price_tick_size: tick(&["priceIncrement", "minPriceTickSize", "min_price_tick_size"]),
        min_quantity_tick_size: tick(&["baseIncrement", "minQuantityTickSize", "min_quantity_tick_size"]),
        trading_enabled,
    })
}

/// Normalize raw candles into bars with strictly increasing timestamps.
///
/// Rows are sorted ascending; when two rows share a timestamp the later row
/// in the payload wins.
pub fn normalize_candles(raw: &Value, layout: CandleLayout) -> Result<Vec<OhlcvBar>> {
    let rows = match raw {
        Value::Array(rows) => rows,
        Value::Object(_) => field(raw, &["data", "candles"])
            .and_then(Value::as_array)
            .ok_or_else(|| AnalyticsError::MalformedPayload("candle payload has no rows".into()))?,
        _ => return Err(AnalyticsError::MalformedPayload("candle payload is not a list".into())),
    };

    let mut bars: Vec<OhlcvBar> = rows.iter().filter_map(|row| parse_bar(row, layout)).collect();
    if bars.len() < rows.len() {
        tracing::debug!(dropped = rows.len() - bars.len(), "Dropped unparsable candles");
    }

    bars.sort_by_key(|b| b.timestamp);

    let mut deduped: Vec<OhlcvBar> = Vec::with_capacity(bars.len());
    for bar in bars {
        match deduped.last_mut() {
            Some(last) if last.timestamp == bar.timestamp => *last = bar,
            _ => deduped.push(bar),
        }
    }
    Ok(deduped)
}

fn parse_bar(row: &Value, layout: CandleLayout) -> Option<OhlcvBar> {
    match row {
        Value::Array(cells) => {
            let num = |i: usize| cells.get(i).and_then(parse_f64);
            let ts = cells.first().and_then(parse_i64)?;
            match layout {
                CandleLayout::Ccxt => Some(OhlcvBar {
                    timestamp: ts,
                    open: num(1)?,
                    high: num(2)?,
                    low: num(3)?,
                    close: num(4)?,
                    volume: num(5).unwrap_or(0.0),
                }),
                CandleLayout::Kucoin => Some(OhlcvBar {
                    timestamp: ts.checked_mul(1000)?,
                    open: num(1)?,
                    close: num(2)?,
                    high: num(3)?,
                    low: num(4)?,
                    volume: num(5).unwrap_or(0.0),
                }),
            }
        }
        Value::Object(_) => {
            let num = |keys: &[&str]| field(row, keys).and_then(parse_f64);
            Some(OhlcvBar {
                timestamp: field(row, &["timestamp", "time", "t"]).and_then(parse_i64)?,
                open: num(&["open", "o"])?,
                high: num(&["high", "h"])?,
                low: num(&["low", "l"])?,
                close: num(&["close", "c"])?,
                volume: num(&["volume", "v"]).unwrap_or(0.0),
            })
        }
        _ => None,
    }
}

/// Normalize an Etherscan-style gas oracle response
pub fn normalize_gas_oracle(raw: &Value) -> Result<GasPrices> {
    if raw.get("status").and_then(Value::as_str) == Some("0") {
        let detail = raw.get("result").and_then(Value::as_str).unwrap_or("unknown error");
        return Err(AnalyticsError::UpstreamUnavailable(format!("gas oracle: {}", detail)));
    }

    let result = raw
        .get("result")
        .filter(|v| v.is_object())
        .ok_or_else(|| AnalyticsError::MalformedPayload("gas oracle response has no result".into()))?;

    let gwei = |key: &str| {
        result
            .get(key)
            .and_then(parse_decimal)
            .ok_or_else(|| AnalyticsError::MalformedPayload(format!("gas oracle missing {}", key)))
    };

    Ok(GasPrices {
        last_block: result.get("LastBlock").and_then(parse_i64).and_then(|b| u64::try_from(b).ok()),
        safe_gwei: gwei("SafeGasPrice")?,
        propose_gwei: gwei("ProposeGasPrice")?,
        fast_gwei: gwei("FastGasPrice")?,
        base_fee_gwei: result.get("suggestBaseFee").and_then(parse_decimal),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_markets_exchange_shape() {
        let raw = json!({"code": "200000", "data": [
            {"symbol": "INJ-USDT", "baseCurrency": "INJ", "quoteCurrency": "USDT",
             "priceIncrement": "0.001", "baseIncrement": "0.01", "enableTrading": true},
            {"symbol": "OLD-USDT", "baseCurrency": "OLD", "quoteCurrency": "USDT", "enableTrading": false},
            {"symbol": "BROKEN", "quoteCurrency": "USDT"}
        ]});
        let markets = normalize_markets(&raw).unwrap();

        assert_eq!(markets.len(), 2);
        assert_eq!(markets[0].ticker, "INJ/USDT");
        assert_eq!(markets[0].market_id, "INJ-USDT");
        assert_eq!(markets[0].min_price_tick_size, Some(dec!(0.001)));
        assert_eq!(markets[0].min_quantity_tick_size, Some(dec!(0.01)));
        assert!(markets[0].trading_enabled);
        assert!(!markets[1].trading_enabled);
        assert_eq!(markets[1].min_price_tick_size, None);
    }

    #[test]
    fn test_markets_indexer_shape() {
        let raw = json!({"markets": [{
            "marketId": "0xa508cb32",
            "ticker": "INJ/USDT",
            "baseTokenMeta": {"symbol": "inj"},
            "quoteTokenMeta": {"symbol": "USDT"},
            "minPriceTickSize": "0.000000000000001",
            "minQuantityTickSize": "1000000000000000",
            "marketStatus": "active"
        }]});
        let markets = normalize_markets(&raw).unwrap();

        assert_eq!(markets.len(), 1);
        assert_eq!(markets[0].ticker, "INJ/USDT");
        assert_eq!(markets[0].market_id, "0xa508cb32");
        assert_eq!(markets[0].base_token, "INJ");
        assert!(markets[0].trading_enabled);

        assert!(matches!(normalize_markets(&json!("nope")), Err(AnalyticsError::MalformedPayload(_))));
    }

    #[test]
    fn test_parse_decimal_variants() {
        assert_eq!(parse_decimal(&json!("12.50")), Some(dec!(12.50)));
        assert_eq!(parse_decimal(&json!(0.1)), Some(dec!(0.1)));
        assert_eq!(parse_decimal(&json!("1e-7")), Some(dec!(0.0000001)));
        assert_eq!(parse_decimal(&json!("abc")), None);
        assert_eq!(parse_decimal(&json!(null)), None);
    }

    #[test]
    fn test_cex_order_book_in_envelope() {
        let raw = json!({
            "code": "200000",
            "data": {
                "bids": [["24.10", "3"], ["24.20", "1.5"]],
                "asks": [["24.40", "2"], ["24.30", "1"]]
            }
        });
        let book = normalize_order_book(&raw).unwrap();
        assert_eq!(book.best_bid(), Some(dec!(24.20)));
        assert_eq!(book.best_ask(), Some(dec!(24.30)));
        assert_eq!(book.bids.len(), 2);
    }

    #[test]
    fn test_indexer_order_book_drops_invalid_levels() {
        let raw = json!({
            "orderbook": {
                "buys": [
                    {"price": "10", "quantity": "1"},
                    {"price": "0", "quantity": "5"},
                    {"price": "9", "quantity": "-1"},
                    {"price": "oops", "quantity": "1"}
                ],
                "sells": []
            }
        });
        let book = normalize_order_book(&raw).unwrap();
        assert_eq!(book.bids.len(), 1);
        assert!(book.asks.is_empty());
    }

    #[test]
    fn test_order_book_without_sides_is_malformed() {
        let err = normalize_order_book(&json!({"data": {"price": 1}})).unwrap_err();
        assert!(matches!(err, AnalyticsError::MalformedPayload(_)));
    }

    #[test]
    fn test_kucoin_candles_sorted_and_deduped() {
        // newest first, as the exchange returns them
        let raw = json!({
            "code": "200000",
            "data": [
                ["1700007200", "3", "4", "4.5", "2.5", "10", "40"],
                ["1700003600", "2", "3", "3.5", "1.5", "10", "30"],
                ["1700003600", "2", "3.1", "3.5", "1.5", "11", "31"],
                ["bad"]
            ]
        });
        let bars = normalize_candles(&raw, CandleLayout::Kucoin).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].timestamp, 1_700_003_600_000);
        assert_eq!(bars[0].close, 3.1);
        assert_eq!(bars[1].high, 4.5);
        assert_eq!(bars[1].low, 2.5);
    }

    #[test]
    fn test_ccxt_and_object_candles() {
        let bars = normalize_candles(&json!([[1000, 1, 2, 0.5, 1.5, 7]]), CandleLayout::Ccxt).unwrap();
        assert_eq!(bars[0].close, 1.5);
        assert_eq!(bars[0].volume, 7.0);

        let bars = normalize_candles(
            &json!([{"t": 2000, "o": "1", "h": "2", "l": "0.5", "c": "1.25"}]),
            CandleLayout::Ccxt,
        )
        .unwrap();
        assert_eq!(bars[0].timestamp, 2000);
        assert_eq!(bars[0].volume, 0.0);
    }

    #[test]
    fn test_ticker_change_rate_is_scaled() {
        let raw = json!({
            "data": {"symbol": "INJ-USDT", "last": "24.5", "changeRate": "0.0325", "vol": "1000", "buy": "24.4", "sell": "24.6"}
        });
        let ticker = normalize_ticker(&raw, "INJ/USDT").unwrap();
        assert_eq!(ticker.last_price, Some(dec!(24.5)));
        assert_eq!(ticker.change_24h_percent, Some(dec!(3.25)));
        assert_eq!(ticker.best_ask, Some(dec!(24.6)));
    }

    #[test]
    fn test_gas_oracle() {
        let raw = json!({
            "status": "1",
            "message": "OK",
            "result": {
                "LastBlock": "19000000",
                "SafeGasPrice": "21",
                "ProposeGasPrice": "22",
                "FastGasPrice": "25",
                "suggestBaseFee": "20.5"
            }
        });
        let gas = normalize_gas_oracle(&raw).unwrap();
        assert_eq!(gas.last_block, Some(19_000_000));
        assert_eq!(gas.fast_gwei, dec!(25));
        assert_eq!(gas.base_fee_gwei, Some(dec!(20.5)));

        let err = normalize_gas_oracle(&json!({"status": "0", "result": "Invalid API Key"})).unwrap_err();
        assert!(matches!(err, AnalyticsError::UpstreamUnavailable(_)));
    }
}
