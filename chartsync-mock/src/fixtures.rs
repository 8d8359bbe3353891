//! Deterministic market data used by the mock services.

use chartsync_core::{
    AssetDetails, AssetKind, AssetRef, CandleSeries, ExchangeInfo, HistoryResponse, Interval,
    PricePoint, Quote, RefreshResponse, Tz,
};
use chrono::{DateTime, Utc};

/// Number of candles in a fixture history.
pub const HISTORY_LEN: usize = 48;

/// 2024-01-02 14:30 UTC (09:30 New York).
const SERIES_START_MS: i64 = 1_704_205_800_000;

struct Listing {
    symbol: &'static str,
    kind: AssetKind,
    name: &'static str,
    currency: &'static str,
    exchange: Option<&'static str>,
    zone: &'static str,
    base: f64,
}

const LISTINGS: &[Listing] = &[
    Listing {
        symbol: "AAPL",
        kind: AssetKind::Stock,
        name: "Apple Inc.",
        currency: "USD",
        exchange: Some("NMS"),
        zone: "America/New_York",
        base: 185.0,
    },
    Listing {
        symbol: "0700.HK",
        kind: AssetKind::Stock,
        name: "Tencent Holdings Ltd",
        currency: "HKD",
        exchange: Some("HKG"),
        zone: "Asia/Hong_Kong",
        base: 290.0,
    },
    Listing {
        symbol: "bitcoin",
        kind: AssetKind::Crypto,
        name: "Bitcoin",
        currency: "USD",
        exchange: None,
        zone: "UTC",
        base: 43_000.0,
    },
    Listing {
        symbol: "XAU",
        kind: AssetKind::Metal,
        name: "Gold",
        currency: "USD",
        exchange: None,
        zone: "America/New_York",
        base: 2_050.0,
    },
];

fn listing(asset: &AssetRef) -> Option<&'static Listing> {
    LISTINGS
        .iter()
        .find(|l| l.kind == asset.kind && l.symbol.eq_ignore_ascii_case(&asset.symbol))
}

/// True when fixtures exist for `asset`.
#[must_use]
pub fn is_known(asset: &AssetRef) -> bool {
    listing(asset).is_some()
}

const fn step_ms(interval: Interval) -> i64 {
    match interval {
        Interval::M1 => 60_000,
        Interval::M5 => 5 * 60_000,
        Interval::M15 => 15 * 60_000,
        Interval::M30 => 30 * 60_000,
        Interval::H1 => 60 * 60_000,
        Interval::D1 => 24 * 60 * 60_000,
    }
}

fn label(ts_ms: i64, zone: &str, interval: Interval) -> String {
    let zone: Tz = zone.parse().unwrap_or(Tz::UTC);
    let Some(instant) = DateTime::<Utc>::from_timestamp_millis(ts_ms) else {
        return String::new();
    };
    let local = instant.with_timezone(&zone);
    if interval.is_intraday() {
        local.format("%Y-%m-%d %H:%M").to_string()
    } else {
        local.format("%Y-%m-%d").to_string()
    }
}

/// Candle `i` of a synthetic series around `base`.
#[must_use]
pub fn candle(base: f64, zone: &str, interval: Interval, i: usize) -> PricePoint {
    #[allow(clippy::cast_possible_wrap, clippy::cast_precision_loss)]
    let (ts, wobble) = (
        SERIES_START_MS + step_ms(interval) * i as i64,
        ((i * 7) % 11) as f64,
    );
    let close = base * (0.97 + wobble * 0.006);
    PricePoint::new(label(ts, zone, interval), ts, close).with_ohlcv(
        close * 0.998,
        close * 1.004,
        close * 0.994,
        1_000_000.0 + wobble * 10_000.0,
    )
}

/// Full history fixture: `HISTORY_LEN` candles.
#[must_use]
pub fn history(asset: &AssetRef, interval: Interval) -> Option<HistoryResponse> {
    let l = listing(asset)?;
    let series: CandleSeries = (0..HISTORY_LEN)
        .map(|i| candle(l.base, l.zone, interval, i))
        .collect();
    Some(HistoryResponse {
        symbol: l.symbol.to_string(),
        interval: Some(interval.as_str().to_string()),
        currency: l.currency.to_string(),
        exchange_timezone: l.zone.to_string(),
        history: series,
    })
}

/// Refresh fixture: the last `candles` points of a series one candle longer
/// than the history fixture, with the overlapping candle repriced.
#[must_use]
pub fn refresh(asset: &AssetRef, interval: Interval, candles: u8) -> Option<RefreshResponse> {
    let l = listing(asset)?;
    let end = HISTORY_LEN + 1;
    let start = end.saturating_sub(usize::from(candles));
    let mut tail: Vec<PricePoint> = (start..end)
        .map(|i| candle(l.base, l.zone, interval, i))
        .collect();
    if let Some(overlap) = tail.iter_mut().find(|p| {
        p.timestamp == candle(l.base, l.zone, interval, HISTORY_LEN - 1).timestamp
    }) {
        overlap.price *= 1.001;
    }
    let last = tail.last().map_or(l.base, |p| p.price);
    let previous_close = l.base;
    Some(RefreshResponse {
        symbol: l.symbol.to_string(),
        currency: l.currency.to_string(),
        timestamp: tail.last().map_or(SERIES_START_MS, |p| p.timestamp),
        quote: Some(Quote {
            price: last,
            previous_close: Some(previous_close),
            change_24h: Some(((last - previous_close) / previous_close * 10_000.0).round() / 100.0),
            open: None,
            high: None,
            low: None,
            volume: None,
        }),
        candles: tail,
        interval: Some(interval.as_str().to_string()),
    })
}

/// Details fixture.
#[must_use]
pub fn details(asset: &AssetRef) -> Option<AssetDetails> {
    let l = listing(asset)?;
    let mut market_data = serde_json::Map::new();
    market_data.insert("current_price".into(), serde_json::json!(l.base));
    market_data.insert("fifty_two_week_high".into(), serde_json::json!(l.base * 1.2));
    market_data.insert("fifty_two_week_low".into(), serde_json::json!(l.base * 0.8));
    Some(AssetDetails {
        name: l.name.to_string(),
        symbol: l.symbol.to_string(),
        currency: l.currency.to_string(),
        market_data,
        exchange_info: l.exchange.map(|code| ExchangeInfo {
            exchange: Some(code.to_string()),
            exchange_timezone: Some(l.zone.to_string()),
            exchange_timezone_short: None,
        }),
    })
}
