//! Market data transfer objects shared by services, engines and views.

use core::fmt;
use core::str::FromStr;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::SyncError;

/// One candle as delivered by the data service.
///
/// `timestamp` is milliseconds since the Unix epoch and is the identity key of
/// a candle; `date` is the wall-clock rendering in the exchange's zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Wall-clock label (`YYYY-MM-DD` or `YYYY-MM-DD HH:MM[:SS]`).
    pub date: String,
    /// Epoch milliseconds.
    pub timestamp: i64,
    /// Close price.
    pub price: f64,
    /// Open price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open: Option<f64>,
    /// High price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high: Option<f64>,
    /// Low price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low: Option<f64>,
    /// Traded volume.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
}

impl PricePoint {
    /// Close-only candle.
    pub fn new(date: impl Into<String>, timestamp: i64, price: f64) -> Self {
        Self {
            date: date.into(),
            timestamp,
            price,
            open: None,
            high: None,
            low: None,
            volume: None,
        }
    }

    /// Attach OHLCV fields.
    #[must_use]
    pub const fn with_ohlcv(mut self, open: f64, high: f64, low: f64, volume: f64) -> Self {
        self.open = Some(open);
        self.high = Some(high);
        self.low = Some(low);
        self.volume = Some(volume);
        self
    }
}

/// Candle series, strictly ascending and unique by `timestamp`.
///
/// Every constructor normalizes its input, so the ordering invariant holds for
/// any value of this type.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CandleSeries(Vec<PricePoint>);

impl CandleSeries {
    /// Empty series.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Build from arbitrary points. Later points win on duplicate timestamps.
    #[must_use]
    pub fn from_points(points: impl IntoIterator<Item = PricePoint>) -> Self {
        let map: BTreeMap<i64, PricePoint> =
            points.into_iter().map(|p| (p.timestamp, p)).collect();
        Self::from_map(map)
    }

    /// Build from a timestamp-keyed map, which is already sorted and unique.
    #[must_use]
    pub fn from_map(map: BTreeMap<i64, PricePoint>) -> Self {
        Self(map.into_values().collect())
    }

    /// Borrow the candles.
    #[must_use]
    pub fn as_slice(&self) -> &[PricePoint] {
        &self.0
    }

    /// Iterate over candles in ascending order.
    pub fn iter(&self) -> std::slice::Iter<'_, PricePoint> {
        self.0.iter()
    }

    /// Number of candles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when the series holds no candles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Most recent candle.
    #[must_use]
    pub fn last(&self) -> Option<&PricePoint> {
        self.0.last()
    }

    /// Close prices in series order.
    #[must_use]
    pub fn prices(&self) -> Vec<f64> {
        self.0.iter().map(|p| p.price).collect()
    }

    /// Consume into the underlying vector.
    #[must_use]
    pub fn into_vec(self) -> Vec<PricePoint> {
        self.0
    }
}

impl<'de> Deserialize<'de> for CandleSeries {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let points = Vec::<PricePoint>::deserialize(deserializer)?;
        Ok(Self::from_points(points))
    }
}

impl FromIterator<PricePoint> for CandleSeries {
    fn from_iter<I: IntoIterator<Item = PricePoint>>(iter: I) -> Self {
        Self::from_points(iter)
    }
}

impl<'a> IntoIterator for &'a CandleSeries {
    type Item = &'a PricePoint;
    type IntoIter = std::slice::Iter<'a, PricePoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Current quote returned by the refresh endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Last traded price.
    pub price: f64,
    /// Previous session close.
    #[serde(default)]
    pub previous_close: Option<f64>,
    /// Percent change against the previous close.
    #[serde(default)]
    pub change_24h: Option<f64>,
    /// Session open.
    #[serde(default)]
    pub open: Option<f64>,
    /// Session high.
    #[serde(default)]
    pub high: Option<f64>,
    /// Session low.
    #[serde(default)]
    pub low: Option<f64>,
    /// Session volume.
    #[serde(default)]
    pub volume: Option<f64>,
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_exchange_timezone() -> String {
    "America/New_York".to_string()
}

/// Full history payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryResponse {
    /// Symbol as resolved by the service.
    pub symbol: String,
    /// Interval actually served.
    #[serde(default)]
    pub interval: Option<String>,
    /// Quote currency.
    #[serde(default = "default_currency")]
    pub currency: String,
    /// IANA zone of the exchange; `date` fields are rendered in it.
    #[serde(default = "default_exchange_timezone")]
    pub exchange_timezone: String,
    /// Candles, normalized on deserialization.
    pub history: CandleSeries,
}

/// Lightweight refresh payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshResponse {
    /// Symbol as resolved by the service.
    pub symbol: String,
    /// Quote currency.
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Server timestamp, epoch milliseconds.
    #[serde(default)]
    pub timestamp: i64,
    /// Current quote, absent when the upstream had none.
    #[serde(default)]
    pub quote: Option<Quote>,
    /// Most recent candles, oldest first.
    #[serde(default)]
    pub candles: Vec<PricePoint>,
    /// Interval of `candles`.
    #[serde(default)]
    pub interval: Option<String>,
}

/// Exchange identification attached to asset details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeInfo {
    /// Exchange code as reported by the data source (e.g. `NMS`, `HKG`).
    #[serde(default)]
    pub exchange: Option<String>,
    /// IANA zone name.
    #[serde(default)]
    pub exchange_timezone: Option<String>,
    /// Short zone label (e.g. `EST`, `HKT`).
    #[serde(default)]
    pub exchange_timezone_short: Option<String>,
}

/// Asset metadata and statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetDetails {
    /// Display name.
    pub name: String,
    /// Symbol.
    pub symbol: String,
    /// Quote currency.
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Free-form statistics (market cap, 52-week range, ...).
    #[serde(default)]
    pub market_data: serde_json::Map<String, serde_json::Value>,
    /// Exchange information, when the asset trades on an exchange.
    #[serde(default)]
    pub exchange_info: Option<ExchangeInfo>,
}

/// Asset class; selects the service's URL namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    /// Exchange-listed equity.
    Stock,
    /// Cryptocurrency, traded around the clock.
    Crypto,
    /// Precious metal.
    Metal,
}

impl AssetKind {
    /// URL path segment (`stocks`, `crypto`, `metals`).
    #[must_use]
    pub const fn path_segment(self) -> &'static str {
        match self {
            Self::Stock => "stocks",
            Self::Crypto => "crypto",
            Self::Metal => "metals",
        }
    }
}

/// Reference to one asset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetRef {
    /// Asset class.
    pub kind: AssetKind,
    /// Service-specific identifier (`AAPL`, `bitcoin`, `XAU`).
    pub symbol: String,
}

impl AssetRef {
    /// Stock reference.
    pub fn stock(symbol: impl Into<String>) -> Self {
        Self {
            kind: AssetKind::Stock,
            symbol: symbol.into(),
        }
    }

    /// Crypto reference.
    pub fn crypto(id: impl Into<String>) -> Self {
        Self {
            kind: AssetKind::Crypto,
            symbol: id.into(),
        }
    }

    /// Metal reference.
    pub fn metal(symbol: impl Into<String>) -> Self {
        Self {
            kind: AssetKind::Metal,
            symbol: symbol.into(),
        }
    }
}

impl fmt::Display for AssetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind.path_segment(), self.symbol)
    }
}

/// Candle interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Interval {
    /// One minute.
    #[serde(rename = "1m")]
    M1,
    /// Five minutes.
    #[serde(rename = "5m")]
    M5,
    /// Fifteen minutes.
    #[serde(rename = "15m")]
    M15,
    /// Thirty minutes.
    #[serde(rename = "30m")]
    M30,
    /// One hour.
    #[serde(rename = "1h", alias = "60m")]
    H1,
    /// One day.
    #[serde(rename = "1d")]
    D1,
}

impl Interval {
    /// Wire identifier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::M1 => "1m",
            Self::M5 => "5m",
            Self::M15 => "15m",
            Self::M30 => "30m",
            Self::H1 => "1h",
            Self::D1 => "1d",
        }
    }

    /// True for every interval shorter than a day.
    #[must_use]
    pub const fn is_intraday(self) -> bool {
        !matches!(self, Self::D1)
    }

    /// Interval to request for a lookback of `days`.
    ///
    /// A requested interval is honored when the source keeps that granularity
    /// for the whole lookback; otherwise the next coarser available interval is
    /// used. Without a request: 5m up to a week, 1h up to 60 days, then daily.
    ///
    /// ```
    /// use chartsync_types::Interval;
    ///
    /// assert_eq!(Interval::recommended(5, None), Interval::M5);
    /// assert_eq!(Interval::recommended(30, Some(Interval::M1)), Interval::M5);
    /// assert_eq!(Interval::recommended(365, Some(Interval::M15)), Interval::H1);
    /// assert_eq!(Interval::recommended(1000, Some(Interval::H1)), Interval::D1);
    /// ```
    #[must_use]
    pub const fn recommended(days: u32, requested: Option<Self>) -> Self {
        const fn coarse(days: u32) -> Interval {
            if days <= 730 { Interval::H1 } else { Interval::D1 }
        }
        match requested {
            Some(Self::M1) if days > 7 => {
                if days <= 60 {
                    Self::M5
                } else {
                    coarse(days)
                }
            }
            Some(Self::M5 | Self::M15 | Self::M30) if days > 60 => coarse(days),
            Some(Self::H1) if days > 730 => Self::D1,
            Some(interval) => interval,
            None if days <= 7 => Self::M5,
            None if days <= 60 => Self::H1,
            None => Self::D1,
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1m" => Ok(Self::M1),
            "5m" => Ok(Self::M5),
            "15m" => Ok(Self::M15),
            "30m" => Ok(Self::M30),
            "1h" | "60m" => Ok(Self::H1),
            "1d" => Ok(Self::D1),
            other => Err(SyncError::InvalidArg(format!("unknown interval: {other}"))),
        }
    }
}

/// Request for a full history load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRequest {
    /// Asset to load.
    pub asset: AssetRef,
    /// Lookback in days.
    pub days: u32,
    /// Requested interval; the service picks one when absent.
    pub interval: Option<Interval>,
    /// Ask the service to skip its own caches.
    pub bypass_cache: bool,
}

impl HistoryRequest {
    /// Build a request with the recommended interval for `days`.
    #[must_use]
    pub const fn new(asset: AssetRef, days: u32) -> Self {
        Self {
            asset,
            days,
            interval: None,
            bypass_cache: false,
        }
    }

    /// Effective interval after availability rules.
    #[must_use]
    pub const fn effective_interval(&self) -> Interval {
        Interval::recommended(self.days, self.interval)
    }
}

/// Request for a lightweight refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshRequest {
    /// Asset to refresh.
    pub asset: AssetRef,
    /// Interval of the tail candles.
    pub interval: Interval,
    candles: u8,
}

impl RefreshRequest {
    /// Default number of tail candles.
    pub const DEFAULT_CANDLES: u8 = 3;
    /// Largest tail the service serves.
    pub const MAX_CANDLES: u8 = 10;

    /// Build a request for the default tail size.
    #[must_use]
    pub const fn new(asset: AssetRef, interval: Interval) -> Self {
        Self {
            asset,
            interval,
            candles: Self::DEFAULT_CANDLES,
        }
    }

    /// Set the tail size, clamped into `1..=10`.
    #[must_use]
    pub fn with_candles(mut self, candles: u8) -> Self {
        self.candles = candles.clamp(1, Self::MAX_CANDLES);
        self
    }

    /// Tail size.
    #[must_use]
    pub const fn candles(&self) -> u8 {
        self.candles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_points_sorts_and_keeps_last_duplicate() {
        let s = CandleSeries::from_points(vec![
            PricePoint::new("b", 200, 2.0),
            PricePoint::new("a", 100, 1.0),
            PricePoint::new("b2", 200, 2.5),
        ]);
        assert_eq!(s.len(), 2);
        assert_eq!(s.as_slice()[0].timestamp, 100);
        assert_eq!(s.as_slice()[1].price, 2.5);
    }

    #[test]
    fn refresh_candles_are_clamped() {
        let r = RefreshRequest::new(AssetRef::stock("AAPL"), Interval::H1);
        assert_eq!(r.candles(), 3);
        assert_eq!(r.clone().with_candles(0).candles(), 1);
        assert_eq!(r.with_candles(50).candles(), 10);
    }

    #[test]
    fn interval_parses_alias() {
        assert_eq!("60m".parse::<Interval>().unwrap(), Interval::H1);
        assert!("2h".parse::<Interval>().is_err());
    }

    #[test]
    fn recommended_defaults() {
        assert_eq!(Interval::recommended(7, None), Interval::M5);
        assert_eq!(Interval::recommended(8, None), Interval::H1);
        assert_eq!(Interval::recommended(61, None), Interval::D1);
        assert_eq!(Interval::recommended(100, Some(Interval::M1)), Interval::H1);
        assert_eq!(Interval::recommended(2000, Some(Interval::M1)), Interval::D1);
        assert_eq!(Interval::recommended(3, Some(Interval::M1)), Interval::M1);
    }
}
