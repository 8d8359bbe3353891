use std::collections::BTreeMap;

use chartsync_types::{CandleSeries, PricePoint};

/// Merge freshly fetched candles into an existing series.
///
/// - Candles are keyed by `timestamp`; an incoming candle replaces an existing
///   one with the same timestamp wholesale.
/// - The result is sorted ascending and unique by timestamp.
/// - Within `incoming`, a later duplicate wins over an earlier one.
///
/// Merging an empty batch or the series itself returns an equal series.
///
/// ```
/// use chartsync_core::timeseries::merge::merge_candles;
/// use chartsync_types::{CandleSeries, PricePoint};
///
/// let held = CandleSeries::from_points(vec![
///     PricePoint::new("a", 100, 10.0),
///     PricePoint::new("b", 200, 20.0),
/// ]);
/// let merged = merge_candles(
///     &held,
///     &[PricePoint::new("b", 200, 21.0), PricePoint::new("c", 300, 30.0)],
/// );
/// assert_eq!(merged.prices(), vec![10.0, 21.0, 30.0]);
/// ```
#[must_use]
pub fn merge_candles(existing: &CandleSeries, incoming: &[PricePoint]) -> CandleSeries {
    if incoming.is_empty() {
        return existing.clone();
    }
    let mut by_ts: BTreeMap<i64, PricePoint> = existing
        .iter()
        .map(|p| (p.timestamp, p.clone()))
        .collect();
    for p in incoming {
        by_ts.insert(p.timestamp, p.clone());
    }
    CandleSeries::from_map(by_ts)
}

/// Fold several batches into `existing`, in order; later batches win.
#[must_use]
pub fn merge_all<'a, I>(existing: &CandleSeries, batches: I) -> CandleSeries
where
    I: IntoIterator<Item = &'a [PricePoint]>,
{
    batches
        .into_iter()
        .fold(existing.clone(), |acc, batch| merge_candles(&acc, batch))
}
