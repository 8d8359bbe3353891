use chartsync_types::{CandleSeries, PricePoint};

use crate::timezone::{TzDatabase, ZoneOffsets, convert_with};

/// Relabel every candle's `date` from the exchange zone into the viewer zone.
///
/// Timestamps and ordering are untouched; labels that cannot be converted keep
/// their original text.
#[must_use]
pub fn with_display_dates(series: &CandleSeries, source_zone: &str, target_zone: &str) -> CandleSeries {
    with_display_dates_using(&TzDatabase, series, source_zone, target_zone)
}

/// [`with_display_dates`] with an injected zone capability.
#[must_use]
pub fn with_display_dates_using(
    zones: &dyn ZoneOffsets,
    series: &CandleSeries,
    source_zone: &str,
    target_zone: &str,
) -> CandleSeries {
    if source_zone == target_zone {
        return series.clone();
    }
    series
        .iter()
        .map(|p| PricePoint {
            date: convert_with(zones, &p.date, source_zone, target_zone),
            ..p.clone()
        })
        .collect()
}

/// The last `n` candles of `series` (all of them when shorter).
#[must_use]
pub fn tail(series: &CandleSeries, n: usize) -> &[PricePoint] {
    let slice = series.as_slice();
    &slice[slice.len().saturating_sub(n)..]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relabels_without_reordering() {
        let s = CandleSeries::from_points(vec![
            PricePoint::new("2024-01-02 09:30", 1, 1.0),
            PricePoint::new("2024-01-02 10:30", 2, 2.0),
        ]);
        let out = with_display_dates(&s, "America/New_York", "Asia/Tokyo");
        let labels: Vec<&str> = out.iter().map(|p| p.date.as_str()).collect();
        assert_eq!(labels, vec!["2024-01-02 23:30", "2024-01-03 00:30"]);
        assert_eq!(out.iter().map(|p| p.timestamp).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn tail_clamps() {
        let s = CandleSeries::from_points((0..5).map(|i| PricePoint::new("d", i, 0.0)));
        assert_eq!(tail(&s, 2).len(), 2);
        assert_eq!(tail(&s, 2)[0].timestamp, 3);
        assert_eq!(tail(&s, 50).len(), 5);
    }
}
