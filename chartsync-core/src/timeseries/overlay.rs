use chartsync_types::{CandleSeries, IndicatorSettings, PricePoint};
use serde::{Deserialize, Serialize};

use crate::indicators::{IndicatorPoint, compute_indicators};

/// One chart row: a candle with its indicator values flattened alongside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    /// Candle.
    #[serde(flatten)]
    pub point: PricePoint,
    /// Indicator values at this candle.
    #[serde(flatten)]
    pub indicators: IndicatorPoint,
}

/// Join `series` with the indicators selected in `settings`.
#[must_use]
pub fn overlay(series: &CandleSeries, settings: &IndicatorSettings) -> Vec<ChartPoint> {
    let indicators = compute_indicators(series, settings);
    series
        .iter()
        .cloned()
        .zip(indicators)
        .map(|(point, indicators)| ChartPoint { point, indicators })
        .collect()
}
