use chartsync_types::{CandleSeries, IndicatorSettings};
use serde::{Deserialize, Serialize};

use super::{bollinger_bands, moving_average};

/// Indicator values aligned with one candle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorPoint {
    /// First moving average.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ma1: Option<f64>,
    /// Second moving average.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ma2: Option<f64>,
    /// Upper Bollinger band.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bb_upper: Option<f64>,
    /// Middle Bollinger band.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bb_middle: Option<f64>,
    /// Lower Bollinger band.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bb_lower: Option<f64>,
}

/// Compute the overlays selected in `settings` for every candle of `series`.
#[must_use]
pub fn compute_indicators(series: &CandleSeries, settings: &IndicatorSettings) -> Vec<IndicatorPoint> {
    compute_for_prices(&series.prices(), settings)
}

/// [`compute_indicators`] over raw close prices.
#[must_use]
pub fn compute_for_prices(prices: &[f64], settings: &IndicatorSettings) -> Vec<IndicatorPoint> {
    let mut out = vec![IndicatorPoint::default(); prices.len()];

    if let Some(spec) = settings.ma1 {
        for (point, v) in out.iter_mut().zip(moving_average(prices, spec.period, spec.kind)) {
            point.ma1 = v;
        }
    }
    if let Some(spec) = settings.ma2 {
        for (point, v) in out.iter_mut().zip(moving_average(prices, spec.period, spec.kind)) {
            point.ma2 = v;
        }
    }
    if let Some(spec) = settings.bollinger {
        for (point, band) in out
            .iter_mut()
            .zip(bollinger_bands(prices, spec.period, spec.multiplier))
        {
            if let Some(b) = band {
                point.bb_upper = Some(b.upper);
                point.bb_middle = Some(b.middle);
                point.bb_lower = Some(b.lower);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chartsync_types::{BollingerSpec, MovingAverageKind, MovingAverageSpec};

    #[test]
    fn disabled_overlays_stay_empty() {
        let out = compute_for_prices(&[1.0, 2.0, 3.0], &IndicatorSettings::none());
        assert!(out.iter().all(|p| *p == IndicatorPoint::default()));
    }

    #[test]
    fn each_overlay_fills_its_own_field() {
        let settings = IndicatorSettings {
            ma1: Some(MovingAverageSpec { period: 2, kind: MovingAverageKind::Sma }),
            ma2: None,
            bollinger: Some(BollingerSpec { period: 3, multiplier: 1.0 }),
        };
        let out = compute_for_prices(&[1.0, 3.0, 5.0], &settings);
        assert_eq!(out[0].ma1, None);
        assert_eq!(out[1].ma1, Some(2.0));
        assert_eq!(out[1].bb_middle, None);
        assert_eq!(out[2].bb_middle, Some(3.0));
        assert!(out.iter().all(|p| p.ma2.is_none()));
    }

    #[test]
    fn serializes_camel_case_and_skips_missing() {
        let p = IndicatorPoint { bb_upper: Some(1.0), ..IndicatorPoint::default() };
        assert_eq!(serde_json::to_string(&p).unwrap(), r#"{"bbUpper":1.0}"#);
    }
}
