use serde::{Deserialize, Serialize};

/// Bollinger band values for one candle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerPoint {
    /// `middle + sigma * multiplier`.
    pub upper: f64,
    /// Simple moving average of the window.
    pub middle: f64,
    /// `middle - sigma * multiplier`.
    pub lower: f64,
}

/// Bollinger bands over `period` prices.
///
/// The middle band is the SMA; the width uses the population standard
/// deviation of the same window.
///
/// ```
/// use chartsync_core::indicators::bollinger_bands;
///
/// let bands = bollinger_bands(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0], 8, 2.0);
/// let last = bands[7].unwrap();
/// assert_eq!(last.middle, 5.0);
/// assert_eq!(last.upper, 9.0);
/// assert_eq!(last.lower, 1.0);
/// ```
#[must_use]
pub fn bollinger_bands(prices: &[f64], period: usize, multiplier: f64) -> Vec<Option<BollingerPoint>> {
    let mut out = vec![None; prices.len()];
    if period == 0 || period > prices.len() {
        return out;
    }
    #[allow(clippy::cast_precision_loss)]
    let n = period as f64;
    for (offset, window) in prices.windows(period).enumerate() {
        let middle = window.iter().sum::<f64>() / n;
        let variance = window.iter().map(|p| (p - middle).powi(2)).sum::<f64>() / n;
        let width = variance.sqrt() * multiplier;
        out[offset + period - 1] = Some(BollingerPoint {
            upper: middle + width,
            middle,
            lower: middle - width,
        });
    }
    out
}
