use chartsync_types::MovingAverageKind;

/// Simple moving average.
///
/// Element `i` is the mean of the `period` prices ending at `i`, defined for
/// `i >= period - 1`.
///
/// ```
/// use chartsync_core::indicators::sma;
///
/// assert_eq!(sma(&[1.0, 2.0, 3.0, 4.0, 5.0], 3), vec![None, None, Some(2.0), Some(3.0), Some(4.0)]);
/// assert_eq!(sma(&[1.0, 2.0], 0), vec![None, None]);
/// ```
#[must_use]
pub fn sma(prices: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; prices.len()];
    if period == 0 || period > prices.len() {
        return out;
    }
    #[allow(clippy::cast_precision_loss)]
    let n = period as f64;
    for (offset, window) in prices.windows(period).enumerate() {
        out[offset + period - 1] = Some(window.iter().sum::<f64>() / n);
    }
    out
}

/// Exponential moving average seeded with the SMA of the first window.
///
/// `EMA[period-1] = SMA[period-1]`, then `EMA[i] = price[i]*k + EMA[i-1]*(1-k)`
/// with `k = 2 / (period + 1)`. An undefined predecessor leaves every later
/// element undefined.
#[must_use]
pub fn ema(prices: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; prices.len()];
    if period == 0 || period > prices.len() {
        return out;
    }
    #[allow(clippy::cast_precision_loss)]
    let k = 2.0 / (period as f64 + 1.0);
    let seed = sma(&prices[..period], period);
    out[period - 1] = seed[period - 1];
    for i in period..prices.len() {
        out[i] = out[i - 1].map(|prev| prices[i].mul_add(k, prev * (1.0 - k)));
    }
    out
}

/// Dispatch on the moving-average flavor.
#[must_use]
pub fn moving_average(prices: &[f64], period: usize, kind: MovingAverageKind) -> Vec<Option<f64>> {
    match kind {
        MovingAverageKind::Sma => sma(prices, period),
        MovingAverageKind::Ema => ema(prices, period),
    }
}
