//! Technical indicators over close-price series.
//!
//! Every function returns one element per input price; an element is `None`
//! until a full window of history exists behind it. All functions are pure and
//! total: empty input yields empty output and a zero period yields no values.
/// Bollinger bands.
pub mod bollinger;
/// Simple and exponential moving averages.
pub mod moving_average;
/// Per-candle indicator assembly driven by view settings.
pub mod series;

pub use bollinger::{BollingerPoint, bollinger_bands};
pub use moving_average::{ema, moving_average, sma};
pub use series::{IndicatorPoint, compute_for_prices, compute_indicators};
