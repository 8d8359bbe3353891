//! chartsync-core
//!
//! Pure algorithms and seams shared across the chartsync workspace.
//!
//! - `indicators`: SMA, EMA and Bollinger bands aligned with a candle series.
//! - `timezone`: wall-clock conversion between IANA zones.
//! - `timeseries`: keyed candle merge and chart overlays.
//! - `market_hours`: exchange profiles and open/close countdowns.
//! - `clock`: injectable source of "now".
//! - `connector`: the `DataService` trait implemented by data sources.
//!
//! Nothing in this crate spawns tasks or owns timers; the stateful
//! controllers live in the `chartsync` crate.
#![warn(missing_docs)]

/// Injectable time source.
pub mod clock;
/// The data service trait.
pub mod connector;
/// Technical indicators.
pub mod indicators;
/// Exchange trading hours.
pub mod market_hours;
/// Candle-series merge and overlay utilities.
pub mod timeseries;
/// Wall-clock timezone conversion.
pub mod timezone;

pub use chartsync_types::*;
pub use clock::{Clock, ManualClock, SystemClock};
pub use connector::DataService;
pub use indicators::{IndicatorPoint, compute_indicators};
pub use market_hours::{ExchangeProfile, MarketStatus, market_status};
pub use timeseries::merge::{merge_all, merge_candles};
pub use timeseries::overlay::{ChartPoint, overlay};
pub use timezone::{TimezoneError, TzDatabase, ZoneOffsets};

/// Re-exported so downstream crates share one zone type.
pub use chrono_tz::Tz;
