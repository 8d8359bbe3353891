//! Configuration types shared by controllers and the orchestrator.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Moving-average periods offered to users.
pub const MA_PERIODS: [usize; 6] = [5, 10, 20, 50, 100, 200];

/// Bollinger band width multipliers offered to users.
pub const BOLLINGER_MULTIPLIERS: [f64; 5] = [1.0, 1.5, 2.0, 2.5, 3.0];

/// Rate-limit countdown configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Wait used when the server does not suggest one.
    pub default_delay: Duration,
    /// Extra whole seconds added to every countdown.
    pub buffer_seconds: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            default_delay: Duration::from_secs(60),
            buffer_seconds: 1,
        }
    }
}

/// Auto-refresh scheduling configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshConfig {
    /// Whether auto-refresh starts enabled.
    pub enabled: bool,
    /// Time between refreshes.
    pub interval: Duration,
    /// Number of tail candles requested by a lightweight refresh.
    pub tail_candles: u8,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval: Duration::from_secs(180),
            tail_candles: 3,
        }
    }
}

/// Bounded inline retry for server timeouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeoutRetryConfig {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before each retry.
    pub delay: Duration,
}

impl Default for TimeoutRetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            delay: Duration::from_secs(5),
        }
    }
}

/// Global configuration for a synchronized chart view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Rate-limit countdown settings.
    pub retry: RetryConfig,
    /// Auto-refresh settings.
    pub auto_refresh: RefreshConfig,
    /// Server-timeout retry settings.
    pub server_timeout: TimeoutRetryConfig,
    /// Delay before the single retry of an unclassified failure.
    pub unclassified_retry_delay: Duration,
    /// Upper bound for any single service call.
    pub request_timeout: Duration,
    /// Lookback of a full load, in days.
    pub history_days: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            retry: RetryConfig::default(),
            auto_refresh: RefreshConfig::default(),
            server_timeout: TimeoutRetryConfig::default(),
            unclassified_retry_delay: Duration::from_secs(3),
            request_timeout: Duration::from_secs(30),
            history_days: 30,
        }
    }
}

impl SyncConfig {
    /// Set the auto-refresh interval.
    #[must_use]
    pub const fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.auto_refresh.interval = interval;
        self
    }

    /// Enable or disable auto-refresh.
    #[must_use]
    pub const fn with_auto_refresh(mut self, enabled: bool) -> Self {
        self.auto_refresh.enabled = enabled;
        self
    }

    /// Set the default rate-limit wait.
    #[must_use]
    pub const fn with_default_retry_delay(mut self, delay: Duration) -> Self {
        self.retry.default_delay = delay;
        self
    }

    /// Set the per-call timeout.
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the history lookback.
    #[must_use]
    pub const fn with_history_days(mut self, days: u32) -> Self {
        self.history_days = days;
        self
    }
}

/// Moving-average flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovingAverageKind {
    /// Simple moving average.
    #[default]
    Sma,
    /// Exponential moving average.
    Ema,
}

/// One moving-average overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovingAverageSpec {
    /// Window length in candles.
    pub period: usize,
    /// Flavor.
    pub kind: MovingAverageKind,
}

/// Bollinger band overlay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerSpec {
    /// Window length in candles.
    pub period: usize,
    /// Band width in standard deviations.
    pub multiplier: f64,
}

/// Indicator selection of a chart view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSettings {
    /// First moving average.
    pub ma1: Option<MovingAverageSpec>,
    /// Second moving average.
    pub ma2: Option<MovingAverageSpec>,
    /// Bollinger bands.
    pub bollinger: Option<BollingerSpec>,
}

impl IndicatorSettings {
    /// No overlays.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            ma1: None,
            ma2: None,
            bollinger: None,
        }
    }
}

impl Default for IndicatorSettings {
    fn default() -> Self {
        Self {
            ma1: Some(MovingAverageSpec {
                period: 20,
                kind: MovingAverageKind::Sma,
            }),
            ma2: Some(MovingAverageSpec {
                period: 50,
                kind: MovingAverageKind::Ema,
            }),
            bollinger: Some(BollingerSpec {
                period: 20,
                multiplier: 2.0,
            }),
        }
    }
}
