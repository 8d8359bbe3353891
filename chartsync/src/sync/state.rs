use chartsync_core::{AssetDetails, AssetRef, CandleSeries, Interval, Quote, SyncError};

/// User-facing failure of a chart view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewError {
    /// Waiting out a rate limit; the countdown is on the retry controller.
    RateLimited {
        /// Server message, if any.
        message: Option<String>,
    },
    /// The service kept timing out after the inline retries.
    Timeout,
    /// The symbol does not exist upstream.
    NotFound {
        /// Requested symbol.
        symbol: String,
    },
    /// The symbol exists but has no history yet.
    EmptyHistory {
        /// Requested symbol.
        symbol: String,
        /// Message to show as-is.
        message: String,
    },
    /// Anything else.
    Failed {
        /// Diagnostic message.
        message: String,
    },
}

impl ViewError {
    /// Build the view-level error for a classified service failure.
    #[must_use]
    pub fn from_error(err: &SyncError) -> Self {
        match err {
            SyncError::RateLimit { message, .. } => Self::RateLimited {
                message: message.clone(),
            },
            SyncError::ServerTimeout { .. } => Self::Timeout,
            SyncError::SymbolNotFound { symbol } => Self::NotFound {
                symbol: symbol.clone(),
            },
            SyncError::EmptyHistory {
                symbol,
                user_message,
            } => Self::EmptyHistory {
                symbol: symbol.clone(),
                message: user_message.clone(),
            },
            other => Self::Failed {
                message: other.to_string(),
            },
        }
    }

    /// Text suitable for display.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::RateLimited { message } => message
                .clone()
                .unwrap_or_else(|| "Rate limit reached. Retrying automatically.".to_string()),
            Self::Timeout => {
                "The data service is not responding. Please try again in a moment.".to_string()
            }
            Self::NotFound { symbol } => format!("Symbol {symbol} was not found."),
            Self::EmptyHistory { message, .. } => message.clone(),
            Self::Failed { .. } => "Failed to load chart data.".to_string(),
        }
    }

    /// True for errors that wait for user action.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::EmptyHistory { .. })
    }
}

impl std::fmt::Display for ViewError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message())
    }
}

/// Everything a chart view renders, published after every change.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewSnapshot {
    /// Asset being displayed.
    pub asset: AssetRef,
    /// Candle series in exchange-local labels.
    pub series: CandleSeries,
    /// Currency of prices.
    pub currency: Option<String>,
    /// IANA zone of the candle labels.
    pub exchange_timezone: Option<String>,
    /// Candle interval of the series.
    pub interval: Option<Interval>,
    /// Latest asset details.
    pub details: Option<AssetDetails>,
    /// Latest quote from a lightweight refresh.
    pub quote: Option<Quote>,
    /// Error to display, if any.
    pub error: Option<ViewError>,
    /// True while any load is in flight.
    pub is_loading: bool,
    /// Server timestamp (ms) of the latest applied refresh.
    pub last_refresh_ms: Option<i64>,
}

impl ViewSnapshot {
    /// Empty snapshot for `asset`.
    #[must_use]
    pub fn empty(asset: AssetRef) -> Self {
        Self {
            asset,
            series: CandleSeries::new(),
            currency: None,
            exchange_timezone: None,
            interval: None,
            details: None,
            quote: None,
            error: None,
            is_loading: false,
            last_refresh_ms: None,
        }
    }

    /// True once any candle has been applied.
    #[must_use]
    pub fn has_data(&self) -> bool {
        !self.series.is_empty()
    }

    /// Latest price: the quote when present, else the last candle.
    #[must_use]
    pub fn last_price(&self) -> Option<f64> {
        self.quote
            .as_ref()
            .map(|q| q.price)
            .or_else(|| self.series.last().map(|p| p.price))
    }
}
