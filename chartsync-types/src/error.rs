use core::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for the chartsync workspace.
///
/// Errors are classified once, at the network boundary, into one of a small
/// number of tagged variants. Downstream code matches on the variant (or on
/// [`SyncError::kind`]) and never inspects message text.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq)]
#[non_exhaustive]
pub enum SyncError {
    /// The data service refused the request because its budget is exhausted.
    #[error("rate limited{}", fmt_wait(.wait_time_seconds))]
    RateLimit {
        /// Server-suggested wait before retrying, in seconds.
        wait_time_seconds: Option<f64>,
        /// Human-readable message supplied by the server, if any.
        message: Option<String>,
    },

    /// The upstream call did not complete in time (gateway timeout, transport timeout).
    #[error("server timeout: {endpoint}")]
    ServerTimeout {
        /// Endpoint label that timed out (e.g. "history").
        endpoint: String,
    },

    /// The requested symbol is unknown to the data service.
    #[error("symbol not found: {symbol}")]
    SymbolNotFound {
        /// Symbol as requested.
        symbol: String,
    },

    /// The symbol exists but the service returned no candles for it.
    #[error("empty history for {symbol}: {user_message}")]
    EmptyHistory {
        /// Symbol as requested.
        symbol: String,
        /// Message suitable for display.
        user_message: String,
    },

    /// Any other failure, carrying the HTTP status when one was observed.
    #[error("request failed{}: {message}", fmt_status(.status))]
    Unclassified {
        /// HTTP status code, when the failure came from an HTTP response.
        status: Option<u16>,
        /// Human-readable error message.
        message: String,
    },

    /// Issues with the returned or expected data (malformed payload, missing fields).
    #[error("data issue: {0}")]
    Data(String),

    /// Invalid input argument.
    #[error("invalid argument: {0}")]
    InvalidArg(String),
}

#[allow(clippy::ref_option)]
fn fmt_wait(wait: &Option<f64>) -> String {
    wait.map_or_else(String::new, |w| format!(" (retry after {w}s)"))
}

#[allow(clippy::ref_option)]
fn fmt_status(status: &Option<u16>) -> String {
    status.map_or_else(String::new, |s| format!(" with status {s}"))
}

/// Coarse classification tag of a [`SyncError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// See [`SyncError::RateLimit`].
    RateLimit,
    /// See [`SyncError::ServerTimeout`].
    ServerTimeout,
    /// See [`SyncError::SymbolNotFound`].
    SymbolNotFound,
    /// See [`SyncError::EmptyHistory`].
    EmptyHistory,
    /// Everything else, including data and argument errors.
    Unclassified,
}

impl ErrorKind {
    /// Stable, kebab-case identifier for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RateLimit => "rate-limit",
            Self::ServerTimeout => "server-timeout",
            Self::SymbolNotFound => "symbol-not-found",
            Self::EmptyHistory => "empty-history",
            Self::Unclassified => "unclassified",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl SyncError {
    /// Helper: build a `RateLimit` error with an optional server wait.
    #[must_use]
    pub const fn rate_limit(wait_time_seconds: Option<f64>) -> Self {
        Self::RateLimit {
            wait_time_seconds,
            message: None,
        }
    }

    /// Helper: build a `ServerTimeout` error for an endpoint label.
    pub fn server_timeout(endpoint: impl Into<String>) -> Self {
        Self::ServerTimeout {
            endpoint: endpoint.into(),
        }
    }

    /// Helper: build a `SymbolNotFound` error.
    pub fn symbol_not_found(symbol: impl Into<String>) -> Self {
        Self::SymbolNotFound {
            symbol: symbol.into(),
        }
    }

    /// Helper: build an `EmptyHistory` error with a generic user message.
    pub fn empty_history(symbol: impl Into<String>) -> Self {
        let symbol = symbol.into();
        let user_message = format!(
            "No price history is available for {symbol} right now. Please check again later."
        );
        Self::EmptyHistory {
            symbol,
            user_message,
        }
    }

    /// Helper: build an `Unclassified` error.
    pub fn unclassified(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Unclassified {
            status,
            message: message.into(),
        }
    }

    /// Classification tag used by retry policy.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::RateLimit { .. } => ErrorKind::RateLimit,
            Self::ServerTimeout { .. } => ErrorKind::ServerTimeout,
            Self::SymbolNotFound { .. } => ErrorKind::SymbolNotFound,
            Self::EmptyHistory { .. } => ErrorKind::EmptyHistory,
            Self::Unclassified { .. } | Self::Data(_) | Self::InvalidArg(_) => {
                ErrorKind::Unclassified
            }
        }
    }

    /// Returns true for errors that no automatic retry can fix.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::SymbolNotFound { .. } | Self::EmptyHistory { .. }
        )
    }

    /// Server-suggested wait for rate-limit errors.
    #[must_use]
    pub const fn retry_after(&self) -> Option<f64> {
        match self {
            Self::RateLimit {
                wait_time_seconds, ..
            } => *wait_time_seconds,
            _ => None,
        }
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        Self::Data(err.to_string())
    }
}
