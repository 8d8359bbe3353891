use core::fmt;
use serde::{Deserialize, Serialize};

/// Data-service endpoints a view talks to.
///
/// Used as a label for errors, logs and mock call accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Endpoint {
    /// Full historical candle series.
    History,
    /// Lightweight refresh: quote plus the most recent candles.
    Refresh,
    /// Asset metadata and market statistics.
    Details,
}

impl Endpoint {
    /// Stable identifier, also the final URL path segment.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::History => "history",
            Self::Refresh => "refresh",
            Self::Details => "details",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
