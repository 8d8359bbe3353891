//! Mapping of raw HTTP outcomes onto the typed error taxonomy.

use chartsync_core::{Endpoint, SyncError};
use serde::Deserialize;

/// Error body shape served by the data service. Every field is optional.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    retry_after: Option<f64>,
    #[serde(default)]
    error_type: Option<String>,
    #[serde(default)]
    symbol: Option<String>,
}

const EMPTY_HISTORY_TYPE: &str = "empty_history";

fn looks_like_timeout(msg: &str) -> bool {
    let m = msg.to_ascii_lowercase();
    m.contains("timeout") || m.contains("timed out")
}

/// Parse a `Retry-After` header given in seconds.
fn parse_retry_after(header: &str) -> Option<f64> {
    header
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|w| w.is_finite() && *w >= 0.0)
}

/// Classify a non-success response.
///
/// - 429: rate limit, wait taken from the body's `retry_after`, else the header
/// - 404 with `error_type == "empty_history"`: empty history
/// - other 404: symbol not found
/// - 408, 502, 503, 504, or a 500 mentioning a timeout: server timeout
/// - anything else: unclassified, carrying the status
#[must_use]
pub fn classify_response(
    endpoint: Endpoint,
    symbol: &str,
    status: u16,
    body: &str,
    retry_after_header: Option<&str>,
) -> SyncError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let text = parsed.error.clone().or_else(|| parsed.message.clone());

    match status {
        429 => SyncError::RateLimit {
            wait_time_seconds: parsed
                .retry_after
                .filter(|w| w.is_finite())
                .or_else(|| retry_after_header.and_then(parse_retry_after)),
            message: parsed.message.or(parsed.error),
        },
        404 if parsed.error_type.as_deref() == Some(EMPTY_HISTORY_TYPE) => {
            let symbol = parsed.symbol.unwrap_or_else(|| symbol.to_string());
            match parsed.error {
                Some(user_message) => SyncError::EmptyHistory {
                    symbol,
                    user_message,
                },
                None => SyncError::empty_history(symbol),
            }
        }
        404 => SyncError::symbol_not_found(symbol),
        408 | 502 | 503 | 504 => SyncError::server_timeout(endpoint.as_str()),
        500 if text.as_deref().is_some_and(looks_like_timeout) || looks_like_timeout(body) => {
            SyncError::server_timeout(endpoint.as_str())
        }
        _ => SyncError::unclassified(
            Some(status),
            text.unwrap_or_else(|| {
                if body.trim().is_empty() {
                    format!("{endpoint} request failed")
                } else {
                    body.chars().take(200).collect()
                }
            }),
        ),
    }
}

/// Classify a transport-level failure (no response was received).
#[must_use]
pub fn classify_transport(endpoint: Endpoint, err: &reqwest::Error) -> SyncError {
    if err.is_timeout() {
        SyncError::server_timeout(endpoint.as_str())
    } else if err.is_decode() {
        SyncError::Data(err.to_string())
    } else {
        SyncError::unclassified(err.status().map(|s| s.as_u16()), err.to_string())
    }
}
