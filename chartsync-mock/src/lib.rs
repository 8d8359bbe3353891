//! In-memory data services for tests and demos.
//!
//! - [`MockDataService`] serves deterministic fixtures and maps a few magic
//!   symbols onto each error class.
//! - [`DynamicMockService`] defers every call to a scriptable controller.
#![warn(missing_docs)]

use async_trait::async_trait;
use chartsync_core::{
    AssetDetails, AssetRef, DataService, HistoryRequest, HistoryResponse, RefreshRequest,
    RefreshResponse, SyncError,
};

mod dynamic;
pub mod fixtures;

pub use dynamic::{DynamicMockController, DynamicMockService, MockBehavior};

/// Mock service for CI-safe demos. Provides deterministic data from static fixtures.
///
/// Magic symbols: `RATELIMIT` fails with a two-second rate limit, `TIMEOUT`
/// with a server timeout, `EMPTY` with an empty history and `FAIL` with an
/// unclassified error.
pub struct MockDataService;

impl Default for MockDataService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDataService {
    /// Create the service.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn maybe_fail(asset: &AssetRef, endpoint: &'static str) -> Result<(), SyncError> {
        match asset.symbol.as_str() {
            "RATELIMIT" => Err(SyncError::RateLimit {
                wait_time_seconds: Some(2.0),
                message: Some("mock rate limit".into()),
            }),
            "TIMEOUT" => Err(SyncError::server_timeout(endpoint)),
            "EMPTY" => Err(SyncError::empty_history(asset.symbol.clone())),
            "FAIL" => Err(SyncError::unclassified(
                Some(500),
                format!("forced failure: {endpoint}"),
            )),
            _ if fixtures::is_known(asset) => Ok(()),
            _ => Err(SyncError::symbol_not_found(asset.symbol.clone())),
        }
    }
}

#[async_trait]
impl DataService for MockDataService {
    fn name(&self) -> &'static str {
        "chartsync-mock"
    }

    async fn history(&self, req: &HistoryRequest) -> Result<HistoryResponse, SyncError> {
        Self::maybe_fail(&req.asset, "history")?;
        fixtures::history(&req.asset, req.effective_interval())
            .ok_or_else(|| SyncError::symbol_not_found(req.asset.symbol.clone()))
    }

    async fn refresh(&self, req: &RefreshRequest) -> Result<RefreshResponse, SyncError> {
        Self::maybe_fail(&req.asset, "refresh")?;
        fixtures::refresh(&req.asset, req.interval, req.candles())
            .ok_or_else(|| SyncError::symbol_not_found(req.asset.symbol.clone()))
    }

    async fn details(&self, asset: &AssetRef) -> Result<AssetDetails, SyncError> {
        Self::maybe_fail(asset, "details")?;
        fixtures::details(asset).ok_or_else(|| SyncError::symbol_not_found(asset.symbol.clone()))
    }
}
