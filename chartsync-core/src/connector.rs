use async_trait::async_trait;

use chartsync_types::{
    AssetDetails, AssetRef, HistoryRequest, HistoryResponse, RefreshRequest, RefreshResponse,
    SyncError,
};

/// The remote data service a chart view synchronizes against.
///
/// Implementations classify every failure into a [`SyncError`] variant before
/// returning it; callers never parse messages.
#[async_trait]
pub trait DataService: Send + Sync {
    /// Human-readable service name used in logs.
    fn name(&self) -> &'static str;

    /// Fetch the full candle series for the requested lookback.
    async fn history(&self, req: &HistoryRequest) -> Result<HistoryResponse, SyncError>;

    /// Fetch the current quote plus the most recent candles.
    async fn refresh(&self, req: &RefreshRequest) -> Result<RefreshResponse, SyncError>;

    /// Fetch asset metadata and market statistics.
    async fn details(&self, asset: &AssetRef) -> Result<AssetDetails, SyncError>;
}
