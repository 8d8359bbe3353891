// Shared fixtures for chart-view tests; import with `use crate::helpers::*;`.
#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use chartsync::{
    AssetDetails, AssetRef, DataService, Endpoint, HistoryResponse, Interval, RefreshResponse,
    SyncConfig, SyncOrchestrator,
};
use chartsync_mock::{DynamicMockController, DynamicMockService, MockBehavior, fixtures};

pub const AAPL: &str = "AAPL";

pub fn aapl() -> AssetRef {
    AssetRef::stock(AAPL)
}

pub fn history() -> HistoryResponse {
    fixtures::history(&aapl(), Interval::H1).expect("AAPL history fixture")
}

pub fn details() -> AssetDetails {
    fixtures::details(&aapl()).expect("AAPL details fixture")
}

pub fn refresh() -> RefreshResponse {
    fixtures::refresh(&aapl(), Interval::H1, 3).expect("AAPL refresh fixture")
}

/// Scripted service whose endpoints succeed with the AAPL fixtures unless a
/// test queues something else first.
pub async fn scripted() -> (Arc<dyn DataService>, DynamicMockController) {
    let (svc, ctl) = DynamicMockService::new_with_controller("scripted");
    ctl.set_history_fallback(MockBehavior::Return(history())).await;
    ctl.set_details_fallback(MockBehavior::Return(details())).await;
    ctl.set_refresh_fallback(MockBehavior::Return(refresh())).await;
    (svc, ctl)
}

pub fn view(svc: Arc<dyn DataService>) -> SyncOrchestrator {
    SyncOrchestrator::new(svc, aapl())
}

pub fn view_with(svc: Arc<dyn DataService>, config: SyncConfig) -> SyncOrchestrator {
    SyncOrchestrator::builder(svc, aapl()).config(config).build()
}

/// Let paused time run forward, firing every timer due on the way.
pub async fn advance_secs(secs: f64) {
    tokio::time::sleep(Duration::from_secs_f64(secs)).await;
}

pub async fn calls(ctl: &DynamicMockController) -> (usize, usize, usize) {
    (
        ctl.calls(Endpoint::History).await,
        ctl.calls(Endpoint::Details).await,
        ctl.calls(Endpoint::Refresh).await,
    )
}

/// A callback plus the counter it bumps.
pub fn counter() -> (Arc<AtomicUsize>, impl Fn() + Send + Sync + 'static) {
    let count = Arc::new(AtomicUsize::new(0));
    let bump = Arc::clone(&count);
    (count, move || {
        bump.fetch_add(1, Ordering::SeqCst);
    })
}

pub fn count(c: &AtomicUsize) -> usize {
    c.load(Ordering::SeqCst)
}
