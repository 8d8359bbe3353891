mod common;

use std::time::Duration;

use chartsync::{AssetRef, SyncOrchestrator};
use common::init_logging;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    // The mock rejects the `RATELIMIT` symbol with a two-second wait.
    let service = std::sync::Arc::new(chartsync_mock::MockDataService::new());
    let view = SyncOrchestrator::new(service, AssetRef::stock("RATELIMIT"));
    view.mount().await;

    let retry = view.retry_controller().clone();
    let mut rx = retry.subscribe();
    println!(
        "rate limited: {} (retry in {})",
        view.is_rate_limited(),
        retry.countdown_display()
    );

    let deadline = tokio::time::Instant::now() + Duration::from_secs(8);
    while let Ok(Ok(())) = tokio::time::timeout_at(deadline, rx.changed()).await {
        let state = *rx.borrow_and_update();
        println!("retry state: {state:?}");
    }

    // A manual refresh clears any countdown immediately.
    view.manual_refresh().await;
    println!(
        "after manual refresh: limited={} error={:?}",
        view.is_rate_limited(),
        view.snapshot().error.map(|e| e.message())
    );
    Ok(())
}
