use chartsync::{Interval, RefreshState, SyncConfig, SyncError};
use chartsync_mock::MockBehavior;

use crate::helpers::{advance_secs, calls, history, refresh, scripted, view, view_with};

#[tokio::test(start_paused = true)]
async fn tick_runs_lightweight_refresh_and_merges_tail() {
    let (svc, ctl) = scripted().await;
    let view = view(svc);
    view.mount().await;

    advance_secs(179.5).await;
    assert_eq!(calls(&ctl).await, (1, 1, 0));

    advance_secs(1.0).await;
    assert_eq!(calls(&ctl).await, (1, 1, 1));

    let snap = view.snapshot();
    assert_eq!(snap.series.len(), 49);
    let repriced = history().history.as_slice()[47].price * 1.001;
    assert!((snap.series.as_slice()[47].price - repriced).abs() < 1e-9);
    assert_eq!(snap.quote, refresh().quote);
    assert_eq!(snap.last_refresh_ms, Some(refresh().timestamp));
    assert!(matches!(
        view.scheduler().state(),
        RefreshState::CountingDown { seconds_remaining } if seconds_remaining > 170
    ));

    let req = &ctl.refresh_requests().await[0];
    assert_eq!(req.interval, Interval::H1);
    assert_eq!(req.candles(), 3);
}

#[tokio::test(start_paused = true)]
async fn refresh_keeps_cycling() {
    let (svc, ctl) = scripted().await;
    let view = view(svc);
    view.mount().await;

    advance_secs(3.0 * 180.0 + 30.0).await;
    assert_eq!(calls(&ctl).await, (1, 1, 3));
    assert_eq!(view.snapshot().series.len(), 49);
}

#[tokio::test(start_paused = true)]
async fn disabled_auto_refresh_never_fires() {
    let (svc, ctl) = scripted().await;
    let view = view_with(svc, SyncConfig::default().with_auto_refresh(false));
    view.mount().await;
    assert_eq!(view.scheduler().state(), RefreshState::Idle);

    advance_secs(600.0).await;
    assert_eq!(calls(&ctl).await, (1, 1, 0));

    view.set_auto_refresh(true);
    advance_secs(180.5).await;
    assert_eq!(calls(&ctl).await, (1, 1, 1));
}

#[tokio::test(start_paused = true)]
async fn background_failure_keeps_displayed_data() {
    let (svc, ctl) = scripted().await;
    let view = view(svc);
    view.mount().await;

    ctl.set_refresh_fallback(MockBehavior::Fail(SyncError::unclassified(
        Some(500),
        "upstream exploded",
    )))
    .await;
    view.auto_refresh().await;

    let snap = view.snapshot();
    assert!(snap.error.is_none());
    assert_eq!(snap.series.len(), 48);

    // One scheduled retry, replaying the lightweight plan.
    advance_secs(3.5).await;
    assert_eq!(calls(&ctl).await, (1, 1, 2));
    advance_secs(30.0).await;
    assert_eq!(calls(&ctl).await, (1, 1, 2));
    assert!(view.snapshot().error.is_none());
}

#[tokio::test(start_paused = true)]
async fn custom_interval_is_honored() {
    let (svc, ctl) = scripted().await;
    let config = SyncConfig::default().with_refresh_interval(std::time::Duration::from_secs(30));
    let view = view_with(svc, config);
    view.mount().await;
    assert_eq!(view.scheduler().countdown_display(), "0:30");

    advance_secs(30.5).await;
    assert_eq!(calls(&ctl).await, (1, 1, 1));
}
