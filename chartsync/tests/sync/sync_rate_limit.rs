use chartsync::{RefreshState, SyncError, ViewError};
use chartsync_mock::MockBehavior;

use crate::helpers::{advance_secs, calls, scripted, view};

fn limited(wait: f64) -> SyncError {
    SyncError::RateLimit {
        wait_time_seconds: Some(wait),
        message: Some("Too many requests".into()),
    }
}

#[tokio::test(start_paused = true)]
async fn initial_rate_limit_counts_down_then_reloads() {
    let (svc, ctl) = scripted().await;
    ctl.push_history(MockBehavior::Fail(limited(5.0))).await;
    let view = view(svc);
    view.mount().await;

    let snap = view.snapshot();
    assert!(!snap.has_data());
    assert_eq!(
        snap.error,
        Some(ViewError::RateLimited {
            message: Some("Too many requests".into())
        })
    );
    assert!(view.is_rate_limited());
    assert_eq!(view.retry_controller().seconds_remaining(), 6);
    assert_eq!(view.scheduler().state(), RefreshState::Idle);

    advance_secs(5.5).await;
    assert!(view.is_rate_limited());
    assert_eq!(calls(&ctl).await.0, 1);

    advance_secs(1.0).await;
    assert!(!view.is_rate_limited());
    assert_eq!(calls(&ctl).await.0, 2);
    let snap = view.snapshot();
    assert!(snap.has_data());
    assert!(snap.error.is_none());
    assert!(matches!(view.scheduler().state(), RefreshState::CountingDown { .. }));
}

#[tokio::test(start_paused = true)]
async fn sibling_success_does_not_clear_rate_limit() {
    let (svc, ctl) = scripted().await;
    ctl.push_details(MockBehavior::Fail(limited(10.0))).await;
    let view = view(svc);
    view.mount().await;

    let snap = view.snapshot();
    assert!(snap.has_data());
    assert!(snap.details.is_none());
    assert!(view.is_rate_limited());
    assert_eq!(view.retry_controller().countdown_display(), "0:11");

    advance_secs(12.0).await;
    assert!(!view.is_rate_limited());
    assert_eq!(calls(&ctl).await, (2, 2, 0));
    assert!(view.snapshot().details.is_some());
}

#[tokio::test(start_paused = true)]
async fn longer_wait_wins_when_both_endpoints_are_limited() {
    let (svc, ctl) = scripted().await;
    ctl.push_history(MockBehavior::Fail(limited(20.0))).await;
    ctl.push_details(MockBehavior::Fail(limited(2.0))).await;
    let view = view(svc);
    view.mount().await;

    assert_eq!(view.retry_controller().seconds_remaining(), 21);
    advance_secs(5.0).await;
    assert_eq!(calls(&ctl).await, (1, 1, 0));
}

#[tokio::test(start_paused = true)]
async fn manual_refresh_cancels_countdown() {
    let (svc, ctl) = scripted().await;
    ctl.push_history(MockBehavior::Fail(limited(30.0))).await;
    let view = view(svc);
    view.mount().await;
    assert!(view.is_rate_limited());

    view.manual_refresh().await;
    assert!(!view.is_rate_limited());
    assert!(view.snapshot().has_data());
    assert_eq!(calls(&ctl).await.0, 2);

    advance_secs(40.0).await;
    assert_eq!(calls(&ctl).await.0, 2);
}

#[tokio::test(start_paused = true)]
async fn lightweight_rate_limit_replays_lightweight() {
    let (svc, ctl) = scripted().await;
    let view = view(svc);
    view.mount().await;

    ctl.push_refresh(MockBehavior::Fail(limited(2.0))).await;
    view.auto_refresh().await;
    assert!(view.is_rate_limited());
    assert!(view.snapshot().error.is_none());
    assert_eq!(view.scheduler().state(), RefreshState::Idle);

    advance_secs(3.5).await;
    assert_eq!(calls(&ctl).await, (1, 1, 2));
    assert_eq!(view.snapshot().series.len(), 49);
}

#[tokio::test(start_paused = true)]
async fn rate_limit_without_server_wait_uses_default() {
    let (svc, ctl) = scripted().await;
    ctl.push_history(MockBehavior::Fail(SyncError::rate_limit(None))).await;
    let view = view(svc);
    view.mount().await;
    assert_eq!(view.retry_controller().countdown_display(), "1:01");
}
