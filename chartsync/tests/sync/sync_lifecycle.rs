use std::time::Duration;

use chartsync::{RefreshState, RetryState, SyncError};
use chartsync_mock::MockBehavior;

use crate::helpers::{AAPL, advance_secs, calls, history, scripted, view};

#[tokio::test(start_paused = true)]
async fn subscribers_see_loading_then_data() {
    let (svc, _ctl) = scripted().await;
    let view = view(svc);
    let mut rx = view.subscribe();
    assert!(!rx.borrow_and_update().has_data());

    view.mount().await;
    assert!(rx.has_changed().expect("sender alive"));
    let snap = rx.borrow_and_update().clone();
    assert_eq!(snap.series.len(), 48);
    assert!(!snap.is_loading);
}

#[tokio::test(start_paused = true)]
async fn is_loading_is_set_while_fetching() {
    let (svc, ctl) = scripted().await;
    ctl.push_history(MockBehavior::Delayed(Duration::from_secs(2), Ok(history())))
        .await;
    let view = view(svc);

    tokio::join!(view.mount(), async {
        advance_secs(1.0).await;
        assert!(view.snapshot().is_loading);
    });
    assert!(!view.snapshot().is_loading);
}

#[tokio::test(start_paused = true)]
async fn unmount_stops_every_timer() {
    let (svc, ctl) = scripted().await;
    ctl.push_history(MockBehavior::Fail(SyncError::rate_limit(Some(5.0))))
        .await;
    let view = view(svc);
    view.mount().await;
    assert!(view.is_rate_limited());

    view.unmount();
    assert_eq!(view.retry_controller().state(), RetryState::Idle);
    assert_eq!(view.scheduler().state(), RefreshState::Idle);

    advance_secs(600.0).await;
    assert_eq!(calls(&ctl).await, (1, 1, 0));
}

#[tokio::test(start_paused = true)]
async fn results_arriving_after_unmount_are_dropped() {
    let (svc, ctl) = scripted().await;
    ctl.push_history(MockBehavior::Delayed(Duration::from_secs(10), Ok(history())))
        .await;
    let view = view(svc);

    tokio::join!(view.mount(), async {
        advance_secs(1.0).await;
        view.unmount();
    });
    assert!(!view.snapshot().has_data());
    assert_eq!(calls(&ctl).await.0, 1);
}

#[tokio::test(start_paused = true)]
async fn dropping_the_view_stops_auto_refresh() {
    let (svc, ctl) = scripted().await;
    {
        let view = view(svc);
        view.mount().await;
    }
    advance_secs(600.0).await;
    assert_eq!(calls(&ctl).await, (1, 1, 0));
}

#[tokio::test(start_paused = true)]
async fn cancelling_the_countdown_resumes_auto_refresh() {
    let (svc, ctl) = scripted().await;
    let view = view(svc);
    view.mount().await;

    ctl.push_refresh(MockBehavior::Fail(SyncError::rate_limit(Some(30.0))))
        .await;
    view.auto_refresh().await;
    assert!(view.is_rate_limited());
    assert!(view.scheduler().is_paused());

    view.retry_controller().cancel();
    advance_secs(0.5).await;
    assert!(!view.is_rate_limited());
    assert!(!view.scheduler().is_paused());
    assert_eq!(view.scheduler().seconds_remaining(), 180);

    advance_secs(180.0).await;
    assert_eq!(calls(&ctl).await, (1, 1, 2));
}

#[tokio::test(start_paused = true)]
async fn remount_after_rate_limit_restarts_auto_refresh() {
    let (svc, ctl) = scripted().await;
    ctl.push_history(MockBehavior::Fail(SyncError::rate_limit(Some(5.0))))
        .await;
    let view = view(svc);
    view.mount().await;
    assert!(view.scheduler().is_paused());

    view.unmount();
    assert!(!view.scheduler().is_paused());
    view.mount().await;
    assert!(view.snapshot().has_data());
    assert!(!view.scheduler().is_paused());
    assert_eq!(view.scheduler().seconds_remaining(), 180);

    advance_secs(180.5).await;
    assert_eq!(calls(&ctl).await, (2, 2, 1));
}

#[tokio::test(start_paused = true)]
async fn remount_clears_hold_left_by_unknown_symbol() {
    let (svc, ctl) = scripted().await;
    ctl.push_history(MockBehavior::Fail(SyncError::symbol_not_found(AAPL)))
        .await;
    let view = view(svc);
    view.mount().await;
    assert!(!view.snapshot().has_data());
    assert!(view.scheduler().is_paused());

    view.unmount();
    view.mount().await;
    assert!(view.snapshot().has_data());
    assert!(!view.scheduler().is_paused());

    advance_secs(180.5).await;
    assert_eq!(calls(&ctl).await.2, 1);
}
