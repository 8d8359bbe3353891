use std::time::Duration;

use chartsync::{CandleSeries, HistoryResponse, SyncConfig, SyncError, ViewError};
use chartsync_mock::MockBehavior;

use crate::helpers::{advance_secs, aapl, calls, scripted, view, view_with};

#[tokio::test(start_paused = true)]
async fn server_timeouts_are_retried_inline() {
    let (svc, ctl) = scripted().await;
    ctl.push_history(MockBehavior::Fail(SyncError::server_timeout("history")))
        .await;
    ctl.push_history(MockBehavior::Fail(SyncError::server_timeout("history")))
        .await;
    let view = view(svc);
    view.mount().await;

    assert_eq!(calls(&ctl).await.0, 3);
    let snap = view.snapshot();
    assert!(snap.has_data());
    assert!(snap.error.is_none());
}

#[tokio::test(start_paused = true)]
async fn exhausted_timeouts_surface_once() {
    let (svc, ctl) = scripted().await;
    ctl.set_history_fallback(MockBehavior::Fail(SyncError::server_timeout("history")))
        .await;
    let view = view(svc);
    view.mount().await;

    assert_eq!(calls(&ctl).await.0, 3);
    assert_eq!(view.snapshot().error, Some(ViewError::Timeout));
}

#[tokio::test(start_paused = true)]
async fn stalled_calls_are_bounded_by_request_timeout() {
    let (svc, ctl) = scripted().await;
    ctl.set_history_fallback(MockBehavior::Hang).await;
    let config = SyncConfig::default().with_request_timeout(Duration::from_secs(2));
    let view = view_with(svc, config);

    let started = tokio::time::Instant::now();
    view.mount().await;
    // Three attempts of 2 s separated by two 5 s pauses.
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_secs(16) && elapsed < Duration::from_secs(17));
    assert_eq!(calls(&ctl).await.0, 3);
    assert_eq!(view.snapshot().error, Some(ViewError::Timeout));
    assert!(view.snapshot().details.is_some());
}

#[tokio::test(start_paused = true)]
async fn unknown_symbol_is_terminal() {
    let (svc, ctl) = scripted().await;
    ctl.set_history_fallback(MockBehavior::Fail(SyncError::symbol_not_found("AAPL")))
        .await;
    ctl.set_details_fallback(MockBehavior::Fail(SyncError::symbol_not_found("AAPL")))
        .await;
    let view = view(svc);
    view.mount().await;

    let err = view.snapshot().error.expect("error shown");
    assert_eq!(
        err,
        ViewError::NotFound {
            symbol: "AAPL".into()
        }
    );
    assert!(err.is_terminal());

    advance_secs(600.0).await;
    assert_eq!(calls(&ctl).await, (1, 1, 0));
}

#[tokio::test(start_paused = true)]
async fn empty_history_payload_is_terminal() {
    let (svc, ctl) = scripted().await;
    ctl.push_history(MockBehavior::Return(HistoryResponse {
        symbol: aapl().symbol,
        interval: Some("1h".into()),
        currency: "USD".into(),
        exchange_timezone: "America/New_York".into(),
        history: CandleSeries::new(),
    }))
    .await;
    let view = view(svc);
    view.mount().await;

    match view.snapshot().error {
        Some(ViewError::EmptyHistory { symbol, message }) => {
            assert_eq!(symbol, "AAPL");
            assert!(message.contains("AAPL"));
        }
        other => panic!("expected empty-history error, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn unclassified_failure_retries_once() {
    let (svc, ctl) = scripted().await;
    ctl.push_history(MockBehavior::Fail(SyncError::unclassified(
        Some(500),
        "Internal Server Error",
    )))
    .await;
    let view = view(svc);
    view.mount().await;

    assert!(matches!(
        view.snapshot().error,
        Some(ViewError::Failed { .. })
    ));

    advance_secs(3.5).await;
    assert_eq!(calls(&ctl).await, (2, 2, 0));
    let snap = view.snapshot();
    assert!(snap.error.is_none());
    assert!(snap.has_data());
}

#[tokio::test(start_paused = true)]
async fn unclassified_failure_is_not_retried_twice() {
    let (svc, ctl) = scripted().await;
    ctl.set_history_fallback(MockBehavior::Fail(SyncError::Data("truncated body".into())))
        .await;
    let view = view(svc);
    view.mount().await;

    advance_secs(60.0).await;
    assert_eq!(calls(&ctl).await.0, 2);
    assert_eq!(
        view.snapshot().error.map(|e| e.message()),
        Some("Failed to load chart data.".to_string())
    );
}

#[tokio::test(start_paused = true)]
async fn details_failure_is_only_logged() {
    let (svc, ctl) = scripted().await;
    ctl.set_details_fallback(MockBehavior::Fail(SyncError::unclassified(Some(502), "bad gateway")))
        .await;
    let view = view(svc);
    view.mount().await;

    let snap = view.snapshot();
    assert!(snap.error.is_none());
    assert!(snap.has_data());
    assert!(snap.details.is_none());
    advance_secs(10.0).await;
    assert_eq!(calls(&ctl).await, (1, 1, 0));
}
