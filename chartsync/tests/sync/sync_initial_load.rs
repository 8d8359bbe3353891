use std::sync::Arc;

use chartsync::market_hours::{MarketPhase, Transition};
use chartsync::{IndicatorSettings, Interval, ManualClock, SyncOrchestrator, Tz};
use chrono::{TimeZone, Utc};

use crate::helpers::{aapl, calls, history, scripted, view};

#[tokio::test(start_paused = true)]
async fn mount_runs_a_full_load() {
    let (svc, ctl) = scripted().await;
    let view = view(svc);
    view.mount().await;

    let snap = view.snapshot();
    assert_eq!(snap.series.len(), 48);
    assert_eq!(snap.currency.as_deref(), Some("USD"));
    assert_eq!(snap.exchange_timezone.as_deref(), Some("America/New_York"));
    assert_eq!(snap.interval, Some(Interval::H1));
    assert_eq!(snap.details.as_ref().map(|d| d.name.as_str()), Some("Apple Inc."));
    assert!(snap.error.is_none());
    assert!(!snap.is_loading);
    assert_eq!(calls(&ctl).await, (1, 1, 0));

    let req = &ctl.history_requests().await[0];
    assert_eq!(req.days, 30);
    assert!(!req.bypass_cache);
}

#[tokio::test(start_paused = true)]
async fn mount_twice_loads_once() {
    let (svc, ctl) = scripted().await;
    let view = view(svc);
    view.mount().await;
    view.mount().await;
    assert_eq!(calls(&ctl).await, (1, 1, 0));
}

#[tokio::test(start_paused = true)]
async fn manual_refresh_reloads_fully_and_bypasses_cache() {
    let (svc, ctl) = scripted().await;
    let view = view(svc);
    view.mount().await;
    view.manual_refresh().await;

    assert_eq!(calls(&ctl).await, (2, 2, 0));
    let reqs = ctl.history_requests().await;
    assert!(reqs[1].bypass_cache);
    assert_eq!(view.scheduler().seconds_remaining(), 180);
}

#[tokio::test(start_paused = true)]
async fn chart_relabels_into_viewer_zone() {
    let (svc, _ctl) = scripted().await;
    let view = view(svc);
    view.mount().await;

    let points = view.chart(&IndicatorSettings::none(), "Europe/London");
    assert_eq!(points.len(), 48);
    assert_eq!(points[0].point.date, "2024-01-02 14:30");
    assert_eq!(points[0].point.timestamp, history().history.as_slice()[0].timestamp);

    let same = view.chart(&IndicatorSettings::none(), "America/New_York");
    assert_eq!(same[0].point.date, "2024-01-02 09:30");
}

#[tokio::test(start_paused = true)]
async fn indicators_align_with_series() {
    let (svc, _ctl) = scripted().await;
    let view = view(svc);
    view.mount().await;

    let ind = view.indicators(&IndicatorSettings::default());
    assert_eq!(ind.len(), 48);
    assert!(ind[18].ma1.is_none());
    assert!(ind[19].ma1.is_some());
    assert!(ind[19].bb_upper.is_some());
    assert!(ind[47].ma2.is_none());
}

#[tokio::test(start_paused = true)]
async fn market_status_uses_injected_clock() {
    let (svc, _ctl) = scripted().await;
    // Saturday 2024-01-06 12:00 UTC.
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 1, 6, 12, 0, 0).unwrap(),
    ));
    let view = SyncOrchestrator::builder(svc, aapl()).clock(clock).build();
    assert!(view.market_status(Tz::Europe__London).is_none());

    view.mount().await;
    assert_eq!(view.exchange_profile().map(|p| p.name), Some("NYSE/NASDAQ"));
    let status = view.market_status(Tz::Europe__London).expect("status");
    assert_eq!(status.phase, MarketPhase::ClosedNonTradingDay);
    assert_eq!(status.transition, Transition::UntilOpen);
    assert!(!status.is_open);
    assert_eq!(status.next_transition_exchange, "Mon 09:30");
    assert_eq!(status.next_transition_viewer, "Mon 14:30");
}
