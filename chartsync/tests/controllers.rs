mod helpers;

use std::sync::Arc;
use std::time::Duration;

use chartsync::{
    AutoRefreshScheduler, ManualClock, MarketHoursTicker, RateLimitRetryController, RefreshConfig,
    RefreshState, RetryConfig, RetryState,
};
use chartsync::market_hours::{MarketPhase, Transition, profile_for_exchange};
use chrono::{TimeZone, Utc};
use helpers::{advance_secs, count, counter};
use tokio_test::{assert_pending, assert_ready};

fn scheduler(interval_secs: u64) -> AutoRefreshScheduler {
    AutoRefreshScheduler::new(&RefreshConfig {
        enabled: true,
        interval: Duration::from_secs(interval_secs),
        tail_candles: 3,
    })
}

#[tokio::test(start_paused = true)]
async fn retry_countdown_fires_exactly_once() {
    let ctl = RateLimitRetryController::default();
    let (fired, bump) = counter();
    ctl.set_on_retry(bump);

    ctl.start_countdown(Some(5.0));
    assert_eq!(ctl.seconds_remaining(), 6);
    assert!(ctl.is_rate_limited());
    assert_eq!(ctl.countdown_display(), "0:06");

    advance_secs(5.5).await;
    assert_eq!(ctl.state(), RetryState::CountingDown { seconds_remaining: 1 });
    assert_eq!(count(&fired), 0);

    advance_secs(1.0).await;
    assert_eq!(ctl.state(), RetryState::Idle);
    assert_eq!(count(&fired), 1);

    advance_secs(30.0).await;
    assert_eq!(count(&fired), 1);
}

#[tokio::test(start_paused = true)]
async fn retry_without_server_wait_uses_default_delay() {
    let ctl = RateLimitRetryController::new(RetryConfig {
        default_delay: Duration::from_secs(60),
        buffer_seconds: 1,
    });
    ctl.start_countdown(None);
    assert_eq!(ctl.seconds_remaining(), 61);
    assert_eq!(ctl.countdown_display(), "1:01");
    ctl.start_countdown(Some(f64::INFINITY));
    assert_eq!(ctl.seconds_remaining(), 61);
}

#[tokio::test(start_paused = true)]
async fn cancel_suppresses_the_retry() {
    let ctl = RateLimitRetryController::default();
    let (fired, bump) = counter();
    ctl.set_on_retry(bump);

    ctl.start_countdown(Some(3.0));
    advance_secs(2.5).await;
    ctl.cancel();
    assert_eq!(ctl.state(), RetryState::Idle);
    assert_eq!(ctl.seconds_remaining(), 0);

    advance_secs(10.0).await;
    assert_eq!(count(&fired), 0);
}

#[tokio::test(start_paused = true)]
async fn latest_retry_handler_wins() {
    let ctl = RateLimitRetryController::default();
    let (first, bump_first) = counter();
    let (second, bump_second) = counter();
    ctl.set_on_retry(bump_first);
    ctl.start_countdown(Some(1.0));
    ctl.set_on_retry(bump_second);

    advance_secs(3.0).await;
    assert_eq!(count(&first), 0);
    assert_eq!(count(&second), 1);
}

#[tokio::test(start_paused = true)]
async fn retry_state_is_published_every_second() {
    let ctl = RateLimitRetryController::default();
    let mut rx = ctl.subscribe();
    ctl.start_countdown(Some(2.0));
    assert_eq!(*rx.borrow_and_update(), RetryState::CountingDown { seconds_remaining: 3 });

    let mut changed = tokio_test::task::spawn(rx.changed());
    assert_pending!(changed.poll());
    advance_secs(1.0).await;
    assert!(changed.is_woken());
    assert_ready!(changed.poll()).expect("sender alive");
    drop(changed);
    assert_eq!(*rx.borrow(), RetryState::CountingDown { seconds_remaining: 2 });
}

#[tokio::test(start_paused = true)]
async fn scheduler_fires_then_waits_for_load_completion() {
    let s = scheduler(3);
    let (fired, bump) = counter();
    s.set_on_refresh(bump);
    s.set_enabled(true);
    assert_eq!(s.state(), RefreshState::CountingDown { seconds_remaining: 3 });
    assert_eq!(s.countdown_display(), "0:03");

    advance_secs(3.5).await;
    assert_eq!(count(&fired), 1);
    assert!(s.is_refreshing());

    advance_secs(5.0).await;
    assert_eq!(count(&fired), 1);

    s.set_loading(true);
    s.set_loading(false);
    assert_eq!(s.state(), RefreshState::CountingDown { seconds_remaining: 3 });

    advance_secs(3.5).await;
    assert_eq!(count(&fired), 2);
}

#[tokio::test(start_paused = true)]
async fn scheduler_skips_cycle_while_loading() {
    let s = scheduler(2);
    let (fired, bump) = counter();
    s.set_on_refresh(bump);
    s.set_enabled(true);
    s.set_loading(true);

    advance_secs(6.5).await;
    assert_eq!(count(&fired), 0);
    assert_eq!(s.state(), RefreshState::CountingDown { seconds_remaining: 0 });

    s.set_loading(false);
    assert_eq!(s.seconds_remaining(), 2);
    advance_secs(2.5).await;
    assert_eq!(count(&fired), 1);
}

#[tokio::test(start_paused = true)]
async fn scheduler_pause_and_disable_clear_the_timer() {
    let s = scheduler(5);
    let (fired, bump) = counter();
    s.set_on_refresh(bump);
    s.set_enabled(true);

    advance_secs(3.5).await;
    s.set_paused(true);
    assert_eq!(s.state(), RefreshState::Idle);
    advance_secs(20.0).await;
    assert_eq!(count(&fired), 0);

    s.set_paused(false);
    assert_eq!(s.seconds_remaining(), 5);
    advance_secs(3.5).await;
    s.set_enabled(false);
    assert!(!s.is_enabled());
    advance_secs(20.0).await;
    assert_eq!(count(&fired), 0);
}

#[tokio::test(start_paused = true)]
async fn scheduler_reset_restarts_without_firing() {
    let s = scheduler(4);
    let (fired, bump) = counter();
    s.set_on_refresh(bump);
    s.set_enabled(true);

    advance_secs(3.5).await;
    s.reset();
    assert_eq!(s.seconds_remaining(), 4);
    advance_secs(2.75).await;
    assert_eq!(count(&fired), 0);
    advance_secs(1.5).await;
    assert_eq!(count(&fired), 1);
}

#[tokio::test(start_paused = true)]
async fn scheduler_shutdown_drops_handler() {
    let s = scheduler(1);
    let (fired, bump) = counter();
    s.set_on_refresh(bump);
    s.set_enabled(true);
    s.shutdown();
    assert_eq!(s.state(), RefreshState::Idle);
    s.set_enabled(true);
    advance_secs(3.5).await;
    assert_eq!(count(&fired), 0);
}

#[tokio::test(start_paused = true)]
async fn scheduler_shutdown_clears_pause() {
    let s = scheduler(2);
    s.set_enabled(true);
    s.set_paused(true);
    s.shutdown();
    assert!(!s.is_paused());

    let (fired, bump) = counter();
    s.set_on_refresh(bump);
    s.set_enabled(true);
    assert_eq!(s.seconds_remaining(), 2);
    advance_secs(2.5).await;
    assert_eq!(count(&fired), 1);
}

#[tokio::test(start_paused = true)]
async fn market_ticker_recomputes_every_minute() {
    // Saturday 2024-01-06 09:30 in New York.
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 1, 6, 14, 30, 0).unwrap(),
    ));
    let profile = *profile_for_exchange("NMS").expect("NMS profile");
    let ticker = MarketHoursTicker::spawn(profile, chartsync::Tz::America__New_York, clock.clone());

    let status = ticker.current().expect("trading profile");
    assert_eq!(status.phase, MarketPhase::ClosedNonTradingDay);
    assert_eq!(status.transition, Transition::UntilOpen);
    assert_eq!(status.minutes_until_transition, 2 * 24 * 60);

    clock.advance(chrono::Duration::minutes(1));
    advance_secs(60.5).await;
    let status = ticker.current().expect("trading profile");
    assert_eq!(status.minutes_until_transition, 2 * 24 * 60 - 1);
}
