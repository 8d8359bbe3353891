use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Timelike, Utc};
use chrono_tz::Tz;

use super::profile::ExchangeProfile;

const MINUTES_PER_DAY: u32 = 24 * 60;

/// Where the exchange is in its daily cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarketPhase {
    /// Today has no regular session.
    ClosedNonTradingDay,
    /// Trading day, session not started yet.
    ClosedBeforeOpen,
    /// Regular session in progress.
    Open,
    /// Trading day, session already over.
    ClosedAfterClose,
}

/// Which transition the countdown targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    /// Counting down to the next open.
    UntilOpen,
    /// Counting down to today's close.
    UntilClose,
}

/// Snapshot of an exchange's session state at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketStatus {
    /// Cycle phase.
    pub phase: MarketPhase,
    /// True while the regular session runs.
    pub is_open: bool,
    /// True when today (exchange-local) has a session.
    pub is_trading_day: bool,
    /// Countdown target.
    pub transition: Transition,
    /// Whole minutes until the transition.
    pub minutes_until_transition: u32,
    /// `Hh Mm`, or `Dd Hh Mm` at 24 hours and beyond.
    pub countdown: String,
    /// Instant of the transition.
    pub next_transition_at: DateTime<Utc>,
    /// Transition rendered in the exchange zone (`Mon 09:30`).
    pub next_transition_exchange: String,
    /// Transition rendered in the viewer zone.
    pub next_transition_viewer: String,
}

/// Session open and close for one day, in both zones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTimes {
    /// Open instant.
    pub open_at: DateTime<Utc>,
    /// Close instant.
    pub close_at: DateTime<Utc>,
    /// Open in the exchange zone (`HH:MM`).
    pub exchange_open: String,
    /// Close in the exchange zone (`HH:MM`).
    pub exchange_close: String,
    /// Open in the viewer zone (`HH:MM`).
    pub viewer_open: String,
    /// Close in the viewer zone (`HH:MM`).
    pub viewer_close: String,
}

/// Render a minute count as `Hh Mm`, or `Dd Hh Mm` when it spans a day.
///
/// ```
/// use chartsync_core::market_hours::format_countdown;
///
/// assert_eq!(format_countdown(90), "1h 30m");
/// assert_eq!(format_countdown(2730), "1d 21h 30m");
/// ```
#[must_use]
pub fn format_countdown(minutes: u32) -> String {
    let days = minutes / MINUTES_PER_DAY;
    let hours = (minutes % MINUTES_PER_DAY) / 60;
    let mins = minutes % 60;
    if days > 0 {
        format!("{days}d {hours}h {mins}m")
    } else {
        format!("{hours}h {mins}m")
    }
}

fn local_instant(zone: Tz, date: NaiveDate, minutes: u32) -> Option<DateTime<Utc>> {
    let naive = date.and_hms_opt(minutes / 60, minutes % 60, 0)?;
    zone.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

fn next_trading_day(profile: &ExchangeProfile, today: NaiveDate) -> Option<(u32, NaiveDate)> {
    (1..=7u32).find_map(|ahead| {
        let date = today.checked_add_days(chrono::Days::new(u64::from(ahead)))?;
        profile
            .trading_days
            .contains_weekday(date.weekday())
            .then_some((ahead, date))
    })
}

fn floor_minute(now: DateTime<Utc>) -> DateTime<Utc> {
    now.with_second(0)
        .and_then(|d| d.with_nanosecond(0))
        .unwrap_or(now)
}

/// Evaluate `profile` at `now`, rendering transition times for `viewer_zone`.
///
/// Returns `None` when the profile has no trading days.
#[must_use]
pub fn market_status(
    profile: &ExchangeProfile,
    now: DateTime<Utc>,
    viewer_zone: Tz,
) -> Option<MarketStatus> {
    if profile.trading_days.is_empty() {
        return None;
    }

    let local = now.with_timezone(&profile.timezone);
    let now_min = local.hour() * 60 + local.minute();
    let today = local.date_naive();
    let is_trading_day = profile.trading_days.contains_weekday(local.weekday());
    let open = profile.open_minutes();
    let close = profile.close_minutes();

    let (phase, transition, minutes, target_day, target_min) = if is_trading_day && now_min < open
    {
        (
            MarketPhase::ClosedBeforeOpen,
            Transition::UntilOpen,
            open - now_min,
            today,
            open,
        )
    } else if is_trading_day && now_min < close {
        (
            MarketPhase::Open,
            Transition::UntilClose,
            close - now_min,
            today,
            close,
        )
    } else {
        let (ahead, date) = next_trading_day(profile, today)?;
        let minutes = (MINUTES_PER_DAY - now_min) + (ahead - 1) * MINUTES_PER_DAY + open;
        let phase = if is_trading_day {
            MarketPhase::ClosedAfterClose
        } else {
            MarketPhase::ClosedNonTradingDay
        };
        (phase, Transition::UntilOpen, minutes, date, open)
    };

    let at = local_instant(profile.timezone, target_day, target_min)
        .unwrap_or_else(|| floor_minute(now) + Duration::minutes(i64::from(minutes)));

    Some(MarketStatus {
        phase,
        is_open: phase == MarketPhase::Open,
        is_trading_day,
        transition,
        minutes_until_transition: minutes,
        countdown: format_countdown(minutes),
        next_transition_at: at,
        next_transition_exchange: at
            .with_timezone(&profile.timezone)
            .format("%a %H:%M")
            .to_string(),
        next_transition_viewer: at.with_timezone(&viewer_zone).format("%a %H:%M").to_string(),
    })
}

/// Session open and close on `date` (exchange-local), rendered in both zones.
///
/// Returns `None` for non-trading days or local times that do not exist.
#[must_use]
pub fn session_times(
    profile: &ExchangeProfile,
    viewer_zone: Tz,
    date: NaiveDate,
) -> Option<SessionTimes> {
    if !profile.trading_days.contains_weekday(date.weekday()) {
        return None;
    }
    let open_at = local_instant(profile.timezone, date, profile.open_minutes())?;
    let close_at = local_instant(profile.timezone, date, profile.close_minutes())?;
    let hm = |at: DateTime<Utc>, zone: Tz| at.with_timezone(&zone).format("%H:%M").to_string();
    Some(SessionTimes {
        open_at,
        close_at,
        exchange_open: hm(open_at, profile.timezone),
        exchange_close: hm(close_at, profile.timezone),
        viewer_open: hm(open_at, viewer_zone),
        viewer_close: hm(close_at, viewer_zone),
    })
}
