//! Wall-clock conversion between IANA zones.
//!
//! Candle labels arrive as exchange-local wall-clock strings without an
//! offset. Converting them to the viewer's zone needs the true instant they
//! denote, which is recovered by rendering a naive UTC reading in the source
//! zone and shifting by the observed difference. The zone database sits
//! behind [`ZoneOffsets`] so tests can inject fixed offsets.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use thiserror::Error;

/// Output format of converted timestamps.
pub const WALL_CLOCK_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Errors raised while converting wall-clock strings.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TimezoneError {
    /// The zone name is not in the zone database.
    #[error("unknown timezone: {0}")]
    UnknownZone(String),
    /// The input is not a recognized wall-clock string.
    #[error("invalid wall-clock timestamp: {0}")]
    InvalidWallClock(String),
}

/// Capability answering "what is the UTC offset of `zone` at `instant`".
pub trait ZoneOffsets: Send + Sync {
    /// Offset of local time from UTC, in minutes (east positive).
    ///
    /// # Errors
    /// Returns `TimezoneError::UnknownZone` when `zone` cannot be resolved.
    fn offset_minutes(&self, zone: &str, instant: DateTime<Utc>) -> Result<i32, TimezoneError>;
}

/// IANA zone database compiled into `chrono-tz`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TzDatabase;

impl TzDatabase {
    /// Resolve a zone name.
    ///
    /// # Errors
    /// Returns `TimezoneError::UnknownZone` when `zone` is not a valid IANA name.
    pub fn resolve(zone: &str) -> Result<Tz, TimezoneError> {
        zone.parse::<Tz>()
            .map_err(|_| TimezoneError::UnknownZone(zone.to_string()))
    }
}

impl ZoneOffsets for TzDatabase {
    fn offset_minutes(&self, zone: &str, instant: DateTime<Utc>) -> Result<i32, TimezoneError> {
        let tz = Self::resolve(zone)?;
        let offset = tz.offset_from_utc_datetime(&instant.naive_utc()).fix();
        Ok(offset.local_minus_utc() / 60)
    }
}

/// A parsed wall-clock label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallClock {
    /// Calendar day without a time component.
    DateOnly(NaiveDate),
    /// Day plus time of day.
    DateTime(NaiveDateTime),
}

/// Parse `YYYY-MM-DD`, `YYYY-MM-DD HH:MM` or `YYYY-MM-DD HH:MM:SS` (space or `T`).
///
/// An hour of `24:00` denotes midnight at the start of the same day.
///
/// # Errors
/// Returns `TimezoneError::InvalidWallClock` for anything else.
pub fn parse_wall_clock(input: &str) -> Result<WallClock, TimezoneError> {
    let invalid = || TimezoneError::InvalidWallClock(input.to_string());
    let trimmed = input.trim();
    let (date_part, time_part) = match trimmed.split_once([' ', 'T']) {
        Some((d, t)) => (d, Some(t.trim())),
        None => (trimmed, None),
    };
    let date = NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map_err(|_| invalid())?;
    let Some(time_part) = time_part else {
        return Ok(WallClock::DateOnly(date));
    };

    let mut fields = time_part.split(':');
    let mut next_field = || -> Result<Option<u32>, TimezoneError> {
        fields
            .next()
            .map(|f| f.parse::<u32>().map_err(|_| invalid()))
            .transpose()
    };
    let hour = next_field()?.ok_or_else(invalid)?;
    let minute = next_field()?.ok_or_else(invalid)?;
    let second = next_field()?.unwrap_or(0);
    if next_field()?.is_some() {
        return Err(invalid());
    }

    let time = if hour == 24 && minute == 0 && second == 0 {
        NaiveTime::from_hms_opt(0, 0, 0)
    } else {
        NaiveTime::from_hms_opt(hour, minute, second)
    }
    .ok_or_else(invalid)?;
    Ok(WallClock::DateTime(date.and_time(time)))
}

/// Interpret `local` as a wall-clock reading in `zone` and return the instant.
///
/// # Errors
/// Propagates `TimezoneError::UnknownZone` from the zone capability.
pub fn local_to_utc(
    zones: &dyn ZoneOffsets,
    local: NaiveDateTime,
    zone: &str,
) -> Result<DateTime<Utc>, TimezoneError> {
    let reference = local.and_utc();
    let rendered = reference.naive_utc()
        + Duration::minutes(i64::from(zones.offset_minutes(zone, reference)?));
    let diff = local - rendered;
    Ok(reference + diff)
}

/// Render `instant` as a wall-clock reading in `zone`.
///
/// # Errors
/// Propagates `TimezoneError::UnknownZone` from the zone capability.
pub fn utc_to_local(
    zones: &dyn ZoneOffsets,
    instant: DateTime<Utc>,
    zone: &str,
) -> Result<NaiveDateTime, TimezoneError> {
    let offset = zones.offset_minutes(zone, instant)?;
    Ok(instant.naive_utc() + Duration::minutes(i64::from(offset)))
}

/// Convert a wall-clock label from `source_zone` to `target_zone`.
///
/// Date-only labels and same-zone conversions return the input unchanged.
///
/// # Errors
/// Returns an error for unparsable input or unknown zones.
pub fn try_convert_with(
    zones: &dyn ZoneOffsets,
    wall_clock: &str,
    source_zone: &str,
    target_zone: &str,
) -> Result<String, TimezoneError> {
    if source_zone == target_zone {
        return Ok(wall_clock.to_string());
    }
    let naive = match parse_wall_clock(wall_clock)? {
        WallClock::DateOnly(_) => return Ok(wall_clock.to_string()),
        WallClock::DateTime(dt) => dt,
    };
    let instant = local_to_utc(zones, naive, source_zone)?;
    let target = utc_to_local(zones, instant, target_zone)?;
    Ok(target.format(WALL_CLOCK_FORMAT).to_string())
}

/// [`try_convert_with`] against the built-in zone database.
///
/// # Errors
/// Returns an error for unparsable input or unknown zones.
pub fn try_convert(
    wall_clock: &str,
    source_zone: &str,
    target_zone: &str,
) -> Result<String, TimezoneError> {
    try_convert_with(&TzDatabase, wall_clock, source_zone, target_zone)
}

/// Convert with an injected zone capability, falling back to the input on failure.
pub fn convert_with(
    zones: &dyn ZoneOffsets,
    wall_clock: &str,
    source_zone: &str,
    target_zone: &str,
) -> String {
    match try_convert_with(zones, wall_clock, source_zone, target_zone) {
        Ok(converted) => converted,
        Err(_err) => {
            #[cfg(feature = "tracing")]
            tracing::warn!(
                input = wall_clock,
                source_zone,
                target_zone,
                error = %_err,
                "timezone conversion failed; keeping original label"
            );
            wall_clock.to_string()
        }
    }
}

/// Convert a wall-clock label between zones, returning the input on any failure.
///
/// ```
/// use chartsync_core::timezone::convert;
///
/// assert_eq!(
///     convert("2024-01-01 09:00", "Asia/Hong_Kong", "America/New_York"),
///     "2023-12-31 20:00"
/// );
/// assert_eq!(convert("2024-01-01", "Asia/Hong_Kong", "America/New_York"), "2024-01-01");
/// assert_eq!(convert("garbage", "UTC", "Asia/Tokyo"), "garbage");
/// ```
#[must_use]
pub fn convert(wall_clock: &str, source_zone: &str, target_zone: &str) -> String {
    convert_with(&TzDatabase, wall_clock, source_zone, target_zone)
}
