use bitflags::bitflags;
use chrono::Weekday;
use chrono_tz::Tz;

bitflags! {
    /// Set of weekdays on which an exchange trades (bit 0 = Sunday).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TradingDays: u8 {
        /// Sunday.
        const SUNDAY = 1 << 0;
        /// Monday.
        const MONDAY = 1 << 1;
        /// Tuesday.
        const TUESDAY = 1 << 2;
        /// Wednesday.
        const WEDNESDAY = 1 << 3;
        /// Thursday.
        const THURSDAY = 1 << 4;
        /// Friday.
        const FRIDAY = 1 << 5;
        /// Saturday.
        const SATURDAY = 1 << 6;
        /// Monday through Friday.
        const WEEKDAYS = Self::MONDAY.bits()
            | Self::TUESDAY.bits()
            | Self::WEDNESDAY.bits()
            | Self::THURSDAY.bits()
            | Self::FRIDAY.bits();
        /// All seven days.
        const EVERY_DAY = Self::WEEKDAYS.bits() | Self::SATURDAY.bits() | Self::SUNDAY.bits();
    }
}

impl TradingDays {
    /// Flag for a single weekday.
    #[must_use]
    pub fn from_weekday(day: Weekday) -> Self {
        Self::from_bits_retain(1 << day.num_days_from_sunday())
    }

    /// True when `day` is a trading day.
    #[must_use]
    pub fn contains_weekday(self, day: Weekday) -> bool {
        self.contains(Self::from_weekday(day))
    }
}

/// Regular session of one exchange, in exchange-local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExchangeProfile {
    /// Display name.
    pub name: &'static str,
    /// Exchange zone.
    pub timezone: Tz,
    /// Opening hour.
    pub open_hour: u32,
    /// Opening minute.
    pub open_minute: u32,
    /// Closing hour.
    pub close_hour: u32,
    /// Closing minute.
    pub close_minute: u32,
    /// Days with a regular session.
    pub trading_days: TradingDays,
}

impl ExchangeProfile {
    /// Minutes from local midnight to the open.
    #[must_use]
    pub const fn open_minutes(&self) -> u32 {
        self.open_hour * 60 + self.open_minute
    }

    /// Minutes from local midnight to the close.
    #[must_use]
    pub const fn close_minutes(&self) -> u32 {
        self.close_hour * 60 + self.close_minute
    }
}

struct Listing {
    codes: &'static [&'static str],
    profile: ExchangeProfile,
}

const fn weekday_session(
    name: &'static str,
    timezone: Tz,
    open: (u32, u32),
    close: (u32, u32),
) -> ExchangeProfile {
    ExchangeProfile {
        name,
        timezone,
        open_hour: open.0,
        open_minute: open.1,
        close_hour: close.0,
        close_minute: close.1,
        trading_days: TradingDays::WEEKDAYS,
    }
}

// Codes follow the data source's exchange identifiers.
static LISTINGS: &[Listing] = &[
    Listing {
        codes: &["NMS", "NGM", "NCM", "NAS", "NYQ", "NYS", "ASE", "PCX", "BTS"],
        profile: weekday_session("NYSE/NASDAQ", chrono_tz::America::New_York, (9, 30), (16, 0)),
    },
    Listing {
        codes: &["HKG"],
        profile: weekday_session("HKEX", chrono_tz::Asia::Hong_Kong, (9, 30), (16, 0)),
    },
    Listing {
        codes: &["JPX", "TYO"],
        profile: weekday_session("Tokyo Stock Exchange", chrono_tz::Asia::Tokyo, (9, 0), (15, 30)),
    },
    Listing {
        codes: &["LSE", "IOB"],
        profile: weekday_session("London Stock Exchange", chrono_tz::Europe::London, (8, 0), (16, 30)),
    },
    Listing {
        codes: &["GER", "FRA", "ETR"],
        profile: weekday_session("XETRA", chrono_tz::Europe::Berlin, (9, 0), (17, 30)),
    },
    Listing {
        codes: &["PAR"],
        profile: weekday_session("Euronext Paris", chrono_tz::Europe::Paris, (9, 0), (17, 30)),
    },
    Listing {
        codes: &["TOR"],
        profile: weekday_session("Toronto Stock Exchange", chrono_tz::America::Toronto, (9, 30), (16, 0)),
    },
    Listing {
        codes: &["ASX"],
        profile: weekday_session("ASX", chrono_tz::Australia::Sydney, (10, 0), (16, 0)),
    },
    Listing {
        codes: &["SHH", "SHZ"],
        profile: weekday_session("Shanghai/Shenzhen", chrono_tz::Asia::Shanghai, (9, 30), (15, 0)),
    },
    Listing {
        codes: &["KSC", "KOE"],
        profile: weekday_session("Korea Exchange", chrono_tz::Asia::Seoul, (9, 0), (15, 30)),
    },
    Listing {
        codes: &["NSI", "BSE"],
        profile: weekday_session("NSE/BSE", chrono_tz::Asia::Kolkata, (9, 15), (15, 30)),
    },
    Listing {
        codes: &["EBS"],
        profile: weekday_session("SIX Swiss Exchange", chrono_tz::Europe::Zurich, (9, 0), (17, 30)),
    },
];

/// All built-in profiles.
pub fn profiles() -> impl Iterator<Item = &'static ExchangeProfile> {
    LISTINGS.iter().map(|l| &l.profile)
}

/// Profile for a data-source exchange code (case-insensitive).
#[must_use]
pub fn profile_for_exchange(code: &str) -> Option<&'static ExchangeProfile> {
    let code = code.trim();
    LISTINGS
        .iter()
        .find(|l| l.codes.iter().any(|c| c.eq_ignore_ascii_case(code)))
        .map(|l| &l.profile)
}

/// First profile whose exchange zone is `zone`.
#[must_use]
pub fn profile_for_timezone(zone: &str) -> Option<&'static ExchangeProfile> {
    profiles().find(|p| p.timezone.name() == zone)
}

/// Resolve by exchange code first, then by zone.
#[must_use]
pub fn lookup(exchange: Option<&str>, zone: Option<&str>) -> Option<&'static ExchangeProfile> {
    exchange
        .and_then(profile_for_exchange)
        .or_else(|| zone.and_then(profile_for_timezone))
}
