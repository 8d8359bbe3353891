//! Exchange trading hours and open/close countdowns.
/// Status computation and countdown formatting.
pub mod calc;
/// Exchange profiles and the built-in registry.
pub mod profile;

pub use calc::{
    MarketPhase, MarketStatus, SessionTimes, Transition, format_countdown, market_status,
    session_times,
};
pub use profile::{
    ExchangeProfile, TradingDays, lookup, profile_for_exchange, profile_for_timezone, profiles,
};
