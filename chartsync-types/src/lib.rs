//! Shared data transfer objects, the error taxonomy and configuration
//! primitives for chartsync.
#![warn(missing_docs)]

mod config;
mod endpoint;
mod error;
/// Market data DTOs: candles, quotes, requests and responses.
pub mod market;

pub use config::{
    BOLLINGER_MULTIPLIERS, BollingerSpec, IndicatorSettings, MA_PERIODS, MovingAverageKind,
    MovingAverageSpec, RefreshConfig, RetryConfig, SyncConfig, TimeoutRetryConfig,
};
pub use endpoint::Endpoint;
pub use error::{ErrorKind, SyncError};
pub use market::{
    AssetDetails, AssetKind, AssetRef, CandleSeries, ExchangeInfo, HistoryRequest,
    HistoryResponse, Interval, PricePoint, Quote, RefreshRequest, RefreshResponse,
};
