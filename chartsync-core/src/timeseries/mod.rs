//! Candle-series utilities shared by the orchestrator and presentation layers.
//!
//! - `merge`: incremental keyed overlay of fresh candles onto a held series
//! - `overlay`: join candles with their indicator values
//! - `util`: display-zone relabeling and slicing helpers
/// Keyed merge of candle batches.
pub mod merge;
/// Candle plus indicator overlay points.
pub mod overlay;
/// Display helpers for candle series.
pub mod util;
