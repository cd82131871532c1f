//! The request payload handed over by the calling collaborator.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One loosely typed bar record as received on the wire.
///
/// Values may be JSON numbers or numeric strings; the normalizer turns these
/// into typed [`Bar`](super::Bar)s or rejects them.
pub type RawRecord = Map<String, Value>;

/// A single analysis request: one symbol, one timeframe, one window of bars.
///
/// `values` is ordered newest-first, matching the upstream market data feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalRequest {
    pub values: Vec<RawRecord>,
    pub symbol: String,
    pub timeframe: String,
    /// Overrides the configured moving-average window for this request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window: Option<usize>,
}

impl SignalRequest {
    pub fn new(symbol: impl Into<String>, timeframe: impl Into<String>, values: Vec<RawRecord>) -> Self {
        Self {
            values,
            symbol: symbol.into(),
            timeframe: timeframe.into(),
            window: None,
        }
    }
}
