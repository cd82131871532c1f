//! Required-field contract between the caller's records and the engine.

use serde::{Deserialize, Serialize};

/// Names of the optional time-label fields, checked in order.
pub const TIME_FIELDS: &[&str] = &["datetime", "timestamp"];

/// Which fields a record must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldSet {
    /// `close` only; open/high/low collapse onto the close.
    CloseOnly,
    /// `open`, `high`, `low`, `close`.
    Ohlc,
}

impl FieldSet {
    pub fn required(&self) -> &'static [&'static str] {
        match self {
            FieldSet::CloseOnly => &["close"],
            FieldSet::Ohlc => &["open", "high", "low", "close"],
        }
    }
}
