//! Output records handed back to the calling collaborator.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::Variant;
use crate::error::EngineError;
use crate::signals::{Crossover, StructureVerdict, TrendDirection};

/// The verdict for one request. Built once, never mutated.
///
/// The moving-average value is keyed by kind and window (`ema50`, `sma20`)
/// and flattened into the record, so the wire shape matches what the upstream
/// alerting service already consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalReport {
    pub symbol: String,
    pub timeframe: String,
    pub variant: Variant,
    /// `ABOVE_EMA`/`BELOW_EMA`/`ON_EMA` (or `_SMA`), or `BUY`/`SELL`/`NO_TRADE`
    /// for the pullback variant.
    pub signal: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crossover: Option<Crossover>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<TrendDirection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structure: Option<StructureVerdict>,
    pub last_close: f64,
    #[serde(flatten)]
    pub average: BTreeMap<String, f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_loss: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub take_profit: Option<f64>,
    /// Chronological index of the evaluated bar.
    pub index: usize,
    /// Time label of the evaluated bar, when the caller supplied one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl SignalReport {
    /// The single moving-average value carried by the report.
    pub fn average(&self) -> Option<f64> {
        self.average.values().next().copied()
    }
}

/// Either a full report or an error record; never a partial result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnalysisOutcome {
    Report(SignalReport),
    Failed { error: String },
}

impl AnalysisOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

impl From<Result<SignalReport, EngineError>> for AnalysisOutcome {
    fn from(result: Result<SignalReport, EngineError>) -> Self {
        match result {
            Ok(report) => Self::Report(report),
            Err(err) => Self::Failed {
                error: err.to_string(),
            },
        }
    }
}

/// Round for display to `decimals` places.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    (value * scale).round() / scale
}
