//! Pullback setup calculator.
//!
//! A long setup needs an established uptrend, the close back above the EMA
//! after the previous bar touched it, and a bullish confirmation candle. The
//! stop sits at the extreme of the bars just before the entry bar and the
//! target is a fixed multiple of that risk. Shorts mirror the rules.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use super::structure::StructureVerdict;
use crate::domain::Bar;
use crate::error::EngineError;
use crate::indicators::AverageSeries;

/// Tunables for the pullback rule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PullbackParams {
    /// Absolute distance (price units) between the previous close and the
    /// previous EMA that counts as a touch. Not scaled by price.
    pub tolerance: f64,
    /// Bars immediately before the entry bar scanned for the stop.
    pub stop_lookback: usize,
    /// Take-profit distance as a multiple of the risk.
    pub reward_risk: f64,
}

impl Default for PullbackParams {
    fn default() -> Self {
        Self {
            tolerance: 0.001,
            stop_lookback: 4,
            reward_risk: 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeSignal {
    Buy,
    Sell,
    NoTrade,
}

impl fmt::Display for TradeSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeSignal::Buy => write!(f, "BUY"),
            TradeSignal::Sell => write!(f, "SELL"),
            TradeSignal::NoTrade => write!(f, "NO_TRADE"),
        }
    }
}

/// Outcome of the pullback rule on the newest bar.
///
/// Levels are `None` only when no trade fires; a stop of `0.0` is still a
/// stop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeSetup {
    pub signal: TradeSignal,
    pub entry: f64,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
}

impl TradeSetup {
    fn no_trade(entry: f64) -> Self {
        Self {
            signal: TradeSignal::NoTrade,
            entry,
            stop_loss: None,
            take_profit: None,
        }
    }

    /// Distance between entry and stop, if a trade fired.
    pub fn risk(&self) -> Option<f64> {
        self.stop_loss.map(|sl| (self.entry - sl).abs())
    }

    /// True when the stop does not sit strictly on the losing side of the entry.
    fn risk_is_inverted(&self) -> bool {
        match (self.signal, self.stop_loss) {
            (TradeSignal::Buy, Some(stop)) => stop >= self.entry,
            (TradeSignal::Sell, Some(stop)) => stop <= self.entry,
            _ => false,
        }
    }
}

/// Evaluate the pullback rule on the newest bar of `bars`.
pub fn evaluate_pullback(
    bars: &[Bar],
    ema: &AverageSeries,
    verdict: StructureVerdict,
    params: &PullbackParams,
) -> Result<TradeSetup, EngineError> {
    if params.stop_lookback == 0 {
        return Err(EngineError::InvalidConfig(
            "stop lookback must be >= 1".into(),
        ));
    }

    let required = (params.stop_lookback + 1).max(ema.seed_index() + 2);
    if bars.len() < required {
        return Err(EngineError::insufficient("pullback", required, bars.len()));
    }

    let cur_idx = bars.len() - 1;
    let prev_idx = cur_idx - 1;
    let (Some(cur_ema), Some(prev_ema)) = (ema.value_at(cur_idx), ema.value_at(prev_idx)) else {
        return Err(EngineError::insufficient("pullback", required, bars.len()));
    };

    let current = &bars[cur_idx];
    let entry = current.close;
    let touched = (bars[prev_idx].close - prev_ema).abs() <= params.tolerance;
    let recent = &bars[cur_idx - params.stop_lookback..cur_idx];

    let setup = match verdict {
        StructureVerdict::Uptrend if entry > cur_ema && touched && current.is_bullish() => {
            let stop = recent.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
            let risk = entry - stop;
            TradeSetup {
                signal: TradeSignal::Buy,
                entry,
                stop_loss: Some(stop),
                take_profit: Some(entry + params.reward_risk * risk),
            }
        }
        StructureVerdict::Downtrend if entry < cur_ema && touched && current.is_bearish() => {
            let stop = recent.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
            let risk = stop - entry;
            TradeSetup {
                signal: TradeSignal::Sell,
                entry,
                stop_loss: Some(stop),
                take_profit: Some(entry - params.reward_risk * risk),
            }
        }
        _ => TradeSetup::no_trade(entry),
    };

    // A stop on the wrong side of the entry leaves nothing to risk.
    if setup.risk_is_inverted() {
        debug!(entry, stop = ?setup.stop_loss, "pullback setup dropped: stop beyond entry");
        return Ok(TradeSetup::no_trade(entry));
    }

    Ok(setup)
}
