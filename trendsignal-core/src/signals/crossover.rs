//! Crossover classifier: where price sits against its average, and whether it
//! just changed sides.
//!
//! Position is an exact comparison with no tolerance band. Two crossover rules
//! are available:
//! - `TwoBar`: previous vs. current bar. A previous `On` counts for either side,
//!   so `On → Above` is a BUY and `On → Below` is a SELL.
//! - `Stabilized`: the two bars before the current one must both sit strictly
//!   on the same side before the current bar's opposite side counts. Any `On`
//!   in that pair suppresses the event.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::Bar;
use crate::error::EngineError;
use crate::indicators::AverageSeries;

/// Close relative to the average on one bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Position {
    Above,
    Below,
    On,
}

impl Position {
    pub fn classify(close: f64, average: f64) -> Self {
        if close > average {
            Position::Above
        } else if close < average {
            Position::Below
        } else {
            Position::On
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Position::Above => "ABOVE",
            Position::Below => "BELOW",
            Position::On => "ON",
        }
    }
}

/// Crossover event on the evaluated bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Crossover {
    Buy,
    Sell,
    None,
}

impl fmt::Display for Crossover {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Crossover::Buy => write!(f, "BUY"),
            Crossover::Sell => write!(f, "SELL"),
            Crossover::None => write!(f, "NONE"),
        }
    }
}

/// Trend direction implied by the current position.
///
/// Serialized as `UP`/`DOWN`/`NEUTRAL`, the labels the alert mailer keys on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrendDirection {
    Up,
    Down,
    Neutral,
}

impl From<Position> for TrendDirection {
    fn from(position: Position) -> Self {
        match position {
            Position::Above => TrendDirection::Up,
            Position::Below => TrendDirection::Down,
            Position::On => TrendDirection::Neutral,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossoverRule {
    TwoBar,
    Stabilized,
}

impl CrossoverRule {
    /// Trailing (close, average) pairs the rule inspects.
    pub fn pairs_required(&self) -> usize {
        match self {
            CrossoverRule::TwoBar => 2,
            CrossoverRule::Stabilized => 3,
        }
    }

    /// Decide the event from trailing positions, oldest first, current last.
    ///
    /// `history` must hold exactly `pairs_required()` entries.
    pub fn detect(&self, history: &[Position]) -> Crossover {
        use Position::*;

        match (self, history) {
            (CrossoverRule::TwoBar, [prev, cur]) => match (prev, cur) {
                (Below | On, Above) => Crossover::Buy,
                (Above | On, Below) => Crossover::Sell,
                _ => Crossover::None,
            },
            (CrossoverRule::Stabilized, [older, prev, cur]) => match (older, prev, cur) {
                (Below, Below, Above) => Crossover::Buy,
                (Above, Above, Below) => Crossover::Sell,
                _ => Crossover::None,
            },
            _ => Crossover::None,
        }
    }
}

/// Classification of the newest bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossoverReading {
    /// Chronological index of the evaluated bar.
    pub index: usize,
    pub close: f64,
    pub average: f64,
    pub position: Position,
    pub crossover: Crossover,
}

/// Classify the newest bar of `bars` against `average`.
///
/// Fails when any of the trailing pairs the rule needs falls inside the
/// average's warmup region.
pub fn classify_crossover(
    bars: &[Bar],
    average: &AverageSeries,
    rule: CrossoverRule,
) -> Result<CrossoverReading, EngineError> {
    let pairs = rule.pairs_required();
    let required = average.seed_index() + pairs;
    if bars.len() < required || average.len() != bars.len() {
        return Err(EngineError::insufficient("crossover", required, bars.len()));
    }

    let start = bars.len() - pairs;
    let mut history = Vec::with_capacity(pairs);
    for (i, bar) in bars.iter().enumerate().skip(start) {
        let avg = average
            .value_at(i)
            .ok_or_else(|| EngineError::insufficient("crossover", required, bars.len()))?;
        history.push(Position::classify(bar.close, avg));
    }

    let index = bars.len() - 1;
    let current = &bars[index];
    let current_avg = average
        .value_at(index)
        .ok_or_else(|| EngineError::insufficient("crossover", required, bars.len()))?;

    Ok(CrossoverReading {
        index,
        close: current.close,
        average: current_avg,
        position: history[pairs - 1],
        crossover: rule.detect(&history),
    })
}
