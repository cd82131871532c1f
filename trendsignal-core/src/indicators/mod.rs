//! Moving-average indicators.
//!
//! Both averages implement [`Indicator`]: bar history in, numeric series out,
//! aligned index-for-index with the bars. Warmup entries are `f64::NAN`;
//! [`AverageSeries`] wraps the raw vector so callers never see the sentinel.

pub mod ema;
pub mod sma;

pub use ema::Ema;
pub use sma::Sma;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::Bar;
use crate::error::EngineError;

/// Trait for indicators.
///
/// # Look-ahead contamination guard
/// No indicator value at bar t may depend on price data from bar t+1 or later.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "ema_50").
    fn name(&self) -> &str;

    /// Number of bars needed before the indicator produces valid output.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire bar series.
    ///
    /// Returns a `Vec<f64>` of the same length as `bars`.
    /// The first `lookback()` values are `f64::NAN`.
    fn compute(&self, bars: &[Bar]) -> Vec<f64>;
}

/// Moving average type selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaKind {
    Sma,
    Ema,
}

impl MaKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            MaKind::Sma => "sma",
            MaKind::Ema => "ema",
        }
    }
}

impl fmt::Display for MaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaKind::Sma => write!(f, "SMA"),
            MaKind::Ema => write!(f, "EMA"),
        }
    }
}

/// A moving-average series aligned with the bars it was computed from.
#[derive(Debug, Clone)]
pub struct AverageSeries {
    pub kind: MaKind,
    pub window: usize,
    values: Vec<f64>,
}

impl AverageSeries {
    /// Value at `index`, or `None` inside the warmup region or out of range.
    pub fn value_at(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied().filter(|v| !v.is_nan())
    }

    /// Raw values, `f64::NAN` where undefined.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Index of the first defined value.
    pub fn seed_index(&self) -> usize {
        self.window.saturating_sub(1)
    }

    /// Report key, e.g. `ema50`.
    pub fn key(&self) -> String {
        format!("{}{}", self.kind.prefix(), self.window)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Compute a moving average of `kind` over the closes of `bars`.
///
/// Always starts from index 0 of `bars`; EMA values depend on the whole prefix.
pub fn moving_average(
    kind: MaKind,
    window: usize,
    bars: &[Bar],
) -> Result<AverageSeries, EngineError> {
    if window == 0 {
        return Err(EngineError::InvalidConfig(
            "moving-average window must be >= 1".into(),
        ));
    }
    let values = match kind {
        MaKind::Sma => Sma::new(window).compute(bars),
        MaKind::Ema => Ema::new(window).compute(bars),
    };
    Ok(AverageSeries {
        kind,
        window,
        values,
    })
}

/// Create synthetic bars from close prices for testing.
///
/// Generates plausible OHLC: open = prev_close (or close for first bar),
/// high = max(open,close) + 1.0, low = min(open,close) - 1.0.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                time: None,
            }
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
