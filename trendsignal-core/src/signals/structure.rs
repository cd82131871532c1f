//! Swing structure detector.
//!
//! A swing high is a bar whose high is strictly greater than every other high
//! within `radius` bars on each side; swing lows mirror this on the low. The
//! last two swings of each kind decide the verdict:
//! higher highs and higher lows → `Uptrend`, lower highs and lower lows →
//! `Downtrend`, anything mixed → `Range`.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::Bar;
use crate::error::EngineError;

/// Neighborhood radius used unless configured otherwise.
pub const DEFAULT_SWING_RADIUS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SwingKind {
    High,
    Low,
}

/// A confirmed local extremum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwingPoint {
    pub index: usize,
    pub price: f64,
    pub kind: SwingKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StructureVerdict {
    Uptrend,
    Downtrend,
    Range,
    NoStructure,
}

/// True if `bars[i].high` is a strict maximum over `[i - radius, i + radius]`.
pub fn is_swing_high(bars: &[Bar], i: usize, radius: usize) -> bool {
    if i < radius || i + radius >= bars.len() {
        return false;
    }

    let hi = bars[i].high;

    bars[i - radius..i].iter().all(|b| b.high < hi)
        && bars[i + 1..=i + radius].iter().all(|b| b.high < hi)
}

/// True if `bars[i].low` is a strict minimum over `[i - radius, i + radius]`.
pub fn is_swing_low(bars: &[Bar], i: usize, radius: usize) -> bool {
    if i < radius || i + radius >= bars.len() {
        return false;
    }

    let lo = bars[i].low;

    bars[i - radius..i].iter().all(|b| b.low > lo)
        && bars[i + 1..=i + radius].iter().all(|b| b.low > lo)
}

/// All swing points of `bars`, in chronological order of discovery.
///
/// A bar can be both a swing high and a swing low (an outside bar); the high
/// is listed first.
pub fn find_swings(bars: &[Bar], radius: usize) -> Vec<SwingPoint> {
    let mut swings = Vec::new();

    for i in 0..bars.len() {
        if is_swing_high(bars, i, radius) {
            swings.push(SwingPoint {
                index: i,
                price: bars[i].high,
                kind: SwingKind::High,
            });
        }
        if is_swing_low(bars, i, radius) {
            swings.push(SwingPoint {
                index: i,
                price: bars[i].low,
                kind: SwingKind::Low,
            });
        }
    }

    swings
}

/// Swing highs and lows of one window, each in chronological order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SwingSet {
    pub highs: Vec<SwingPoint>,
    pub lows: Vec<SwingPoint>,
}

impl SwingSet {
    pub fn from_bars(bars: &[Bar], radius: usize) -> Self {
        let (highs, lows) = find_swings(bars, radius)
            .into_iter()
            .partition(|s| s.kind == SwingKind::High);
        Self { highs, lows }
    }

    /// Verdict from the two most recent highs and lows.
    pub fn verdict(&self) -> StructureVerdict {
        let (Some((h2, h1)), Some((l2, l1))) = (last_two(&self.highs), last_two(&self.lows))
        else {
            return StructureVerdict::NoStructure;
        };

        if h1 > h2 && l1 > l2 {
            StructureVerdict::Uptrend
        } else if h1 < h2 && l1 < l2 {
            StructureVerdict::Downtrend
        } else {
            StructureVerdict::Range
        }
    }
}

/// `(previous, latest)` prices of the last two swings.
fn last_two(points: &[SwingPoint]) -> Option<(f64, f64)> {
    match points {
        [.., prev, last] => Some((prev.price, last.price)),
        _ => None,
    }
}

/// Result of a structure scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureReading {
    pub verdict: StructureVerdict,
    pub swings: SwingSet,
}

/// Scan `bars` for swings and classify the structure.
pub fn classify_structure(bars: &[Bar], radius: usize) -> Result<StructureReading, EngineError> {
    if radius == 0 {
        return Err(EngineError::InvalidConfig(
            "swing radius must be >= 1".into(),
        ));
    }

    let swings = SwingSet::from_bars(bars, radius);
    let verdict = swings.verdict();
    debug!(
        highs = swings.highs.len(),
        lows = swings.lows.len(),
        ?verdict,
        "swing structure classified"
    );

    Ok(StructureReading { verdict, swings })
}
