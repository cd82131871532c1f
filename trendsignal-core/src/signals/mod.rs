//! Signal classification on top of normalized bars and their averages.
//!
//! Everything here is a pure function of one window: no component keeps
//! state between calls.

pub mod crossover;
pub mod pullback;
pub mod structure;

pub use crossover::{
    classify_crossover, Crossover, CrossoverReading, CrossoverRule, Position, TrendDirection,
};
pub use pullback::{evaluate_pullback, PullbackParams, TradeSetup, TradeSignal};
pub use structure::{
    classify_structure, find_swings, StructureReading, StructureVerdict, SwingKind, SwingPoint,
    SwingSet, DEFAULT_SWING_RADIUS,
};
