//! TrendSignal Core: stateless trend classification for a window of price bars.
//!
//! This crate contains the whole signal engine:
//! - Domain types (bars, the collaborator's request payload)
//! - Bar normalizer (required fields, numeric coercion, chronological order)
//! - Moving averages (SMA, EMA) behind the `Indicator` trait
//! - Crossover classifier with two-bar and stabilized three-bar rules
//! - Swing structure detector (higher highs / higher lows)
//! - Pullback setup calculator (stop-loss, take-profit at a fixed reward multiple)
//! - Engine facade selecting one of four variants from `EngineConfig`
//!
//! Every call is a pure function of its input. The crate never installs a
//! tracing subscriber; binaries decide where events go.

pub mod config;
pub mod data;
pub mod domain;
pub mod engine;
pub mod error;
pub mod indicators;
pub mod signals;

pub use config::{ConfigError, EngineConfig, Variant};
pub use domain::{Bar, RawRecord, SignalRequest};
pub use engine::{analyze, AnalysisOutcome, SignalEngine, SignalReport};
pub use error::{EngineError, ErrorKind};
