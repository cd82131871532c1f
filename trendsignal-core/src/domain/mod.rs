//! Domain types for TrendSignal

pub mod bar;
pub mod request;

pub use bar::Bar;
pub use request::{RawRecord, SignalRequest};
