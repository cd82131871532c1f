//! Signal engine: one request in, one report out.
//!
//! The pipeline runs strictly forward:
//!
//! 1. Normalize: validate records, coerce numbers, reorder oldest-first
//! 2. Average: EMA or SMA over the whole window
//! 3. Classify: crossover variants read position and crossover; the pullback
//!    variant scans swing structure and evaluates the trade setup
//! 4. Report: round numeric fields for display and build the record
//!
//! Nothing survives a call. Every series is allocated per request, so engines
//! can be shared across threads freely.

pub mod report;

pub use report::{round_to, AnalysisOutcome, SignalReport};

use std::borrow::Cow;
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::config::{EngineConfig, Variant};
use crate::data::normalize;
use crate::domain::SignalRequest;
use crate::error::EngineError;
use crate::indicators::moving_average;
use crate::signals::{
    classify_crossover, classify_structure, evaluate_pullback, Crossover, StructureVerdict,
    TradeSetup, TradeSignal, TrendDirection,
};

/// A validated configuration, ready to analyze requests.
#[derive(Debug, Clone)]
pub struct SignalEngine {
    config: EngineConfig,
}

impl SignalEngine {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Analyze one request. A `window` on the request overrides the config.
    pub fn analyze(&self, request: &SignalRequest) -> Result<SignalReport, EngineError> {
        let config = match request.window {
            Some(window) if window != self.config.window => {
                let config = EngineConfig {
                    window,
                    ..self.config.clone()
                };
                config.validate()?;
                Cow::Owned(config)
            }
            _ => Cow::Borrowed(&self.config),
        };

        let result = run(request, &config);
        if let Err(err) = &result {
            warn!(symbol = %request.symbol, kind = ?err.kind(), %err, "analysis rejected");
        }
        result
    }

    /// Like [`analyze`](Self::analyze), but folds failures into an error record.
    pub fn respond(&self, request: &SignalRequest) -> AnalysisOutcome {
        self.analyze(request).into()
    }
}

/// One-shot convenience: validate `config` and analyze `request`.
pub fn analyze(request: &SignalRequest, config: &EngineConfig) -> Result<SignalReport, EngineError> {
    SignalEngine::new(config.clone())?.analyze(request)
}

/// Labels produced by the classification step.
struct Classification {
    signal: String,
    crossover: Option<Crossover>,
    direction: Option<TrendDirection>,
    structure: Option<StructureVerdict>,
    entry: Option<f64>,
    stop_loss: Option<f64>,
    take_profit: Option<f64>,
}

fn run(request: &SignalRequest, config: &EngineConfig) -> Result<SignalReport, EngineError> {
    let variant = config.variant;
    let min_bars = config.min_bars();
    debug!(
        symbol = %request.symbol,
        %variant,
        window = config.window,
        records = request.values.len(),
        min_bars,
        "analysis started"
    );

    let bars = normalize(&request.values, variant.field_set(), min_bars)?;
    let average = moving_average(variant.ma_kind(), config.window, &bars)?;

    let Some(index) = bars.len().checked_sub(1) else {
        return Err(EngineError::insufficient("engine", min_bars.max(1), 0));
    };
    let current = &bars[index];
    let current_avg = average
        .value_at(index)
        .ok_or_else(|| EngineError::insufficient("engine", min_bars, bars.len()))?;
    let dp = config.display_decimals;

    let classification = match variant.crossover_rule() {
        Some(rule) => {
            let reading = classify_crossover(&bars, &average, rule)?;
            Classification {
                signal: format!("{}_{}", reading.position.label(), average.kind),
                crossover: Some(reading.crossover),
                direction: (variant == Variant::SmaTrend).then(|| reading.position.into()),
                structure: None,
                entry: None,
                stop_loss: None,
                take_profit: None,
            }
        }
        None => {
            let structure = classify_structure(&bars, config.swing_radius)?;
            let setup = evaluate_pullback(
                &bars,
                &average,
                structure.verdict,
                &config.pullback_params(),
            )?;
            let (entry, stop_loss, take_profit) =
                display_levels(&setup, config.reward_risk, dp);
            Classification {
                signal: setup.signal.to_string(),
                crossover: None,
                direction: None,
                structure: Some(structure.verdict),
                entry,
                stop_loss,
                take_profit,
            }
        }
    };

    debug!(
        symbol = %request.symbol,
        signal = %classification.signal,
        index,
        "analysis finished"
    );

    Ok(SignalReport {
        symbol: request.symbol.clone(),
        timeframe: request.timeframe.clone(),
        variant,
        signal: classification.signal,
        crossover: classification.crossover,
        direction: classification.direction,
        structure: classification.structure,
        last_close: round_to(current.close, dp),
        average: BTreeMap::from([(average.key(), round_to(current_avg, dp))]),
        entry: classification.entry,
        stop_loss: classification.stop_loss,
        take_profit: classification.take_profit,
        index,
        timestamp: current.time.clone(),
    })
}

/// Rounded `(entry, stop_loss, take_profit)` of a setup, all `None` for no trade.
///
/// The target is rebuilt from the rounded entry and stop, so the displayed
/// levels keep the reward multiple to the last displayed decimal.
fn display_levels(
    setup: &TradeSetup,
    reward_risk: f64,
    decimals: u32,
) -> (Option<f64>, Option<f64>, Option<f64>) {
    let Some(stop) = setup.stop_loss.filter(|_| setup.signal != TradeSignal::NoTrade) else {
        return (None, None, None);
    };
    let entry = round_to(setup.entry, decimals);
    let stop = round_to(stop, decimals);
    let target = round_to(entry + reward_risk * (entry - stop), decimals);
    (Some(entry), Some(stop), Some(target))
}
