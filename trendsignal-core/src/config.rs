//! Serializable engine configuration.
//!
//! The engine reads no ambient state: every tunable lives in [`EngineConfig`]
//! and is passed explicitly to each call. Configs load from TOML, e.g.
//!
//! ```toml
//! variant = "pullback"
//! window = 50
//! pullback_tolerance = 0.001
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::data::FieldSet;
use crate::error::EngineError;
use crate::indicators::MaKind;
use crate::signals::{CrossoverRule, PullbackParams, DEFAULT_SWING_RADIUS};

/// Which signal recipe the engine runs.
///
/// All variants share one pipeline; the variant only picks the average kind,
/// the crossover rule, and whether structure and trade setup are computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// EMA position plus two-bar crossover.
    EmaCross,
    /// EMA position plus stabilized three-bar crossover.
    EmaCrossConfirmed,
    /// Swing structure plus EMA pullback trade setup.
    Pullback,
    /// SMA position, trend direction and stabilized crossover.
    SmaTrend,
}

impl Variant {
    pub const ALL: [Variant; 4] = [
        Variant::EmaCross,
        Variant::EmaCrossConfirmed,
        Variant::Pullback,
        Variant::SmaTrend,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Variant::EmaCross => "ema_cross",
            Variant::EmaCrossConfirmed => "ema_cross_confirmed",
            Variant::Pullback => "pullback",
            Variant::SmaTrend => "sma_trend",
        }
    }

    pub fn ma_kind(&self) -> MaKind {
        match self {
            Variant::SmaTrend => MaKind::Sma,
            _ => MaKind::Ema,
        }
    }

    /// Crossover rule, or `None` for variants that report no crossover.
    pub fn crossover_rule(&self) -> Option<CrossoverRule> {
        match self {
            Variant::EmaCross => Some(CrossoverRule::TwoBar),
            Variant::EmaCrossConfirmed | Variant::SmaTrend => Some(CrossoverRule::Stabilized),
            Variant::Pullback => None,
        }
    }

    pub fn field_set(&self) -> FieldSet {
        match self {
            Variant::Pullback => FieldSet::Ohlc,
            _ => FieldSet::CloseOnly,
        }
    }

    /// Fewest bars this variant accepts under `config`, or `None` when the
    /// count does not fit in `usize`.
    pub fn checked_min_bars(&self, config: &EngineConfig) -> Option<usize> {
        let window = config.window.max(1);
        match self.crossover_rule() {
            Some(rule) => (window - 1).checked_add(rule.pairs_required()),
            None => {
                let structure = window.checked_add(config.structure_margin)?;
                let crossover = window.checked_add(1)?;
                let stop = config.stop_lookback.checked_add(1)?;
                Some(structure.max(crossover).max(stop))
            }
        }
    }

    /// Fewest bars this variant accepts under `config`. Saturates at
    /// `usize::MAX`; [`EngineConfig::validate`] rejects such configs.
    pub fn min_bars(&self, config: &EngineConfig) -> usize {
        self.checked_min_bars(config).unwrap_or(usize::MAX)
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Variant::ALL
            .into_iter()
            .find(|v| v.name() == s)
            .ok_or_else(|| {
                let names: Vec<&str> = Variant::ALL.iter().map(|v| v.name()).collect();
                format!("unknown variant '{s}' (expected one of: {})", names.join(", "))
            })
    }
}

/// Engine tunables. Missing TOML keys fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub variant: Variant,
    /// Moving-average window.
    pub window: usize,
    /// Bars on each side a swing point must dominate.
    pub swing_radius: usize,
    /// Absolute price distance that counts as touching the EMA.
    pub pullback_tolerance: f64,
    /// Bars before the current one scanned for the stop-loss.
    pub stop_lookback: usize,
    /// Take-profit multiple of the risk.
    pub reward_risk: f64,
    /// Extra bars beyond `window` the pullback variant requires.
    pub structure_margin: usize,
    /// Decimal places of numeric report fields.
    pub display_decimals: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let pullback = PullbackParams::default();
        Self {
            variant: Variant::EmaCross,
            window: 50,
            swing_radius: DEFAULT_SWING_RADIUS,
            pullback_tolerance: pullback.tolerance,
            stop_lookback: pullback.stop_lookback,
            reward_risk: pullback.reward_risk,
            structure_margin: 10,
            display_decimals: 5,
        }
    }
}

impl EngineConfig {
    pub fn for_variant(variant: Variant) -> Self {
        Self {
            variant,
            ..Self::default()
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Minimum bar count for the configured variant.
    pub fn min_bars(&self) -> usize {
        self.variant.min_bars(self)
    }

    pub fn pullback_params(&self) -> PullbackParams {
        PullbackParams {
            tolerance: self.pullback_tolerance,
            stop_lookback: self.stop_lookback,
            reward_risk: self.reward_risk,
        }
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        let invalid = |msg: &str| Err(EngineError::InvalidConfig(msg.to_string()));

        if self.window == 0 {
            return invalid("window must be >= 1");
        }
        if self.swing_radius == 0 {
            return invalid("swing_radius must be >= 1");
        }
        if self.stop_lookback == 0 {
            return invalid("stop_lookback must be >= 1");
        }
        if !self.pullback_tolerance.is_finite() || self.pullback_tolerance < 0.0 {
            return invalid("pullback_tolerance must be a finite, non-negative number");
        }
        if !self.reward_risk.is_finite() || self.reward_risk <= 0.0 {
            return invalid("reward_risk must be a finite, positive number");
        }
        if self.display_decimals > 12 {
            return invalid("display_decimals must be <= 12");
        }
        if self.variant.checked_min_bars(self).is_none() {
            return invalid("window and margins overflow the required bar count");
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error(transparent)]
    Invalid(#[from] EngineError),
}
