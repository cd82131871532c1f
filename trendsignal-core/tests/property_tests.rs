//! Property tests for signal invariants.
//!
//! Uses proptest to verify:
//! 1. Normalized bars come out oldest-first
//! 2. EMA follows its seed and recursion exactly
//! 3. SMA of constant closes is that constant
//! 4. Crossover events agree with the current position
//! 5. Swing points dominate their neighborhood; verdicts need two of each
//! 6. Trade targets sit at the reward multiple of the risk, long and short

use proptest::prelude::*;
use serde_json::json;
use trendsignal_core::data::{normalize, FieldSet};
use trendsignal_core::indicators::{moving_average, Ema, Indicator, MaKind, Sma};
use trendsignal_core::signals::{
    classify_crossover, classify_structure, evaluate_pullback, find_swings, Crossover,
    CrossoverRule, Position, PullbackParams, StructureVerdict, SwingKind, TradeSignal,
};
use trendsignal_core::{Bar, RawRecord};

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_price() -> impl Strategy<Value = f64> {
    (1.0..500.0_f64).prop_map(|p| (p * 100.0).round() / 100.0)
}

fn arb_closes(min: usize, max: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(arb_price(), min..max)
}

/// Bars with a consistent OHLC envelope around each close.
fn arb_bars(min: usize, max: usize) -> impl Strategy<Value = Vec<Bar>> {
    prop::collection::vec((arb_price(), 0.0..5.0_f64, 0.0..5.0_f64), min..max).prop_map(|rows| {
        rows.into_iter()
            .map(|(close, up, down)| Bar {
                open: close,
                high: close + up,
                low: close - down,
                close,
                time: None,
            })
            .collect()
    })
}

fn close_record(close: f64) -> RawRecord {
    match json!({ "close": close }) {
        serde_json::Value::Object(map) => map,
        _ => unreachable!(),
    }
}

// ── 1. Chronological order ───────────────────────────────────────────

proptest! {
    #[test]
    fn normalize_reverses_feed_order(closes in arb_closes(1, 80)) {
        let records: Vec<RawRecord> = closes.iter().map(|&c| close_record(c)).collect();
        let bars = normalize(&records, FieldSet::CloseOnly, closes.len()).unwrap();
        let got: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let expected: Vec<f64> = closes.iter().rev().copied().collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn normalize_rejects_short_windows(closes in arb_closes(0, 20)) {
        let records: Vec<RawRecord> = closes.iter().map(|&c| close_record(c)).collect();
        prop_assert!(normalize(&records, FieldSet::CloseOnly, closes.len() + 1).is_err());
    }
}

// ── 2. EMA recursion ─────────────────────────────────────────────────

proptest! {
    #[test]
    fn ema_seed_and_recursion(closes in arb_closes(1, 120), period in 1usize..30) {
        prop_assume!(closes.len() >= period);
        let bars: Vec<Bar> = closes.iter().copied().map(Bar::from_close).collect();
        let ema = Ema::new(period);
        let values = ema.compute(&bars);
        let alpha = ema.alpha();

        for v in &values[..period - 1] {
            prop_assert!(v.is_nan());
        }
        let seed = closes[..period].iter().sum::<f64>() / period as f64;
        prop_assert!((values[period - 1] - seed).abs() < 1e-9);

        for i in period..closes.len() {
            let expected = alpha * closes[i] + (1.0 - alpha) * values[i - 1];
            prop_assert!((values[i] - expected).abs() < 1e-9);
        }
    }
}

// ── 3. SMA of constant closes ────────────────────────────────────────

proptest! {
    #[test]
    fn sma_of_constant_is_constant(c in arb_price(), n in 1usize..100, period in 1usize..50) {
        prop_assume!(n >= period);
        let bars: Vec<Bar> = (0..n).map(|_| Bar::from_close(c)).collect();
        let values = Sma::new(period).compute(&bars);
        for v in &values[period - 1..] {
            prop_assert!((v - c).abs() <= 1e-9 * c.abs().max(1.0));
        }
    }
}

// ── 4. Crossover consistency ─────────────────────────────────────────

proptest! {
    #[test]
    fn crossover_matches_position(closes in arb_closes(12, 60), window in 1usize..10) {
        let bars: Vec<Bar> = closes.iter().copied().map(Bar::from_close).collect();
        let average = moving_average(MaKind::Ema, window, &bars).unwrap();

        let two_bar = classify_crossover(&bars, &average, CrossoverRule::TwoBar).unwrap();
        let stabilized = classify_crossover(&bars, &average, CrossoverRule::Stabilized).unwrap();
        prop_assert_eq!(two_bar.position, stabilized.position);

        for reading in [&two_bar, &stabilized] {
            match reading.crossover {
                Crossover::Buy => prop_assert_eq!(reading.position, Position::Above),
                Crossover::Sell => prop_assert_eq!(reading.position, Position::Below),
                Crossover::None => {}
            }
        }

        // A stabilized event is always also a two-bar event.
        if stabilized.crossover != Crossover::None {
            prop_assert_eq!(stabilized.crossover, two_bar.crossover);
        }
    }
}

// ── 5. Swing structure ───────────────────────────────────────────────

proptest! {
    #[test]
    fn swings_dominate_neighbors(bars in arb_bars(0, 60), radius in 1usize..5) {
        for swing in find_swings(&bars, radius) {
            let i = swing.index;
            prop_assert!(i >= radius && i + radius < bars.len());
            for j in (i - radius..=i + radius).filter(|&j| j != i) {
                match swing.kind {
                    SwingKind::High => prop_assert!(bars[i].high > bars[j].high),
                    SwingKind::Low => prop_assert!(bars[i].low < bars[j].low),
                }
            }
        }
    }

    #[test]
    fn trend_verdicts_need_two_rising_or_falling_pairs(bars in arb_bars(0, 60)) {
        let reading = classify_structure(&bars, 2).unwrap();
        let highs: Vec<f64> = reading.swings.highs.iter().map(|s| s.price).collect();
        let lows: Vec<f64> = reading.swings.lows.iter().map(|s| s.price).collect();

        if highs.len() < 2 || lows.len() < 2 {
            prop_assert_eq!(reading.verdict, StructureVerdict::NoStructure);
        } else {
            let (h1, h2) = (highs[highs.len() - 2], highs[highs.len() - 1]);
            let (l1, l2) = (lows[lows.len() - 2], lows[lows.len() - 1]);
            let expected = if h2 > h1 && l2 > l1 {
                StructureVerdict::Uptrend
            } else if h2 < h1 && l2 < l1 {
                StructureVerdict::Downtrend
            } else {
                StructureVerdict::Range
            };
            prop_assert_eq!(reading.verdict, expected);
        }
    }
}

// ── 6. Reward multiple ───────────────────────────────────────────────

proptest! {
    /// A flat shelf at 100 pins EMA(3) to the previous close, so a bullish
    /// close above 100 always fires a long.
    #[test]
    fn take_profit_is_reward_multiple_of_risk(
        lows in prop::collection::vec(50.0..99.9_f64, 4),
        close in 100.5..120.0_f64,
        reward_risk in 0.5..5.0_f64,
    ) {
        let mut bars: Vec<Bar> = (0..6)
            .map(|_| Bar { open: 100.0, high: 100.5, low: 99.95, close: 100.0, time: None })
            .collect();
        for (bar, &low) in bars[2..6].iter_mut().zip(&lows) {
            bar.low = low;
        }
        bars.push(Bar { open: 100.0, high: close + 0.5, low: 99.0, close, time: None });

        let ema = moving_average(MaKind::Ema, 3, &bars).unwrap();
        let params = PullbackParams { reward_risk, ..PullbackParams::default() };
        let setup = evaluate_pullback(&bars, &ema, StructureVerdict::Uptrend, &params).unwrap();

        prop_assert_eq!(setup.signal, TradeSignal::Buy);
        let stop = lows.iter().copied().fold(f64::INFINITY, f64::min);
        prop_assert_eq!(setup.stop_loss, Some(stop));
        let target = setup.take_profit.unwrap();
        let risk = setup.entry - stop;
        prop_assert!((target - setup.entry - reward_risk * risk).abs() < 1e-9);
    }
}

proptest! {
    /// Mirror of the long case: a bearish close under the shelf always
    /// fires a short with the stop at the highest recent high.
    #[test]
    fn short_target_is_reward_multiple_of_risk(
        highs in prop::collection::vec(100.1..150.0_f64, 4),
        close in 80.0..99.5_f64,
        reward_risk in 0.5..5.0_f64,
    ) {
        let mut bars: Vec<Bar> = (0..6)
            .map(|_| Bar { open: 100.0, high: 100.05, low: 99.5, close: 100.0, time: None })
            .collect();
        for (bar, &high) in bars[2..6].iter_mut().zip(&highs) {
            bar.high = high;
        }
        bars.push(Bar { open: 100.0, high: 100.0, low: close - 0.5, close, time: None });

        let ema = moving_average(MaKind::Ema, 3, &bars).unwrap();
        let params = PullbackParams { reward_risk, ..PullbackParams::default() };
        let setup = evaluate_pullback(&bars, &ema, StructureVerdict::Downtrend, &params).unwrap();

        prop_assert_eq!(setup.signal, TradeSignal::Sell);
        let stop = highs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        prop_assert_eq!(setup.stop_loss, Some(stop));
        let target = setup.take_profit.unwrap();
        prop_assert!(target < setup.entry);
        let risk = (setup.entry - stop).abs();
        prop_assert!(((target - setup.entry).abs() - reward_risk * risk).abs() < 1e-9);
    }
}
