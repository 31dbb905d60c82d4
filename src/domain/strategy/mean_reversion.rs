//! High-frequency Bollinger/RSI mean reversion, both directions.
//!
//! Long when the bar's low tags the lower band with RSI(14) below 35 on a
//! volume spike; short mirrored at the upper band with RSI above 65.
//!
//! Exit ladder: close back at the middle band (filled at the band), RSI at the
//! opposite extreme, 3% hard stop, 48-bar timeout.

use super::{stop_exit, ExitAction, ExitPlan, Fill, StrategyPolicy, Trigger};
use crate::domain::candle::Candle;
use crate::domain::indicator::{
    bollinger, calculate_bollinger, calculate_rsi, calculate_sma, rsi, BollingerBands,
};
use crate::domain::indicator_helpers::{closes, volumes};
use crate::domain::position::{ExitReason, Position, Side};

const LONG_RSI_ENTRY: f64 = 35.0;
const SHORT_RSI_ENTRY: f64 = 65.0;
const LONG_RSI_EXIT: f64 = 70.0;
const SHORT_RSI_EXIT: f64 = 30.0;
const VOLUME_PERIOD: usize = 20;
const VOLUME_MULTIPLIER: f64 = 1.2;
const STOP_PCT: f64 = 0.03;
const MAX_BARS_HELD: usize = 48;

pub struct MeanReversion {
    bands: BollingerBands,
    rsi: Vec<f64>,
    volume_avg: Vec<f64>,
}

impl MeanReversion {
    pub fn new(candles: &[Candle]) -> Self {
        let closes = closes(candles);
        MeanReversion {
            bands: calculate_bollinger(
                &closes,
                bollinger::DEFAULT_PERIOD,
                bollinger::DEFAULT_MULTIPLIER,
            ),
            rsi: calculate_rsi(&closes, rsi::DEFAULT_PERIOD),
            volume_avg: calculate_sma(&volumes(candles), VOLUME_PERIOD),
        }
    }
}

impl StrategyPolicy for MeanReversion {
    fn detect_trigger(&mut self, candles: &[Candle], i: usize) -> Option<Trigger> {
        let bar = &candles[i];
        let rsi = self.rsi[i];
        let volume_spike = bar.volume > self.volume_avg[i] * VOLUME_MULTIPLIER;
        if !volume_spike {
            return None;
        }

        let side = if bar.low <= self.bands.lower[i] && rsi < LONG_RSI_ENTRY {
            Side::Long
        } else if bar.high >= self.bands.upper[i] && rsi > SHORT_RSI_ENTRY {
            Side::Short
        } else {
            return None;
        };

        Some(Trigger {
            side,
            market_price: bar.close,
        })
    }

    fn plan_exits(&self, _candles: &[Candle], i: usize, side: Side, entry_price: f64) -> ExitPlan {
        let stop = match side {
            Side::Long => entry_price * (1.0 - STOP_PCT),
            Side::Short => entry_price * (1.0 + STOP_PCT),
        };
        ExitPlan {
            stop,
            first_target: self.bands.middle[i],
            second_target: None,
        }
    }

    fn evaluate_exit(&self, candles: &[Candle], i: usize, position: &Position) -> ExitAction {
        let bar = &candles[i];
        let rsi = self.rsi[i];

        let (back_at_mean, rsi_extreme) = match position.side {
            Side::Long => (bar.close >= position.first_target, rsi > LONG_RSI_EXIT),
            Side::Short => (bar.close <= position.first_target, rsi < SHORT_RSI_EXIT),
        };

        if back_at_mean {
            return ExitAction::Close(Fill {
                market_price: position.first_target,
                reason: ExitReason::Target,
            });
        }
        if rsi_extreme {
            return ExitAction::Close(Fill {
                market_price: bar.close,
                reason: ExitReason::IndicatorExtreme,
            });
        }
        if let Some(stop) = stop_exit(position, bar) {
            return stop;
        }
        if position.bars_held(i) >= MAX_BARS_HELD {
            return ExitAction::Close(Fill {
                market_price: bar.close,
                reason: ExitReason::Timeout,
            });
        }
        ExitAction::Hold
    }
}
