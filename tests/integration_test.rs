//! Integration tests across the public API.
//!
//! Tests cover:
//! - Every strategy over quiet data (no trades, flat equity)
//! - 50-EMA trend continuation over an oscillating uptrend
//! - Mean-reversion entry and exit plan on a volume-spike selloff
//! - Pipeline over a mock data port
//! - Signal checker and registry lookups
//! - Property tests for indicator definitions and ledger bookkeeping

mod common;

use approx::assert_relative_eq;
use common::*;
use proptest::prelude::*;
use tradelab::cli;
use tradelab::domain::backtest::{run_backtest, run_backtest_with, BacktestConfig};
use tradelab::domain::error::TradelabError;
use tradelab::domain::indicator::{bollinger, calculate_bollinger, calculate_ema, calculate_sma};
use tradelab::domain::indicator_helpers::closes;
use tradelab::domain::position::{Outcome, Side};
use tradelab::domain::signal::{check_signal, MIN_CANDLES};
use tradelab::domain::strategy::registry::get_strategy_description;
use tradelab::domain::strategy::{build_policy, StrategyId, StrategyPolicy};

mod quiet_market {
    use super::*;

    #[test]
    fn no_strategy_trades_flat_data() {
        let candles = flat_candles(260, 100.0);
        for id in StrategyId::ALL {
            let result = run_backtest(&candles, id.as_str());
            assert_eq!(result.strategy, id);
            assert_eq!(result.total_trades, 0, "{id}");
            assert_eq!(result.final_balance, 10_000.0);
            assert_eq!(result.equity_curve.len(), 260 - id.warmup() + 1, "{id}");
            assert!(result.equity_curve.iter().all(|&b| b == 10_000.0));
            assert_eq!(result.win_rate, 0.0);
            assert_eq!(result.profit_factor, 0.0);
            assert_eq!(result.sharpe_ratio, 0.0);
        }
    }

    #[test]
    fn sixty_flat_candles_never_trade() {
        let candles = flat_candles(60, 100.0);
        for id in StrategyId::ALL {
            let result = run_backtest(&candles, id.as_str());
            assert_eq!(result.total_trades, 0, "{id}");
            assert!(result.trades.is_empty(), "{id}");
            assert_eq!(result.final_balance, 10_000.0, "{id}");
            assert!(!result.equity_curve.is_empty(), "{id}");
            assert!(
                result.equity_curve.iter().all(|&b| b == 10_000.0),
                "{id}"
            );
        }
    }

    #[test]
    fn short_series_returns_seeded_empty_result() {
        let candles = flat_candles(60, 100.0);
        let result = run_backtest(&candles, "bb-snap-back");
        assert_eq!(result.total_trades, 0);
        assert_eq!(result.equity_curve, vec![10_000.0]);
        assert!(result.trades.is_empty());
    }

    #[test]
    fn unknown_id_runs_default_strategy() {
        let candles = flat_candles(60, 100.0);
        assert_eq!(
            run_backtest(&candles, "martingale").strategy,
            StrategyId::DEFAULT
        );
    }
}

mod mean_reversion_selloff {
    use super::*;

    #[test]
    fn first_trigger_is_long_with_middle_band_target() {
        let candles = selloff_and_recovery();
        let bands = calculate_bollinger(
            &closes(&candles),
            bollinger::DEFAULT_PERIOD,
            bollinger::DEFAULT_MULTIPLIER,
        );
        let mut policy = build_policy(StrategyId::MeanReversionHf, &candles);

        let (i, trigger) = (StrategyId::MeanReversionHf.warmup()..candles.len())
            .find_map(|i| policy.detect_trigger(&candles, i).map(|t| (i, t)))
            .expect("selloff should trigger");

        assert!((50..=53).contains(&i), "triggered at {i}");
        assert_eq!(trigger.side, Side::Long);
        assert_eq!(trigger.market_price, candles[i].close);
        assert!(candles[i].low <= bands.lower[i]);

        let plan = policy.plan_exits(&candles, i, Side::Long, trigger.market_price);
        assert_eq!(plan.first_target, bands.middle[i]);
        assert_relative_eq!(plan.stop, trigger.market_price * 0.97, epsilon = 1e-9);
        assert!(plan.stop < trigger.market_price && trigger.market_price < plan.first_target);
        assert_eq!(plan.second_target, None);
    }

    #[test]
    fn backtest_books_the_long() {
        let result = run_backtest(&selloff_and_recovery(), "mean-reversion-hf");
        assert!(result.total_trades >= 1);
        let first = result.trades.last().unwrap();
        assert_eq!(first.side, Side::Long);
        assert!(first.exit_time > first.entry_time);
        assert_eq!(result.wins + result.losses, result.total_trades);
    }
}

mod uptrend {
    use super::*;

    const ID: StrategyId = StrategyId::Ema50TrendContinuation;

    #[test]
    fn trend_continuation_takes_long_trades() {
        let result = run_backtest(&uptrend_with_oscillation(), ID.as_str());
        assert_eq!(result.strategy, ID);
        assert!(result.total_trades >= 1);
        assert!(result.trades.iter().all(|t| t.side == Side::Long));
    }

    #[test]
    fn first_trigger_brackets_entry() {
        let candles = uptrend_with_oscillation();
        let mut policy = build_policy(ID, &candles);

        let (i, trigger) = (ID.warmup()..candles.len())
            .find_map(|i| {
                if !policy.detect_setup(&candles, i) {
                    return None;
                }
                policy.detect_trigger(&candles, i).map(|t| (i, t))
            })
            .expect("uptrend should trigger");

        assert_eq!(trigger.side, Side::Long);
        let plan = policy.plan_exits(&candles, i, Side::Long, trigger.market_price);
        assert!(
            plan.stop < trigger.market_price && trigger.market_price < plan.first_target,
            "bar {i}: stop {} entry {} target {}",
            plan.stop,
            trigger.market_price,
            plan.first_target
        );
    }
}

mod pipeline_with_mock_port {
    use super::*;

    #[test]
    fn runs_over_fetched_candles() {
        let port = MockDataPort::new().with_candles("BTCUSDT", selloff_and_recovery());
        let config = BacktestConfig::default();
        let result = cli::run_backtest_pipeline(
            &port,
            "BTCUSDT",
            StrategyId::MeanReversionHf,
            &config,
        )
        .unwrap();
        assert_eq!(
            result,
            run_backtest_with(&selloff_and_recovery(), StrategyId::MeanReversionHf, &config)
        );
    }

    #[test]
    fn too_few_candles_is_an_error() {
        let port = MockDataPort::new().with_candles("ETHUSDT", flat_candles(120, 50.0));
        let err = cli::run_backtest_pipeline(
            &port,
            "ETHUSDT",
            StrategyId::BbSnapBack,
            &BacktestConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            TradelabError::InsufficientData { bars: 120, minimum: 210, .. }
        ));
    }

    #[test]
    fn port_errors_propagate() {
        let port = MockDataPort::new().with_error("SOLUSDT", "exchange offline");
        let err = cli::run_backtest_pipeline(
            &port,
            "SOLUSDT",
            StrategyId::DEFAULT,
            &BacktestConfig::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("exchange offline"));
    }
}

mod signals_and_registry {
    use super::*;

    #[test]
    fn quiet_market_has_no_signal() {
        assert!(check_signal(&flat_candles(MIN_CANDLES, 100.0)).is_none());
        assert!(check_signal(&flat_candles(MIN_CANDLES - 1, 100.0)).is_none());
    }

    #[test]
    fn every_id_is_described() {
        for id in StrategyId::ALL {
            let d = get_strategy_description(id.as_str());
            assert!(!d.name.is_empty());
            assert!(!d.buy_rules.is_empty());
            assert!(!d.sell_rules.is_empty());
        }
        assert_eq!(
            get_strategy_description("nope").name,
            get_strategy_description(StrategyId::DEFAULT.as_str()).name
        );
    }
}

fn random_walk() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-0.03f64..0.03, 220..320).prop_map(|steps| {
        let mut price = 100.0;
        steps
            .into_iter()
            .map(|r| {
                price *= 1.0 + r;
                price
            })
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn sma_matches_window_mean(
        data in prop::collection::vec(1.0f64..1_000.0, 1..80),
        period in 1usize..20,
    ) {
        let sma = calculate_sma(&data, period);
        prop_assert_eq!(sma.len(), data.len());
        for (i, value) in sma.iter().enumerate() {
            if i + 1 < period {
                prop_assert!(value.is_nan());
            } else {
                let window = &data[i + 1 - period..=i];
                let mean = window.iter().sum::<f64>() / period as f64;
                prop_assert!((value - mean).abs() <= 1e-9 * mean.abs().max(1.0));
            }
        }
    }

    #[test]
    fn ema_is_aligned_and_deterministic(
        data in prop::collection::vec(1.0f64..1_000.0, 1..80),
        period in 1usize..20,
    ) {
        let first = calculate_ema(&data, period);
        let second = calculate_ema(&data, period);
        prop_assert_eq!(first.len(), data.len());
        for (a, b) in first.iter().zip(&second) {
            prop_assert!(a == b || (a.is_nan() && b.is_nan()));
        }
    }

    #[test]
    fn ledger_bookkeeping_holds(path in random_walk()) {
        let candles = candles_from_closes(&path);
        for id in StrategyId::ALL {
            let result = run_backtest_with(&candles, id, &BacktestConfig::default());
            prop_assert_eq!(result.wins + result.losses, result.total_trades);
            prop_assert_eq!(result.trades.len(), result.total_trades);
            if candles.len() >= id.min_candles() {
                prop_assert_eq!(result.equity_curve.len(), candles.len() - id.warmup() + 1);
            } else {
                prop_assert_eq!(result.equity_curve.len(), 1);
            }
            prop_assert_eq!(result.equity_curve.last().copied(), Some(result.final_balance));
            prop_assert!(result.trades.windows(2).all(|w| w[0].entry_time >= w[1].entry_time));
            for trade in &result.trades {
                prop_assert_eq!(trade.outcome, Outcome::from_pnl(trade.pnl));
                prop_assert!(trade.exit_time >= trade.entry_time);
            }
            prop_assert!((0.0..=100.0).contains(&result.win_rate));
        }
    }
}
