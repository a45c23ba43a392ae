//! Stress tests
//!
//! Long runs under turbulent settings to verify every model stays finite,
//! inside its documented ranges, and that the log stays bounded.

use playground_core::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn turbulent(seed: u64, mode: Mode) -> Engine {
    Engine::new(EngineConfig {
        seed: Some(seed),
        initial_mode: mode,
        models: SimConfig::turbulent(),
        ..EngineConfig::default()
    })
    .unwrap()
}

/// Long random walks on each tick-driven model.
mod long_run_tests {
    use super::*;

    #[test]
    fn amm_reserves_stay_positive() {
        for kind in [CurveKind::ConstantProduct, CurveKind::Concentrated] {
            let mut engine = turbulent(1, Mode::Amm);
            engine
                .edit_amm(|m| {
                    m.set_kind(kind);
                    Ok(())
                })
                .unwrap();
            let k0 = engine.amm().params().x * engine.amm().params().y;

            engine.run_ticks(5_000);

            let p = engine.amm().params();
            assert!(p.x > 0.0 && p.y > 0.0);
            assert!(((p.x * p.y) - k0).abs() / k0 < 1e-6);
            let pos = &engine.amm().metrics().position;
            assert!(pos.amount0 >= 0.0 && pos.amount1 >= 0.0);
            assert!(engine.amm().curve().iter().all(|pt| pt.y.is_finite()));
        }
    }

    #[test]
    fn interest_accrual_monotone() {
        let mut engine = turbulent(2, Mode::Interest);
        engine.edit_interest(|m| m.set_apr_pct(250.0)).unwrap();
        let mut last = 0.0;
        for _ in 0..2_000 {
            engine.step_once();
            let accrued = engine.interest().accrued();
            assert!(accrued >= last);
            last = accrued;
        }
        assert_eq!(engine.interest().days_elapsed(), 2_000);
    }

    #[test]
    fn market_making_mid_floor_and_inventory() {
        let mut engine = turbulent(3, Mode::MarketMaking);
        engine.edit_market_making(|m| m.set_mid(1.0)).unwrap();
        for _ in 0..5_000 {
            engine.step_once();
            assert!(engine.market_making().params().mid >= 0.01);
        }
        let mm = engine.market_making();
        assert_eq!(mm.ladder().len(), 2 * mm.params().levels + 1);
        assert!(mm.ticks_since_regen() < 30);
        assert!(mm.metrics().fills > 0);
        assert!(mm.inventory().unsigned_abs() <= mm.metrics().fills * 5);
    }

    #[test]
    fn option_price_stays_sane() {
        let mut engine = turbulent(4, Mode::Options);
        for _ in 0..5_000 {
            engine.step_once();
            let o = engine.options();
            assert!(o.params().spot >= 0.01);
            assert!(o.price().is_finite() && o.price() >= 0.0);
            assert!(o.valuation().greeks.delta.abs() <= 1.0);
        }
    }

    #[test]
    fn il_ratio_pinned_to_bounds() {
        let mut engine = turbulent(5, Mode::Il);
        for _ in 0..20_000 {
            engine.step_once();
            let r = engine.il().params().price_ratio;
            assert!((MIN_PRICE_RATIO..=MAX_PRICE_RATIO).contains(&r));
            assert!(engine.il().il_value() <= 1e-12);
        }
        assert!(engine.event_bus().len() <= 500);
    }
}

/// Pool ledgers under hostile action sequences.
mod pool_stress_tests {
    use super::*;

    #[test]
    fn ledger_never_negative() {
        let mut engine = turbulent(6, Mode::Interest);
        let actions = [
            PoolAction::Borrow,
            PoolAction::Withdraw,
            PoolAction::Repay,
            PoolAction::Deposit,
        ];
        for i in 0..2_000u32 {
            let action = actions[(i % 4) as usize];
            let amount = Quote::new(Decimal::from(i * 997 % 750_000));
            engine.apply_pool(action, amount).unwrap();

            let p = engine.lending().params();
            assert!(p.cash >= Quote::zero());
            assert!(p.borrows >= Quote::zero());
            let u = engine.lending().metrics().utilization;
            assert!(u >= Decimal::ZERO && u <= Decimal::ONE);
        }
    }

    #[test]
    fn max_deposit_keeps_engine_alive() {
        let mut engine = turbulent(10, Mode::Interest);
        engine.apply_pool(PoolAction::Deposit, Quote::new(Decimal::MAX)).unwrap();
        engine.apply_pool(PoolAction::Repay, Quote::new(Decimal::MAX)).unwrap();
        engine.apply_pool(PoolAction::Deposit, Quote::new(Decimal::MAX)).unwrap();

        let p = engine.lending().params();
        assert_eq!(p.cash.value(), Decimal::MAX);
        assert_eq!(p.borrows, Quote::zero());
        assert_eq!(engine.lending().metrics().utilization, Decimal::ZERO);
        assert_eq!(engine.event_bus().len(), 3);
    }

    #[test]
    fn drained_pool_sits_at_full_utilization() {
        let mut engine = turbulent(7, Mode::Interest);
        engine.apply_pool(PoolAction::Borrow, Quote::new(dec!(1_000_000_000))).unwrap();
        assert_eq!(engine.lending().metrics().utilization, Decimal::ONE);
        let c = engine.lending().params().curve;
        let expected = c.base + c.slope1 + c.slope2;
        assert!((engine.lending().metrics().borrow_apr - expected).abs() < 1e-12);
    }
}

/// Extreme perp inputs.
mod perp_stress_tests {
    use super::*;

    #[test]
    fn extreme_leverage() {
        let mut engine = turbulent(8, Mode::MarketMaking);
        for lev in [dec!(0.1), dec!(1), dec!(100), dec!(1000)] {
            engine.edit_perp(|p| p.set_leverage(lev)).unwrap();
            let liq = engine.perp().liquidation_price();
            assert!(liq >= Decimal::ZERO);
            assert!(engine.perp().pnl_curve().y_scale.is_finite());
        }
    }

    #[test]
    fn vanishing_leverage_and_huge_size() {
        let mut engine = turbulent(11, Mode::MarketMaking);
        engine
            .edit_perp(|p| p.set_leverage(dec!(0.0000000000000000000000000001)))
            .unwrap();
        assert_eq!(engine.perp().liquidation_price(), Decimal::ZERO);

        engine
            .edit_perp(|p| {
                p.set_side(Side::Short);
                p.set_qty(dec!(1_000_000_000_000_000_000_000_000_000))
            })
            .unwrap();
        assert!(engine.perp().liquidation_price() > engine.perp().params().entry.value());
        assert_eq!(engine.perp().metrics().notional, Decimal::MAX);
    }
}

/// Mode churn with a running clock.
mod churn_tests {
    use super::*;

    #[test]
    fn mode_churn_keeps_log_bounded() {
        let mut engine = turbulent(9, Mode::Amm);
        engine.start();
        for i in 0..10_000usize {
            if i % 37 == 0 {
                engine.set_mode(Mode::ALL[(i / 37) % Mode::ALL.len()]);
            }
            if i % 1_001 == 0 {
                engine.toggle();
            }
            engine.tick();
        }
        let bus = engine.event_bus();
        assert!(bus.len() <= 500);
        let ids: Vec<u64> = bus.iter().map(|e| e.id.0).collect();
        assert!(ids.windows(2).all(|w| w[1] == w[0] + 1));
    }
}
