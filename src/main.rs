//! DeFi playground headless simulation.
//!
//! Drives every model the way a browser host would: start the clock, feed it
//! ticks, edit parameters between runs, and read back metrics and the log.
//! `RUST_LOG=playground_core=debug` shows every tick and event.

use playground_core::*;
use rust_decimal_macros::dec;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const SEED: u64 = 7;

fn main() -> Result<(), EngineError> {
    init_logging();

    println!("DeFi Playground Simulation");
    println!("Seeded run ({SEED}), one model per scenario\n");

    scenario_1_amm_swaps()?;
    scenario_2_interest_accrual()?;
    scenario_3_lending_pool()?;
    scenario_4_market_making()?;
    scenario_5_perp_liquidation()?;
    scenario_6_options()?;
    scenario_7_impermanent_loss()?;
    scenario_8_clock_and_reset()?;

    println!("\nAll simulations completed successfully.");
    Ok(())
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn engine(mode: Mode) -> Result<Engine, EngineError> {
    Engine::new(EngineConfig {
        seed: Some(SEED),
        initial_mode: mode,
        ..EngineConfig::default()
    })
}

/// Random trades against each curve shape.
fn scenario_1_amm_swaps() -> Result<(), EngineError> {
    println!("Scenario 1: AMM Swaps\n");

    let mut engine = engine(Mode::Amm)?;
    for kind in [
        CurveKind::ConstantProduct,
        CurveKind::Weighted,
        CurveKind::StableLike,
        CurveKind::Concentrated,
    ] {
        engine.edit_amm(|m| {
            m.set_kind(kind);
            Ok(())
        })?;
        engine.run_ticks(50);

        let m = engine.amm().metrics();
        println!(
            "  {:?}: k {:.1}, spot {:.4}, last slippage {:+.4}%, {} trades",
            kind,
            m.k,
            m.spot_price,
            m.last_slippage * 100.0,
            m.trades
        );
    }
    let pos = &engine.amm().metrics().position;
    println!(
        "  Concentrated position: {:.2} x / {:.2} y, in range: {}\n",
        pos.amount0, pos.amount1, pos.in_range
    );
    Ok(())
}

/// Simple vs compound growth on the same principal.
fn scenario_2_interest_accrual() -> Result<(), EngineError> {
    println!("Scenario 2: Interest Accrual\n");

    let mut engine = engine(Mode::Interest)?;
    engine.edit_interest(|m| m.set_apr_pct(12.0))?;
    engine.run_ticks(180);

    let m = engine.interest();
    println!("  Day {}: accrued {:.4}, balance {:.4}", m.days_elapsed(), m.accrued(), m.current_balance());
    println!(
        "  Horizon: simple {:.2}, compound {:.2}, edge {:.4}\n",
        m.metrics().simple_at_horizon,
        m.metrics().compound_at_horizon,
        m.metrics().compounding_edge
    );
    Ok(())
}

/// Utilization walks up the kinked curve as the pool is drained.
fn scenario_3_lending_pool() -> Result<(), EngineError> {
    println!("Scenario 3: Lending Pool\n");

    let mut engine = engine(Mode::Interest)?;
    let steps = [
        (PoolAction::Deposit, dec!(200_000)),
        (PoolAction::Borrow, dec!(350_000)),
        (PoolAction::Borrow, dec!(500_000)),
        (PoolAction::Repay, dec!(100_000)),
        (PoolAction::Withdraw, dec!(1_000_000)),
    ];
    for (action, amount) in steps {
        let applied = engine.apply_pool(action, Quote::new(amount))?;
        let m = engine.lending().metrics();
        println!(
            "  {:<8} {:>9} (applied {:>9}): U {:.2}%, borrow {:.2}%, supply {:.2}%",
            action.as_str(),
            amount,
            applied,
            engine.lending().utilization_f64() * 100.0,
            m.borrow_apr * 100.0,
            m.supply_apr * 100.0
        );
    }

    match engine.apply_pool(PoolAction::Deposit, Quote::new(dec!(-1))) {
        Err(e) => println!("  Negative deposit rejected: {e}\n"),
        Ok(_) => println!("  Negative deposit unexpectedly accepted\n"),
    }
    Ok(())
}

/// Mid walk, random fills and periodic ladder rebuilds.
fn scenario_4_market_making() -> Result<(), EngineError> {
    println!("Scenario 4: Market Making\n");

    let mut engine = engine(Mode::MarketMaking)?;
    engine.run_ticks(300);

    let mm = engine.market_making();
    let fills = engine.events().filter(|e| e.kind == EventKind::Fill).count();
    let regens = engine.events().filter(|e| e.kind == EventKind::BookRegen).count();
    println!("  Mid {:.4}, inventory {}, notional {:.2}", mm.params().mid, mm.inventory(), mm.metrics().inventory_notional);
    println!("  Quotes {:.4} / {:.4}", mm.metrics().best_bid, mm.metrics().best_ask);
    println!("  {} fills, {} ladder rebuilds, {} levels on book\n", fills, regens, mm.ladder().len());
    Ok(())
}

/// Liquidation price across leverage for both sides.
fn scenario_5_perp_liquidation() -> Result<(), EngineError> {
    println!("Scenario 5: Perp Liquidation\n");

    let mut engine = engine(Mode::MarketMaking)?;
    for side in [Side::Long, Side::Short] {
        for leverage in [dec!(2), dec!(10), dec!(50)] {
            engine.edit_perp(|p| {
                p.set_side(side);
                p.set_leverage(leverage)
            })?;
            let perp = engine.perp();
            println!(
                "  {side} {leverage}x @ {}: liquidation {:.4} ({:.2}% away)",
                perp.params().entry,
                perp.liquidation_price(),
                perp.metrics().liquidation_distance * dec!(100)
            );
        }
    }
    println!();
    Ok(())
}

/// Spot random walk and Greeks for a call and a put.
fn scenario_6_options() -> Result<(), EngineError> {
    println!("Scenario 6: Options\n");

    let mut engine = engine(Mode::Options)?;
    for kind in [OptionKind::Call, OptionKind::Put] {
        engine.edit_options(|o| {
            o.set_kind(kind);
            Ok(())
        })?;
        engine.run_ticks(100);
        let o = engine.options();
        let g = o.valuation().greeks;
        println!(
            "  {:?} spot {:.2}: price {:.4}, delta {:.4}, gamma {:.5}, theta {:.4}, vega {:.4}",
            kind,
            o.params().spot,
            o.price(),
            g.delta,
            g.gamma,
            g.theta,
            g.vega
        );
    }
    println!();
    Ok(())
}

/// Drifting price ratio under both pool weightings.
fn scenario_7_impermanent_loss() -> Result<(), EngineError> {
    println!("Scenario 7: Impermanent Loss\n");

    let mut engine = engine(Mode::Il)?;
    for weighting in [Weighting::FiftyFifty, Weighting::EightyTwenty] {
        engine.edit_il(|m| {
            m.set_weighting(weighting);
            m.set_price_ratio(2.0)
        })?;
        engine.run_ticks(200);
        let il = engine.il();
        println!(
            "  {}: ratio {:.4}, IL {:.3}%",
            weighting.label(),
            il.params().price_ratio,
            il.il_value() * 100.0
        );
    }
    println!();
    Ok(())
}

/// Host-style clock: ticks only fire while running, reset wipes the log.
fn scenario_8_clock_and_reset() -> Result<(), EngineError> {
    println!("Scenario 8: Clock, Mode Switch and Reset\n");

    let mut engine = engine(Mode::Amm)?;
    engine.start();
    for _ in 0..20 {
        engine.tick();
    }
    engine.set_mode(Mode::Options);
    for _ in 0..20 {
        engine.tick();
    }
    engine.stop();
    let fired = (0..20).filter_map(|_| engine.tick()).count();

    println!("  Tick {} after 40 running ticks, {} fired while stopped", engine.tick_count(), fired);
    let amm_only = EventFilter::only(Mode::Amm);
    println!(
        "  Log: {} events, {} from amm",
        engine.event_bus().len(),
        engine.filtered_events(&amm_only).count()
    );

    engine.reset();
    let last = engine.event_bus().latest().map(|e| (e.id.0, e.kind.as_str()));
    println!("  After reset: tick {}, {} event(s), last {:?}", engine.tick_count(), engine.event_bus().len(), last);
    Ok(())
}
