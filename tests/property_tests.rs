//! Property-based tests for the math kernels.
//!
//! These tests verify invariants hold under random inputs.

use playground_core::*;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// Strategies for generating test data
fn reserve_strategy() -> impl Strategy<Value = f64> {
    10.0f64..1_000_000.0
}

fn balance_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..100_000_000i64).prop_map(|x| Decimal::new(x, 2)) // 0 to 1,000,000
}

fn price_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|x| Decimal::new(x, 2)) // $0.01 to $10,000
}

fn leverage_strategy() -> impl Strategy<Value = Decimal> {
    (1u32..=50u32).prop_map(Decimal::from) // 1x to 50x
}

fn mmr_strategy() -> impl Strategy<Value = Decimal> {
    // kept below the 2% initial margin of a 50x position
    (1i64..=150i64).prop_map(|x| Decimal::new(x, 4)) // 0.01% to 1.5%
}

proptest! {
    /// Buying then selling back what came out lands on the same invariant
    #[test]
    fn swap_round_trip_keeps_product(
        x in reserve_strategy(),
        y in reserve_strategy(),
        frac in 0.0001f64..0.5,
    ) {
        let k = x * y;
        let size = x * frac;
        let (x1, y1) = constant_product_swap(x, y, size, TradeDirection::Buy);
        prop_assert!(((x1 * y1) - k).abs() / k < 1e-9);

        let received = y - y1;
        let (x2, y2) = constant_product_swap(x1, y1, received, TradeDirection::Sell);
        prop_assert!(((x2 * y2) - k).abs() / k < 1e-9);
        prop_assert!((x2 - x).abs() / x < 1e-9);
        prop_assert!((y2 - y).abs() / y < 1e-9);
    }

    /// Buys lower the spot price, sells raise it
    #[test]
    fn swap_moves_price_against_trader(
        x in reserve_strategy(),
        y in reserve_strategy(),
        size in 0.01f64..10_000.0,
    ) {
        let p0 = spot_price(x, y);
        let (bx, by) = constant_product_swap(x, y, size, TradeDirection::Buy);
        let (sx, sy) = constant_product_swap(x, y, size, TradeDirection::Sell);
        prop_assert!(spot_price(bx, by) < p0);
        prop_assert!(spot_price(sx, sy) > p0);
    }

    /// Utilization is zero on a non-positive denominator, exact ratio otherwise
    #[test]
    fn utilization_exact(
        cash in balance_strategy(),
        borrows in balance_strategy(),
        reserves in balance_strategy(),
    ) {
        let u = utilization(Quote::new(cash), Quote::new(borrows), Quote::new(reserves));
        let denom = cash + borrows - reserves;
        if denom <= Decimal::ZERO {
            prop_assert_eq!(u, Decimal::ZERO);
        } else {
            prop_assert_eq!(u, borrows / denom);
            prop_assert!(u >= Decimal::ZERO);
        }
    }

    /// With no reserves utilization stays within [0, 1]
    #[test]
    fn utilization_bounded_without_reserves(
        cash in balance_strategy(),
        borrows in balance_strategy(),
    ) {
        let u = utilization(Quote::new(cash), Quote::new(borrows), Quote::zero());
        prop_assert!(u >= Decimal::ZERO && u <= Decimal::ONE);
    }

    /// Kinked borrow rate never decreases with utilization
    #[test]
    fn jump_curve_monotone(
        u1 in 0.0f64..=1.0,
        u2 in 0.0f64..=1.0,
        kink in 0.05f64..0.95,
    ) {
        let curve = IrCurveParams { kink, ..IrCurveParams::default() };
        let (lo, hi) = if u1 <= u2 { (u1, u2) } else { (u2, u1) };
        prop_assert!(borrow_apr(lo, &curve) <= borrow_apr(hi, &curve) + 1e-12);
        prop_assert!(supply_apr(hi, borrow_apr(hi, &curve), 0.1) <= borrow_apr(hi, &curve));
    }

    /// Simple and compound agree at one year and at day zero
    #[test]
    fn accrual_agrees_at_one_year(
        principal in 1.0f64..1_000_000.0,
        rate in 0.0f64..2.0,
    ) {
        let simple = simple_balance(principal, rate, 365.0);
        let compound = compound_balance(principal, rate, 365.0);
        prop_assert!((simple - compound).abs() / simple < 1e-9);
        prop_assert_eq!(simple_balance(principal, rate, 0.0), principal);
        prop_assert!((compound_balance(principal, rate, 0.0) - principal).abs() < 1e-9);
    }

    /// Put-call parity holds for any sane inputs
    #[test]
    fn put_call_parity(
        spot in 1.0f64..500.0,
        strike in 1.0f64..500.0,
        rate in -0.02f64..0.2,
        vol in 0.01f64..1.5,
        t in 0.01f64..5.0,
    ) {
        let c = black_scholes(OptionKind::Call, spot, strike, rate, vol, t);
        let p = black_scholes(OptionKind::Put, spot, strike, rate, vol, t);
        let parity = spot - strike * (-rate * t).exp();
        // erf approximation error scales with the larger of spot and strike
        let tol = 1e-6 * spot.max(strike) + 1e-4;
        prop_assert!((c.price - p.price - parity).abs() < tol);
        prop_assert!(c.price >= 0.0 && p.price >= 0.0);
        prop_assert!((0.0..=1.0).contains(&c.greeks.delta));
        prop_assert!(c.greeks.gamma >= 0.0 && c.greeks.vega >= 0.0);
    }

    /// Impermanent loss is never a gain, for either weighting
    #[test]
    fn impermanent_loss_non_positive(p in 0.001f64..100.0) {
        prop_assert!(impermanent_loss_5050(p) <= 1e-12);
        prop_assert!(impermanent_loss_8020(p) <= 1e-12);
        prop_assert!(impermanent_loss_5050(p) >= -1.0);
    }

    /// Long liquidation sits below entry, short above, never negative
    #[test]
    fn liquidation_price_side_of_entry(
        entry in price_strategy(),
        leverage in leverage_strategy(),
        mmr in mmr_strategy(),
    ) {
        let entry_price = Price::new_unchecked(entry);
        let lev = Leverage::new_unchecked(leverage);

        let long = perp_liquidation_price(Side::Long, entry_price, dec!(1), lev, mmr);
        let short = perp_liquidation_price(Side::Short, entry_price, dec!(1), lev, mmr);
        prop_assert!(long >= Decimal::ZERO);
        prop_assert!(long < entry);
        prop_assert!(short > entry);
    }

    /// PnL is zero at entry regardless of side or size
    #[test]
    fn pnl_zero_at_entry(
        entry in price_strategy(),
        qty in (1i64..10_000i64).prop_map(|x| Decimal::new(x, 2)),
    ) {
        let e = Price::new_unchecked(entry);
        prop_assert_eq!(perp_pnl(Side::Long, e, qty, entry), Decimal::ZERO);
        prop_assert_eq!(perp_pnl(Side::Short, e, qty, entry), Decimal::ZERO);
    }

    /// Concentrated amounts are never negative, whatever the ordering of bounds
    #[test]
    fn concentrated_amounts_non_negative(
        liquidity in 0.0f64..1e6,
        current in -50_000i32..50_000,
        a in -50_000i32..50_000,
        b in -50_000i32..50_000,
    ) {
        let (x, y) = concentrated_amounts(
            liquidity,
            tick_to_sqrt_price(current),
            tick_to_sqrt_price(a),
            tick_to_sqrt_price(b),
        );
        prop_assert!(x >= 0.0 && y >= 0.0);
        prop_assert!(x.is_finite() && y.is_finite());
    }

    /// Ladder shape holds for any mid, depth and spacing
    #[test]
    fn ladder_invariants(
        mid in 0.01f64..100_000.0,
        levels in 5usize..=30,
        tick_bps in 1.0f64..500.0,
        seed in any::<u64>(),
    ) {
        let book = regen_book(mid, levels, tick_bps, &mut StdRng::seed_from_u64(seed));
        prop_assert_eq!(book.len(), 2 * levels + 1);
        prop_assert_eq!(book.levels().iter().filter(|l| l.is_mid()).count(), 1);
        for level in book.levels() {
            prop_assert!(level.price >= MIN_LEVEL_PRICE);
            prop_assert!((0.0..=100.0).contains(&level.bid_pct));
            prop_assert!((0.0..=100.0).contains(&level.ask_pct));
            prop_assert!(!(level.bid_size > 0.0 && level.ask_size > 0.0));
        }
        let top_bid = book.levels().iter().map(|l| l.bid_pct).fold(0.0, f64::max);
        let top_ask = book.levels().iter().map(|l| l.ask_pct).fold(0.0, f64::max);
        prop_assert!((top_bid - 100.0).abs() < 1e-9);
        prop_assert!((top_ask - 100.0).abs() < 1e-9);
    }

    /// The log never exceeds capacity and keeps the newest ids contiguous
    #[test]
    fn event_bus_bounded(capacity in 1usize..600, logs in 0usize..2_000) {
        let mut bus = EventBus::new(capacity, Mode::Amm);
        for i in 0..logs {
            bus.log(EventKind::Swap, format!("event {i}"), None);
        }
        prop_assert_eq!(bus.len(), logs.min(capacity));
        let ids: Vec<u64> = bus.iter().map(|e| e.id.0).collect();
        prop_assert!(ids.windows(2).all(|w| w[1] == w[0] + 1));
        if let Some(last) = ids.last() {
            prop_assert_eq!(*last, logs as u64);
        }
    }
}
