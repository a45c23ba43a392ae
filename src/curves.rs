//! AMM curve kernels.
//!
//! Pure functions for the four pool shapes the playground shows: constant
//! product, weighted, a stable-like blend, and concentrated liquidity. None of
//! these fail; degenerate inputs fall through to a displayable number.

use crate::types::TradeDirection;

/// Base of the concentrated-liquidity tick grid: each tick is one basis point of price.
pub const TICK_BASE: f64 = 1.0001;

pub fn clamp01(v: f64) -> f64 {
    v.clamp(0.0, 1.0)
}

/// Pool price as y per x. Zero reserves price at zero.
pub fn spot_price(x: f64, y: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    y / x
}

/// Fee-free constant-product update. Returns the new `(x, y)`; `x * y` is unchanged.
pub fn constant_product_swap(x: f64, y: f64, size: f64, direction: TradeDirection) -> (f64, f64) {
    let k = x * y;
    match direction {
        TradeDirection::Buy => {
            let new_x = x + size;
            let new_y = if new_x > 0.0 { k / new_x } else { y };
            (new_x, new_y)
        }
        TradeDirection::Sell => {
            let new_y = y + size;
            let new_x = if new_y > 0.0 { k / new_y } else { x };
            (new_x, new_y)
        }
    }
}

pub fn constant_product_y(k: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    k / x
}

/// Weighted pool invariant `k = x^wx * y^wy`.
pub fn weighted_invariant(x: f64, y: f64, wx: f64, wy: f64) -> f64 {
    x.powf(wx) * y.powf(wy)
}

/// Solves the weighted invariant for y: `(k / x^wx)^(1/wy)`.
pub fn weighted_curve_y(k: f64, x: f64, wx: f64, wy: f64) -> f64 {
    if x <= 0.0 || wy <= 0.0 {
        return 0.0;
    }
    (k / x.powf(wx)).powf(1.0 / wy)
}

/// Blend of the constant-product branch and a flat "balanced" branch.
///
/// Near balance (`x ≈ k/x`) the balanced branch dominates, which flattens the
/// curve the way a stable-swap pool does. The amplification `A` and the
/// distance from balance both shift weight onto the constant-product branch.
pub fn stable_like_y(k: f64, x: f64, x0: f64, y0: f64, amplification: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    let y_cp = k / x;
    let y_bal = ((x0 + y0) - x).max(1.0);
    let scale = 0.5 * (x0 + y0);
    let imbalance = if scale > 0.0 {
        (x - k / x).abs() / scale
    } else {
        0.0
    };
    let alpha = clamp01(1.0 - (-amplification * 1e-4).exp() * (-imbalance).exp());
    alpha * y_cp + (1.0 - alpha) * y_bal
}

pub fn tick_to_sqrt_price(tick: i32) -> f64 {
    TICK_BASE.powf(tick as f64 / 2.0)
}

pub fn tick_to_price(tick: i32) -> f64 {
    let s = tick_to_sqrt_price(tick);
    s * s
}

/// Largest tick whose price does not exceed `price`. Non-positive prices map to tick 0.
pub fn price_to_tick(price: f64) -> i32 {
    if price <= 0.0 || !price.is_finite() {
        return 0;
    }
    let raw = (price.ln() / TICK_BASE.ln()).floor();
    raw.clamp(i32::MIN as f64, i32::MAX as f64) as i32
}

/// Rounds `tick` down to the nearest multiple of `spacing`.
pub fn snap_tick(tick: i32, spacing: i32) -> i32 {
    if spacing <= 0 {
        return tick;
    }
    tick.div_euclid(spacing) * spacing
}

/// Token amounts held by a position of liquidity `l` over `[sqrt_pa, sqrt_pb]` at `sqrt_p`.
///
/// Below the range the position is all token0, above it all token1. The bounds
/// are ordered first and results clamped at zero, so edited ranges that cross
/// each other still produce sane output.
pub fn concentrated_amounts(l: f64, sqrt_p: f64, sqrt_pa: f64, sqrt_pb: f64) -> (f64, f64) {
    let (lo, hi) = if sqrt_pa <= sqrt_pb {
        (sqrt_pa, sqrt_pb)
    } else {
        (sqrt_pb, sqrt_pa)
    };
    if l <= 0.0 || lo <= 0.0 {
        return (0.0, 0.0);
    }

    let (amount0, amount1) = if sqrt_p <= lo {
        (l * (hi - lo) / (lo * hi), 0.0)
    } else if sqrt_p >= hi {
        (0.0, l * (hi - lo))
    } else {
        (l * (hi - sqrt_p) / (sqrt_p * hi), l * (sqrt_p - lo))
    };
    (amount0.max(0.0), amount1.max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swap_conserves_product() {
        let (x, y) = constant_product_swap(1000.0, 1000.0, 50.0, TradeDirection::Buy);
        assert!((x * y - 1_000_000.0).abs() < 1e-6);
        assert_eq!(x, 1050.0);

        let (x, y) = constant_product_swap(1000.0, 1000.0, 50.0, TradeDirection::Sell);
        assert!((x * y - 1_000_000.0).abs() < 1e-6);
        assert_eq!(y, 1050.0);
    }

    #[test]
    fn spot_price_guards_zero() {
        assert_eq!(spot_price(0.0, 10.0), 0.0);
        assert_eq!(spot_price(2.0, 10.0), 5.0);
    }

    #[test]
    fn weighted_curve_passes_through_reserves() {
        let (x, y, wx) = (800.0, 200.0, 0.8);
        let k = weighted_invariant(x, y, wx, 1.0 - wx);
        let back = weighted_curve_y(k, x, wx, 1.0 - wx);
        assert!((back - y).abs() < 1e-6);
    }

    #[test]
    fn even_weights_reduce_to_constant_product() {
        let k = weighted_invariant(1000.0, 1000.0, 0.5, 0.5);
        let y = weighted_curve_y(k, 500.0, 0.5, 0.5);
        assert!((y - 2000.0).abs() < 1e-6);
    }

    #[test]
    fn stable_like_is_flat_near_balance() {
        let k = 1000.0 * 1000.0;
        // at balance the imbalance term is zero and A = 0 gives the balanced branch
        let y = stable_like_y(k, 1000.0, 1000.0, 1000.0, 0.0);
        assert!((y - 1000.0).abs() < 1e-9);

        // far from balance the constant-product branch takes over
        let far = stable_like_y(k, 100.0, 1000.0, 1000.0, 0.0);
        let cp = k / 100.0;
        assert!((far - cp).abs() / cp < 0.01);
    }

    #[test]
    fn tick_zero_is_unit_price() {
        assert_eq!(tick_to_sqrt_price(0), 1.0);
        assert!((tick_to_price(100) - 1.0001f64.powi(100)).abs() < 1e-12);
    }

    #[test]
    fn price_to_tick_inverts_tick_to_price() {
        for tick in [-500, -60, 0, 60, 887] {
            let p = tick_to_price(tick) * (1.0 + 1e-9);
            assert_eq!(price_to_tick(p), tick);
        }
        assert_eq!(price_to_tick(0.0), 0);
    }

    #[test]
    fn snap_rounds_down() {
        assert_eq!(snap_tick(125, 60), 120);
        assert_eq!(snap_tick(-1, 60), -60);
        assert_eq!(snap_tick(7, 0), 7);
    }

    #[test]
    fn concentrated_branches() {
        let (sa, sb) = (tick_to_sqrt_price(-600), tick_to_sqrt_price(600));

        let (a0, a1) = concentrated_amounts(1000.0, sb * 1.01, sa, sb);
        assert_eq!(a0, 0.0);
        assert!(a1 > 0.0);

        let (a0, a1) = concentrated_amounts(1000.0, sa * 0.99, sa, sb);
        assert!(a0 > 0.0);
        assert_eq!(a1, 0.0);

        let (a0, a1) = concentrated_amounts(1000.0, 1.0, sa, sb);
        assert!(a0 > 0.0 && a1 > 0.0);
    }

    #[test]
    fn crossed_bounds_stay_non_negative() {
        let (a0, a1) = concentrated_amounts(1000.0, 1.0, 1.05, 0.95);
        assert!(a0 >= 0.0 && a1 >= 0.0);
    }
}
