//! Utilization and interest-rate curves for the lending pool.
//!
//! Rates are annual fractions (0.05 = 5%). Utilization is computed on exact
//! decimals from the pool ledger and handed to the curves as `f64`.

use crate::types::Quote;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurveType {
    /// Kinked: gentle slope up to the kink, steep slope past it.
    Jump,
    Linear,
    Sigmoid,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IrCurveParams {
    pub curve_type: CurveType,
    pub base: f64,
    pub kink: f64,
    pub slope1: f64,
    pub slope2: f64,
}

impl Default for IrCurveParams {
    fn default() -> Self {
        Self {
            curve_type: CurveType::Jump,
            base: 0.02,
            kink: 0.8,
            slope1: 0.10,
            slope2: 1.00,
        }
    }
}

/// `borrows / (cash + borrows - reserves)`, or zero when that denominator is
/// not positive or falls outside the decimal range.
pub fn utilization(cash: Quote, borrows: Quote, reserves: Quote) -> Decimal {
    let denom = cash
        .value()
        .checked_add(borrows.value())
        .and_then(|total| total.checked_sub(reserves.value()));
    match denom {
        Some(d) if d > Decimal::ZERO => borrows.value().checked_div(d).unwrap_or(Decimal::ZERO),
        _ => Decimal::ZERO,
    }
}

pub fn borrow_apr(u: f64, curve: &IrCurveParams) -> f64 {
    match curve.curve_type {
        CurveType::Linear => curve.base + curve.slope1 * u,
        CurveType::Sigmoid => curve.base + curve.slope2 / (1.0 + (-10.0 * (u - 0.5)).exp()),
        CurveType::Jump => {
            if u <= curve.kink {
                let progress = if curve.kink > 0.0 { u / curve.kink } else { 1.0 };
                curve.base + curve.slope1 * progress
            } else {
                let room = 1.0 - curve.kink;
                let overshoot = if room > 0.0 { (u - curve.kink) / room } else { 1.0 };
                curve.base + curve.slope1 + curve.slope2 * overshoot
            }
        }
    }
}

pub fn supply_apr(u: f64, borrow_apr: f64, reserve_factor: f64) -> f64 {
    borrow_apr * u * (1.0 - reserve_factor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn q(v: Decimal) -> Quote {
        Quote::new(v)
    }

    #[test]
    fn utilization_exact_ratio() {
        let u = utilization(q(dec!(600)), q(dec!(400)), q(dec!(0)));
        assert_eq!(u, dec!(0.4));

        let u = utilization(q(dec!(500)), q(dec!(400)), q(dec!(100)));
        assert_eq!(u, dec!(0.5));
    }

    #[test]
    fn utilization_guards_non_positive_denominator() {
        assert_eq!(utilization(q(dec!(0)), q(dec!(0)), q(dec!(0))), Decimal::ZERO);
        assert_eq!(utilization(q(dec!(10)), q(dec!(5)), q(dec!(20))), Decimal::ZERO);
        assert_eq!(utilization(q(dec!(10)), q(dec!(5)), q(dec!(15))), Decimal::ZERO);
    }

    #[test]
    fn utilization_out_of_decimal_range_is_zero() {
        let max = q(Decimal::MAX);
        assert_eq!(utilization(max, max, q(dec!(0))), Decimal::ZERO);
        assert_eq!(utilization(max, q(dec!(1)), q(dec!(0))), Decimal::ZERO);
        // a huge balance that still fits divides normally
        assert_eq!(utilization(q(dec!(0)), max, q(dec!(0))), Decimal::ONE);
    }

    #[test]
    fn utilization_can_exceed_one() {
        // reserves eat into the denominator without capping the ratio
        let u = utilization(q(dec!(10)), q(dec!(100)), q(dec!(50)));
        assert_eq!(u, dec!(100) / dec!(60));
        assert!(u > Decimal::ONE);
    }

    #[test]
    fn jump_curve_is_continuous_at_kink() {
        let c = IrCurveParams::default();
        let at = borrow_apr(c.kink, &c);
        let just_above = borrow_apr(c.kink + 1e-9, &c);
        assert!((at - (c.base + c.slope1)).abs() < 1e-12);
        assert!((just_above - at).abs() < 1e-6);
        assert!((borrow_apr(1.0, &c) - (c.base + c.slope1 + c.slope2)).abs() < 1e-12);
        assert_eq!(borrow_apr(0.0, &c), c.base);
    }

    #[test]
    fn degenerate_kinks() {
        let zero = IrCurveParams { kink: 0.0, ..IrCurveParams::default() };
        assert!(borrow_apr(0.0, &zero).is_finite());
        let full = IrCurveParams { kink: 1.0, ..IrCurveParams::default() };
        assert!(borrow_apr(1.0, &full).is_finite());
        assert!(borrow_apr(1.2, &full).is_finite());
    }

    #[test]
    fn linear_and_sigmoid() {
        let lin = IrCurveParams { curve_type: CurveType::Linear, ..IrCurveParams::default() };
        assert!((borrow_apr(0.5, &lin) - 0.07).abs() < 1e-12);

        let sig = IrCurveParams { curve_type: CurveType::Sigmoid, ..IrCurveParams::default() };
        assert!((borrow_apr(0.5, &sig) - (0.02 + 0.5)).abs() < 1e-12);
        assert!(borrow_apr(0.9, &sig) > borrow_apr(0.1, &sig));
    }

    #[test]
    fn supply_rate_shares_interest() {
        assert!((supply_apr(0.5, 0.1, 0.1) - 0.045).abs() < 1e-12);
        assert_eq!(supply_apr(0.0, 0.1, 0.1), 0.0);
    }
}
