//! Normal distribution helpers and Black-Scholes valuation.
//!
//! `erf` uses the Abramowitz-Stegun 7.1.26 rational approximation (max
//! absolute error about 1.5e-7) so the pricing does not depend on a libm
//! special function.

use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, SQRT_2};

const AS_P: f64 = 0.327_591_1;
const AS_A1: f64 = 0.254_829_592;
const AS_A2: f64 = -0.284_496_736;
const AS_A3: f64 = 1.421_413_741;
const AS_A4: f64 = -1.453_152_027;
const AS_A5: f64 = 1.061_405_429;

pub fn erf(x: f64) -> f64 {
    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    let t = 1.0 / (1.0 + AS_P * x);
    let poly = ((((AS_A5 * t + AS_A4) * t + AS_A3) * t + AS_A2) * t + AS_A1) * t;
    sign * (1.0 - poly * (-x * x).exp())
}

pub fn normal_cdf(x: f64) -> f64 {
    0.5 * (1.0 + erf(x / SQRT_2))
}

pub fn normal_pdf(x: f64) -> f64 {
    (-0.5 * x * x).exp() / (2.0 * PI).sqrt()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    Call,
    Put,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Greeks {
    pub delta: f64,
    pub gamma: f64,
    /// Per year. Divide by 365 for a daily figure.
    pub theta: f64,
    /// Per unit of volatility (1.0 = 100 vol points).
    pub vega: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Valuation {
    pub price: f64,
    pub greeks: Greeks,
}

pub fn payoff_at_expiry(kind: OptionKind, spot: f64, strike: f64) -> f64 {
    match kind {
        OptionKind::Call => (spot - strike).max(0.0),
        OptionKind::Put => (strike - spot).max(0.0),
    }
}

pub fn d1_d2(spot: f64, strike: f64, rate: f64, vol: f64, t: f64) -> (f64, f64) {
    let vol_sqrt_t = vol * t.sqrt();
    let d1 = ((spot / strike).ln() + (rate + 0.5 * vol * vol) * t) / vol_sqrt_t;
    (d1, d1 - vol_sqrt_t)
}

/// Price and Greeks. Degenerate inputs (no time, no vol, non-positive spot or
/// strike) fall back to discounted intrinsic value with a step delta.
pub fn black_scholes(kind: OptionKind, spot: f64, strike: f64, rate: f64, vol: f64, t: f64) -> Valuation {
    let t_pos = t.max(0.0);
    let discount = (-rate * t_pos).exp();
    let degenerate = !(vol > 0.0 && t > 0.0 && spot > 0.0 && strike > 0.0);

    if degenerate {
        let forward_intrinsic = spot - strike * discount;
        let (price, delta) = match kind {
            OptionKind::Call => (
                forward_intrinsic.max(0.0),
                if forward_intrinsic > 0.0 { 1.0 } else { 0.0 },
            ),
            OptionKind::Put => (
                (-forward_intrinsic).max(0.0),
                if forward_intrinsic < 0.0 { -1.0 } else { 0.0 },
            ),
        };
        return Valuation {
            price,
            greeks: Greeks {
                delta,
                ..Greeks::default()
            },
        };
    }

    let (d1, d2) = d1_d2(spot, strike, rate, vol, t);
    let sqrt_t = t.sqrt();
    let pdf_d1 = normal_pdf(d1);
    let gamma = pdf_d1 / (spot * vol * sqrt_t);
    let vega = spot * pdf_d1 * sqrt_t;
    let decay = -spot * pdf_d1 * vol / (2.0 * sqrt_t);

    let (price, delta, theta) = match kind {
        OptionKind::Call => (
            spot * normal_cdf(d1) - strike * discount * normal_cdf(d2),
            normal_cdf(d1),
            decay - rate * strike * discount * normal_cdf(d2),
        ),
        OptionKind::Put => (
            strike * discount * normal_cdf(-d2) - spot * normal_cdf(-d1),
            normal_cdf(d1) - 1.0,
            decay + rate * strike * discount * normal_cdf(-d2),
        ),
    };

    Valuation {
        price: price.max(0.0),
        greeks: Greeks {
            delta,
            gamma,
            theta,
            vega,
        },
    }
}
