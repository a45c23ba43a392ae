//! AMM model.
//!
//! Holds pool reserves and curve parameters, samples the active curve shape
//! for plotting, and tracks a concentrated-liquidity position alongside the
//! pool. Every tick is one random fee-free constant-product trade, whatever
//! the displayed curve kind, so `x * y` is conserved across steps.

use crate::config::{DynamicsConfig, SimConfig};
use crate::curves::{
    concentrated_amounts, constant_product_swap, constant_product_y, price_to_tick, snap_tick,
    spot_price, stable_like_y, tick_to_price, tick_to_sqrt_price, weighted_curve_y,
    weighted_invariant,
};
use crate::events::{EventEmitter, EventKind, EventPayload, SwapEvent};
use crate::model::{non_negative, positive, Model, ParamError};
use crate::series::{linspace, svg_path, Point, Viewport};
use crate::types::{Bps, TradeDirection};
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

pub const MAX_FEE_BPS: u32 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurveKind {
    ConstantProduct,
    Weighted,
    StableLike,
    Concentrated,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConcentratedRange {
    pub tick_spacing: i32,
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub current_tick: i32,
    pub liquidity: f64,
}

impl Default for ConcentratedRange {
    fn default() -> Self {
        Self {
            tick_spacing: 60,
            tick_lower: -600,
            tick_upper: 600,
            current_tick: 0,
            liquidity: 1_000.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmmParams {
    pub kind: CurveKind,
    pub x: f64,
    pub y: f64,
    pub fee: Bps,
    // weight of x; y carries 1 - wx
    pub wx: f64,
    pub amplification: f64,
    // nominal trade size, each tick draws 0.5x..1.5x of this
    pub trade_size: f64,
    pub range: ConcentratedRange,
}

impl Default for AmmParams {
    fn default() -> Self {
        Self {
            kind: CurveKind::ConstantProduct,
            x: 1_000.0,
            y: 1_000.0,
            fee: Bps(30),
            wx: 0.8,
            amplification: 100.0,
            trade_size: 25.0,
            range: ConcentratedRange::default(),
        }
    }
}

impl AmmParams {
    pub fn wy(&self) -> f64 {
        1.0 - self.wx
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PositionMetrics {
    pub amount0: f64,
    pub amount1: f64,
    pub price_lower: f64,
    pub price_upper: f64,
    pub price_current: f64,
    pub in_range: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AmmMetrics {
    pub k: f64,
    pub spot_price: f64,
    pub window: f64,
    pub last_slippage: f64,
    pub last_direction: Option<TradeDirection>,
    pub trades: u64,
    // fees are charged on the input token: x for buys, y for sells
    pub fees_x: f64,
    pub fees_y: f64,
    pub position: PositionMetrics,
}

#[derive(Debug, Clone)]
pub struct AmmModel {
    params: AmmParams,
    // reserves the stable-like balanced branch is centred on
    anchor: (f64, f64),
    dynamics: DynamicsConfig,
    curve: Vec<Point>,
    liquidity_profile: Vec<Point>,
    metrics: AmmMetrics,
}

impl AmmModel {
    pub fn new(params: AmmParams, dynamics: DynamicsConfig) -> Self {
        let anchor = (params.x, params.y);
        let mut model = Self {
            params,
            anchor,
            dynamics,
            curve: Vec::new(),
            liquidity_profile: Vec::new(),
            metrics: AmmMetrics::default(),
        };
        model.recompute();
        model
    }

    pub fn params(&self) -> &AmmParams {
        &self.params
    }

    pub fn metrics(&self) -> &AmmMetrics {
        &self.metrics
    }

    pub fn curve(&self) -> &[Point] {
        &self.curve
    }

    /// Position value in token1 across a price band around the range.
    pub fn liquidity_profile(&self) -> &[Point] {
        &self.liquidity_profile
    }

    /// The pool's current reserves as a point on the sampled curve.
    pub fn current_point(&self) -> Point {
        let (lo, hi) = self.dynamics.amm_y_bounds;
        Point::new(self.params.x, self.params.y.clamp(lo, hi))
    }

    pub fn curve_path(&self, width: f64, height: f64) -> String {
        let (lo, hi) = self.dynamics.amm_y_bounds;
        let vp = Viewport::new((0.0, self.metrics.window), (lo, hi), width, height);
        svg_path(&self.curve, &vp)
    }

    // 4.1: validated edits. callers recompute afterwards.

    /// Switching to concentrated moves the position's tick to the pool price.
    pub fn set_kind(&mut self, kind: CurveKind) {
        self.params.kind = kind;
        if kind == CurveKind::Concentrated {
            self.sync_current_tick();
        }
    }

    /// New reserves also re-centre the stable-like curve on them and, when
    /// concentrated, move the position's tick to the new price.
    pub fn set_reserves(&mut self, x: f64, y: f64) -> Result<(), ParamError> {
        let x = positive("x", x)?;
        let y = positive("y", y)?;
        self.params.x = x;
        self.params.y = y;
        self.anchor = (x, y);
        if self.params.kind == CurveKind::Concentrated {
            self.sync_current_tick();
        }
        Ok(())
    }

    pub fn set_fee_bps(&mut self, fee_bps: u32) -> Result<(), ParamError> {
        if fee_bps > MAX_FEE_BPS {
            return Err(ParamError::OutOfRange {
                name: "fee_bps",
                value: f64::from(fee_bps),
                min: 0.0,
                max: f64::from(MAX_FEE_BPS),
            });
        }
        self.params.fee = Bps(fee_bps);
        Ok(())
    }

    /// Weight of x, clamped into [0.01, 0.99] so neither side vanishes.
    pub fn set_weight_x(&mut self, wx: f64) -> Result<(), ParamError> {
        let wx = positive("wx", wx)?;
        self.params.wx = wx.clamp(0.01, 0.99);
        Ok(())
    }

    pub fn set_amplification(&mut self, a: f64) -> Result<(), ParamError> {
        self.params.amplification = non_negative("amplification", a)?;
        Ok(())
    }

    pub fn set_trade_size(&mut self, size: f64) -> Result<(), ParamError> {
        self.params.trade_size = positive("trade_size", size)?;
        Ok(())
    }

    pub fn set_tick_spacing(&mut self, spacing: i32) -> Result<(), ParamError> {
        if spacing <= 0 {
            return Err(ParamError::NotPositive {
                name: "tick_spacing",
                value: spacing.to_string(),
            });
        }
        let range = &mut self.params.range;
        range.tick_spacing = spacing;
        range.tick_lower = snap_tick(range.tick_lower, spacing);
        range.tick_upper = snap_tick(range.tick_upper, spacing);
        Ok(())
    }

    /// Bounds snap to the tick grid. Ordering is not enforced; the amount math tolerates crossed bounds.
    pub fn set_range(&mut self, tick_lower: i32, tick_upper: i32) {
        let range = &mut self.params.range;
        range.tick_lower = snap_tick(tick_lower, range.tick_spacing);
        range.tick_upper = snap_tick(tick_upper, range.tick_spacing);
    }

    pub fn set_current_tick(&mut self, tick: i32) {
        self.params.range.current_tick = tick;
    }

    pub fn set_liquidity(&mut self, liquidity: f64) -> Result<(), ParamError> {
        self.params.range.liquidity = non_negative("liquidity", liquidity)?;
        Ok(())
    }

    fn sync_current_tick(&mut self) {
        self.params.range.current_tick = price_to_tick(spot_price(self.params.x, self.params.y));
    }

    fn curve_y(&self, x: f64) -> f64 {
        let p = &self.params;
        match p.kind {
            CurveKind::ConstantProduct | CurveKind::Concentrated => {
                constant_product_y(p.x * p.y, x)
            }
            CurveKind::Weighted => {
                let k = weighted_invariant(p.x, p.y, p.wx, p.wy());
                weighted_curve_y(k, x, p.wx, p.wy())
            }
            CurveKind::StableLike => {
                stable_like_y(p.x * p.y, x, self.anchor.0, self.anchor.1, p.amplification)
            }
        }
    }

    fn sample_curve(&mut self) {
        let window = (self.dynamics.amm_window_factor * self.params.x).max(self.dynamics.amm_window_min);
        let n = self.dynamics.amm_curve_samples.max(2);
        let (lo, hi) = self.dynamics.amm_y_bounds;

        let curve = (1..=n)
            .map(|i| {
                let x = window * i as f64 / n as f64;
                Point::new(x, self.curve_y(x).clamp(lo, hi))
            })
            .collect();
        self.curve = curve;
        self.metrics.window = window;
    }

    fn position_metrics(&mut self) {
        let r = &self.params.range;
        let sqrt_p = tick_to_sqrt_price(r.current_tick);
        let sqrt_pa = tick_to_sqrt_price(r.tick_lower);
        let sqrt_pb = tick_to_sqrt_price(r.tick_upper);
        let (amount0, amount1) = concentrated_amounts(r.liquidity, sqrt_p, sqrt_pa, sqrt_pb);

        self.metrics.position = PositionMetrics {
            amount0,
            amount1,
            price_lower: tick_to_price(r.tick_lower),
            price_upper: tick_to_price(r.tick_upper),
            price_current: sqrt_p * sqrt_p,
            in_range: r.tick_lower < r.current_tick && r.current_tick < r.tick_upper,
        };

        // band is the range plus half its width on either side
        let (lower, upper) = (r.tick_lower.min(r.tick_upper), r.tick_lower.max(r.tick_upper));
        let pad = ((upper - lower) / 2).max(r.tick_spacing);
        let samples = self.dynamics.amm_curve_samples.max(2);
        self.liquidity_profile = linspace((lower - pad) as f64, (upper + pad) as f64, samples)
            .map(|t| {
                let tick = t.round() as i32;
                let s = tick_to_sqrt_price(tick);
                let (a0, a1) = concentrated_amounts(r.liquidity, s, sqrt_pa, sqrt_pb);
                Point::new(s * s, a0 * s * s + a1)
            })
            .collect();
    }
}

impl Model for AmmModel {
    fn recompute(&mut self) {
        let p = &self.params;
        self.metrics.k = match p.kind {
            CurveKind::Weighted => weighted_invariant(p.x, p.y, p.wx, p.wy()),
            _ => p.x * p.y,
        };
        self.metrics.spot_price = spot_price(p.x, p.y);
        self.sample_curve();
        self.position_metrics();
    }

    fn step(&mut self, rng: &mut dyn RngCore, events: &mut dyn EventEmitter) {
        let direction = if rng.gen_bool(0.5) {
            TradeDirection::Buy
        } else {
            TradeDirection::Sell
        };
        let size = self.params.trade_size * (0.5 + rng.gen::<f64>());
        let fee = size * self.params.fee.as_fraction();

        let p0 = spot_price(self.params.x, self.params.y);
        let (x, y) = constant_product_swap(self.params.x, self.params.y, size, direction);
        self.params.x = x;
        self.params.y = y;
        let p1 = spot_price(x, y);
        if self.params.kind == CurveKind::Concentrated {
            self.sync_current_tick();
        }
        self.recompute();

        let slippage = if p0 == 0.0 { 0.0 } else { (p1 - p0) / p0 };
        self.metrics.last_slippage = slippage;
        self.metrics.last_direction = Some(direction);
        self.metrics.trades += 1;
        match direction {
            TradeDirection::Buy => self.metrics.fees_x += fee,
            TradeDirection::Sell => self.metrics.fees_y += fee,
        }

        events.log(
            EventKind::Swap,
            format!(
                "{} {:.2}: x={:.2} y={:.2} price {:.4} → {:.4} ({:+.3}%)",
                direction,
                size,
                x,
                y,
                p0,
                p1,
                slippage * 100.0
            ),
            Some(EventPayload::Swap(SwapEvent {
                direction,
                size,
                fee,
                x,
                y,
                price_before: p0,
                price_after: p1,
                slippage,
            })),
        );
    }

    fn reset(&mut self, config: &SimConfig) {
        *self = Self::new(config.amm.clone(), config.dynamics);
    }
}
