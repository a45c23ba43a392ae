//! Leveraged perpetual position explorer.
//!
//! A single isolated position: initial margin is notional divided by
//! leverage, and the position is liquidated once the remaining equity falls
//! to the maintenance fraction of the mark notional. Not tick driven; every
//! edit re-runs `compute_perps`.

use crate::config::{DynamicsConfig, SimConfig};
use crate::events::{EventEmitter, EventKind, EventPayload, PerpEvent};
use crate::model::{positive_decimal, Model, ParamError};
use crate::series::{sample, svg_path, Point, Viewport};
use crate::types::{Leverage, Price, Side};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

const PNL_DOMAIN_LOW: f64 = 0.4;
const PNL_DOMAIN_HIGH: f64 = 1.6;
const PNL_SCALE_HEADROOM: f64 = 1.2;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerpParams {
    pub side: Side,
    pub entry: Price,
    pub qty: Decimal,
    pub leverage: Leverage,
    pub maintenance_margin_ratio: Decimal,
}

impl Default for PerpParams {
    fn default() -> Self {
        Self {
            side: Side::Long,
            entry: Price::new_unchecked(dec!(100)),
            qty: dec!(1),
            leverage: Leverage::new_unchecked(dec!(10)),
            maintenance_margin_ratio: dec!(0.006),
        }
    }
}

// saturates at Decimal::MAX, so a vanishing leverage reads as unbounded margin
pub fn initial_margin(entry: Price, qty: Decimal, leverage: Leverage) -> Decimal {
    notional(entry, qty).saturating_mul(leverage.initial_margin_fraction())
}

pub fn notional(entry: Price, qty: Decimal) -> Decimal {
    entry.value().saturating_mul(qty)
}

// long:  (entry*qty - IM) / ((1 - mmr) * qty)
// short: (entry*qty + IM) / ((1 + mmr) * qty)
// qty cancels, so this runs per unit: entry * (1 -/+ 1/leverage) / (1 -/+ mmr)
pub fn perp_liquidation_price(
    side: Side,
    entry: Price,
    qty: Decimal,
    leverage: Leverage,
    mmr: Decimal,
) -> Decimal {
    if qty <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    let margin_per_unit = entry.value().saturating_mul(leverage.initial_margin_fraction());
    let (numerator, factor) = match side {
        Side::Long => (
            entry.value().saturating_sub(margin_per_unit),
            Decimal::ONE.checked_sub(mmr),
        ),
        Side::Short => (
            entry.value().saturating_add(margin_per_unit),
            Decimal::ONE.checked_add(mmr),
        ),
    };
    match factor {
        Some(f) if f > Decimal::ZERO && numerator > Decimal::ZERO => {
            numerator.checked_div(f).unwrap_or(Decimal::MAX)
        }
        _ => Decimal::ZERO,
    }
}

pub fn perp_pnl(side: Side, entry: Price, qty: Decimal, mark: Decimal) -> Decimal {
    side.sign()
        .saturating_mul(mark.saturating_sub(entry.value()))
        .saturating_mul(qty)
}

#[derive(Debug, Clone, Default)]
pub struct PnlCurve {
    pub points: Vec<Point>,
    // symmetric y half-range for the chart
    pub y_scale: f64,
}

impl PnlCurve {
    pub fn path(&self, width: f64, height: f64) -> String {
        let (x_min, x_max) = match (self.points.first(), self.points.last()) {
            (Some(a), Some(b)) => (a.x, b.x),
            _ => return String::new(),
        };
        let vp = Viewport::new((x_min, x_max), (-self.y_scale, self.y_scale), width, height);
        svg_path(&self.points, &vp)
    }
}

pub fn pnl_curve(side: Side, entry: Price, qty: Decimal, samples: usize) -> PnlCurve {
    let entry_f = entry.as_f64();
    let qty_f = qty.to_f64().unwrap_or(0.0);
    let sign = match side {
        Side::Long => 1.0,
        Side::Short => -1.0,
    };
    let points = sample(
        PNL_DOMAIN_LOW * entry_f,
        PNL_DOMAIN_HIGH * entry_f,
        samples.max(2),
        |mark| sign * (mark - entry_f) * qty_f,
    );
    let edge = |p: Option<&Point>| p.map(|p| p.y.abs()).unwrap_or(0.0);
    let y_scale = edge(points.first()).max(edge(points.last())) * PNL_SCALE_HEADROOM;
    PnlCurve { points, y_scale }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PerpMetrics {
    pub notional: Decimal,
    pub initial_margin: Decimal,
    pub liquidation_price: Decimal,
    // how far price can move against the position before liquidation, as a fraction of entry
    pub liquidation_distance: Decimal,
}

#[derive(Debug, Clone)]
pub struct PerpModel {
    params: PerpParams,
    dynamics: DynamicsConfig,
    metrics: PerpMetrics,
    curve: PnlCurve,
}

impl PerpModel {
    pub fn new(params: PerpParams, dynamics: DynamicsConfig) -> Self {
        let mut model = Self {
            params,
            dynamics,
            metrics: PerpMetrics::default(),
            curve: PnlCurve::default(),
        };
        model.recompute();
        model
    }

    pub fn params(&self) -> &PerpParams {
        &self.params
    }

    pub fn metrics(&self) -> &PerpMetrics {
        &self.metrics
    }

    pub fn liquidation_price(&self) -> Decimal {
        self.metrics.liquidation_price
    }

    pub fn pnl_curve(&self) -> &PnlCurve {
        &self.curve
    }

    pub fn pnl_at(&self, mark: Decimal) -> Decimal {
        perp_pnl(self.params.side, self.params.entry, self.params.qty, mark)
    }

    /// Recompute and log the position snapshot.
    pub fn compute_perps(&mut self, events: &mut dyn EventEmitter) {
        self.recompute();
        let p = &self.params;
        events.log(
            EventKind::PerpUpdate,
            format!(
                "{} {} @ {} {}: liq {:.4}, IM {:.4}",
                p.side,
                p.qty,
                p.entry,
                p.leverage,
                self.metrics.liquidation_price,
                self.metrics.initial_margin
            ),
            Some(EventPayload::Perp(PerpEvent {
                side: p.side,
                entry: p.entry,
                qty: p.qty,
                liquidation_price: self.metrics.liquidation_price,
            })),
        );
    }

    pub fn set_side(&mut self, side: Side) {
        self.params.side = side;
    }

    pub fn set_entry(&mut self, entry: Decimal) -> Result<(), ParamError> {
        self.params.entry = Price::new_unchecked(positive_decimal("entry", entry)?);
        Ok(())
    }

    pub fn set_qty(&mut self, qty: Decimal) -> Result<(), ParamError> {
        self.params.qty = positive_decimal("qty", qty)?;
        Ok(())
    }

    pub fn set_leverage(&mut self, leverage: Decimal) -> Result<(), ParamError> {
        self.params.leverage = Leverage::new_unchecked(positive_decimal("leverage", leverage)?);
        Ok(())
    }

    pub fn set_maintenance_margin_ratio(&mut self, mmr: Decimal) -> Result<(), ParamError> {
        if mmr <= Decimal::ZERO || mmr >= Decimal::ONE {
            return Err(ParamError::OutOfRange {
                name: "maintenance_margin_ratio",
                value: mmr.to_f64().unwrap_or(f64::NAN),
                min: 0.0,
                max: 1.0,
            });
        }
        self.params.maintenance_margin_ratio = mmr;
        Ok(())
    }
}

impl Model for PerpModel {
    fn recompute(&mut self) {
        let p = &self.params;
        let liq = perp_liquidation_price(p.side, p.entry, p.qty, p.leverage, p.maintenance_margin_ratio);
        let distance = ((liq - p.entry.value()).abs())
            .checked_div(p.entry.value())
            .unwrap_or(Decimal::ZERO);

        self.metrics = PerpMetrics {
            notional: notional(p.entry, p.qty),
            initial_margin: initial_margin(p.entry, p.qty, p.leverage),
            liquidation_price: liq,
            liquidation_distance: distance,
        };
        self.curve = pnl_curve(p.side, p.entry, p.qty, self.dynamics.perp_samples);
    }

    fn reset(&mut self, config: &SimConfig) {
        *self = Self::new(config.perp.clone(), config.dynamics);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventBus;
    use crate::types::Mode;

    fn lev(v: Decimal) -> Leverage {
        Leverage::new(v).unwrap()
    }

    fn price(v: Decimal) -> Price {
        Price::new(v).unwrap()
    }

    #[test]
    fn long_liquidation_regression() {
        let liq = perp_liquidation_price(Side::Long, price(dec!(100)), dec!(1), lev(dec!(10)), dec!(0.006));
        assert!((liq - dec!(90.54325955734406)).abs() < dec!(0.0000000001));
    }

    #[test]
    fn short_liquidation_above_entry() {
        let liq = perp_liquidation_price(Side::Short, price(dec!(100)), dec!(1), lev(dec!(10)), dec!(0.006));
        // 110 / 1.006
        assert!((liq - dec!(109.3439363817)).abs() < dec!(0.0000001));
        assert!(liq > dec!(100));
    }

    #[test]
    fn sub_one_leverage_floors_at_zero() {
        // IM exceeds notional, long can never be liquidated
        let liq = perp_liquidation_price(Side::Long, price(dec!(100)), dec!(2), lev(dec!(0.5)), dec!(0.006));
        assert_eq!(liq, Decimal::ZERO);
    }

    #[test]
    fn liquidation_independent_of_qty() {
        let a = perp_liquidation_price(Side::Long, price(dec!(2500)), dec!(1), lev(dec!(20)), dec!(0.01));
        let b = perp_liquidation_price(Side::Long, price(dec!(2500)), dec!(7), lev(dec!(20)), dec!(0.01));
        assert!((a - b).abs() < dec!(0.000000001));
    }

    #[test]
    fn extreme_inputs_saturate() {
        let tiny = lev(dec!(0.0000000000000000000000000001));
        let im = initial_margin(price(dec!(100)), dec!(1), tiny);
        assert_eq!(im, Decimal::MAX);
        let long = perp_liquidation_price(Side::Long, price(dec!(100)), dec!(1), tiny, dec!(0.006));
        assert_eq!(long, Decimal::ZERO);
        let short = perp_liquidation_price(Side::Short, price(dec!(100)), dec!(1), tiny, dec!(0.006));
        assert!(short > dec!(100));

        let huge_qty = dec!(1_000_000_000_000_000_000_000_000_000);
        assert_eq!(notional(price(dec!(100)), huge_qty), Decimal::MAX);
        let liq = perp_liquidation_price(Side::Long, price(dec!(100)), huge_qty, lev(dec!(10)), dec!(0.006));
        assert!((liq - dec!(90.54325955734406)).abs() < dec!(0.0000000001));
        assert_eq!(perp_pnl(Side::Long, price(dec!(100)), huge_qty, dec!(1000)), Decimal::MAX);
        assert_eq!(perp_pnl(Side::Short, price(dec!(100)), huge_qty, dec!(1000)), Decimal::MIN);
    }

    #[test]
    fn tiny_leverage_edit_recomputes() {
        let mut m = PerpModel::new(PerpParams::default(), DynamicsConfig::default());
        m.set_leverage(dec!(0.0000000000000000000000000001)).unwrap();
        m.recompute();
        assert_eq!(m.metrics().initial_margin, Decimal::MAX);
        assert_eq!(m.liquidation_price(), Decimal::ZERO);
        assert_eq!(m.metrics().liquidation_distance, Decimal::ONE);
    }

    #[test]
    fn pnl_signs() {
        let e = price(dec!(100));
        assert_eq!(perp_pnl(Side::Long, e, dec!(2), dec!(110)), dec!(20));
        assert_eq!(perp_pnl(Side::Short, e, dec!(2), dec!(110)), dec!(-20));
    }

    #[test]
    fn pnl_curve_domain_and_scale() {
        let c = pnl_curve(Side::Long, price(dec!(100)), dec!(1), 121);
        assert_eq!(c.points.len(), 121);
        assert!((c.points[0].x - 40.0).abs() < 1e-9);
        assert!((c.points[120].x - 160.0).abs() < 1e-9);
        assert!((c.y_scale - 72.0).abs() < 1e-9);
        assert!(c.path(300.0, 150.0).starts_with("M "));
    }

    #[test]
    fn compute_perps_logs_snapshot() {
        let mut m = PerpModel::new(PerpParams::default(), DynamicsConfig::default());
        let mut bus = EventBus::new(10, Mode::MarketMaking);
        m.compute_perps(&mut bus);
        let ev = bus.latest().unwrap();
        assert_eq!(ev.kind, EventKind::PerpUpdate);
        match &ev.payload {
            Some(EventPayload::Perp(p)) => assert_eq!(p.liquidation_price, m.liquidation_price()),
            other => panic!("unexpected payload {other:?}"),
        }
    }

    #[test]
    fn setters_validate() {
        let mut m = PerpModel::new(PerpParams::default(), DynamicsConfig::default());
        assert!(m.set_leverage(Decimal::ZERO).is_err());
        assert!(m.set_qty(dec!(-1)).is_err());
        assert!(m.set_maintenance_margin_ratio(dec!(1)).is_err());
        m.set_side(Side::Short);
        m.set_leverage(dec!(5)).unwrap();
        m.recompute();
        assert!(m.liquidation_price() > dec!(100));
        assert_eq!(m.metrics().initial_margin, dec!(20));
    }
}
