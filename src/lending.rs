// 9.3 lending.rs: utilization-based lending pool. not driven by the clock;
// deposit / withdraw / borrow / repay actions mutate the ledger and refresh the curves.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::config::{DynamicsConfig, SimConfig};
use crate::events::{EventEmitter, EventKind, EventPayload, PoolEvent};
use crate::model::{finite, in_range, Model, ParamError};
use crate::rates::{borrow_apr, supply_apr, utilization, IrCurveParams};
use crate::series::{linspace, Point};
use crate::types::Quote;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PoolAction {
    Deposit,
    Withdraw,
    Borrow,
    Repay,
}

impl PoolAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            PoolAction::Deposit => "deposit",
            PoolAction::Withdraw => "withdraw",
            PoolAction::Borrow => "borrow",
            PoolAction::Repay => "repay",
        }
    }
}

// Pool ledger and rate curve
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LendingParams {
    // idle liquidity available to borrow or withdraw
    pub cash: Quote,
    // outstanding loans
    pub borrows: Quote,
    // protocol reserves, excluded from supplier liquidity
    pub reserves: Quote,
    // share of borrow interest kept as reserves
    pub reserve_factor: f64,
    pub curve: IrCurveParams,
}

impl Default for LendingParams {
    fn default() -> Self {
        Self {
            cash: Quote::new(dec!(400_000)),
            borrows: Quote::new(dec!(600_000)),
            reserves: Quote::zero(),
            reserve_factor: 0.10,
            curve: IrCurveParams::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LendingMetrics {
    pub utilization: Decimal,
    pub borrow_apr: f64,
    pub supply_apr: f64,
}

#[derive(Debug, Clone)]
pub struct LendingModel {
    params: LendingParams,
    dynamics: DynamicsConfig,
    borrow_curve: Vec<Point>,
    supply_curve: Vec<Point>,
    metrics: LendingMetrics,
}

impl LendingModel {
    pub fn new(params: LendingParams, dynamics: DynamicsConfig) -> Self {
        let mut model = Self {
            params,
            dynamics,
            borrow_curve: Vec::new(),
            supply_curve: Vec::new(),
            metrics: LendingMetrics::default(),
        };
        model.recompute();
        model
    }

    pub fn params(&self) -> &LendingParams {
        &self.params
    }

    pub fn metrics(&self) -> &LendingMetrics {
        &self.metrics
    }

    pub fn utilization_f64(&self) -> f64 {
        self.metrics.utilization.to_f64().unwrap_or(0.0)
    }

    /// Borrow APR against utilization over [0, 1].
    pub fn borrow_curve(&self) -> &[Point] {
        &self.borrow_curve
    }

    /// Supply APR against utilization over [0, 1].
    pub fn supply_curve(&self) -> &[Point] {
        &self.supply_curve
    }

    /// Where the pool sits on the borrow curve right now.
    pub fn current_point(&self) -> Point {
        Point::new(self.utilization_f64(), self.metrics.borrow_apr)
    }

    /// Applies one pool action and logs it. Returns the amount actually moved,
    /// which is clamped for withdrawals and borrows (to cash), repayments (to
    /// borrows) and deposits (to the room left below `Decimal::MAX`).
    pub fn apply_pool(
        &mut self,
        action: PoolAction,
        amount: Quote,
        events: &mut dyn EventEmitter,
    ) -> Result<Quote, ParamError> {
        if amount.is_negative() {
            return Err(ParamError::OutOfRange {
                name: "amount",
                value: amount.as_f64(),
                min: 0.0,
                max: f64::INFINITY,
            });
        }

        let p = &mut self.params;
        let applied = match action {
            PoolAction::Deposit => {
                let before = p.cash;
                p.cash = p.cash.saturating_add(amount);
                p.cash.saturating_sub(before)
            }
            PoolAction::Withdraw => {
                let moved = amount.min(p.cash);
                p.cash = p.cash.saturating_sub(moved);
                moved
            }
            PoolAction::Borrow => {
                let moved = amount.min(p.cash);
                p.cash = p.cash.saturating_sub(moved);
                p.borrows = p.borrows.saturating_add(moved);
                moved
            }
            PoolAction::Repay => {
                let moved = amount.min(p.borrows);
                p.borrows = p.borrows.saturating_sub(moved);
                p.cash = p.cash.saturating_add(moved);
                moved
            }
        };

        self.recompute();

        events.log(
            EventKind::PoolAction,
            format!(
                "{} {} (applied {}): utilization {:.2}%, borrow {:.2}%, supply {:.2}%",
                action.as_str(),
                amount,
                applied,
                self.utilization_f64() * 100.0,
                self.metrics.borrow_apr * 100.0,
                self.metrics.supply_apr * 100.0
            ),
            Some(EventPayload::Pool(PoolEvent {
                action,
                requested: amount,
                applied,
                cash: self.params.cash,
                borrows: self.params.borrows,
                utilization: self.metrics.utilization,
                borrow_apr: self.metrics.borrow_apr,
                supply_apr: self.metrics.supply_apr,
            })),
        );

        Ok(applied)
    }

    pub fn set_reserve_factor(&mut self, factor: f64) -> Result<(), ParamError> {
        self.params.reserve_factor = in_range("reserve_factor", factor, 0.0, 1.0)?;
        Ok(())
    }

    pub fn set_reserves(&mut self, reserves: Quote) -> Result<(), ParamError> {
        if reserves.is_negative() {
            return Err(ParamError::OutOfRange {
                name: "reserves",
                value: reserves.as_f64(),
                min: 0.0,
                max: f64::INFINITY,
            });
        }
        self.params.reserves = reserves;
        Ok(())
    }

    pub fn set_curve(&mut self, curve: IrCurveParams) -> Result<(), ParamError> {
        finite("base", curve.base)?;
        finite("slope1", curve.slope1)?;
        finite("slope2", curve.slope2)?;
        in_range("kink", curve.kink, 0.0, 1.0)?;
        self.params.curve = curve;
        Ok(())
    }
}

impl Model for LendingModel {
    fn recompute(&mut self) {
        let p = &self.params;
        let u_dec = utilization(p.cash, p.borrows, p.reserves);
        let u = u_dec.to_f64().unwrap_or(0.0);
        let borrow = borrow_apr(u, &p.curve);

        self.metrics = LendingMetrics {
            utilization: u_dec,
            borrow_apr: borrow,
            supply_apr: supply_apr(u, borrow, p.reserve_factor),
        };

        let n = self.dynamics.rate_curve_samples.max(2);
        let (borrow_curve, supply_curve): (Vec<Point>, Vec<Point>) = linspace(0.0, 1.0, n)
            .map(|u| {
                let b = borrow_apr(u, &p.curve);
                (Point::new(u, b), Point::new(u, supply_apr(u, b, p.reserve_factor)))
            })
            .unzip();
        self.borrow_curve = borrow_curve;
        self.supply_curve = supply_curve;
    }

    fn reset(&mut self, config: &SimConfig) {
        *self = Self::new(config.lending.clone(), config.dynamics);
    }
}
