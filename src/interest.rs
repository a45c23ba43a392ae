// 5.0: interest accrual. compound vs simple growth of a principal, plus a
// running accrual that advances one day per tick.

use crate::config::{DynamicsConfig, SimConfig};
use crate::events::{AccrualEvent, EventEmitter, EventKind, EventPayload};
use crate::model::{non_negative, positive, Model, ParamError};
use crate::series::{linspace, Point};
use rand::RngCore;
use serde::{Deserialize, Serialize};

pub const DAYS_PER_YEAR: f64 = 365.0;
pub const MIN_HORIZON_DAYS: u32 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccrualMode {
    Simple,
    Compound,
}

pub fn compound_balance(principal: f64, rate: f64, days: f64) -> f64 {
    principal * (1.0 + rate).powf(days / DAYS_PER_YEAR)
}

pub fn simple_balance(principal: f64, rate: f64, days: f64) -> f64 {
    principal * (1.0 + rate * days / DAYS_PER_YEAR)
}

/// One day's growth factor minus one for an annual `rate`.
pub fn daily_rate(rate: f64, mode: AccrualMode) -> f64 {
    match mode {
        AccrualMode::Compound => (1.0 + rate).powf(1.0 / DAYS_PER_YEAR) - 1.0,
        AccrualMode::Simple => rate / DAYS_PER_YEAR,
    }
}

pub fn balance(principal: f64, rate: f64, days: f64, mode: AccrualMode) -> f64 {
    match mode {
        AccrualMode::Compound => compound_balance(principal, rate, days),
        AccrualMode::Simple => simple_balance(principal, rate, days),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterestParams {
    pub principal: f64,
    // percent, 5.0 = 5% APR. no upper clamp
    pub apr_pct: f64,
    pub mode: AccrualMode,
    pub horizon_days: u32,
}

impl Default for InterestParams {
    fn default() -> Self {
        Self {
            principal: 1_000.0,
            apr_pct: 5.0,
            mode: AccrualMode::Compound,
            horizon_days: 365,
        }
    }
}

impl InterestParams {
    pub fn rate(&self) -> f64 {
        self.apr_pct / 100.0
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InterestMetrics {
    pub simple_at_horizon: f64,
    pub compound_at_horizon: f64,
    // compound minus simple at the horizon
    pub compounding_edge: f64,
    pub effective_apy: f64,
    pub daily_rate: f64,
}

#[derive(Debug, Clone)]
pub struct InterestModel {
    params: InterestParams,
    dynamics: DynamicsConfig,
    accrued: f64,
    days_elapsed: u32,
    simple_curve: Vec<Point>,
    compound_curve: Vec<Point>,
    metrics: InterestMetrics,
}

impl InterestModel {
    pub fn new(mut params: InterestParams, dynamics: DynamicsConfig) -> Self {
        params.horizon_days = params.horizon_days.max(MIN_HORIZON_DAYS);
        let mut model = Self {
            params,
            dynamics,
            accrued: 0.0,
            days_elapsed: 0,
            simple_curve: Vec::new(),
            compound_curve: Vec::new(),
            metrics: InterestMetrics::default(),
        };
        model.recompute();
        model
    }

    pub fn params(&self) -> &InterestParams {
        &self.params
    }

    pub fn metrics(&self) -> &InterestMetrics {
        &self.metrics
    }

    pub fn accrued(&self) -> f64 {
        self.accrued
    }

    pub fn days_elapsed(&self) -> u32 {
        self.days_elapsed
    }

    pub fn current_balance(&self) -> f64 {
        self.params.principal + self.accrued
    }

    pub fn simple_curve(&self) -> &[Point] {
        &self.simple_curve
    }

    pub fn compound_curve(&self) -> &[Point] {
        &self.compound_curve
    }

    pub fn set_principal(&mut self, principal: f64) -> Result<(), ParamError> {
        self.params.principal = positive("principal", principal)?;
        Ok(())
    }

    pub fn set_apr_pct(&mut self, apr_pct: f64) -> Result<(), ParamError> {
        self.params.apr_pct = non_negative("apr_pct", apr_pct)?;
        Ok(())
    }

    pub fn set_mode(&mut self, mode: AccrualMode) {
        self.params.mode = mode;
    }

    /// Horizons shorter than a week are raised to seven days.
    pub fn set_horizon_days(&mut self, days: u32) {
        self.params.horizon_days = days.max(MIN_HORIZON_DAYS);
    }
}

impl Model for InterestModel {
    fn recompute(&mut self) {
        let p = &self.params;
        let rate = p.rate();
        let horizon = p.horizon_days as f64;
        let n = (p.horizon_days as usize + 1).min(self.dynamics.interest_max_samples.max(2));

        self.simple_curve = linspace(0.0, horizon, n)
            .map(|d| Point::new(d, simple_balance(p.principal, rate, d)))
            .collect();
        self.compound_curve = linspace(0.0, horizon, n)
            .map(|d| Point::new(d, compound_balance(p.principal, rate, d)))
            .collect();

        let simple = simple_balance(p.principal, rate, horizon);
        let compound = compound_balance(p.principal, rate, horizon);
        let daily = daily_rate(rate, p.mode);
        self.metrics = InterestMetrics {
            simple_at_horizon: simple,
            compound_at_horizon: compound,
            compounding_edge: compound - simple,
            effective_apy: (1.0 + daily).powf(DAYS_PER_YEAR) - 1.0,
            daily_rate: daily,
        };
    }

    fn step(&mut self, _rng: &mut dyn RngCore, events: &mut dyn EventEmitter) {
        let daily = daily_rate(self.params.rate(), self.params.mode);
        let increment = (self.params.principal * daily).max(0.0);
        self.accrued += increment;
        self.days_elapsed += 1;

        events.log(
            EventKind::Accrue,
            format!(
                "day {}: +{:.4} accrued ({:?}), balance {:.2}",
                self.days_elapsed,
                increment,
                self.params.mode,
                self.current_balance()
            ),
            Some(EventPayload::Accrual(AccrualEvent {
                day: self.days_elapsed,
                increment,
                accrued: self.accrued,
                balance: self.current_balance(),
            })),
        );
    }

    fn reset(&mut self, config: &SimConfig) {
        *self = Self::new(config.interest.clone(), config.dynamics);
    }
}
