// 14.0: option pricing playground. spot jitters each tick; price, Greeks and
// the payoff diagram are re-derived from the Black-Scholes kernels.

use crate::black_scholes::{black_scholes, payoff_at_expiry, OptionKind, Valuation};
use crate::config::{DynamicsConfig, SimConfig};
use crate::events::{EventEmitter, EventKind, EventPayload, OptionTickEvent};
use crate::model::{finite, positive, symmetric_jitter, Model, ParamError};
use crate::series::{sample, svg_path, Point, Viewport};
use rand::RngCore;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionParams {
    pub kind: OptionKind,
    pub spot: f64,
    pub strike: f64,
    // annualised, 0.2 = 20 vol
    pub volatility: f64,
    // years
    pub time_to_expiry: f64,
    pub risk_free_rate: f64,
    // right edge of the payoff diagram
    pub payoff_domain_max: f64,
}

impl Default for OptionParams {
    fn default() -> Self {
        Self {
            kind: OptionKind::Call,
            spot: 100.0,
            strike: 100.0,
            volatility: 0.2,
            time_to_expiry: 0.5,
            risk_free_rate: 0.03,
            payoff_domain_max: 200.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OptionModel {
    params: OptionParams,
    dynamics: DynamicsConfig,
    valuation: Valuation,
    payoff_curve: Vec<Point>,
    value_curve: Vec<Point>,
}

impl OptionModel {
    pub fn new(params: OptionParams, dynamics: DynamicsConfig) -> Self {
        let mut model = Self {
            params,
            dynamics,
            valuation: Valuation::default(),
            payoff_curve: Vec::new(),
            value_curve: Vec::new(),
        };
        model.recompute();
        model
    }

    pub fn params(&self) -> &OptionParams {
        &self.params
    }

    pub fn valuation(&self) -> &Valuation {
        &self.valuation
    }

    pub fn price(&self) -> f64 {
        self.valuation.price
    }

    /// Intrinsic value at expiry across `[0, payoff_domain_max]`.
    pub fn payoff_curve(&self) -> &[Point] {
        &self.payoff_curve
    }

    /// Today's model value across the same spot domain.
    pub fn value_curve(&self) -> &[Point] {
        &self.value_curve
    }

    pub fn payoff_path(&self, width: f64, height: f64) -> String {
        let vp = Viewport::fit(&self.payoff_curve, width, height);
        svg_path(&self.payoff_curve, &vp)
    }

    pub fn set_kind(&mut self, kind: OptionKind) {
        self.params.kind = kind;
    }

    pub fn set_spot(&mut self, spot: f64) -> Result<(), ParamError> {
        self.params.spot = positive("spot", spot)?;
        Ok(())
    }

    pub fn set_strike(&mut self, strike: f64) -> Result<(), ParamError> {
        self.params.strike = positive("strike", strike)?;
        Ok(())
    }

    pub fn set_volatility(&mut self, vol: f64) -> Result<(), ParamError> {
        self.params.volatility = positive("volatility", vol)?;
        Ok(())
    }

    pub fn set_time_to_expiry(&mut self, years: f64) -> Result<(), ParamError> {
        self.params.time_to_expiry = positive("time_to_expiry", years)?;
        Ok(())
    }

    pub fn set_risk_free_rate(&mut self, rate: f64) -> Result<(), ParamError> {
        self.params.risk_free_rate = finite("risk_free_rate", rate)?;
        Ok(())
    }

    pub fn set_payoff_domain_max(&mut self, max: f64) -> Result<(), ParamError> {
        self.params.payoff_domain_max = positive("payoff_domain_max", max)?;
        Ok(())
    }

    fn value_at(&self, spot: f64) -> Valuation {
        let p = &self.params;
        black_scholes(p.kind, spot, p.strike, p.risk_free_rate, p.volatility, p.time_to_expiry)
    }
}

impl Model for OptionModel {
    fn recompute(&mut self) {
        self.valuation = self.value_at(self.params.spot);

        let n = self.dynamics.payoff_samples.max(2);
        let (kind, strike, max) = (self.params.kind, self.params.strike, self.params.payoff_domain_max);
        self.payoff_curve = sample(0.0, max, n, |s| payoff_at_expiry(kind, s, strike));
        let value_curve = sample(0.0, max, n, |s| self.value_at(s).price);
        self.value_curve = value_curve;
    }

    fn step(&mut self, rng: &mut dyn RngCore, events: &mut dyn EventEmitter) {
        let jitter = symmetric_jitter(rng, self.dynamics.spot_jitter);
        self.params.spot = (self.params.spot + jitter).max(self.dynamics.price_floor);
        self.recompute();

        let v = self.valuation;
        events.log(
            EventKind::OptionTick,
            format!(
                "spot {:.2} ({:+.3}): {:?} {:.4}, Δ {:.3} Γ {:.4} Θ {:.3} ν {:.3}",
                self.params.spot,
                jitter,
                self.params.kind,
                v.price,
                v.greeks.delta,
                v.greeks.gamma,
                v.greeks.theta,
                v.greeks.vega
            ),
            Some(EventPayload::OptionTick(OptionTickEvent {
                kind: self.params.kind,
                spot: self.params.spot,
                price: v.price,
                delta: v.greeks.delta,
            })),
        );
    }

    fn reset(&mut self, config: &SimConfig) {
        *self = Self::new(config.options.clone(), config.dynamics);
    }
}
