// 15.0: impermanent loss explorer. the price ratio drifts a little each tick and
// the loss versus holding is re-derived for the chosen pool weighting.

use crate::config::{DynamicsConfig, SimConfig};
use crate::events::{EventEmitter, EventKind, EventPayload, IlDriftEvent};
use crate::model::{finite, symmetric_jitter, Model, ParamError};
use crate::series::{sample, svg_path, Point, Viewport};
use rand::RngCore;
use serde::{Deserialize, Serialize};

pub const MIN_PRICE_RATIO: f64 = 0.1;
pub const MAX_PRICE_RATIO: f64 = 3.0;

// 15.1: kernels. p is new_price / entry_price, result is a fraction (-0.05 = 5% worse than holding)

pub fn impermanent_loss_5050(p: f64) -> f64 {
    if p <= 0.0 {
        return -1.0;
    }
    2.0 * p.sqrt() / (1.0 + p) - 1.0
}

/// Weighted-pool heuristic: the 50/50 pool proxy `sqrt(p)` reweighted to `p^w`,
/// over the linear hold proxy `w*p + (1-w)`. Reduces to a close cousin of the
/// 50/50 formula at `w = 0.5`.
pub fn impermanent_loss_weighted(p: f64, w: f64) -> f64 {
    if p <= 0.0 {
        return -1.0;
    }
    let hold = w * p + (1.0 - w);
    if hold <= 0.0 {
        return 0.0;
    }
    p.powf(w) / hold - 1.0
}

pub fn impermanent_loss_8020(p: f64) -> f64 {
    impermanent_loss_weighted(p, 0.8)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weighting {
    FiftyFifty,
    EightyTwenty,
}

impl Weighting {
    pub fn il(&self, p: f64) -> f64 {
        match self {
            Weighting::FiftyFifty => impermanent_loss_5050(p),
            Weighting::EightyTwenty => impermanent_loss_8020(p),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Weighting::FiftyFifty => "50/50",
            Weighting::EightyTwenty => "80/20",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IlParams {
    pub price_ratio: f64,
    pub weighting: Weighting,
}

impl Default for IlParams {
    fn default() -> Self {
        Self {
            price_ratio: 1.0,
            weighting: Weighting::FiftyFifty,
        }
    }
}

#[derive(Debug, Clone)]
pub struct IlModel {
    params: IlParams,
    dynamics: DynamicsConfig,
    il_value: f64,
    curve: Vec<Point>,
}

impl IlModel {
    pub fn new(params: IlParams, dynamics: DynamicsConfig) -> Self {
        let mut model = Self {
            params,
            dynamics,
            il_value: 0.0,
            curve: Vec::new(),
        };
        model.params.price_ratio = clamp_ratio(model.params.price_ratio);
        model.recompute();
        model
    }

    pub fn params(&self) -> &IlParams {
        &self.params
    }

    pub fn il_value(&self) -> f64 {
        self.il_value
    }

    pub fn curve(&self) -> &[Point] {
        &self.curve
    }

    pub fn current_point(&self) -> Point {
        Point::new(self.params.price_ratio, self.il_value)
    }

    pub fn curve_path(&self, width: f64, height: f64) -> String {
        let vp = Viewport::fit(&self.curve, width, height);
        svg_path(&self.curve, &vp)
    }

    /// Out-of-range ratios are clamped into `[0.1, 3.0]`; only non-finite input is rejected.
    pub fn set_price_ratio(&mut self, ratio: f64) -> Result<(), ParamError> {
        self.params.price_ratio = clamp_ratio(finite("price_ratio", ratio)?);
        Ok(())
    }

    pub fn set_weighting(&mut self, weighting: Weighting) {
        self.params.weighting = weighting;
    }
}

fn clamp_ratio(ratio: f64) -> f64 {
    ratio.clamp(MIN_PRICE_RATIO, MAX_PRICE_RATIO)
}

impl Model for IlModel {
    fn recompute(&mut self) {
        let weighting = self.params.weighting;
        self.il_value = weighting.il(self.params.price_ratio);
        self.curve = sample(
            MIN_PRICE_RATIO,
            MAX_PRICE_RATIO,
            self.dynamics.il_samples.max(2),
            |p| weighting.il(p),
        );
    }

    fn step(&mut self, rng: &mut dyn RngCore, events: &mut dyn EventEmitter) {
        let drift = symmetric_jitter(rng, self.dynamics.ratio_drift);
        self.params.price_ratio = clamp_ratio(self.params.price_ratio + drift);
        self.recompute();

        events.log(
            EventKind::IlDrift,
            format!(
                "ratio {:.4} ({:+.4}): {} IL {:.3}%",
                self.params.price_ratio,
                drift,
                self.params.weighting.label(),
                self.il_value * 100.0
            ),
            Some(EventPayload::IlDrift(IlDriftEvent {
                price_ratio: self.params.price_ratio,
                il_value: self.il_value,
            })),
        );
    }

    fn reset(&mut self, config: &SimConfig) {
        *self = Self::new(config.il.clone(), config.dynamics);
    }
}
