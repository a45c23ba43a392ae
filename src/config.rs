// 7.0 config.rs: every default the engine resets to, in one place.
// 7.1 DynamicsConfig holds the stochastic knobs and sample counts shared by all models.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::amm::{AmmParams, CurveKind, MAX_FEE_BPS};
use crate::impermanent_loss::{IlParams, MAX_PRICE_RATIO, MIN_PRICE_RATIO};
use crate::interest::{InterestParams, MIN_HORIZON_DAYS};
use crate::lending::LendingParams;
use crate::market_making::{MarketMakingParams, MAX_LEVELS, MIN_LEVELS};
use crate::options::OptionParams;
use crate::perp::PerpParams;
use crate::types::Bps;

/** 7.2: per-tick randomness and chart resolution. */
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DynamicsConfig {
    // AMM curve sample count
    pub amm_curve_samples: usize,
    // curve x window is max(factor * x, min)
    pub amm_window_factor: f64,
    pub amm_window_min: f64,
    // y values are clamped here so the chart stays readable
    pub amm_y_bounds: (f64, f64),
    // market making mid moves U(-j, j) per tick
    pub mid_jitter: f64,
    pub fill_probability: f64,
    // fills are 1..=max_fill_size units
    pub max_fill_size: i64,
    // ticks between ladder rebuilds
    pub book_regen_interval: u32,
    pub perp_samples: usize,
    // option spot moves U(-j, j) per tick
    pub spot_jitter: f64,
    pub payoff_samples: usize,
    // IL price ratio moves U(-d, d) per tick
    pub ratio_drift: f64,
    pub il_samples: usize,
    pub rate_curve_samples: usize,
    pub interest_max_samples: usize,
    // random walks never go below this
    pub price_floor: f64,
}

impl Default for DynamicsConfig {
    fn default() -> Self {
        Self {
            amm_curve_samples: 160,
            amm_window_factor: 2.2,
            amm_window_min: 1_800.0,
            amm_y_bounds: (1.0, 5_000.0),
            mid_jitter: 0.25,
            fill_probability: 0.35,
            max_fill_size: 5,
            book_regen_interval: 90,
            perp_samples: 121,
            spot_jitter: 0.25,
            payoff_samples: 121,
            ratio_drift: 0.01,
            il_samples: 200,
            rate_curve_samples: 201,
            interest_max_samples: 241,
            price_floor: 0.01,
        }
    }
}

// The complete model configuration. reset() restores exactly this.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimConfig {
    pub amm: AmmParams,
    pub interest: InterestParams,
    pub lending: LendingParams,
    pub market_making: MarketMakingParams,
    pub perp: PerpParams,
    pub options: OptionParams,
    pub il: IlParams,
    pub dynamics: DynamicsConfig,
}

impl SimConfig {
    // The stock classroom setup
    pub fn classroom() -> Self {
        Self::default()
    }

    // Bigger moves everywhere. good for showing slippage, liquidations and IL quickly
    pub fn turbulent() -> Self {
        let mut config = Self::default();
        config.amm.trade_size = 80.0;
        config.market_making.spread_pct = 0.5;
        config.options.volatility = 0.6;
        config.perp.leverage = crate::types::Leverage::new_unchecked(dec!(25));
        config.dynamics.mid_jitter = 1.0;
        config.dynamics.spot_jitter = 1.0;
        config.dynamics.ratio_drift = 0.05;
        config.dynamics.fill_probability = 0.6;
        config.dynamics.book_regen_interval = 30;
        config
    }

    // Stablecoin pair: flat curve, tight spread, barely moving prices
    pub fn stable_pair() -> Self {
        let mut config = Self::default();
        config.amm.kind = CurveKind::StableLike;
        config.amm.amplification = 500.0;
        config.amm.fee = Bps(4);
        config.market_making.mid = 1.0;
        config.market_making.spread_pct = 0.02;
        config.market_making.tick_bps = 1.0;
        config.dynamics.mid_jitter = 0.0005;
        config.dynamics.spot_jitter = 0.0005;
        config.dynamics.ratio_drift = 0.001;
        config.dynamics.price_floor = 0.0001;
        config.options.spot = 1.0;
        config.options.strike = 1.0;
        config.options.volatility = 0.02;
        config.options.payoff_domain_max = 2.0;
        config
    }

    // Validate the configuration for internal consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        // amm checks
        let amm = &self.amm;
        if !(amm.x > 0.0 && amm.y > 0.0) {
            return Err(ConfigError::InvalidAmm {
                reason: "reserves must be positive".to_string(),
            });
        }
        if !(amm.wx > 0.0 && amm.wx < 1.0) {
            return Err(ConfigError::InvalidAmm {
                reason: "weight must be strictly between 0 and 1".to_string(),
            });
        }
        if !(amm.trade_size > 0.0) || !(amm.amplification >= 0.0) {
            return Err(ConfigError::InvalidAmm {
                reason: "trade size must be positive and amplification non-negative".to_string(),
            });
        }
        if amm.fee.value() > MAX_FEE_BPS {
            return Err(ConfigError::InvalidAmm {
                reason: "fee above 100%".to_string(),
            });
        }
        let range = &amm.range;
        if range.tick_spacing <= 0 || range.tick_lower >= range.tick_upper || !(range.liquidity >= 0.0) {
            return Err(ConfigError::InvalidAmm {
                reason: "concentrated range needs spacing > 0, lower < upper, liquidity >= 0".to_string(),
            });
        }

        // interest checks
        let interest = &self.interest;
        if !(interest.principal > 0.0) || !(interest.apr_pct >= 0.0) || !interest.apr_pct.is_finite() {
            return Err(ConfigError::InvalidInterest {
                reason: "principal must be positive and APR non-negative".to_string(),
            });
        }
        if interest.horizon_days < MIN_HORIZON_DAYS {
            return Err(ConfigError::InvalidInterest {
                reason: format!("horizon must be at least {MIN_HORIZON_DAYS} days"),
            });
        }

        // lending checks
        let lending = &self.lending;
        if lending.cash.is_negative() || lending.borrows.is_negative() || lending.reserves.is_negative() {
            return Err(ConfigError::InvalidLending {
                reason: "pool balances must be non-negative".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&lending.reserve_factor) || !(0.0..=1.0).contains(&lending.curve.kink) {
            return Err(ConfigError::InvalidLending {
                reason: "reserve factor and kink must be within [0, 1]".to_string(),
            });
        }

        // market making checks
        let mm = &self.market_making;
        if !(mm.mid > 0.0) || !(mm.tick_bps > 0.0) || !(mm.spread_pct >= 0.0) {
            return Err(ConfigError::InvalidMarketMaking {
                reason: "mid and tick must be positive, spread non-negative".to_string(),
            });
        }
        if !(MIN_LEVELS..=MAX_LEVELS).contains(&mm.levels) {
            return Err(ConfigError::InvalidMarketMaking {
                reason: format!("levels must be within [{MIN_LEVELS}, {MAX_LEVELS}]"),
            });
        }

        // perp checks
        let perp = &self.perp;
        if perp.qty <= Decimal::ZERO {
            return Err(ConfigError::InvalidPerp {
                reason: "quantity must be positive".to_string(),
            });
        }
        if perp.maintenance_margin_ratio <= Decimal::ZERO || perp.maintenance_margin_ratio >= Decimal::ONE {
            return Err(ConfigError::InvalidPerp {
                reason: "MM ratio must be between 0 and 1".to_string(),
            });
        }

        // option checks
        let opt = &self.options;
        let positive = [opt.spot, opt.strike, opt.volatility, opt.time_to_expiry, opt.payoff_domain_max];
        if positive.iter().any(|v| !(*v > 0.0 && v.is_finite())) || !opt.risk_free_rate.is_finite() {
            return Err(ConfigError::InvalidOptions {
                reason: "spot, strike, vol, expiry and domain must be positive".to_string(),
            });
        }

        // il checks
        if !(MIN_PRICE_RATIO..=MAX_PRICE_RATIO).contains(&self.il.price_ratio) {
            return Err(ConfigError::InvalidIl {
                reason: format!("price ratio must be within [{MIN_PRICE_RATIO}, {MAX_PRICE_RATIO}]"),
            });
        }

        self.dynamics.validate()
    }
}

impl DynamicsConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.fill_probability) {
            return Err(ConfigError::InvalidDynamics {
                reason: "fill probability must be within [0, 1]".to_string(),
            });
        }
        let jitters = [self.mid_jitter, self.spot_jitter, self.ratio_drift];
        if jitters.iter().any(|j| !(*j >= 0.0 && j.is_finite())) {
            return Err(ConfigError::InvalidDynamics {
                reason: "jitters must be finite and non-negative".to_string(),
            });
        }
        let samples = [
            self.amm_curve_samples,
            self.perp_samples,
            self.payoff_samples,
            self.il_samples,
            self.rate_curve_samples,
            self.interest_max_samples,
        ];
        if samples.iter().any(|n| *n < 2) {
            return Err(ConfigError::InvalidDynamics {
                reason: "every curve needs at least 2 samples".to_string(),
            });
        }
        if self.book_regen_interval == 0 || self.max_fill_size < 1 {
            return Err(ConfigError::InvalidDynamics {
                reason: "regen interval and max fill size must be at least 1".to_string(),
            });
        }
        if !(self.price_floor > 0.0) || !(self.amm_y_bounds.0 < self.amm_y_bounds.1) {
            return Err(ConfigError::InvalidDynamics {
                reason: "price floor must be positive and y bounds ordered".to_string(),
            });
        }
        Ok(())
    }
}

// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid amm config: {reason}")]
    InvalidAmm { reason: String },
    #[error("invalid interest config: {reason}")]
    InvalidInterest { reason: String },
    #[error("invalid lending config: {reason}")]
    InvalidLending { reason: String },
    #[error("invalid market making config: {reason}")]
    InvalidMarketMaking { reason: String },
    #[error("invalid perp config: {reason}")]
    InvalidPerp { reason: String },
    #[error("invalid options config: {reason}")]
    InvalidOptions { reason: String },
    #[error("invalid il config: {reason}")]
    InvalidIl { reason: String },
    #[error("invalid dynamics config: {reason}")]
    InvalidDynamics { reason: String },
}

// Named presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    Classroom,
    Turbulent,
    StablePair,
}

impl Preset {
    pub fn config(&self) -> SimConfig {
        match self {
            Preset::Classroom => SimConfig::classroom(),
            Preset::Turbulent => SimConfig::turbulent(),
            Preset::StablePair => SimConfig::stable_pair(),
        }
    }
}
