// 3.0: the capability every simulated model shares. the engine only ever talks
// to models through this trait, picked by mode from its dispatch table.

use crate::config::SimConfig;
use crate::events::EventEmitter;
use rand::{Rng, RngCore};
use rust_decimal::Decimal;

pub trait Model {
    /// Re-derive every metric and sampled curve from current parameters. Idempotent.
    fn recompute(&mut self);

    /// Advance one stochastic tick. Models that are not tick driven keep the default.
    fn step(&mut self, _rng: &mut dyn RngCore, _events: &mut dyn EventEmitter) {}

    /// Restore the configured defaults and recompute.
    fn reset(&mut self, config: &SimConfig);
}

// 3.1: rejected parameter edits. state is untouched when one of these comes back.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParamError {
    #[error("{name} must be a finite number, got {value}")]
    NonFinite { name: &'static str, value: f64 },

    #[error("{name} must be positive, got {value}")]
    NotPositive { name: &'static str, value: String },

    #[error("{name} must be within [{min}, {max}], got {value}")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

/// Uniform draw from `[-amplitude, amplitude)`. A zero amplitude yields zero.
pub(crate) fn symmetric_jitter(rng: &mut dyn RngCore, amplitude: f64) -> f64 {
    (rng.gen::<f64>() * 2.0 - 1.0) * amplitude
}

pub(crate) fn finite(name: &'static str, value: f64) -> Result<f64, ParamError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ParamError::NonFinite { name, value })
    }
}

pub(crate) fn positive(name: &'static str, value: f64) -> Result<f64, ParamError> {
    let value = finite(name, value)?;
    if value > 0.0 {
        Ok(value)
    } else {
        Err(ParamError::NotPositive {
            name,
            value: value.to_string(),
        })
    }
}

pub(crate) fn non_negative(name: &'static str, value: f64) -> Result<f64, ParamError> {
    let value = finite(name, value)?;
    if value >= 0.0 {
        Ok(value)
    } else {
        Err(ParamError::OutOfRange {
            name,
            value,
            min: 0.0,
            max: f64::INFINITY,
        })
    }
}

pub(crate) fn in_range(name: &'static str, value: f64, min: f64, max: f64) -> Result<f64, ParamError> {
    let value = finite(name, value)?;
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(ParamError::OutOfRange {
            name,
            value,
            min,
            max,
        })
    }
}

pub(crate) fn positive_decimal(name: &'static str, value: Decimal) -> Result<Decimal, ParamError> {
    if value > Decimal::ZERO {
        Ok(value)
    } else {
        Err(ParamError::NotPositive {
            name,
            value: value.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rust_decimal_macros::dec;

    #[test]
    fn jitter_stays_in_band() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..1_000 {
            let j = symmetric_jitter(&mut rng, 0.25);
            assert!((-0.25..0.25).contains(&j));
        }
        assert_eq!(symmetric_jitter(&mut rng, 0.0), 0.0);
    }

    #[test]
    fn validators() {
        assert_eq!(positive("x", 2.0), Ok(2.0));
        assert!(matches!(positive("x", 0.0), Err(ParamError::NotPositive { .. })));
        assert!(matches!(positive("x", f64::NAN), Err(ParamError::NonFinite { .. })));
        assert!(non_negative("fee", 0.0).is_ok());
        assert!(in_range("w", 1.5, 0.0, 1.0).is_err());
        assert!(positive_decimal("qty", dec!(-1)).is_err());
    }
}
