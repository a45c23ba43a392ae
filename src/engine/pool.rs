//! Lending pool actions.

use super::core::Engine;
use super::results::EngineError;
use crate::lending::PoolAction;
use crate::types::{Mode, Quote};
use tracing::warn;

impl Engine {
    /// Deposit, withdraw, borrow or repay. Returns the amount actually moved
    /// after clamping. Negative amounts are rejected and nothing is logged.
    pub fn apply_pool(&mut self, action: PoolAction, amount: Quote) -> Result<Quote, EngineError> {
        self.bus.stamp(self.clock.tick(), Mode::Interest);
        self.models
            .lending
            .apply_pool(action, amount, &mut self.bus)
            .map_err(|e| {
                warn!(action = action.as_str(), %amount, error = %e, "pool action rejected");
                EngineError::from(e)
            })
    }
}
