// 8.0.2: result types and errors for engine operations.

use crate::config::ConfigError;
use crate::model::ParamError;
use crate::types::Mode;

/// What one executed tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickOutcome {
    pub tick: u64,
    pub mode: Mode,
    pub events_logged: usize,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("Invalid parameter: {0}")]
    Param(#[from] ParamError),

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
}
