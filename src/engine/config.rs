//! Engine configuration options.

use crate::config::SimConfig;
use crate::events::DEFAULT_EVENT_CAPACITY;
use crate::types::Mode;
use serde::{Deserialize, Serialize};

/// Engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Maximum number of events to retain in memory.
    pub max_events: usize,
    /// Fixed rng seed. `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Mode active after construction.
    pub initial_mode: Mode,
    /// Model defaults, also what `reset` restores.
    pub models: SimConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_events: DEFAULT_EVENT_CAPACITY,
            seed: None,
            initial_mode: Mode::Amm,
            models: SimConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }
}
